//! GPIO indicator LED.

/// LED pin configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedConfig {
    pub pin: u8,
    pub active_high: bool,
}

impl LedConfig {
    /// Pin from `CONFIG`, active high.
    pub fn from_config() -> Self {
        Self {
            pin: crate::config::CONFIG.led_pin(),
            active_high: true,
        }
    }

    /// Pin level that lights the LED.
    #[inline]
    pub fn on_level(&self) -> bool {
        self.active_high
    }
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            pin: crate::config::DEFAULT_LED_PIN,
            active_high: true,
        }
    }
}

#[cfg(target_os = "espidf")]
pub use esp::LedTransducer;

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_svc::hal::gpio::{AnyOutputPin, Output, PinDriver};
    use esp_idf_svc::sys::EspError;

    use super::LedConfig;
    use crate::player::Transducer;

    /// LED on a GPIO output.
    pub struct LedTransducer<'d> {
        pin: PinDriver<'d, AnyOutputPin, Output>,
        config: LedConfig,
    }

    impl<'d> LedTransducer<'d> {
        /// Claim the configured pin as an output, LED off.
        pub fn new(config: LedConfig) -> Result<Self, EspError> {
            // SAFETY: The pin number comes from CONFIG and is claimed only here.
            let pin = unsafe { AnyOutputPin::new(config.pin as i32) };
            let mut led = Self {
                pin: PinDriver::output(pin)?,
                config,
            };
            led.drive(false);
            Ok(led)
        }

        fn drive(&mut self, lit: bool) {
            // Fire-and-forget: a failed level write leaves the previous level
            let _ = if lit == self.config.on_level() {
                self.pin.set_high()
            } else {
                self.pin.set_low()
            };
        }
    }

    impl<'d> Transducer for LedTransducer<'d> {
        fn activate(&mut self) {
            self.drive(true);
        }

        fn deactivate(&mut self) {
            self.drive(false);
        }
    }
}
