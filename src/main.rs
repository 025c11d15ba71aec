//! RustMorseWriter - Main entry point
//!
//! On the device: text arrives on UART1, the LED keys it, and a drain task
//! on the second core sends transcript and logs back out on the same UART
//! while the write is still playing.
//!
//! On host: text from stdin, the "LED" is a `*` blinking on stderr, the
//! transcript goes to stdout from a separate reader thread.

#![cfg_attr(target_os = "espidf", no_std)]
#![cfg_attr(target_os = "espidf", no_main)]

use morse_writer::{
    input::{Feed, LineBuffer},
    log_drain, log_error,
    writer::{MorseWriter, WriterShared},
    LOG_STREAM,
};

static SHARED: WriterShared = WriterShared::new();

#[cfg(target_os = "espidf")]
mod device {
    use core::ffi::c_void;

    use esp_idf_svc::hal::cpu::Core;
    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::hal::gpio::AnyIOPin;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::task;
    use esp_idf_svc::hal::uart::{self, UartDriver};
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::sys::EspError;

    use morse_writer::hal::{EspClock, LedConfig, LedTransducer};

    use super::*;

    /// UART read timeout in FreeRTOS ticks.
    const RX_TIMEOUT_TICKS: u32 = 10;

    /// Drain task period.
    const DRAIN_PERIOD_MS: u32 = 20;

    const DRAIN_STACK_SIZE: usize = 4096;
    const DRAIN_PRIORITY: u8 = 5;

    // Set once in `run` before the drain task starts, never moved afterwards.
    // The main task receives through it, the drain task transmits.
    static mut UART: Option<UartDriver<'static>> = None;

    struct UartOut<'a>(&'a UartDriver<'static>);

    impl core::fmt::Write for UartOut<'_> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            self.0.write(s.as_bytes()).map(|_| ()).map_err(|_| core::fmt::Error)
        }
    }

    fn uart() -> Option<&'static UartDriver<'static>> {
        // SAFETY: Written once before any reader exists.
        unsafe { (*core::ptr::addr_of!(UART)).as_ref() }
    }

    /// Transcript and log drain, runs while `write` blocks the main task.
    extern "C" fn drain_task(_arg: *mut c_void) {
        let Some(uart) = uart() else {
            // SAFETY: A FreeRTOS task must delete itself instead of returning.
            unsafe { esp_idf_svc::sys::vTaskDelete(core::ptr::null_mut()) };
            return;
        };
        let mut tx = [0u8; 128];

        loop {
            loop {
                let n = SHARED.transcript.drain_into(&mut tx);
                if n == 0 {
                    break;
                }
                if uart.write(&tx[..n]).is_err() {
                    break;
                }
            }
            log_drain::drain_to(&LOG_STREAM, &mut UartOut(uart));
            FreeRtos::delay_ms(DRAIN_PERIOD_MS);
        }
    }

    pub fn run() -> Result<(), EspError> {
        let peripherals = Peripherals::take()?;

        let driver = UartDriver::new(
            peripherals.uart1,
            peripherals.pins.gpio17,
            peripherals.pins.gpio18,
            Option::<AnyIOPin>::None, // CTS
            Option::<AnyIOPin>::None, // RTS
            &uart::config::Config::default().baudrate(Hertz(115_200)),
        )?;

        // SAFETY: Single assignment, the drain task is not running yet.
        unsafe {
            *core::ptr::addr_of_mut!(UART) = Some(driver);
        }
        let Some(uart) = uart() else {
            return Ok(());
        };

        // SAFETY: drain_task takes no argument and never returns.
        unsafe {
            task::create(
                drain_task,
                c"drain",
                DRAIN_STACK_SIZE,
                core::ptr::null_mut(),
                DRAIN_PRIORITY,
                Some(Core::Core1),
            )?;
        }

        let led = LedTransducer::new(LedConfig::from_config())?;
        let mut writer = MorseWriter::new(led, EspClock, &SHARED, &LOG_STREAM);

        let mut line = LineBuffer::<{ morse_writer::input::LINE_SIZE }>::new();
        let mut rx = [0u8; 64];

        loop {
            let n = uart.read(&mut rx, RX_TIMEOUT_TICKS)?;
            for &b in &rx[..n] {
                if line.feed(b) == Feed::Line {
                    if !line.is_empty() {
                        if let Err(e) = writer.write(line.as_bytes()) {
                            log_error!(LOG_STREAM, 0, "write failed: {}", e);
                        }
                    }
                    line.clear();
                }
            }
        }
    }
}

#[cfg(target_os = "espidf")]
#[no_mangle]
fn main() {
    esp_idf_svc::sys::link_patches();

    if let Err(e) = device::run() {
        log_error!(LOG_STREAM, 0, "fatal: {}", e);
    }

    loop {
        unsafe {
            esp_idf_svc::sys::vTaskDelay(1000);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::io::{Read, Write};
    use std::thread;
    use std::time::{Duration, Instant};

    use morse_writer::player::{Clock, Transducer};

    use super::*;

    /// Shows the key state as `*` on stderr.
    pub struct TerminalLed;

    impl Transducer for TerminalLed {
        fn activate(&mut self) {
            eprint!("*");
        }

        fn deactivate(&mut self) {
            eprint!("\x08 \x08");
        }
    }

    pub struct StdClock {
        origin: Instant,
    }

    impl StdClock {
        pub fn new() -> Self {
            Self { origin: Instant::now() }
        }
    }

    impl Clock for StdClock {
        fn now_us(&self) -> i64 {
            self.origin.elapsed().as_micros() as i64
        }

        fn delay_us(&mut self, us: u32) {
            thread::sleep(Duration::from_micros(us as u64));
        }
    }

    /// Writes `core::fmt` output to stderr.
    struct Stderr;

    impl core::fmt::Write for Stderr {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            std::io::stderr().write_all(s.as_bytes()).map_err(|_| core::fmt::Error)
        }
    }

    /// Transcript and log drain, runs beside the blocking writer.
    fn spawn_reader() {
        thread::spawn(|| {
            let mut buf = [0u8; 64];
            loop {
                let n = SHARED.transcript.drain_into(&mut buf);
                if n > 0 {
                    let mut out = std::io::stdout();
                    let _ = out.write_all(&buf[..n]);
                    let _ = out.flush();
                }
                log_drain::drain_to(&LOG_STREAM, &mut Stderr);
                thread::sleep(Duration::from_millis(20));
            }
        });
    }

    pub fn run() -> std::io::Result<()> {
        spawn_reader();

        let mut writer = MorseWriter::new(TerminalLed, StdClock::new(), &SHARED, &LOG_STREAM);
        let mut line = LineBuffer::<{ morse_writer::input::LINE_SIZE }>::new();

        for byte in std::io::stdin().lock().bytes() {
            if line.feed(byte?) == Feed::Line {
                if !line.is_empty() {
                    if let Err(e) = writer.write(line.as_bytes()) {
                        log_error!(LOG_STREAM, 0, "write failed: {}", e);
                    }
                }
                line.clear();
            }
        }

        if !line.is_empty() {
            if let Err(e) = writer.write(line.as_bytes()) {
                log_error!(LOG_STREAM, 0, "write failed: {}", e);
            }
        }

        writer.shutdown();
        // Let the reader flush the last newline
        thread::sleep(Duration::from_millis(100));
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() -> std::io::Result<()> {
    host::run()
}
