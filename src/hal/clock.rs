//! ESP-IDF time source and blocking delay.

use esp_idf_svc::hal::delay::{Ets, FreeRtos};

use crate::player::Clock;

/// High-resolution timer plus FreeRTOS delay.
///
/// Whole milliseconds yield to the scheduler, the remainder busy-waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct EspClock;

impl Clock for EspClock {
    #[inline]
    fn now_us(&self) -> i64 {
        // SAFETY: esp_timer_get_time is always safe to call
        unsafe { esp_idf_svc::sys::esp_timer_get_time() }
    }

    fn delay_us(&mut self, us: u32) {
        FreeRtos::delay_ms(us / 1000);
        let rest = us % 1000;
        if rest > 0 {
            Ets::delay_us(rest);
        }
    }
}
