//! Module: config
//!
//! Purpose: Runtime configuration for RustMorseWriter.
//!
//! Architecture:
//! - One static `CONFIG` of atomics, readable from any task without locks
//! - `generation` bumps on every change so holders of a cached copy can notice
//! - The base time unit is a compile-time constant (see `player::DOT_TIME_US`)
//!   and deliberately absent here
//!
//! Safety: Lock-free. All access via atomics.

use core::sync::atomic::{AtomicU16, AtomicU8, Ordering};

use crate::logging::LogLevel;

/// Default GPIO for the indicator LED.
pub const DEFAULT_LED_PIN: u8 = 2;

/// What to do when symbols or codes cannot be stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OverflowPolicy {
    /// Finish the write, count the loss, report success.
    DropAndCount = 0,
    /// Finish the write, then report the loss as an error.
    FailWrite = 1,
}

impl OverflowPolicy {
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::FailWrite,
            _ => Self::DropAndCount,
        }
    }
}

impl Default for OverflowPolicy {
    fn default() -> Self {
        OverflowPolicy::DropAndCount
    }
}

/// Writer configuration.
pub struct WriterConfig {
    overflow_policy: AtomicU8,
    log_level: AtomicU8,
    led_pin: AtomicU8,
    generation: AtomicU16,
}

/// Global configuration instance.
pub static CONFIG: WriterConfig = WriterConfig::new();

impl WriterConfig {
    pub const fn new() -> Self {
        Self {
            overflow_policy: AtomicU8::new(OverflowPolicy::DropAndCount as u8),
            log_level: AtomicU8::new(LogLevel::Info as u8),
            led_pin: AtomicU8::new(DEFAULT_LED_PIN),
            generation: AtomicU16::new(0),
        }
    }

    #[inline]
    pub fn overflow_policy(&self) -> OverflowPolicy {
        OverflowPolicy::from_u8(self.overflow_policy.load(Ordering::Relaxed))
    }

    pub fn set_overflow_policy(&self, policy: OverflowPolicy) {
        self.overflow_policy.store(policy as u8, Ordering::Relaxed);
        self.bump();
    }

    /// Most verbose level that still gets logged.
    #[inline]
    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_u8(self.log_level.load(Ordering::Relaxed))
    }

    pub fn set_log_level(&self, level: LogLevel) {
        self.log_level.store(level as u8, Ordering::Relaxed);
        self.bump();
    }

    /// GPIO number driving the indicator LED (read once at startup).
    #[inline]
    pub fn led_pin(&self) -> u8 {
        self.led_pin.load(Ordering::Relaxed)
    }

    pub fn set_led_pin(&self, pin: u8) {
        self.led_pin.store(pin, Ordering::Relaxed);
        self.bump();
    }

    #[inline]
    pub fn generation(&self) -> u16 {
        self.generation.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = WriterConfig::new();
        assert_eq!(cfg.overflow_policy(), OverflowPolicy::DropAndCount);
        assert_eq!(cfg.log_level(), LogLevel::Info);
        assert_eq!(cfg.led_pin(), DEFAULT_LED_PIN);
        assert_eq!(cfg.generation(), 0);
    }

    #[test]
    fn test_changes_bump_generation() {
        let cfg = WriterConfig::new();
        cfg.set_overflow_policy(OverflowPolicy::FailWrite);
        cfg.set_log_level(LogLevel::Trace);
        assert_eq!(cfg.overflow_policy(), OverflowPolicy::FailWrite);
        assert_eq!(cfg.log_level(), LogLevel::Trace);
        assert_eq!(cfg.generation(), 2);
    }

    #[test]
    fn test_policy_from_unknown_byte() {
        assert_eq!(OverflowPolicy::from_u8(9), OverflowPolicy::DropAndCount);
    }
}
