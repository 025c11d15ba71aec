//! Hardware Abstraction Layer for RustMorseWriter.
//!
//! Thin wrappers around ESP-IDF peripherals implementing the player's
//! `Transducer` and `Clock` traits. Playback logic stays in core modules.

pub mod gpio;

#[cfg(target_os = "espidf")]
pub mod clock;

pub use gpio::LedConfig;

#[cfg(target_os = "espidf")]
pub use clock::EspClock;
#[cfg(target_os = "espidf")]
pub use gpio::LedTransducer;
