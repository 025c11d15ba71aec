//! # RustMorseWriter
//!
//! Text to Morse signaling: keys a two-state output (LED, relay) with
//! correctly timed dots, dashes and gaps, and records a readable transcript
//! (`.`, `-`, space, newline) for asynchronous readback.
//!
//! ## Architecture
//!
//! ```text
//! text ──▶ sequence ──▶ player ──▶ Transducer (LED)
//!          (code table)    │
//!                          └────▶ TranscriptBuffer ──▶ reader
//! ```
//!
//! - [`code`]: letter table and run-length element decoding
//! - [`sequence`]: per-write code list, whitespace collapsing
//! - [`player`]: timed playback behind `Transducer` / `Clock` traits
//! - [`transcript`]: lock-free bounded transcript FIFO
//! - [`writer`]: device engine tying them together

#![cfg_attr(not(test), no_std)]

pub mod code;
pub mod config;
pub mod error;
pub mod fault;
pub mod hal;
pub mod input;
pub mod log_drain;
pub mod log_globals;
pub mod logging;
pub mod player;
pub mod sequence;
pub mod transcript;
pub mod writer;

pub use code::{lookup, Element, SignalCode};
pub use config::{OverflowPolicy, CONFIG};
pub use error::{PlayError, SequenceFull, TranscriptOverflow, WriteError};
pub use fault::{FaultCode, FaultState};
pub use log_globals::LOG_STREAM;
pub use player::{CancelToken, Clock, PlayReport, SignalPlayer, Transducer};
pub use sequence::{build, Sequence, SequenceBuilder};
pub use transcript::TranscriptBuffer;
pub use writer::{MorseWriter, WriterShared};

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");
