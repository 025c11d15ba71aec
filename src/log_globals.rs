//! Global log stream instance.
//!
//! Every task pushes here; the drain task (UART on the device, stderr on
//! host) is the single consumer.

use crate::logging::LogStream;

/// Shared log stream for the writer, player and front-end.
pub static LOG_STREAM: LogStream = LogStream::new();
