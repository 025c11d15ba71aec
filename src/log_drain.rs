//! Log output.
//!
//! Drains a [`LogStream`] into any `core::fmt::Write` sink. On the device
//! the sink is the UART, on host it is stderr.
//!
//! Format: `[timestamp_us] LEVEL: message`

use core::fmt::Write;

use crate::logging::{LogEntry, LogStream};

/// Write one formatted entry.
pub fn write_entry(out: &mut dyn Write, entry: &LogEntry) -> core::fmt::Result {
    writeln!(
        out,
        "[{:10}] {}: {}",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.message()
    )
}

/// Drain every pending entry into `out`.
///
/// A pending drop count is reported once, then reset. Returns the number of
/// entries written.
pub fn drain_to<const N: usize>(stream: &LogStream<N>, out: &mut dyn Write) -> usize {
    let mut written = 0;

    while let Some(entry) = stream.drain() {
        if write_entry(out, &entry).is_err() {
            break;
        }
        written += 1;
    }

    let dropped = stream.dropped();
    if dropped > 0 {
        let _ = writeln!(out, "[WARN] Dropped: {} log messages", dropped);
        stream.reset_dropped();
    }

    written
}
