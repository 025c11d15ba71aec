//! Non-blocking logging for RustMorseWriter.
//!
//! # Architecture
//!
//! ```text
//! MorseWriter ── log_warn!() ──▶ LogStream ──▶ log_drain::drain_to ──▶ UART / stderr
//!                (stack format)   (bounded)      (reader task)
//! ```
//!
//! Playback keeps its timing because it never touches a blocking sink: a
//! message is formatted on the stack, queued, and written out later by
//! whoever drains the stream. Levels above `CONFIG.log_level()` are
//! discarded before formatting.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Longest message kept; the rest is cut.
pub const MAX_MSG_LEN: usize = 96;

/// Entries the default stream holds.
pub const LOG_BUFFER_SIZE: usize = 64;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    /// Convert to string for output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    /// Convert from raw u8 value (out of range saturates to Trace).
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// True if this level passes the configured filter.
    #[inline]
    pub fn enabled(self) -> bool {
        self <= crate::config::CONFIG.log_level()
    }
}

/// One queued message.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Clock time of the call, microseconds.
    pub timestamp_us: i64,
    pub level: LogLevel,
    pub len: u8,
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: LogEntry = LogEntry {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text (lossy: invalid UTF-8 yields a placeholder).
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Bounded log queue: any task may push, one drain task pops.
///
/// A slot is claimed by advancing the head with a CAS and becomes visible to the
/// drain only once its `ready` flag is raised, so a half-written entry is
/// never read. A full queue refuses the entry and counts it.
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    slots: UnsafeCell<[LogEntry; N]>,
    ready: [AtomicBool; N],
    head: AtomicU32,
    tail: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: A slot is written only by the producer that claimed it and read
// only by the drain after `ready` is observed with Acquire.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: u32 = N as u32 - 1;

    pub const fn new() -> Self {
        const { assert!(N.is_power_of_two(), "log queue size must be a power of 2") };

        Self {
            slots: UnsafeCell::new([LogEntry::EMPTY; N]),
            ready: [const { AtomicBool::new(false) }; N],
            head: AtomicU32::new(0),
            tail: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue a message, truncated to `MAX_MSG_LEN`. Never blocks.
    ///
    /// `false` means the queue was full and the message is gone.
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        let mut claimed = self.head.load(Ordering::Relaxed);
        loop {
            if claimed.wrapping_sub(self.tail.load(Ordering::Acquire)) >= N as u32 {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            match self.head.compare_exchange_weak(
                claimed,
                claimed.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => claimed = current,
            }
        }

        let idx = (claimed & Self::MASK) as usize;
        let len = msg.len().min(MAX_MSG_LEN);

        // SAFETY: `idx` was handed to this producer alone and its ready flag
        // is down, so the drain is not reading it.
        unsafe {
            let slot = &mut (*self.slots.get())[idx];
            slot.timestamp_us = timestamp_us;
            slot.level = level;
            slot.len = len as u8;
            slot.msg[..len].copy_from_slice(&msg[..len]);
        }
        self.ready[idx].store(true, Ordering::Release);
        true
    }

    /// Pop the oldest published entry.
    ///
    /// `None` when empty, or when the oldest slot is still being written.
    pub fn drain(&self) -> Option<LogEntry> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }

        let idx = (tail & Self::MASK) as usize;
        if !self.ready[idx].load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: Ready flag observed; only this consumer touches the slot now.
        let entry = unsafe { (*self.slots.get())[idx] };
        self.ready[idx].store(false, Ordering::Release);
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Messages refused since the last reset.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub fn has_entries(&self) -> bool {
        self.pending() != 0
    }

    /// Claimed slots not yet drained (includes ones still being written).
    #[inline]
    pub fn pending(&self) -> u32 {
        let tail = self.tail.load(Ordering::Relaxed);
        self.head.load(Ordering::Acquire).wrapping_sub(tail)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer, truncating at the end of `buf`.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    let mut writer = BufWriter::new(buf);
    let _ = core::fmt::write(&mut writer, args);
    writer.len()
}

/// `core::fmt::Write` over a byte slice that silently truncates.
pub struct BufWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> BufWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }
}

impl<'a> core::fmt::Write for BufWriter<'a> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buf.len() - self.pos;
        let to_write = bytes.len().min(remaining);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        Ok(())
    }
}

/// Non-blocking log macro.
///
/// # Example
///
/// ```ignore
/// log_at!(LogLevel::Info, LOG_STREAM, clock.now_us(), "played {} codes", n);
/// ```
#[macro_export]
macro_rules! log_at {
    ($level:expr, $stream:expr, $timestamp:expr, $($arg:tt)*) => {{
        let level: $crate::logging::LogLevel = $level;
        if level.enabled() {
            let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
            let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
            $stream.push($timestamp, level, &buf[..len]);
        }
    }};
}

#[macro_export]
macro_rules! log_info {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::LogLevel::Info, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::LogLevel::Warn, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::LogLevel::Error, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::LogLevel::Debug, $stream, $timestamp, $($arg)*)
    };
}

/// Trace log (maximum verbosity, per element).
#[macro_export]
macro_rules! log_trace {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::LogLevel::Trace, $stream, $timestamp, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_then_drain() {
        let stream = LogStream::<8>::new();
        assert!(stream.drain().is_none());

        assert!(stream.push(1000, LogLevel::Warn, b"transcript full"));
        assert_eq!(stream.pending(), 1);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.timestamp_us, 1000);
        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.message(), "transcript full");
        assert!(!stream.has_entries());
    }

    #[test]
    fn test_full_stream_refuses_and_counts() {
        let stream = LogStream::<2>::new();

        assert!(stream.push(1, LogLevel::Info, b"a"));
        assert!(stream.push(2, LogLevel::Info, b"b"));
        assert!(!stream.push(3, LogLevel::Info, b"c"));
        assert!(!stream.push(4, LogLevel::Info, b"d"));
        assert_eq!(stream.dropped(), 2);
        assert_eq!(stream.pending(), 2);

        // Oldest survives, space frees up after a drain
        assert_eq!(stream.drain().unwrap().message(), "a");
        assert!(stream.push(5, LogLevel::Info, b"e"));
        assert_eq!(stream.drain().unwrap().message(), "b");
        assert_eq!(stream.drain().unwrap().message(), "e");

        stream.reset_dropped();
        assert_eq!(stream.dropped(), 0);
    }

    #[test]
    fn test_unpublished_slot_is_not_drained() {
        let stream = LogStream::<4>::new();
        // Claim a slot without publishing it
        stream.head.fetch_add(1, Ordering::AcqRel);

        assert_eq!(stream.pending(), 1);
        assert!(stream.drain().is_none());
    }

    #[test]
    fn test_long_message_cut() {
        let stream = LogStream::<4>::new();
        assert!(stream.push(0, LogLevel::Info, &[b'-'; MAX_MSG_LEN + 20]));
        assert_eq!(stream.drain().unwrap().len as usize, MAX_MSG_LEN);
    }

    #[test]
    fn test_format_to_buffer_cuts_at_end() {
        let mut buf = [0u8; 6];
        let len = format_to_buffer(&mut buf, format_args!("sent {} codes", 12));
        assert_eq!(&buf[..len], b"sent 1");
    }

    #[test]
    fn test_levels() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Debug < LogLevel::Trace);
        assert_eq!(LogLevel::from_u8(1), LogLevel::Warn);
        assert_eq!(LogLevel::from_u8(42), LogLevel::Trace);
        assert_eq!(LogLevel::Info.as_str(), "INFO");
    }

    #[test]
    fn test_macros_filter_by_default_level() {
        let stream = LogStream::<8>::new();
        crate::log_warn!(stream, 10, "dropped {}", 3);
        crate::log_debug!(stream, 11, "hidden {}", 4);
        crate::log_trace!(stream, 12, "hidden {}", 5);
        assert_eq!(stream.pending(), 1);
        assert_eq!(stream.drain().unwrap().message(), "dropped 3");
    }

    #[test]
    fn test_concurrent_producers_with_drain() {
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<16>::new());
        let producers: Vec<_> = (0..3)
            .map(|t| {
                let stream = Arc::clone(&stream);
                thread::spawn(move || {
                    for i in 0..50 {
                        let msg = format!("t{} #{}", t, i);
                        stream.push(i, LogLevel::Info, msg.as_bytes());
                    }
                })
            })
            .collect();

        let mut drained = 0u32;
        while producers.iter().any(|h| !h.is_finished()) {
            while let Some(entry) = stream.drain() {
                assert!(entry.message().starts_with('t'));
                drained += 1;
            }
        }
        for h in producers {
            h.join().unwrap();
        }
        while let Some(entry) = stream.drain() {
            assert!(entry.message().starts_with('t'));
            drained += 1;
        }

        assert_eq!(drained + stream.dropped(), 150);
    }
}
