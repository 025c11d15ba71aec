//! Module: writer
//!
//! Purpose: The device engine. Accepts a text buffer, builds its sequence,
//! plays it, and serves transcript reads.
//!
//! Architecture:
//! ```text
//! write(bytes) ──▶ SequenceBuilder ──▶ SignalPlayer ──▶ LED
//!                                           │
//!                                           ▼
//! read(buf)    ◀──────────────────── TranscriptBuffer
//! ```
//!
//! - `write` takes `&mut self`: one writer at a time, enforced by the borrow
//! - Sequence state is built per call and dropped afterwards
//! - Transcript, fault state and cancel token live in [`WriterShared`] so a
//!   reader task can use them while a write is blocking
//! - Losses are latched in `FaultState` and logged, whatever the policy

use crate::config::{OverflowPolicy, CONFIG};
use crate::error::{PlayError, WriteError};
use crate::fault::{FaultCode, FaultState};
use crate::logging::LogStream;
use crate::player::{CancelToken, Clock, PlayReport, SignalPlayer, Transducer};
use crate::sequence::{Sequence, SequenceBuilder};
use crate::transcript::{TranscriptBuffer, TRANSCRIPT_CAPACITY};
use crate::{log_debug, log_info, log_warn};

/// State shared between the writing task and readers.
pub struct WriterShared<const N: usize = TRANSCRIPT_CAPACITY> {
    pub transcript: TranscriptBuffer<N>,
    pub fault: FaultState,
    pub cancel: CancelToken,
}

impl<const N: usize> WriterShared<N> {
    pub const fn new() -> Self {
        Self {
            transcript: TranscriptBuffer::new(),
            fault: FaultState::new(),
            cancel: CancelToken::new(),
        }
    }
}

impl<const N: usize> Default for WriterShared<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Text to Morse writer.
///
/// # Example
///
/// ```ignore
/// static SHARED: WriterShared = WriterShared::new();
///
/// let mut writer = MorseWriter::new(led, clock, &SHARED, &LOG_STREAM);
/// writer.write(b"sos\n")?;
///
/// let mut buf = [0u8; 64];
/// let n = writer.read(&mut buf); // "... --- ...\n"
/// ```
pub struct MorseWriter<'a, T, C, const N: usize = TRANSCRIPT_CAPACITY> {
    player: SignalPlayer<'a, T, C, N>,
    shared: &'a WriterShared<N>,
    log: &'a LogStream,
    writes: u32,
}

impl<'a, T: Transducer, C: Clock, const N: usize> MorseWriter<'a, T, C, N> {
    pub fn new(mut transducer: T, clock: C, shared: &'a WriterShared<N>, log: &'a LogStream) -> Self {
        // Known state before the first write
        transducer.deactivate();

        let player = SignalPlayer::new(transducer, clock, &shared.transcript)
            .with_cancel(&shared.cancel)
            .with_policy(CONFIG.overflow_policy());

        log_info!(log, player.clock().now_us(), "{} init", crate::VERSION);

        Self {
            player,
            shared,
            log,
            writes: 0,
        }
    }

    /// Send `buf` as Morse, blocking until the signal is finished.
    ///
    /// One trailing terminator (`\0` or `\n`) is not transcoded. Bytes other
    /// than letters and spaces are skipped. Returns the number of bytes
    /// consumed, which is always `buf.len()` on success.
    ///
    /// Under `FailWrite` a loss is reported after the whole signal has been
    /// sent; when both the sequence and the transcript overflowed,
    /// `SequenceOverflow` is returned and the transcript loss is in
    /// `FaultState` only.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize, WriteError> {
        // A cancel only applies to the write in progress
        self.shared.cancel.reset();

        let policy = CONFIG.overflow_policy();
        self.player.set_policy(policy);
        self.writes = self.writes.wrapping_add(1);

        let mut builder = SequenceBuilder::new();
        builder.extend(strip_terminator(buf));
        let seq: Sequence = builder.finish();

        log_debug!(
            self.log,
            self.now_us(),
            "write #{}: {} bytes, {} codes ({} letters)",
            self.writes,
            buf.len(),
            seq.len(),
            seq.letters()
        );

        let lost_codes = seq.overflowed();
        if lost_codes > 0 {
            self.shared.fault.record(FaultCode::SequenceOverflow, lost_codes);
            log_warn!(self.log, self.now_us(), "sequence full: {} codes dropped", lost_codes);
        }

        let result = self.player.play(&seq);

        // Counted on every exit, cancelled plays included
        let dropped = self.player.dropped();
        if dropped > 0 {
            self.record_transcript_loss(dropped);
        }

        match result {
            Ok(report) => self.log_report(&report),
            Err(PlayError::Cancelled) => {
                self.shared.cancel.reset();
                log_warn!(self.log, self.now_us(), "write #{} cancelled", self.writes);
                return Err(WriteError::Cancelled);
            }
            Err(PlayError::TranscriptOverflow { .. }) if lost_codes > 0 => {
                // Sequence loss was known before playback and wins
                return Err(WriteError::SequenceOverflow { dropped: lost_codes });
            }
            Err(PlayError::TranscriptOverflow { dropped }) => {
                return Err(WriteError::TranscriptOverflow { dropped });
            }
        }

        if lost_codes > 0 && policy == OverflowPolicy::FailWrite {
            return Err(WriteError::SequenceOverflow { dropped: lost_codes });
        }

        Ok(buf.len())
    }

    /// Copy up to `out.len()` transcript symbols. Never blocks; 0 if empty.
    pub fn read(&self, out: &mut [u8]) -> usize {
        self.shared.transcript.drain_into(out)
    }

    /// Shared state (transcript, fault, cancel token).
    pub fn shared(&self) -> &'a WriterShared<N> {
        self.shared
    }

    /// Token that aborts the running write when tripped.
    ///
    /// A trip while no write is running is discarded by the next `write`.
    pub fn cancel_token(&self) -> &'a CancelToken {
        &self.shared.cancel
    }

    /// Writes attempted since creation.
    pub fn writes(&self) -> u32 {
        self.writes
    }

    /// Turn the output off and hand back the hardware.
    pub fn shutdown(mut self) -> (T, C) {
        self.player.transducer_mut().deactivate();
        log_info!(self.log, self.now_us(), "exit after {} writes", self.writes);
        self.player.into_parts()
    }

    fn log_report(&self, report: &PlayReport) {
        log_info!(
            self.log,
            self.now_us(),
            "sent {} codes, {} elements in {} ms",
            report.codes,
            report.elements,
            report.duration_us / 1000
        );
    }

    fn record_transcript_loss(&mut self, dropped: u32) {
        self.shared.fault.record(FaultCode::TranscriptOverflow, dropped);
        log_warn!(self.log, self.now_us(), "transcript full: {} symbols dropped", dropped);
    }

    #[inline]
    fn now_us(&self) -> i64 {
        self.player.clock().now_us()
    }
}

/// Drop one trailing `\0` or `\n`.
fn strip_terminator(buf: &[u8]) -> &[u8] {
    match buf.split_last() {
        Some((&(b'\0' | b'\n'), rest)) => rest,
        _ => buf,
    }
}
