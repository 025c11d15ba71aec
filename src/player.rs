//! Timed signal playback.
//!
//! Walks a [`Sequence`] code by code, keys the transducer for each element
//! and mirrors what was sent into the transcript. Pure logic: the output and
//! the delay primitive are traits, so host tests run on a virtual clock.
//!
//! # Timing (base unit = one dot)
//!
//! ```text
//! dot   ▁█▁        on 1, off 1
//! dash  ▁███▁      on 3, off 1
//! letter gap       +1 after the last element's gap, transcript ' '
//! word gap         1, transcript ' ' (no letter gap after it)
//! last code        transcript '\n', no trailing pause
//! ```
//!
//! Playback blocks the calling task for the whole signal.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::code::{Element, SignalCode};
use crate::config::OverflowPolicy;
use crate::error::PlayError;
use crate::sequence::Sequence;
use crate::transcript::{TranscriptBuffer, TRANSCRIPT_CAPACITY};

/// Base time unit (one dot) in microseconds.
pub const DOT_TIME_US: u32 = 200_000;

/// Dash duration (3 units).
pub const DASH_TIME_US: u32 = DOT_TIME_US * 3;

/// Silence after every element (1 unit).
pub const ELEMENT_GAP_US: u32 = DOT_TIME_US;

/// Extra silence between letters (1 unit).
pub const LETTER_GAP_US: u32 = DOT_TIME_US;

/// Silence for a word gap code (1 unit).
pub const WORD_GAP_US: u32 = DOT_TIME_US;

/// Two-state output (LED, relay, TX key line).
///
/// Calls are fire-and-forget and must return promptly.
pub trait Transducer {
    fn activate(&mut self);
    fn deactivate(&mut self);
}

/// Time source and blocking delay.
pub trait Clock {
    /// Monotonic time in microseconds.
    fn now_us(&self) -> i64;

    /// Block the calling task for `us` microseconds.
    fn delay_us(&mut self, us: u32);
}

impl<T: Transducer + ?Sized> Transducer for &mut T {
    fn activate(&mut self) {
        (**self).activate()
    }

    fn deactivate(&mut self) {
        (**self).deactivate()
    }
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now_us(&self) -> i64 {
        (**self).now_us()
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

/// Cooperative cancellation flag.
///
/// Checked before every element and every pause. Safe to trip from
/// another task while a play is running.
pub struct CancelToken {
    cancelled: AtomicBool,
}

impl CancelToken {
    pub const fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Re-arm for the next play.
    #[inline]
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Never tripped; used when the caller supplies no token.
static NO_CANCEL: CancelToken = CancelToken::new();

/// Outcome of a completed play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayReport {
    /// Codes played (letters and word gaps)
    pub codes: usize,
    /// Dots and dashes keyed
    pub elements: usize,
    /// Transcript symbols refused by a full buffer
    pub dropped: u32,
    /// Clock time spent in playback
    pub duration_us: u64,
}

/// Plays sequences on a transducer, mirroring into a transcript.
pub struct SignalPlayer<'a, T, C, const N: usize = TRANSCRIPT_CAPACITY> {
    transducer: T,
    clock: C,
    transcript: &'a TranscriptBuffer<N>,
    cancel: &'a CancelToken,
    policy: OverflowPolicy,
    // Per-play counters
    elements: usize,
    dropped: u32,
}

impl<'a, T: Transducer, C: Clock, const N: usize> SignalPlayer<'a, T, C, N> {
    /// Create a player with `DropAndCount` policy and no cancellation.
    pub fn new(transducer: T, clock: C, transcript: &'a TranscriptBuffer<N>) -> Self {
        Self {
            transducer,
            clock,
            transcript,
            cancel: &NO_CANCEL,
            policy: OverflowPolicy::DropAndCount,
            elements: 0,
            dropped: 0,
        }
    }

    /// Abort playback when `token` is tripped.
    pub fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_policy(mut self, policy: OverflowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_policy(&mut self, policy: OverflowPolicy) {
        self.policy = policy;
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn transducer_mut(&mut self) -> &mut T {
        &mut self.transducer
    }

    /// Give back the transducer and clock.
    pub fn into_parts(self) -> (T, C) {
        (self.transducer, self.clock)
    }

    /// Transcript symbols refused during the current or last play.
    ///
    /// Still valid after `play` returned `Cancelled`.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Play a whole sequence, blocking until done.
    ///
    /// An empty sequence does nothing: no keying, no transcript.
    /// Transcript overflow never shortens the signal; under `FailWrite` it is
    /// reported as an error once playback has finished.
    pub fn play<const M: usize>(&mut self, seq: &Sequence<M>) -> Result<PlayReport, PlayError> {
        self.elements = 0;
        self.dropped = 0;
        let start = self.clock.now_us();

        let codes = seq.as_slice();
        for (i, &code) in codes.iter().enumerate() {
            self.play_code(code)?;

            if i + 1 == codes.len() {
                // End of message: newline, no trailing pause
                self.emit(b'\n');
            } else if !code.is_word_gap() {
                self.emit(b' ');
                self.pause(LETTER_GAP_US)?;
            }
        }

        let report = PlayReport {
            codes: codes.len(),
            elements: self.elements,
            dropped: self.dropped,
            duration_us: self.clock.now_us().saturating_sub(start).max(0) as u64,
        };

        if report.dropped > 0 && self.policy == OverflowPolicy::FailWrite {
            return Err(PlayError::TranscriptOverflow {
                dropped: report.dropped,
            });
        }
        Ok(report)
    }

    /// Play one code: a word gap or the elements of a letter.
    pub fn play_code(&mut self, code: SignalCode) -> Result<(), PlayError> {
        if code.is_word_gap() {
            self.emit(b' ');
            return self.pause(WORD_GAP_US);
        }

        for element in code.elements() {
            self.key(element)?;
        }
        Ok(())
    }

    /// Key one element followed by its gap.
    fn key(&mut self, element: Element) -> Result<(), PlayError> {
        self.check_cancel()?;

        self.transducer.activate();
        self.emit(element.symbol());
        self.clock.delay_us(element.units() * DOT_TIME_US);
        // Off before the gap, never after
        self.transducer.deactivate();
        self.elements += 1;

        self.pause(ELEMENT_GAP_US)
    }

    fn pause(&mut self, us: u32) -> Result<(), PlayError> {
        self.check_cancel()?;
        self.clock.delay_us(us);
        Ok(())
    }

    #[inline]
    fn check_cancel(&self) -> Result<(), PlayError> {
        if self.cancel.is_cancelled() {
            Err(PlayError::Cancelled)
        } else {
            Ok(())
        }
    }

    #[inline]
    fn emit(&mut self, symbol: u8) {
        if self.transcript.append(symbol).is_err() {
            self.dropped = self.dropped.saturating_add(1);
        }
    }
}

/// Play `seq` once with default policy and no cancellation.
pub fn play<T, C, const M: usize, const N: usize>(
    seq: &Sequence<M>,
    transducer: &mut T,
    clock: &mut C,
    transcript: &TranscriptBuffer<N>,
) -> Result<PlayReport, PlayError>
where
    T: Transducer,
    C: Clock,
{
    SignalPlayer::new(transducer, clock, transcript).play(seq)
}
