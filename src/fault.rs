//! Loss tracking for RustMorseWriter.
//!
//! Playback tolerates two kinds of loss: transcript symbols refused by a full
//! buffer, and codes that did not fit in one sequence. Both end up here, so a
//! write that returned `Ok` can still be audited afterwards from any task.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// What was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// Nothing recorded yet.
    None = 0,
    /// Transcript symbols dropped on a full buffer.
    TranscriptOverflow = 1,
    /// Letters or gaps dropped past sequence capacity.
    SequenceOverflow = 2,
}

impl FaultCode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => FaultCode::TranscriptOverflow,
            2 => FaultCode::SequenceOverflow,
            _ => FaultCode::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FaultCode::None => "none",
            FaultCode::TranscriptOverflow => "transcript-overflow",
            FaultCode::SequenceOverflow => "sequence-overflow",
        }
    }
}

impl core::fmt::Display for FaultCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free loss ledger.
///
/// `record` latches the most recent loss and adds to a per-kind total.
/// `acknowledge` lowers the flag; totals and the event count stay until reboot.
///
/// ```ignore
/// static LOSSES: FaultState = FaultState::new();
///
/// LOSSES.record(FaultCode::TranscriptOverflow, 12);
/// if LOSSES.is_active() {
///     report(LOSSES.snapshot());
///     LOSSES.acknowledge();
/// }
/// ```
pub struct FaultState {
    active: AtomicBool,
    last: AtomicU8,
    last_dropped: AtomicU32,
    transcript_lost: AtomicU32,
    sequence_lost: AtomicU32,
    events: AtomicU32,
}

impl FaultState {
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            last: AtomicU8::new(FaultCode::None as u8),
            last_dropped: AtomicU32::new(0),
            transcript_lost: AtomicU32::new(0),
            sequence_lost: AtomicU32::new(0),
            events: AtomicU32::new(0),
        }
    }

    /// Record `dropped` items lost to `code`.
    pub fn record(&self, code: FaultCode, dropped: u32) {
        match code {
            FaultCode::TranscriptOverflow => {
                self.transcript_lost.fetch_add(dropped, Ordering::Relaxed);
            }
            FaultCode::SequenceOverflow => {
                self.sequence_lost.fetch_add(dropped, Ordering::Relaxed);
            }
            FaultCode::None => return,
        }
        self.last.store(code as u8, Ordering::Release);
        self.last_dropped.store(dropped, Ordering::Release);
        self.events.fetch_add(1, Ordering::Relaxed);
        // Publish last, readers check the flag first
        self.active.store(true, Ordering::Release);
    }

    /// Unacknowledged loss pending.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Kind of the most recent loss.
    #[inline]
    pub fn last(&self) -> FaultCode {
        FaultCode::from_u8(self.last.load(Ordering::Acquire))
    }

    /// Items dropped by the most recent loss.
    #[inline]
    pub fn last_dropped(&self) -> u32 {
        self.last_dropped.load(Ordering::Acquire)
    }

    /// Total items lost to `code` since boot.
    pub fn lost(&self, code: FaultCode) -> u32 {
        match code {
            FaultCode::TranscriptOverflow => self.transcript_lost.load(Ordering::Relaxed),
            FaultCode::SequenceOverflow => self.sequence_lost.load(Ordering::Relaxed),
            FaultCode::None => 0,
        }
    }

    /// Loss events recorded since boot.
    #[inline]
    pub fn events(&self) -> u32 {
        self.events.load(Ordering::Relaxed)
    }

    /// Lower the active flag.
    #[inline]
    pub fn acknowledge(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn snapshot(&self) -> FaultSnapshot {
        FaultSnapshot {
            active: self.is_active(),
            last: self.last(),
            last_dropped: self.last_dropped(),
            transcript_lost: self.lost(FaultCode::TranscriptOverflow),
            sequence_lost: self.lost(FaultCode::SequenceOverflow),
            events: self.events(),
        }
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of a [`FaultState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaultSnapshot {
    pub active: bool,
    pub last: FaultCode,
    pub last_dropped: u32,
    pub transcript_lost: u32,
    pub sequence_lost: u32,
    pub events: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_acknowledge() {
        let losses = FaultState::new();
        assert!(!losses.is_active());
        assert_eq!(losses.last(), FaultCode::None);

        losses.record(FaultCode::TranscriptOverflow, 7);
        assert!(losses.is_active());
        assert_eq!(losses.last(), FaultCode::TranscriptOverflow);
        assert_eq!(losses.last_dropped(), 7);

        losses.acknowledge();
        assert!(!losses.is_active());
        assert_eq!(losses.events(), 1);
        assert_eq!(losses.lost(FaultCode::TranscriptOverflow), 7);
    }

    #[test]
    fn test_totals_per_kind() {
        let losses = FaultState::new();

        losses.record(FaultCode::SequenceOverflow, 3);
        losses.record(FaultCode::TranscriptOverflow, 10);
        losses.record(FaultCode::TranscriptOverflow, 5);

        let snap = losses.snapshot();
        assert_eq!(snap.last, FaultCode::TranscriptOverflow);
        assert_eq!(snap.last_dropped, 5);
        assert_eq!(snap.transcript_lost, 15);
        assert_eq!(snap.sequence_lost, 3);
        assert_eq!(snap.events, 3);
    }

    #[test]
    fn test_recording_none_is_ignored() {
        let losses = FaultState::new();
        losses.record(FaultCode::None, 9);
        assert!(!losses.is_active());
        assert_eq!(losses.events(), 0);
    }

    #[test]
    fn test_code_names() {
        assert_eq!(FaultCode::from_u8(200), FaultCode::None);
        assert_eq!(FaultCode::from_u8(2).as_str(), "sequence-overflow");
    }
}
