//! Error types
//!
//! Malformed text is never an error: unknown bytes are skipped. What remains
//! is capacity loss and cancellation.

use core::fmt;

/// The sequence has no room for another code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceFull;

/// The transcript buffer holds its maximum of unread symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptOverflow;

/// Playback failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayError {
    /// E10: Cancel token tripped, playback stopped early
    Cancelled,
    /// E11: Transcript symbols were discarded (FailWrite policy)
    TranscriptOverflow { dropped: u32 },
}

/// Failure of a full write cycle (build + play).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteError {
    /// E10: Cancel token tripped, playback stopped early
    Cancelled,
    /// E11: Transcript symbols were discarded (FailWrite policy)
    TranscriptOverflow { dropped: u32 },
    /// E12: Input produced more codes than a sequence holds (FailWrite policy)
    SequenceOverflow { dropped: u32 },
}

impl PlayError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Cancelled => "E10",
            Self::TranscriptOverflow { .. } => "E11",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Cancelled => "playback cancelled",
            Self::TranscriptOverflow { .. } => "transcript overflow",
        }
    }
}

impl WriteError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Cancelled => "E10",
            Self::TranscriptOverflow { .. } => "E11",
            Self::SequenceOverflow { .. } => "E12",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Cancelled => "playback cancelled",
            Self::TranscriptOverflow { .. } => "transcript overflow",
            Self::SequenceOverflow { .. } => "sequence overflow",
        }
    }
}

impl From<PlayError> for WriteError {
    fn from(e: PlayError) -> Self {
        match e {
            PlayError::Cancelled => WriteError::Cancelled,
            PlayError::TranscriptOverflow { dropped } => WriteError::TranscriptOverflow { dropped },
        }
    }
}

impl fmt::Display for SequenceFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("sequence full")
    }
}

impl fmt::Display for TranscriptOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("transcript buffer full")
    }
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TranscriptOverflow { dropped } => {
                write!(f, "{}: {} ({} dropped)", self.code(), self.message(), dropped)
            }
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TranscriptOverflow { dropped } | Self::SequenceOverflow { dropped } => {
                write!(f, "{}: {} ({} dropped)", self.code(), self.message(), dropped)
            }
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}
