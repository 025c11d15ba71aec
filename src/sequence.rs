//! Module: sequence
//!
//! Purpose: Turn a text buffer into an ordered list of signal codes.
//!
//! Architecture:
//! - Letters map to their code, a run of spaces collapses into one word gap
//! - No gap before the first letter, trailing gaps trimmed on finish
//! - Builder state lives in a per-call value, nothing global
//! - Fixed inline storage, no heap
//!
//! Safety: Safe. No unsafe blocks.

use crate::code::{self, SignalCode};
use crate::error::SequenceFull;

/// Maximum codes in one sequence.
pub const SEQUENCE_CAPACITY: usize = 512;

/// Bounded list of signal codes for one write.
#[derive(Clone, Debug)]
pub struct Sequence<const N: usize = SEQUENCE_CAPACITY> {
    codes: [SignalCode; N],
    len: usize,
    overflowed: u32,
}

impl<const N: usize> Sequence<N> {
    /// Create empty sequence
    pub const fn new() -> Self {
        Self {
            codes: [SignalCode::WORD_GAP; N],
            len: 0,
            overflowed: 0,
        }
    }

    /// Append a code.
    ///
    /// At capacity the code is discarded, counted, and `SequenceFull` returned.
    pub fn push(&mut self, code: SignalCode) -> Result<(), SequenceFull> {
        if self.len >= N {
            self.overflowed = self.overflowed.saturating_add(1);
            return Err(SequenceFull);
        }
        self.codes[self.len] = code;
        self.len += 1;
        Ok(())
    }

    /// Shorten to `len` codes (no-op if already shorter).
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.len = len;
        }
    }

    /// Codes in playback order.
    #[inline]
    pub fn as_slice(&self) -> &[SignalCode] {
        &self.codes[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of letter codes (word gaps excluded).
    pub fn letters(&self) -> usize {
        self.as_slice().iter().filter(|c| !c.is_word_gap()).count()
    }

    /// Codes discarded because the sequence was full.
    #[inline]
    pub fn overflowed(&self) -> u32 {
        self.overflowed
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for Sequence<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PartialEq for Sequence<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<const N: usize> Eq for Sequence<N> {}

/// Incremental sequence builder.
///
/// One builder per write. Feed bytes with [`push_byte`](Self::push_byte),
/// then call [`finish`](Self::finish).
pub struct SequenceBuilder<const N: usize = SEQUENCE_CAPACITY> {
    seq: Sequence<N>,
    /// Length up to and including the last letter pushed
    last_letter: usize,
    /// Set until a letter follows; blocks leading and repeated gaps
    space_pending: bool,
}

impl<const N: usize> SequenceBuilder<N> {
    pub const fn new() -> Self {
        Self {
            seq: Sequence::new(),
            last_letter: 0,
            space_pending: true,
        }
    }

    /// Feed one input byte. Case is folded here.
    pub fn push_byte(&mut self, byte: u8) {
        let ch = byte.to_ascii_uppercase();

        if let Some(code) = code::lookup(ch) {
            if self.seq.push(code).is_ok() {
                self.space_pending = false;
                self.last_letter = self.seq.len();
            }
        } else if ch == b' ' && !self.space_pending {
            // A dropped gap still closes the word
            let _ = self.seq.push(SignalCode::WORD_GAP);
            self.space_pending = true;
        }
    }

    /// Feed a whole buffer.
    pub fn extend(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push_byte(b);
        }
    }

    /// Trim trailing gaps and hand over the sequence.
    pub fn finish(mut self) -> Sequence<N> {
        self.seq.truncate(self.last_letter);
        self.seq
    }
}

impl<const N: usize> Default for SequenceBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a sequence from text in one call.
pub fn build(text: &[u8]) -> Sequence {
    let mut builder = SequenceBuilder::new();
    builder.extend(text);
    builder.finish()
}
