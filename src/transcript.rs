//! Lock-free transcript buffer.
//!
//! SPSC ring of transcript symbols (`.`, `-`, space, newline). The player
//! appends while a reader drains from another task.
//!
//! ```text
//! SignalPlayer            TranscriptBuffer           Reader
//! ────────────            ────────────────           ──────
//! append('.') ──────────▶ [.][-][ ][\n] ──────────▶ drain_into()
//! never blocks             512 symbols               never blocks
//! ```
//!
//! A full buffer never overwrites unread symbols: the new symbol is refused
//! and counted in `dropped()`.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::error::TranscriptOverflow;

/// Default transcript capacity in symbols.
pub const TRANSCRIPT_CAPACITY: usize = 512;

/// Bounded FIFO of transcript symbols.
///
/// N must be a power of 2.
pub struct TranscriptBuffer<const N: usize = TRANSCRIPT_CAPACITY> {
    symbols: UnsafeCell<[u8; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: Single producer (player) owns write_idx, single consumer (reader)
// owns read_idx. A slot is only touched by the side that currently owns it.
unsafe impl<const N: usize> Sync for TranscriptBuffer<N> {}
unsafe impl<const N: usize> Send for TranscriptBuffer<N> {}

impl<const N: usize> TranscriptBuffer<N> {
    const MASK: usize = N - 1;

    /// Create new empty buffer
    pub const fn new() -> Self {
        const { assert!(N.is_power_of_two(), "Transcript size must be power of 2") };

        Self {
            symbols: UnsafeCell::new([0u8; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Append a symbol (producer side).
    ///
    /// Fails with `TranscriptOverflow` when N symbols are unread; the symbol
    /// is discarded and the drop counter incremented.
    #[inline]
    pub fn append(&self, symbol: u8) -> Result<(), TranscriptOverflow> {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N as u32 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(TranscriptOverflow);
        }

        let idx = (write as usize) & Self::MASK;

        // SAFETY: Slot idx is outside [read, write), consumer cannot touch it.
        unsafe {
            self.symbols.get().cast::<u8>().add(idx).write(symbol);
        }

        self.write_idx.store(write.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Remove the oldest symbol (consumer side).
    #[inline]
    pub fn pop(&self) -> Option<u8> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;

        // SAFETY: Slot idx is inside [read, write), producer will not write it
        // until read_idx moves past.
        let symbol = unsafe { self.symbols.get().cast::<u8>().add(idx).read() };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(symbol)
    }

    /// Move up to `out.len()` oldest symbols into `out`.
    ///
    /// Returns number of symbols copied (0 if empty). Never blocks.
    #[inline]
    pub fn drain_into(&self, out: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in out.iter_mut() {
            match self.pop() {
                Some(s) => {
                    *slot = s;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// Drain up to `max` oldest symbols, in FIFO order.
    #[inline]
    pub fn drain(&self, max: usize) -> Drain<'_, N> {
        Drain {
            buffer: self,
            remaining: max,
        }
    }

    /// Number of unread symbols
    #[inline]
    pub fn len(&self) -> usize {
        let write = self.write_idx.load(Ordering::Acquire);
        let read = self.read_idx.load(Ordering::Acquire);
        (write.wrapping_sub(read) as usize).min(N)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Free slots left before appends start failing
    #[inline]
    pub fn available(&self) -> usize {
        N - self.len()
    }

    /// Symbols refused since creation or last reset.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Discard everything unread (consumer side).
    #[inline]
    pub fn clear(&self) {
        let write = self.write_idx.load(Ordering::Acquire);
        self.read_idx.store(write, Ordering::Release);
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for TranscriptBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`TranscriptBuffer::drain`].
pub struct Drain<'a, const N: usize> {
    buffer: &'a TranscriptBuffer<N>,
    remaining: usize,
}

impl<'a, const N: usize> Iterator for Drain<'a, N> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.remaining == 0 {
            return None;
        }
        let symbol = self.buffer.pop()?;
        self.remaining -= 1;
        Some(symbol)
    }
}
