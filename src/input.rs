//! Line framing for text arriving byte by byte (UART, stdin).
//!
//! Bytes accumulate until a terminator; the caller then hands the line to
//! `MorseWriter::write` and clears the buffer.

/// Default line capacity, one full sequence worth of letters.
pub const LINE_SIZE: usize = 512;

/// What `LineBuffer::feed` did with a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// Byte stored (or ignored because the line is full)
    Pending,
    /// Terminator seen, line ready
    Line,
}

/// Line input buffer
pub struct LineBuffer<const N: usize = LINE_SIZE> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> LineBuffer<N> {
    /// Create empty buffer
    pub const fn new() -> Self {
        Self {
            buf: [0u8; N],
            len: 0,
        }
    }

    /// Push a byte; ignored once the buffer is full.
    pub fn push(&mut self, c: u8) {
        if self.len < N {
            self.buf[self.len] = c;
            self.len += 1;
        }
    }

    /// Feed a raw input byte.
    ///
    /// `\r` and `\n` end the line, backspace/DEL edit it.
    pub fn feed(&mut self, c: u8) -> Feed {
        match c {
            b'\r' | b'\n' => Feed::Line,
            0x08 | 0x7F => {
                self.backspace();
                Feed::Pending
            }
            _ => {
                self.push(c);
                Feed::Pending
            }
        }
    }

    /// Remove last byte
    pub fn backspace(&mut self) {
        if self.len > 0 {
            self.len -= 1;
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
