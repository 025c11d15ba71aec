//! Module: code
//!
//! Purpose: Letter to signal code table and run-length decoding.
//!
//! Each letter is a 16-bit code read MSB first. A run of three set bits is a
//! dash, a single set bit is a dot, and each element is followed by one zero
//! bit. Unused low bits are zero padding.
//!
//! ```text
//! A = 0xB800 = 1011 1000 0000 0000  →  .-
//! S = 0xA800 = 1010 1000 0000 0000  →  ...
//! O = 0xEEE0 = 1110 1110 1110 0000  →  ---
//! ```
//!
//! Safety: Safe. No unsafe blocks. Copy types only.

/// Width of a signal code in bits.
pub const CODE_BITS: u8 = 16;

const DOT_MASK: u16 = 0x8000;
const DASH_MASK: u16 = 0xE000;

/// Encoded codes for A..Z (standard international Morse).
pub static MORSE_CODES: [u16; 26] = [
    0xB800, // A .-
    0xEA80, // B -...
    0xEBA0, // C -.-.
    0xEA00, // D -..
    0x8000, // E .
    0xAE80, // F ..-.
    0xEE80, // G --.
    0xAA00, // H ....
    0xA000, // I ..
    0xBBB8, // J .---
    0xEB80, // K -.-
    0xBA80, // L .-..
    0xEE00, // M --
    0xE800, // N -.
    0xEEE0, // O ---
    0xBBA0, // P .--.
    0xEEB8, // Q --.-
    0xBA00, // R .-.
    0xA800, // S ...
    0xE000, // T -
    0xAE00, // U ..-
    0xAB80, // V ...-
    0xBB80, // W .--
    0xEAE0, // X -..-
    0xEBB8, // Y -.--
    0xEEA0, // Z --..
];

/// Keying element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Element {
    Dot,
    Dash,
}

impl Element {
    /// Key-down duration in base time units.
    #[inline]
    pub fn units(self) -> u32 {
        match self {
            Element::Dot => 1,
            Element::Dash => 3,
        }
    }

    /// Transcript symbol for this element.
    #[inline]
    pub fn symbol(self) -> u8 {
        match self {
            Element::Dot => b'.',
            Element::Dash => b'-',
        }
    }

    /// Number of code bits the element occupies (excluding the trailing gap bit).
    #[inline]
    fn width(self) -> u8 {
        match self {
            Element::Dot => 1,
            Element::Dash => 3,
        }
    }
}

/// Bit-packed signal code for one letter, or the reserved word gap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SignalCode(pub u16);

impl SignalCode {
    /// Reserved code marking a pause between words.
    pub const WORD_GAP: SignalCode = SignalCode(0x0000);

    /// Raw bit pattern.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// True for the reserved all-zero word gap.
    #[inline]
    pub const fn is_word_gap(self) -> bool {
        self.0 == 0
    }

    /// Decode the code into its dots and dashes, MSB first.
    ///
    /// The word gap decodes to an empty sequence.
    #[inline]
    pub fn elements(self) -> Elements {
        Elements {
            bits: self.0,
            consumed: 0,
        }
    }
}

/// Look up the code for an uppercase ASCII letter.
///
/// Returns `None` for anything outside `A..=Z`; callers fold case first.
#[inline]
pub fn lookup(letter: u8) -> Option<SignalCode> {
    if letter.is_ascii_uppercase() {
        Some(SignalCode(MORSE_CODES[(letter - b'A') as usize]))
    } else {
        None
    }
}

/// Iterator over the elements of a [`SignalCode`].
///
/// Cloning restarts from the clone point, so the same code can be walked
/// once for timing and again for display.
#[derive(Clone, Debug)]
pub struct Elements {
    bits: u16,
    consumed: u8,
}

impl Iterator for Elements {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        while self.consumed < CODE_BITS {
            let element = if self.bits & DASH_MASK == DASH_MASK {
                Some(Element::Dash)
            } else if self.bits & DOT_MASK == DOT_MASK {
                Some(Element::Dot)
            } else {
                None
            };

            match element {
                Some(e) => {
                    self.bits <<= e.width();
                    self.consumed += e.width();
                    return Some(e);
                }
                None => {
                    // Gap or padding bit
                    self.bits <<= 1;
                    self.consumed += 1;
                }
            }
        }
        None
    }
}
