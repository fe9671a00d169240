//! Allocation-free text primitives used when draining the history ring.
//!
//! Everything in this module works on fixed-size stack buffers and pushes
//! output one byte at a time through a [`CharSink`], so it is usable from
//! contexts where formatted I/O is too expensive.

use core::fmt;
use core::ops::Deref;

/// Digit table shared by every base.
const DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Widest rendering: 32 binary digits plus a terminator slot.
const DIGITS_CAP: usize = 33;
const DIGITS_END: usize = DIGITS_CAP - 1;

/// Receives output one byte at a time.
///
/// The sink is assumed not to fail. Writers that can fail should latch their
/// error internally, see [`crate::sink::WriteSink`].
///
/// Implemented for every `FnMut(u8)`, so a closure is a sink:
///
/// ```
/// # use historing::codec::{emit_string, CharSink};
/// let mut out = Vec::new();
/// emit_string("hello", &mut |b: u8| out.push(b));
/// assert_eq!(out, b"hello");
/// ```
pub trait CharSink {
    /// Emit a single byte.
    fn put_char(&mut self, byte: u8);
}

impl<F> CharSink for F
where
    F: FnMut(u8),
{
    #[inline]
    fn put_char(&mut self, byte: u8) {
        self(byte)
    }
}

/// A numeric base between 2 and 16 inclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Radix(u8);

impl Radix {
    pub const BINARY: Radix = Radix(2);
    pub const OCTAL: Radix = Radix(8);
    pub const DECIMAL: Radix = Radix(10);
    pub const HEX: Radix = Radix(16);

    /// Returns `None` for bases outside `2..=16`.
    pub const fn new(base: u8) -> Option<Radix> {
        if base >= 2 && base <= 16 {
            Some(Radix(base))
        } else {
            None
        }
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// The textual digits of one `format_unsigned` call.
///
/// Owns its buffer, so two renderings never alias each other. The byte
/// after the last digit is always NUL.
#[derive(Copy, Clone)]
pub struct Digits {
    buf: [u8; DIGITS_CAP],
    start: usize,
}

impl Digits {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[self.start..DIGITS_END]
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        // SAFETY: only bytes from `DIGITS` are ever written past `start`.
        unsafe { core::str::from_utf8_unchecked(self.as_bytes()) }
    }

    /// Push the digits through `sink`.
    pub fn emit(&self, sink: &mut dyn CharSink) {
        for &b in self.as_bytes() {
            sink.put_char(b);
        }
    }
}

impl Deref for Digits {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Digits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Digits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl PartialEq<&str> for Digits {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Renders `value` in `radix` using lowercase digits.
///
/// Zero renders as `"0"`. Digits are filled from the end of the buffer
/// towards the front, no leading zeros.
///
/// # Examples
///
/// ```
/// # use historing::codec::{format_unsigned, Radix};
/// assert_eq!(format_unsigned(0, Radix::BINARY).as_str(), "0");
/// assert_eq!(format_unsigned(0xabcd, Radix::HEX).as_str(), "abcd");
/// assert_eq!(format_unsigned(u32::MAX, Radix::DECIMAL).as_str(), "4294967295");
/// ```
pub fn format_unsigned(value: u32, radix: Radix) -> Digits {
    let mut buf = [0u8; DIGITS_CAP];
    let mut pos = DIGITS_END;
    let base = radix.get() as u32;
    let mut val = value;

    if val == 0 {
        pos -= 1;
        buf[pos] = b'0';
    }
    while val != 0 {
        pos -= 1;
        buf[pos] = DIGITS[(val % base) as usize];
        val /= base;
    }

    Digits { buf, start: pos }
}

/// Writes an ordinary string to `sink`, stopping at the end of `text` or at
/// an embedded NUL, whichever comes first.
pub fn emit_string(text: &str, sink: &mut dyn CharSink) {
    for &b in text.as_bytes() {
        if b == 0 {
            break;
        }
        sink.put_char(b);
    }
}

/// Writes a string held in alternate (read-only, instruction-addressed)
/// storage to `sink`.
///
/// Same contract as [`emit_string`], but every byte is fetched through
/// [`far_read_byte`].
pub fn emit_string_far(text: &str, sink: &mut dyn CharSink) {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = far_read_byte(&bytes[i]);
        if b == 0 {
            break;
        }
        sink.put_char(b);
        i += 1;
    }
}

/// Byte fetch for alternate string storage.
///
/// On a split address space target this is a program-memory load. On a
/// unified address space it degrades to a volatile read so the access is
/// never folded into the ordinary path.
#[inline(always)]
pub fn far_read_byte(byte: &u8) -> u8 {
    // SAFETY: `byte` is a valid, aligned reference for the duration of the read.
    unsafe { core::ptr::read_volatile(byte) }
}
