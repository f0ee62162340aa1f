//! UTF-8 well-formedness oracle.
//!
//! The rope stores raw bytes and treats UTF-8 validity as a checked
//! invariant rather than a type-level fact, because the `_unchecked`
//! entry points may deliberately break it. Everything here reduces to
//! `std::str::from_utf8`, applied to the smallest slice that answers
//! the question.

use crate::error::{Result, TextError};
use crate::rope::Rope;

/// Number of bytes in the sequence introduced by lead byte `b`,
/// or 0 when `b` cannot start a sequence.
const fn sequence_len(b: u8) -> usize {
    match b {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

const fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

/// Whether `bytes` is entirely well-formed UTF-8.
pub fn encoded(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes).is_ok()
}

/// Whether `bytes` begins with a complete, well-formed code point.
///
/// An empty slice vacuously qualifies. Equivalently: whether a split
/// placed just before `bytes` falls on a code point boundary.
pub fn starts_encoded(bytes: &[u8]) -> bool {
    let Some(&lead) = bytes.first() else {
        return true;
    };
    let width = sequence_len(lead);
    width != 0 && bytes.len() >= width && encoded(&bytes[..width])
}

/// Whether `bytes` ends with a complete, well-formed code point.
///
/// An empty slice vacuously qualifies.
pub fn ends_encoded(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return true;
    }
    let scan = bytes.len().saturating_sub(4);
    for i in (scan..bytes.len()).rev() {
        let b = bytes[i];
        if !is_continuation(b) {
            let width = sequence_len(b);
            return width != 0 && i + width == bytes.len() && encoded(&bytes[i..]);
        }
    }
    false
}

/// Validates the whole rope, seams between segments included.
///
/// # Errors
///
/// [`TextError::MalformedPayload`] if the concatenated content is not
/// well-formed UTF-8 (for instance after `_unchecked` mutations).
pub fn checked_encoding(rope: &Rope) -> Result<()> {
    let mut validator = StreamValidator::default();
    for segment in rope.segments() {
        validator.feed(segment)?;
    }
    validator.finish()
}

/// Incremental UTF-8 validation across a sequence of byte chunks.
///
/// A code point may straddle a chunk seam; up to three of its bytes are
/// carried over and validated once the sequence completes.
#[derive(Debug, Default)]
pub(crate) struct StreamValidator {
    pending: [u8; 4],
    pending_len: usize,
}

impl StreamValidator {
    pub(crate) fn feed(&mut self, mut chunk: &[u8]) -> Result<()> {
        // Complete a sequence left hanging by the previous chunk.
        if self.pending_len > 0 {
            let width = sequence_len(self.pending[0]);
            debug_assert!(width > self.pending_len);
            while self.pending_len < width {
                let Some((&b, rest)) = chunk.split_first() else {
                    return Ok(());
                };
                self.pending[self.pending_len] = b;
                self.pending_len += 1;
                chunk = rest;
            }
            if !encoded(&self.pending[..width]) {
                return Err(TextError::MalformedPayload);
            }
            self.pending_len = 0;
        }

        let tail = incomplete_tail_start(chunk);
        if !encoded(&chunk[..tail]) {
            return Err(TextError::MalformedPayload);
        }
        self.pending[..chunk.len() - tail].copy_from_slice(&chunk[tail..]);
        self.pending_len = chunk.len() - tail;
        Ok(())
    }

    pub(crate) fn finish(&self) -> Result<()> {
        if self.pending_len == 0 {
            Ok(())
        } else {
            Err(TextError::MalformedPayload)
        }
    }
}

/// Offset where a sequence that overruns `bytes` begins, or `len` when
/// the chunk ends on a sequence boundary.
fn incomplete_tail_start(bytes: &[u8]) -> usize {
    let n = bytes.len();
    for i in (n.saturating_sub(3)..n).rev() {
        let width = sequence_len(bytes[i]);
        if width != 0 {
            return if i + width > n { i } else { n };
        }
        if !is_continuation(bytes[i]) {
            // Invalid lead; leave it to the body validation.
            return n;
        }
    }
    n
}
