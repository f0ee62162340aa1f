//! Streaming output and padded display.
//!
//! Rope content goes to byte sinks segment by segment, never
//! flattened. Formatted display honors the formatter's width, fill,
//! and alignment, writing fill characters in chunks of 8 to amortize
//! sink calls.

use std::fmt::{self, Alignment};
use std::io::{self, Write};

use crate::rope::{Rope, RopeView};

/// Fill characters written per sink call while padding.
const FILL_CHUNK: usize = 8;

/// Writes the rope's content to `sink`, one segment per call, then
/// flushes.
///
/// # Errors
///
/// Returns an error if the underlying writer fails.
pub fn write_to<W: Write>(sink: &mut W, rope: &Rope) -> io::Result<()> {
    for segment in rope.segments() {
        sink.write_all(segment)?;
    }
    sink.flush()
}

/// Streams `chunks` through `f` with padding around `len` bytes of
/// content.
///
/// Width is compared against the byte length; segment seams never
/// split the fill runs.
pub(crate) fn pad_chunks<'a, I>(f: &mut fmt::Formatter<'_>, len: usize, chunks: I) -> fmt::Result
where
    I: Iterator<Item = &'a [u8]>,
{
    let pad = f.width().unwrap_or(0).saturating_sub(len);
    let (before, after) = match f.align() {
        Some(Alignment::Right) => (pad, 0),
        Some(Alignment::Center) => (pad / 2, pad - pad / 2),
        Some(Alignment::Left) | None => (0, pad),
    };
    write_fill(f, before)?;
    for chunk in chunks {
        match std::str::from_utf8(chunk) {
            Ok(text) => f.write_str(text)?,
            // Deliberately broken content still renders, lossily.
            Err(_) => f.write_str(&String::from_utf8_lossy(chunk))?,
        }
    }
    write_fill(f, after)
}

fn write_fill(f: &mut fmt::Formatter<'_>, n: usize) -> fmt::Result {
    if n == 0 {
        return Ok(());
    }
    let fill = f.fill();
    let mut chunk = String::with_capacity(FILL_CHUNK * fill.len_utf8());
    for _ in 0..FILL_CHUNK {
        chunk.push(fill);
    }
    let mut remaining = n;
    while remaining >= FILL_CHUNK {
        f.write_str(&chunk)?;
        remaining -= FILL_CHUNK;
    }
    f.write_str(&chunk[..remaining * fill.len_utf8()])
}

impl fmt::Display for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        pad_chunks(f, self.len(), self.segments())
    }
}

impl fmt::Display for RopeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        pad_chunks(f, self.len(), self.segments())
    }
}
