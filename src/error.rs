//! Error type shared by every fallible entry point of the crate.
//!
//! Errors are reported at the public boundary only; the tree algorithms
//! assume their preconditions hold once an operation has been admitted.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TextError>;

/// An error produced by a checked text or rope operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TextError {
    /// The offset lands between the bytes of a multi-byte code point,
    /// so the mutation would bisect it.
    #[error("invalid encoding: offset {at} bisects a UTF-8 code point")]
    BisectsCodePoint {
        /// The offending byte offset.
        at: usize,
    },

    /// The inserted payload is not well-formed UTF-8 at its boundaries.
    #[error("invalid encoding: payload is not well-formed UTF-8")]
    MalformedPayload,

    /// An offset or range endpoint fell outside `[0, len]`.
    #[error("offset {index} out of range for length {len}")]
    OutOfRange {
        /// The rejected offset.
        index: usize,
        /// The length it was checked against.
        len: usize,
    },

    /// The allocator could not provide the requested backing storage.
    ///
    /// Only surfaced by entry points that acquire capacity up front
    /// (the strong-guarantee paths); everywhere else allocation is
    /// infallible in the usual Rust sense.
    #[error("allocation failed while reserving {bytes} additional bytes")]
    AllocationFailed {
        /// How many additional bytes were requested.
        bytes: usize,
    },
}

impl TextError {
    /// True for both encoding-breakage varieties.
    pub const fn is_invalid_encoding(&self) -> bool {
        matches!(
            self,
            Self::BisectsCodePoint { .. } | Self::MalformedPayload
        )
    }
}

/// Range-checks `index` against an inclusive upper bound.
pub(crate) fn check_offset(index: usize, len: usize) -> Result<()> {
    if index <= len {
        Ok(())
    } else {
        Err(TextError::OutOfRange { index, len })
    }
}

/// Range-checks `lo..hi` against `len`, requiring `lo <= hi`.
pub(crate) fn check_range(lo: usize, hi: usize, len: usize) -> Result<()> {
    if lo > hi {
        return Err(TextError::OutOfRange { index: lo, len: hi });
    }
    check_offset(hi, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_distinguish_encoding_varieties() {
        let point = TextError::BisectsCodePoint { at: 2 }.to_string();
        let payload = TextError::MalformedPayload.to_string();
        assert!(point.contains("bisects"));
        assert!(payload.contains("payload"));
        assert_ne!(point, payload);
    }

    #[test]
    fn test_is_invalid_encoding() {
        assert!(TextError::BisectsCodePoint { at: 0 }.is_invalid_encoding());
        assert!(TextError::MalformedPayload.is_invalid_encoding());
        assert!(!TextError::OutOfRange { index: 9, len: 3 }.is_invalid_encoding());
        assert!(!TextError::AllocationFailed { bytes: 1 }.is_invalid_encoding());
    }

    #[test]
    fn test_range_checks() {
        assert!(check_offset(3, 3).is_ok());
        assert_eq!(
            check_offset(4, 3),
            Err(TextError::OutOfRange { index: 4, len: 3 })
        );
        assert!(check_range(1, 3, 3).is_ok());
        assert!(check_range(3, 1, 3).is_err());
    }
}
