//! The outcome of a single coding pass.
//!
//! Every call into the engines ends with exactly one [`CoderResult`]. Two of
//! the variants are flow-control signals rather than errors:
//!
//! - [`CoderResult::Underflow`]: the input is exhausted, or ends partway
//!   through a sequence. Supply more input and call again.
//! - [`CoderResult::Overflow`]: the output has no room for the next code point.
//!   Drain or grow the output and call again.
//!
//! The remaining two describe bad input. Their length is the exact number of
//! input units (bytes when decoding, 16-bit units when encoding) that start at
//! the source position and must be skipped or replaced before retrying.
//!
//! # Example
//!
//! ```
//! use utf8conv::{CoderResult, SliceSink, SliceSource, Source, decode};
//!
//! let mut out = [0u16; 4];
//! let mut src = SliceSource::new(&[0xC0, 0x80]);
//! let mut dst = SliceSink::new(&mut out);
//! let result = decode(&mut src, &mut dst);
//! assert_eq!(result, CoderResult::Malformed(1));
//! assert!(result.is_error());
//! assert_eq!(src.position(), 0);
//! ```

use core::fmt;

use crate::error::{CodingError, EncodingError};

/// The result of a decode or encode pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoderResult {
    /// More input is required to make progress.
    Underflow,
    /// More output space is required to make progress.
    Overflow,
    /// The input at the current position is malformed for the given number of
    /// units.
    Malformed(usize),
    /// The input at the current position is well formed but has no
    /// representation in the target form.
    ///
    /// Never produced by UTF-8 ⇄ UTF-16 conversion itself; reserved for
    /// narrower targets layered over the same protocol.
    Unmappable(usize),
}

impl CoderResult {
    /// Returns `true` for [`CoderResult::Underflow`].
    #[inline]
    pub const fn is_underflow(self) -> bool {
        matches!(self, Self::Underflow)
    }

    /// Returns `true` for [`CoderResult::Overflow`].
    #[inline]
    pub const fn is_overflow(self) -> bool {
        matches!(self, Self::Overflow)
    }

    /// Returns `true` for [`CoderResult::Malformed`] and
    /// [`CoderResult::Unmappable`].
    #[inline]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Malformed(_) | Self::Unmappable(_))
    }

    /// Returns `true` for [`CoderResult::Malformed`].
    #[inline]
    pub const fn is_malformed(self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    /// Returns `true` for [`CoderResult::Unmappable`].
    #[inline]
    pub const fn is_unmappable(self) -> bool {
        matches!(self, Self::Unmappable(_))
    }

    /// The number of offending input units, or `None` for the flow-control
    /// variants.
    #[inline]
    pub const fn length(self) -> Option<usize> {
        match self {
            Self::Malformed(n) | Self::Unmappable(n) => Some(n),
            Self::Underflow | Self::Overflow => None,
        }
    }

    /// Converts an error result into a [`CodingError`] anchored at `position`,
    /// the source position the caller observed when the pass stopped.
    ///
    /// Underflow and overflow are not errors and come back as `Ok`.
    pub fn into_result(self, position: usize) -> Result<Self, CodingError> {
        match self {
            Self::Underflow | Self::Overflow => Ok(self),
            Self::Malformed(n) => Err(CodingError::Malformed(EncodingError::new(
                position,
                Some(n),
            ))),
            Self::Unmappable(n) => Err(CodingError::Unmappable {
                position,
                length: n,
            }),
        }
    }
}

impl fmt::Display for CoderResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Underflow => f.write_str("UNDERFLOW"),
            Self::Overflow => f.write_str("OVERFLOW"),
            Self::Malformed(n) => write!(f, "MALFORMED[{}]", n),
            Self::Unmappable(n) => write!(f, "UNMAPPABLE[{}]", n),
        }
    }
}
