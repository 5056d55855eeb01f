use core::fmt;

use thiserror::Error;

/// An error indicating that an input is not well formed.
///
/// Matches the shape of `std::str::Utf8Error`. Positions and lengths are in
/// input units: bytes for UTF-8 input, 16-bit units for UTF-16 input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodingError {
    valid_up_to: usize,
    error_len: Option<usize>,
}

impl EncodingError {
    /// Creates a new encoding error.
    #[inline]
    pub const fn new(valid_up_to: usize, error_len: Option<usize>) -> Self {
        Self {
            valid_up_to,
            error_len,
        }
    }

    /// Returns the index in the input up to which valid data was verified.
    ///
    /// It is the maximum index such that `input[..index]` is well formed.
    #[inline]
    pub const fn valid_up_to(&self) -> usize {
        self.valid_up_to
    }

    /// Provides more information about the failure:
    ///
    /// * `None`: the end of the input was reached inside a sequence.
    /// * `Some(len)`: an invalid sequence was encountered. The length is the
    ///   number of units starting at `valid_up_to()` that must be skipped.
    #[inline]
    pub const fn error_len(&self) -> Option<usize> {
        self.error_len
    }
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error_len) = self.error_len {
            write!(
                f,
                "invalid sequence of {} units from index {}",
                error_len, self.valid_up_to
            )
        } else {
            write!(f, "incomplete sequence from index {}", self.valid_up_to)
        }
    }
}

impl core::error::Error for EncodingError {}

/// Why a configured replacement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidReplacement {
    /// A decoder replacement may not be a surrogate code unit.
    Surrogate(u16),
    /// An encoder replacement must contain at least one byte.
    Empty,
    /// An encoder replacement may hold at most one encoded code point.
    TooLong(usize),
    /// An encoder replacement must itself be well-formed UTF-8.
    NotUtf8(EncodingError),
}

impl fmt::Display for InvalidReplacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surrogate(unit) => write!(f, "surrogate unit {:#06X}", unit),
            Self::Empty => f.write_str("empty byte sequence"),
            Self::TooLong(len) => write!(f, "{} bytes is longer than one code point", len),
            Self::NotUtf8(e) => write!(f, "not UTF-8: {}", e),
        }
    }
}

/// Errors surfaced by the coding driver and configuration builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodingError {
    /// The input was not well formed and the configured action was to report.
    #[error("malformed input: {0}")]
    Malformed(EncodingError),
    /// The input could not be mapped to the target form.
    #[error("unmappable input of {length} units at index {position}")]
    Unmappable {
        /// Index of the first unmappable unit.
        position: usize,
        /// Number of units that could not be mapped.
        length: usize,
    },
    /// A replacement value was rejected by a configuration builder.
    #[error("illegal replacement: {0}")]
    InvalidReplacement(InvalidReplacement),
}

impl CodingError {
    /// Returns the underlying [`EncodingError`] for malformed input.
    #[inline]
    pub const fn encoding_error(&self) -> Option<&EncodingError> {
        match self {
            Self::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EncodingError> for CodingError {
    #[inline]
    fn from(e: EncodingError) -> Self {
        Self::Malformed(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_error_display() {
        let e = EncodingError::new(4, Some(2));
        assert_eq!(e.to_string(), "invalid sequence of 2 units from index 4");
        let e = EncodingError::new(1, None);
        assert_eq!(e.to_string(), "incomplete sequence from index 1");
    }

    #[test]
    fn coding_error_display() {
        let err = CodingError::from(EncodingError::new(0, Some(1)));
        assert_eq!(
            err.to_string(),
            "malformed input: invalid sequence of 1 units from index 0"
        );
        assert_eq!(err.encoding_error(), Some(&EncodingError::new(0, Some(1))));

        let err = CodingError::InvalidReplacement(InvalidReplacement::Surrogate(0xD800));
        assert_eq!(err.to_string(), "illegal replacement: surrogate unit 0xD800");
        assert_eq!(err.encoding_error(), None);
    }
}
