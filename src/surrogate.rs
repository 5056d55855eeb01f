//! Surrogate pair parsing and generation.
//!
//! UTF-16 represents code points above U+FFFF as a high surrogate
//! (U+D800–U+DBFF) followed by a low surrogate (U+DC00–U+DFFF). The same range
//! constants serve both directions: [`parse`] combines a pair when encoding to
//! UTF-8, [`split`] produces one when decoding from it.

use crate::result::CoderResult;

/// First high surrogate.
pub const HIGH_START: u16 = 0xD800;
/// Last high surrogate.
pub const HIGH_END: u16 = 0xDBFF;
/// First low surrogate.
pub const LOW_START: u16 = 0xDC00;
/// Last low surrogate.
pub const LOW_END: u16 = 0xDFFF;

/// First supplementary code point.
pub const MIN_SUPPLEMENTARY: u32 = 0x1_0000;
/// Largest Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10_FFFF;

/// Returns true if the unit is a high surrogate (U+D800–U+DBFF).
#[inline]
pub const fn is_high(unit: u16) -> bool {
    unit >= HIGH_START && unit <= HIGH_END
}

/// Returns true if the unit is a low surrogate (U+DC00–U+DFFF).
#[inline]
pub const fn is_low(unit: u16) -> bool {
    unit >= LOW_START && unit <= LOW_END
}

/// Returns true if the unit is either kind of surrogate.
#[inline]
pub const fn is_surrogate(unit: u16) -> bool {
    unit >= HIGH_START && unit <= LOW_END
}

/// Returns true if the code point needs a surrogate pair in UTF-16.
#[inline]
pub const fn is_supplementary(cp: u32) -> bool {
    cp >= MIN_SUPPLEMENTARY && cp <= MAX_CODE_POINT
}

/// Combines a high and a low surrogate into a code point.
///
/// The caller must have checked both ranges.
#[inline]
pub const fn combine(high: u16, low: u16) -> u32 {
    MIN_SUPPLEMENTARY + (((high - HIGH_START) as u32) << 10) + (low - LOW_START) as u32
}

/// Splits a supplementary code point into its high and low surrogates.
///
/// The caller must have checked [`is_supplementary`].
#[inline]
pub const fn split(cp: u32) -> (u16, u16) {
    let offset = cp - MIN_SUPPLEMENTARY;
    (
        HIGH_START + (offset >> 10) as u16,
        LOW_START + (offset & 0x3FF) as u16,
    )
}

/// A code point recovered from one or two UTF-16 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parsed {
    /// The scalar value.
    pub code_point: u32,
    /// How many units it occupied: 1, or 2 for a surrogate pair.
    pub width: usize,
}

/// Parses the unit at the current position, consulting the following unit
/// when `unit` is a high surrogate.
///
/// `next` is `None` when the input currently ends after `unit`. On failure
/// the returned [`CoderResult`] is what the caller must report without
/// consuming anything:
///
/// - a high surrogate followed by anything but a low surrogate is
///   `Malformed(1)`; the following unit is left for the next step,
/// - a high surrogate with nothing after it is `Underflow`,
/// - a low surrogate on its own is `Malformed(1)`.
///
/// ```
/// use utf8conv::CoderResult;
/// use utf8conv::surrogate::{self, Parsed};
///
/// assert_eq!(
///     surrogate::parse(0xD83D, Some(0xDE00)),
///     Ok(Parsed { code_point: 0x1F600, width: 2 })
/// );
/// assert_eq!(surrogate::parse(0xD83D, Some(0x0041)), Err(CoderResult::Malformed(1)));
/// assert_eq!(surrogate::parse(0xD83D, None), Err(CoderResult::Underflow));
/// assert_eq!(surrogate::parse(0xDE00, None), Err(CoderResult::Malformed(1)));
/// ```
pub fn parse(unit: u16, next: Option<u16>) -> Result<Parsed, CoderResult> {
    if is_high(unit) {
        return match next {
            Some(low) if is_low(low) => Ok(Parsed {
                code_point: combine(unit, low),
                width: 2,
            }),
            Some(_) => Err(CoderResult::Malformed(1)),
            None => Err(CoderResult::Underflow),
        };
    }
    if is_low(unit) {
        return Err(CoderResult::Malformed(1));
    }
    Ok(Parsed {
        code_point: unit as u32,
        width: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert!(is_high(0xD800));
        assert!(is_high(0xDBFF));
        assert!(!is_high(0xDC00));
        assert!(is_low(0xDC00));
        assert!(is_low(0xDFFF));
        assert!(!is_low(0xE000));
        assert!(is_surrogate(0xDABC));
        assert!(!is_surrogate(0xD7FF));
    }

    #[test]
    fn test_combine_and_split() {
        assert_eq!(combine(0xD800, 0xDC00), 0x10000);
        assert_eq!(combine(0xDBFF, 0xDFFF), 0x10FFFF);
        assert_eq!(split(0x10000), (0xD800, 0xDC00));
        assert_eq!(split(0x10FFFF), (0xDBFF, 0xDFFF));
        assert_eq!(split(0x1F600), (0xD83D, 0xDE00));

        for cp in [0x10000, 0x12345, 0x1F600, 0xFFFFF, 0x10FFFF] {
            let (high, low) = split(cp);
            assert!(is_high(high));
            assert!(is_low(low));
            assert_eq!(combine(high, low), cp);
        }
    }

    #[test]
    fn test_is_supplementary() {
        assert!(!is_supplementary(0xFFFF));
        assert!(is_supplementary(0x10000));
        assert!(is_supplementary(0x10FFFF));
        assert!(!is_supplementary(0x110000));
    }

    #[test]
    fn test_parse_plain_unit() {
        assert_eq!(
            parse(0x0041, None),
            Ok(Parsed {
                code_point: 0x41,
                width: 1
            })
        );
        assert_eq!(
            parse(0xFFFF, Some(0xDC00)),
            Ok(Parsed {
                code_point: 0xFFFF,
                width: 1
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        // High followed by another high: only the first is at fault.
        assert_eq!(parse(0xD800, Some(0xD800)), Err(CoderResult::Malformed(1)));
        assert_eq!(parse(0xDBFF, None), Err(CoderResult::Underflow));
        assert_eq!(parse(0xDC00, Some(0xDC00)), Err(CoderResult::Malformed(1)));
    }
}
