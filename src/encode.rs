//! UTF-16 → UTF-8 encoding.
//!
//! The mirror image of [`decode`](crate::decode()): [`encode`] is the exact,
//! resumable engine and [`encode_bulk`] the whole-slice convenience wrapper.
//!
//! # Example
//!
//! ```
//! use utf8conv::{CoderResult, SliceSink, SliceSource, encode};
//!
//! let units = [0x68, 0xE9, 0x65E5, 0xD83D, 0xDE00];
//! let mut out = [0u8; 16];
//! let mut src = SliceSource::new(&units);
//! let mut dst = SliceSink::new(&mut out);
//!
//! assert_eq!(encode(&mut src, &mut dst), CoderResult::Underflow);
//! assert_eq!(dst.written(), "h\u{e9}\u{65e5}\u{1f600}".as_bytes());
//! ```

use crate::buffer::{Sink, SliceSink, SliceSource, Source};
use crate::classify::{self, Unit};
use crate::config::EncoderConfig;
use crate::result::CoderResult;
use crate::surrogate;

/// Upper bound on bytes produced per input unit.
///
/// A surrogate pair takes four bytes for two units, so three bytes per unit
/// (a BMP unit from U+0800) is the worst case.
pub const MAX_BYTES_PER_UNIT: usize = 3;

/// Expected bytes per input unit, for sizing outputs.
pub const AVERAGE_BYTES_PER_UNIT: f32 = 1.1;

/// Encodes UTF-16 units from `src` into UTF-8 bytes in `dst`.
///
/// A high surrogate is only consumed together with the low surrogate after
/// it. If the input ends right after a high surrogate the result is
/// [`CoderResult::Underflow`] with the high surrogate still pending, so a
/// caller can append the rest and call again. A high surrogate followed by
/// anything else, and a low surrogate on its own, are `Malformed(1)`.
pub fn encode<I, O>(src: &mut I, dst: &mut O) -> CoderResult
where
    I: Source<u16> + ?Sized,
    O: Sink<u8> + ?Sized,
{
    copy_ascii(src, dst);

    while src.has_remaining() {
        let u = src.peek(0);

        match classify::unit(u) {
            Unit::Ascii => {
                if dst.remaining() < 1 {
                    return CoderResult::Overflow;
                }
                dst.push(u as u8);
                src.advance(1);
            }
            Unit::Two => {
                if dst.remaining() < 2 {
                    return CoderResult::Overflow;
                }
                dst.extend_from_slice(&[0xC0 | (u >> 6) as u8, 0x80 | (u & 0x3F) as u8]);
                src.advance(1);
            }
            Unit::High | Unit::Low => {
                let next = if src.remaining() > 1 {
                    Some(src.peek(1))
                } else {
                    None
                };
                let parsed = match surrogate::parse(u, next) {
                    Ok(parsed) => parsed,
                    Err(result) => return result,
                };
                if dst.remaining() < 4 {
                    return CoderResult::Overflow;
                }
                let s = parsed.code_point;
                dst.extend_from_slice(&[
                    0xF0 | (s >> 18) as u8,
                    0x80 | ((s >> 12) & 0x3F) as u8,
                    0x80 | ((s >> 6) & 0x3F) as u8,
                    0x80 | (s & 0x3F) as u8,
                ]);
                src.advance(parsed.width);
            }
            Unit::Three => {
                if dst.remaining() < 3 {
                    return CoderResult::Overflow;
                }
                dst.extend_from_slice(&[
                    0xE0 | (u >> 12) as u8,
                    0x80 | ((u >> 6) & 0x3F) as u8,
                    0x80 | (u & 0x3F) as u8,
                ]);
                src.advance(1);
            }
        }
    }

    CoderResult::Underflow
}

/// Encodes all of `src` into `dst`, returning the number of bytes written.
///
/// Under [`Replace`](crate::CodingErrorAction::Replace) each unpaired
/// surrogate, including a high surrogate that ends the input, is written as
/// `config`'s replacement bytes. Any other action returns `None` at the first
/// unpaired surrogate.
///
/// # Panics
///
/// Panics if `dst` is shorter than three bytes per input unit.
///
/// ```
/// use utf8conv::{CodingErrorAction, EncoderConfig, encode_bulk};
///
/// let input = [0x61, 0xDC00, 0x62, 0xD800];
/// let mut out = [0u8; 12];
///
/// assert_eq!(encode_bulk(&input, &mut out, &EncoderConfig::new()), None);
///
/// let config = EncoderConfig::new().with_malformed_action(CodingErrorAction::Replace);
/// assert_eq!(encode_bulk(&input, &mut out, &config), Some(4));
/// assert_eq!(&out[..4], b"a?b?");
/// ```
pub fn encode_bulk(src: &[u16], dst: &mut [u8], config: &EncoderConfig) -> Option<usize> {
    assert!(
        dst.len() >= src.len() * MAX_BYTES_PER_UNIT,
        "output of {} bytes cannot hold the encoding of {} units",
        dst.len(),
        src.len()
    );

    let mut src = SliceSource::new(src);
    let mut dst = SliceSink::new(dst);

    loop {
        let result = match encode(&mut src, &mut dst) {
            // Input is complete, so a cut-off tail is malformed.
            CoderResult::Underflow if src.has_remaining() => {
                CoderResult::Malformed(src.remaining())
            }
            CoderResult::Underflow => return Some(dst.position()),
            CoderResult::Overflow => return None,
            result => result,
        };
        let skip = result.length()?;
        if !config.replaces(result) {
            return None;
        }
        dst.extend_from_slice(config.replacement());
        src.advance(skip);
    }
}

/// Returns `true` if the unit can be encoded on its own, which is every unit
/// except a surrogate.
#[inline]
pub const fn can_encode(unit: u16) -> bool {
    !surrogate::is_surrogate(unit)
}

/// Bulk-copies the leading ASCII run when the input is contiguous.
fn copy_ascii<I, O>(src: &mut I, dst: &mut O)
where
    I: Source<u16> + ?Sized,
    O: Sink<u8> + ?Sized,
{
    let run = match src.as_slice() {
        Some(units) => {
            let limit = units.len().min(dst.remaining());
            let run = units[..limit].iter().take_while(|&&u| u < 0x80).count();
            for &u in &units[..run] {
                dst.push(u as u8);
            }
            run
        }
        None => return,
    };
    src.advance(run);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodingErrorAction;

    fn run(units: &[u16], capacity: usize) -> (CoderResult, usize, Vec<u8>) {
        let mut out = vec![0u8; capacity];
        let mut src = SliceSource::new(units);
        let mut dst = SliceSink::new(&mut out);
        let result = encode(&mut src, &mut dst);
        let written = dst.written().to_vec();
        (result, src.position(), written)
    }

    #[test]
    fn test_lengths() {
        assert_eq!(run(&[0x24], 4).2, [0x24]);
        assert_eq!(run(&[0xA2], 4).2, [0xC2, 0xA2]);
        assert_eq!(run(&[0x20AC], 4).2, [0xE2, 0x82, 0xAC]);
        assert_eq!(run(&[0xD800, 0xDF48], 4).2, [0xF0, 0x90, 0x8D, 0x88]);
    }

    #[test]
    fn test_lone_low() {
        let (result, consumed, out) = run(&[0x41, 0xDC00, 0x42], 8);
        assert_eq!(result, CoderResult::Malformed(1));
        assert_eq!(consumed, 1);
        assert_eq!(out, b"A");
    }

    #[test]
    fn test_high_then_non_low() {
        let (result, consumed, _) = run(&[0xD800, 0x41], 8);
        assert_eq!(result, CoderResult::Malformed(1));
        assert_eq!(consumed, 0);

        let (result, consumed, _) = run(&[0xD800, 0xD800, 0xDC00], 8);
        assert_eq!(result, CoderResult::Malformed(1));
        assert_eq!(consumed, 0);
    }

    #[test]
    fn test_high_at_end_is_pending() {
        let (result, consumed, out) = run(&[0x41, 0xD83D], 8);
        assert_eq!(result, CoderResult::Underflow);
        assert_eq!(consumed, 1);
        assert_eq!(out, b"A");
    }

    #[test]
    fn test_overflow() {
        let (result, consumed, out) = run(&[0x41, 0x20AC], 3);
        assert_eq!(result, CoderResult::Overflow);
        assert_eq!(consumed, 1);
        assert_eq!(out, b"A");

        let (result, consumed, _) = run(&[0xD83D, 0xDE00], 3);
        assert_eq!(result, CoderResult::Overflow);
        assert_eq!(consumed, 0);

        let (result, consumed, _) = run(&[0xE9], 1);
        assert_eq!(result, CoderResult::Overflow);
        assert_eq!(consumed, 0);
    }

    #[test]
    fn test_surrogate_error_beats_overflow() {
        assert_eq!(run(&[0xDC00], 0).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xD800], 0).0, CoderResult::Underflow);
    }

    #[test]
    fn test_can_encode() {
        assert!(can_encode(0x41));
        assert!(can_encode(0xFFFD));
        assert!(!can_encode(0xD800));
        assert!(!can_encode(0xDFFF));
    }

    #[test]
    fn test_bulk() {
        let mut out = [0u8; 32];
        let config = EncoderConfig::new();
        let units: Vec<u16> = "h\u{e9}llo \u{1f600}".encode_utf16().collect();
        let n = encode_bulk(&units, &mut out, &config).unwrap();
        assert_eq!(&out[..n], "h\u{e9}llo \u{1f600}".as_bytes());

        assert_eq!(encode_bulk(&[0xD800], &mut out, &config), None);
    }

    #[test]
    fn test_bulk_replace_multibyte() {
        let config = EncoderConfig::new()
            .with_malformed_action(CodingErrorAction::Replace)
            .with_replacement("\u{fffd}".as_bytes())
            .unwrap();
        let mut out = [0u8; 12];
        let n = encode_bulk(&[0xDC00, 0x41, 0xD800, 0xD800], &mut out, &config).unwrap();
        assert_eq!(
            &out[..n],
            &[0xEF, 0xBF, 0xBD, 0x41, 0xEF, 0xBF, 0xBD, 0xEF, 0xBF, 0xBD]
        );
    }

    #[test]
    fn test_bulk_replace_high_at_end() {
        let config = EncoderConfig::replacing();
        let mut out = [0u8; 12];
        assert_eq!(encode_bulk(&[0x61, 0xDC00, 0x62, 0xD800], &mut out, &config), Some(4));
        assert_eq!(&out[..4], b"a?b?");
        assert_eq!(encode_bulk(&[0xDBFF], &mut out, &config), Some(1));
    }

    #[test]
    #[should_panic(expected = "cannot hold")]
    fn test_bulk_short_output() {
        let mut out = [0u8; 5];
        let _ = encode_bulk(&[0x41, 0x42], &mut out, &EncoderConfig::new());
    }
}
