//! UTF-8 → UTF-16 decoding.
//!
//! [`decode`] is the exact, resumable engine: it stops at the first sequence
//! it cannot finish and leaves the source positioned on that sequence's first
//! byte. [`decode_bulk`] is the convenience wrapper over whole slices that
//! either substitutes a replacement unit or gives up with `None`.
//!
//! # Example
//!
//! ```
//! use utf8conv::{CoderResult, SliceSink, SliceSource, decode};
//!
//! let bytes = "h\u{e9}\u{65e5}\u{1f600}".as_bytes();
//! let mut out = [0u16; 8];
//! let mut src = SliceSource::new(bytes);
//! let mut dst = SliceSink::new(&mut out);
//!
//! assert_eq!(decode(&mut src, &mut dst), CoderResult::Underflow);
//! assert_eq!(dst.written(), &[0x68, 0xE9, 0x65E5, 0xD83D, 0xDE00]);
//! ```

use crate::buffer::{Sink, SliceSink, SliceSource, Source};
use crate::classify::{self, Lead};
use crate::config::DecoderConfig;
use crate::result::CoderResult;
use crate::surrogate;

/// Upper bound on UTF-16 units produced per input byte.
///
/// A 4-byte sequence yields a 2-unit pair and every malformed sequence at most
/// one replacement unit, so an output as long as the input always suffices.
pub const MAX_UNITS_PER_BYTE: usize = 1;

/// Expected UTF-16 units per input byte, for sizing outputs.
pub const AVERAGE_UNITS_PER_BYTE: f32 = 1.0;

/// Decodes UTF-8 from `src` into UTF-16 units in `dst`.
///
/// Returns when the input is exhausted ([`CoderResult::Underflow`]), the
/// output cannot hold the next code point ([`CoderResult::Overflow`]), or the
/// sequence at the source position is invalid ([`CoderResult::Malformed`]
/// with the number of bytes to skip). Both cursors stop right after the last
/// code point that was fully converted.
///
/// A sequence cut short by the end of the input is an `Underflow` as long as
/// every byte present is acceptable; the first unacceptable byte turns it into
/// `Malformed` with the count of bytes before it.
pub fn decode<I, O>(src: &mut I, dst: &mut O) -> CoderResult
where
    I: Source<u8> + ?Sized,
    O: Sink<u16> + ?Sized,
{
    copy_ascii(src, dst);

    while src.has_remaining() {
        let b1 = src.peek(0);
        let available = src.remaining();

        match classify::lead(b1) {
            Lead::Ascii => {
                if dst.remaining() < 1 {
                    return CoderResult::Overflow;
                }
                dst.push(b1 as u16);
                src.advance(1);
            }
            Lead::Two => {
                if available < 2 || dst.remaining() < 1 {
                    return xflow(available, 2);
                }
                let b2 = src.peek(1);
                if !classify::is_continuation(b2) {
                    return CoderResult::Malformed(1);
                }
                dst.push(classify::decode_two(b1, b2));
                src.advance(2);
            }
            Lead::Three => {
                if available < 3 || dst.remaining() < 1 {
                    if available > 1 && classify::bad_second_of_three(b1, src.peek(1)) {
                        return CoderResult::Malformed(1);
                    }
                    return xflow(available, 3);
                }
                let b2 = src.peek(1);
                let b3 = src.peek(2);
                if classify::bad_three(b1, b2, b3) {
                    return CoderResult::Malformed(classify::malformed_len_three(b1, b2));
                }
                let unit = classify::decode_three(b1, b2, b3);
                if surrogate::is_surrogate(unit) {
                    return CoderResult::Malformed(3);
                }
                dst.push(unit);
                src.advance(3);
            }
            Lead::Four => {
                if available < 4 || dst.remaining() < 2 {
                    if available > 1 && classify::bad_second_of_four(b1, src.peek(1)) {
                        return CoderResult::Malformed(1);
                    }
                    if available > 2 && !classify::is_continuation(src.peek(2)) {
                        return CoderResult::Malformed(2);
                    }
                    return xflow(available, 4);
                }
                let b2 = src.peek(1);
                let b3 = src.peek(2);
                let b4 = src.peek(3);
                let cp = classify::decode_four(b1, b2, b3, b4);
                if classify::bad_four(b1, b2, b3, b4) || !surrogate::is_supplementary(cp) {
                    return CoderResult::Malformed(classify::malformed_len_four(b1, b2, b3));
                }
                let (high, low) = surrogate::split(cp);
                dst.push(high);
                dst.push(low);
                src.advance(4);
            }
            Lead::Invalid => return CoderResult::Malformed(1),
        }
    }

    CoderResult::Underflow
}

/// Decodes all of `src` into `dst`, returning the number of units written.
///
/// Malformed input is handled by `config`'s malformed action: under
/// [`Replace`](crate::CodingErrorAction::Replace) each malformed sequence
/// becomes one replacement unit and decoding continues after it, and a
/// sequence cut off by the end of `src` becomes a single replacement. Any
/// other action returns `None` at the first malformed sequence, with no
/// indication of where it was; use [`decode`] or
/// [`decode_to_vec`](crate::decode_to_vec) when the position matters.
///
/// # Panics
///
/// Panics if `dst` is shorter than `src`.
///
/// ```
/// use utf8conv::{CodingErrorAction, DecoderConfig, decode_bulk};
///
/// let input = [b'a', 0xC0, 0x80, b'b'];
/// let mut out = [0u16; 4];
///
/// assert_eq!(decode_bulk(&input, &mut out, &DecoderConfig::new()), None);
///
/// let config = DecoderConfig::new().with_malformed_action(CodingErrorAction::Replace);
/// assert_eq!(decode_bulk(&input, &mut out, &config), Some(4));
/// assert_eq!(out, [0x61, 0xFFFD, 0xFFFD, 0x62]);
/// ```
pub fn decode_bulk(src: &[u8], dst: &mut [u16], config: &DecoderConfig) -> Option<usize> {
    assert!(
        dst.len() >= src.len() * MAX_UNITS_PER_BYTE,
        "output of {} units cannot hold the decoding of {} bytes",
        dst.len(),
        src.len()
    );

    let mut src = SliceSource::new(src);
    let mut dst = SliceSink::new(dst);

    loop {
        let result = match decode(&mut src, &mut dst) {
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
        dst.push(config.replacement());
        src.advance(skip);
    }
}

/// Bulk-copies the leading ASCII run when the input is contiguous.
fn copy_ascii<I, O>(src: &mut I, dst: &mut O)
where
    I: Source<u8> + ?Sized,
    O: Sink<u16> + ?Sized,
{
    let run = match src.as_slice() {
        Some(bytes) => {
            let limit = bytes.len().min(dst.remaining());
            let run = bytes[..limit].iter().take_while(|b| b.is_ascii()).count();
            for &b in &bytes[..run] {
                dst.push(b as u16);
            }
            run
        }
        None => return,
    };
    src.advance(run);
}

/// Picks the flow signal for a sequence of `needed` bytes that did not fit.
#[inline]
fn xflow(available: usize, needed: usize) -> CoderResult {
    if available < needed {
        CoderResult::Underflow
    } else {
        CoderResult::Overflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodingErrorAction;

    fn run(bytes: &[u8], capacity: usize) -> (CoderResult, usize, Vec<u16>) {
        let mut out = vec![0u16; capacity];
        let mut src = SliceSource::new(bytes);
        let mut dst = SliceSink::new(&mut out);
        let result = decode(&mut src, &mut dst);
        let written = dst.written().to_vec();
        (result, src.position(), written)
    }

    #[test]
    fn test_ascii() {
        let (result, consumed, out) = run(b"hello", 8);
        assert_eq!(result, CoderResult::Underflow);
        assert_eq!(consumed, 5);
        assert_eq!(out, [0x68, 0x65, 0x6C, 0x6C, 0x6F]);
    }

    #[test]
    fn test_ascii_overflow() {
        let (result, consumed, out) = run(b"hello", 3);
        assert_eq!(result, CoderResult::Overflow);
        assert_eq!(consumed, 3);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_multibyte() {
        let (result, consumed, out) = run("\u{e9}\u{65e5}\u{1f600}".as_bytes(), 8);
        assert_eq!(result, CoderResult::Underflow);
        assert_eq!(consumed, 9);
        assert_eq!(out, [0xE9, 0x65E5, 0xD83D, 0xDE00]);
    }

    #[test]
    fn test_overlong() {
        assert_eq!(run(&[0xC0, 0x80], 4).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xC1, 0xBF], 4).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xE0, 0x80, 0x80], 4).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xE0, 0x9F, 0xBF], 4).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xF0, 0x80, 0x80, 0x80], 4).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xF0, 0x8F, 0xBF, 0xBF], 4).0, CoderResult::Malformed(1));
    }

    #[test]
    fn test_surrogate_range() {
        assert_eq!(run(&[0xED, 0xA0, 0x80], 4).0, CoderResult::Malformed(3));
        assert_eq!(run(&[0xED, 0xBF, 0xBF], 4).0, CoderResult::Malformed(3));
        let (result, _, out) = run(&[0xED, 0x9F, 0xBF], 4);
        assert_eq!(result, CoderResult::Underflow);
        assert_eq!(out, [0xD7FF]);
    }

    #[test]
    fn test_above_max() {
        assert_eq!(run(&[0xF4, 0x90, 0x80, 0x80], 4).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xF5, 0x80, 0x80, 0x80], 4).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xF8, 0x88, 0x80, 0x80, 0x80], 4).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xFF], 4).0, CoderResult::Malformed(1));
    }

    #[test]
    fn test_stray_continuation() {
        let (result, consumed, out) = run(&[b'a', 0x80, b'b'], 4);
        assert_eq!(result, CoderResult::Malformed(1));
        assert_eq!(consumed, 1);
        assert_eq!(out, [0x61]);
    }

    #[test]
    fn test_bad_continuation_lengths() {
        assert_eq!(run(&[0xC3, 0x28], 4).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xE2, 0x28, 0xA1], 4).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xE2, 0x82, 0x28], 4).0, CoderResult::Malformed(2));
        assert_eq!(run(&[0xF0, 0x28, 0x8C, 0xBC], 4).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xF0, 0x90, 0x28, 0xBC], 4).0, CoderResult::Malformed(2));
        assert_eq!(run(&[0xF0, 0x90, 0x8C, 0x28], 4).0, CoderResult::Malformed(3));
    }

    #[test]
    fn test_truncated() {
        assert_eq!(run(&[0xE2], 4), (CoderResult::Underflow, 0, vec![]));
        assert_eq!(run(&[0xE2, 0x82], 4), (CoderResult::Underflow, 0, vec![]));
        assert_eq!(run(&[0xE2, 0x28], 4).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xE0, 0x80], 4).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xC3], 4).0, CoderResult::Underflow);
        assert_eq!(run(&[0xF0, 0x90, 0x80], 4).0, CoderResult::Underflow);
        assert_eq!(run(&[0xF0, 0x80], 4).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xF4, 0x90], 4).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xF1, 0x80, 0x28], 4).0, CoderResult::Malformed(2));

        let (result, consumed, out) = run(&[b'x', 0xF0, 0x9F], 4);
        assert_eq!(result, CoderResult::Underflow);
        assert_eq!(consumed, 1);
        assert_eq!(out, [0x78]);
    }

    #[test]
    fn test_overflow_leaves_input() {
        let (result, consumed, out) = run(&[0xF0, 0x9F, 0x98, 0x80], 1);
        assert_eq!(result, CoderResult::Overflow);
        assert_eq!(consumed, 0);
        assert!(out.is_empty());

        let (result, consumed, _) = run(&[b'a', 0xE6, 0x97, 0xA5], 1);
        assert_eq!(result, CoderResult::Overflow);
        assert_eq!(consumed, 1);

        let (result, consumed, _) = run(&[0xC3, 0xA9], 0);
        assert_eq!(result, CoderResult::Overflow);
        assert_eq!(consumed, 0);
    }

    #[test]
    fn test_underflow_beats_overflow() {
        assert_eq!(run(&[0xE2, 0x82], 0).0, CoderResult::Underflow);
        assert_eq!(run(&[0xC3], 0).0, CoderResult::Underflow);
    }

    #[test]
    fn test_bad_prefix_beats_overflow() {
        assert_eq!(run(&[0xE2, 0x28, 0x80], 0).0, CoderResult::Malformed(1));
        assert_eq!(run(&[0xF0, 0x90, 0x28, 0x80], 1).0, CoderResult::Malformed(2));
        assert_eq!(run(&[0xF0, 0x90, 0x80, 0x28], 1).0, CoderResult::Overflow);
    }

    #[test]
    fn test_empty() {
        assert_eq!(run(&[], 0), (CoderResult::Underflow, 0, vec![]));
    }

    #[test]
    fn test_bulk_report() {
        let mut out = [0u16; 8];
        let config = DecoderConfig::new();
        assert_eq!(decode_bulk(b"abc", &mut out, &config), Some(3));
        assert_eq!(decode_bulk(&[b'a', 0xFF], &mut out, &config), None);
        assert_eq!(decode_bulk(&[b'a', 0xE2, 0x82], &mut out, &config), None);
    }

    #[test]
    fn test_bulk_replace() {
        let config = DecoderConfig::new()
            .with_malformed_action(CodingErrorAction::Replace)
            .with_replacement(u16::from(b'?'))
            .unwrap();
        let mut out = [0u16; 16];

        let input = [0xE2, 0x82, 0x28, b'x', 0xED, 0xA0, 0x80, b'y'];
        let n = decode_bulk(&input, &mut out, &config).unwrap();
        assert_eq!(&out[..n], &[0x3F, 0x28, 0x78, 0x3F, 0x79]);

        // A truncated tail collapses into a single replacement.
        let n = decode_bulk(&[b'a', 0xF0, 0x9F, 0x98], &mut out, &config).unwrap();
        assert_eq!(&out[..n], &[0x61, 0x3F]);
    }

    #[test]
    fn test_bulk_replace_cut_off_tail() {
        let config = DecoderConfig::replacing();
        let mut out = [0u16; 8];
        assert_eq!(decode_bulk(&[b'a', 0xF0, 0x9F, 0x98], &mut out, &config), Some(2));
        assert_eq!(&out[..2], &[0x61, 0xFFFD]);
        assert_eq!(decode_bulk(&[0xE2], &mut out, &config), Some(1));
        assert_eq!(out[0], 0xFFFD);
    }

    #[test]
    fn test_bulk_ignore_is_not_replace() {
        let config = DecoderConfig::new().with_malformed_action(CodingErrorAction::Ignore);
        let mut out = [0u16; 4];
        assert_eq!(decode_bulk(&[0x80], &mut out, &config), None);
    }

    #[test]
    #[should_panic(expected = "cannot hold")]
    fn test_bulk_short_output() {
        let mut out = [0u16; 1];
        decode_bulk(b"ab", &mut out, &DecoderConfig::new());
    }
}
