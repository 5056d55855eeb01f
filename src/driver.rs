//! The policy layer between callers and the engines.
//!
//! The engines stop at every problem. The functions here resume them
//! according to a [`DecoderConfig`] or [`EncoderConfig`], and know about
//! end of input: once the caller says no more input is coming, a sequence the
//! engine was still waiting to complete is malformed.
//!
//! # Streaming
//!
//! ```
//! use utf8conv::{CoderResult, DecoderConfig, QueueSource, Source, decode_with};
//!
//! let config = DecoderConfig::replacing();
//! let mut pending = QueueSource::new();
//! let mut out: Vec<u16> = Vec::with_capacity(16);
//!
//! let chunks: [&[u8]; 3] = [b"caf", &[0xC3], &[0xA9, 0xE2]];
//! for (i, chunk) in chunks.into_iter().enumerate() {
//!     pending.extend(chunk);
//!     let last = i == chunks.len() - 1;
//!     assert_eq!(decode_with(&config, &mut pending, &mut out, last), CoderResult::Underflow);
//! }
//! assert_eq!(out, [0x63, 0x61, 0x66, 0xE9, 0xFFFD]);
//! assert_eq!(pending.remaining(), 0);
//! ```

use alloc::vec::Vec;

use log::{debug, trace};

use crate::buffer::{Counter, Sink, SliceSource, Source};
use crate::config::{CodingErrorAction, DecoderConfig, EncoderConfig};
use crate::decode::{AVERAGE_UNITS_PER_BYTE, decode};
use crate::encode::{AVERAGE_BYTES_PER_UNIT, encode};
use crate::error::{CodingError, EncodingError};
use crate::result::CoderResult;

/// The resolved policy for one pass, independent of direction.
struct Policy<'a, U> {
    malformed: CodingErrorAction,
    unmappable: CodingErrorAction,
    replacement: &'a [U],
}

impl<U> Policy<'_, U> {
    fn action(&self, result: CoderResult) -> CodingErrorAction {
        if result.is_unmappable() {
            self.unmappable
        } else {
            self.malformed
        }
    }
}

/// Decodes from `src` into `dst`, applying `config` to malformed input.
///
/// Returns [`CoderResult::Underflow`] when `src` is used up (when
/// `end_of_input` is `false`, possibly with the start of an unfinished
/// sequence left in `src`), [`CoderResult::Overflow`] when `dst` is full, or
/// the error itself when the configured action is
/// [`Report`](CodingErrorAction::Report), with `src` positioned on it.
///
/// With `end_of_input` set, bytes left over at the end form one malformed
/// sequence covering all of them.
pub fn decode_with<I, O>(
    config: &DecoderConfig,
    src: &mut I,
    dst: &mut O,
    end_of_input: bool,
) -> CoderResult
where
    I: Source<u8> + ?Sized,
    O: Sink<u16> + ?Sized,
{
    let replacement = [config.replacement()];
    let policy = Policy {
        malformed: config.malformed_action(),
        unmappable: config.unmappable_action(),
        replacement: &replacement,
    };
    drive::<u8, u16, I, O>(decode::<I, O>, &policy, src, dst, end_of_input)
}

/// Encodes from `src` into `dst`, applying `config` to unpaired surrogates.
///
/// The encoding counterpart of [`decode_with`]. With `end_of_input` set, a
/// high surrogate that ends the input is malformed rather than pending.
pub fn encode_with<I, O>(
    config: &EncoderConfig,
    src: &mut I,
    dst: &mut O,
    end_of_input: bool,
) -> CoderResult
where
    I: Source<u16> + ?Sized,
    O: Sink<u8> + ?Sized,
{
    let policy = Policy {
        malformed: config.malformed_action(),
        unmappable: config.unmappable_action(),
        replacement: config.replacement(),
    };
    drive::<u16, u8, I, O>(encode::<I, O>, &policy, src, dst, end_of_input)
}

fn drive<T, U, I, O>(
    engine: fn(&mut I, &mut O) -> CoderResult,
    policy: &Policy<'_, U>,
    src: &mut I,
    dst: &mut O,
    end_of_input: bool,
) -> CoderResult
where
    T: Copy,
    U: Copy,
    I: Source<T> + ?Sized,
    O: Sink<U> + ?Sized,
{
    loop {
        let mut result = engine(src, dst);
        if result.is_underflow() && end_of_input && src.has_remaining() {
            result = CoderResult::Malformed(src.remaining());
        }
        let Some(length) = result.length() else {
            return result;
        };

        match policy.action(result) {
            CodingErrorAction::Report => return result,
            CodingErrorAction::Replace => {
                if dst.remaining() < policy.replacement.len() {
                    return CoderResult::Overflow;
                }
                trace!(
                    "replacing {} at input position {}",
                    result,
                    src.position()
                );
                dst.extend_from_slice(policy.replacement);
            }
            CodingErrorAction::Ignore => {
                trace!("skipping {} at input position {}", result, src.position());
            }
        }
        src.advance(length);
    }
}

/// Decodes a whole UTF-8 input into a new vector of UTF-16 units.
///
/// Errors the configuration says to report come back as
/// [`CodingError::Malformed`], with `valid_up_to` set to the byte index of the
/// offending sequence. `error_len` is `None` when the input ends in the middle
/// of a sequence.
///
/// ```
/// use utf8conv::{DecoderConfig, decode_to_vec};
///
/// let units = decode_to_vec("a\u{1f600}".as_bytes(), &DecoderConfig::new()).unwrap();
/// assert_eq!(units, [0x61, 0xD83D, 0xDE00]);
///
/// let err = decode_to_vec(&[b'a', 0xE2, 0x82], &DecoderConfig::new()).unwrap_err();
/// let err = err.encoding_error().unwrap();
/// assert_eq!(err.valid_up_to(), 1);
/// assert_eq!(err.error_len(), None);
/// ```
pub fn decode_to_vec(bytes: &[u8], config: &DecoderConfig) -> Result<Vec<u16>, CodingError> {
    let mut src = SliceSource::new(bytes);
    let mut out = Vec::with_capacity(estimate(bytes.len(), AVERAGE_UNITS_PER_BYTE));
    collect(
        |src, out, end| decode_with(config, src, out, end),
        config.malformed_action(),
        &mut src,
        &mut out,
    )?;
    Ok(out)
}

/// Encodes a whole UTF-16 input into a new vector of UTF-8 bytes.
///
/// Positions in errors are unit indices into `units`.
///
/// ```
/// use utf8conv::{EncoderConfig, encode_to_vec};
///
/// let bytes = encode_to_vec(&[0x61, 0xD83D, 0xDE00], &EncoderConfig::new()).unwrap();
/// assert_eq!(bytes, "a\u{1f600}".as_bytes());
///
/// let bytes = encode_to_vec(&[0x61, 0xD83D], &EncoderConfig::replacing()).unwrap();
/// assert_eq!(bytes, b"a?");
/// ```
pub fn encode_to_vec(units: &[u16], config: &EncoderConfig) -> Result<Vec<u8>, CodingError> {
    let mut src = SliceSource::new(units);
    let mut out = Vec::with_capacity(estimate(units.len(), AVERAGE_BYTES_PER_UNIT));
    collect(
        |src, out, end| encode_with(config, src, out, end),
        config.malformed_action(),
        &mut src,
        &mut out,
    )?;
    Ok(out)
}

/// Runs `pass` over the whole of `src`, growing `out` on overflow.
///
/// The first pass treats the input as open-ended so that a truncated tail
/// can be told apart from other malformed input before end of input is
/// declared.
fn collect<T, U, F>(
    mut pass: F,
    malformed: CodingErrorAction,
    src: &mut SliceSource<'_, T>,
    out: &mut Vec<U>,
) -> Result<(), CodingError>
where
    T: Copy,
    U: Copy,
    F: FnMut(&mut SliceSource<'_, T>, &mut Vec<U>, bool) -> CoderResult,
{
    let mut end_of_input = false;
    loop {
        match pass(src, out, end_of_input) {
            CoderResult::Overflow => {
                let additional = out.capacity().max(src.remaining()).max(4);
                debug!(
                    "output full at {} units, reserving {} more",
                    out.len(),
                    additional
                );
                out.reserve(additional);
            }
            CoderResult::Underflow if !src.has_remaining() => return Ok(()),
            CoderResult::Underflow => {
                if end_of_input || malformed == CodingErrorAction::Report {
                    return Err(EncodingError::new(src.position(), None).into());
                }
                end_of_input = true;
            }
            result => {
                result.into_result(src.position())?;
            }
        }
    }
}

fn estimate(len: usize, average: f32) -> usize {
    (len as f32 * average) as usize
}

/// Checks that `bytes` is well-formed UTF-8.
///
/// ```
/// use utf8conv::validate;
///
/// assert!(validate("h\u{e9}llo".as_bytes()).is_ok());
/// let err = validate(&[b'h', 0xED, 0xA0, 0x80]).unwrap_err();
/// assert_eq!((err.valid_up_to(), err.error_len()), (1, Some(3)));
/// ```
pub fn validate(bytes: &[u8]) -> Result<(), EncodingError> {
    utf16_len(bytes).map(|_| ())
}

/// Returns the number of UTF-16 units `bytes` decodes to.
pub fn utf16_len(bytes: &[u8]) -> Result<usize, EncodingError> {
    let mut src = SliceSource::new(bytes);
    let mut counter = Counter::new();
    let result = decode(&mut src, &mut counter);
    finish_count(result, &src, counter.count())
}

/// Returns the number of UTF-8 bytes `units` encodes to.
///
/// An unpaired surrogate is an error; a high surrogate at the very end is
/// reported with `error_len() == None`.
pub fn utf8_len(units: &[u16]) -> Result<usize, EncodingError> {
    let mut src = SliceSource::new(units);
    let mut counter = Counter::new();
    let result = encode(&mut src, &mut counter);
    finish_count(result, &src, counter.count())
}

fn finish_count<T: Copy>(
    result: CoderResult,
    src: &SliceSource<'_, T>,
    count: usize,
) -> Result<usize, EncodingError> {
    match result.length() {
        Some(n) => Err(EncodingError::new(src.position(), Some(n))),
        None if src.has_remaining() => Err(EncodingError::new(src.position(), None)),
        None => Ok(count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SliceSink;

    #[test]
    fn test_decode_with_report() {
        let config = DecoderConfig::new();
        let mut out = [0u16; 8];
        let mut src = SliceSource::new(&[b'a', 0xFF, b'b']);
        let mut dst = SliceSink::new(&mut out);
        let result = decode_with(&config, &mut src, &mut dst, true);
        assert_eq!(result, CoderResult::Malformed(1));
        assert_eq!(src.position(), 1);
        assert_eq!(dst.written(), &[0x61]);
    }

    #[test]
    fn test_decode_with_end_of_input() {
        let config = DecoderConfig::new();
        let mut out = [0u16; 8];

        let mut src = SliceSource::new(&[b'a', 0xF0, 0x9F, 0x98]);
        let mut dst = SliceSink::new(&mut out);
        assert_eq!(
            decode_with(&config, &mut src, &mut dst, false),
            CoderResult::Underflow
        );
        assert_eq!(src.position(), 1);

        let mut src = SliceSource::new(&[b'a', 0xF0, 0x9F, 0x98]);
        let mut dst = SliceSink::new(&mut out);
        assert_eq!(
            decode_with(&config, &mut src, &mut dst, true),
            CoderResult::Malformed(3)
        );
        assert_eq!(src.position(), 1);
    }

    #[test]
    fn test_decode_with_ignore() {
        let config = DecoderConfig::new().with_malformed_action(CodingErrorAction::Ignore);
        let mut out = [0u16; 8];
        let mut src = SliceSource::new(&[0xC0, b'a', 0x80, 0x80, b'b', 0xE2]);
        let mut dst = SliceSink::new(&mut out);
        assert_eq!(
            decode_with(&config, &mut src, &mut dst, true),
            CoderResult::Underflow
        );
        assert_eq!(dst.written(), &[0x61, 0x62]);
        assert_eq!(src.position(), 6);
    }

    #[test]
    fn test_replacement_needs_room() {
        let config = DecoderConfig::replacing();
        let mut out = [0u16; 1];
        let mut src = SliceSource::new(&[b'a', 0x80]);
        let mut dst = SliceSink::new(&mut out);
        assert_eq!(
            decode_with(&config, &mut src, &mut dst, true),
            CoderResult::Overflow
        );
        assert_eq!(src.position(), 1);

        let encoder = EncoderConfig::replacing()
            .with_replacement("\u{fffd}".as_bytes())
            .unwrap();
        let mut out = [0u8; 2];
        let mut src = SliceSource::new(&[0xDC00]);
        let mut dst = SliceSink::new(&mut out);
        assert_eq!(
            encode_with(&encoder, &mut src, &mut dst, true),
            CoderResult::Overflow
        );
        assert_eq!(src.position(), 0);
    }

    #[test]
    fn test_encode_with_lone_high_at_end() {
        let config = EncoderConfig::new();
        let mut out = [0u8; 8];

        let mut src = SliceSource::new(&[0x41, 0xD800]);
        let mut dst = SliceSink::new(&mut out);
        assert_eq!(
            encode_with(&config, &mut src, &mut dst, false),
            CoderResult::Underflow
        );
        assert_eq!(src.position(), 1);

        let mut src = SliceSource::new(&[0x41, 0xD800]);
        let mut dst = SliceSink::new(&mut out);
        assert_eq!(
            encode_with(&config, &mut src, &mut dst, true),
            CoderResult::Malformed(1)
        );
        assert_eq!(src.position(), 1);
    }

    #[test]
    fn test_decode_to_vec() {
        let text = "The quick \u{e9}\u{65e5}\u{1f600} fox";
        let units = decode_to_vec(text.as_bytes(), &DecoderConfig::new()).unwrap();
        assert_eq!(units, text.encode_utf16().collect::<Vec<_>>());

        let err = decode_to_vec(&[b'a', b'b', 0xC0, 0x80], &DecoderConfig::new()).unwrap_err();
        assert_eq!(err, CodingError::Malformed(EncodingError::new(2, Some(1))));

        let units = decode_to_vec(&[b'a', 0xE2, 0x82], &DecoderConfig::replacing()).unwrap();
        assert_eq!(units, [0x61, 0xFFFD]);

        let ignore = DecoderConfig::new().with_malformed_action(CodingErrorAction::Ignore);
        let units = decode_to_vec(&[b'a', 0xE2, 0x82], &ignore).unwrap();
        assert_eq!(units, [0x61]);
    }

    #[test]
    fn test_encode_to_vec_grows() {
        // Three bytes per unit outgrows the initial estimate.
        let units = [0x65E5u16; 100];
        let bytes = encode_to_vec(&units, &EncoderConfig::new()).unwrap();
        assert_eq!(bytes.len(), 300);
        assert_eq!(&bytes[..3], &[0xE6, 0x97, 0xA5]);

        let err = encode_to_vec(&[0x41, 0x42, 0xDC00], &EncoderConfig::new()).unwrap_err();
        assert_eq!(err, CodingError::Malformed(EncodingError::new(2, Some(1))));

        let err = encode_to_vec(&[0x41, 0xD800], &EncoderConfig::new()).unwrap_err();
        assert_eq!(err, CodingError::Malformed(EncodingError::new(1, None)));
    }

    #[test]
    fn test_lengths() {
        assert_eq!(utf16_len(b""), Ok(0));
        assert_eq!(utf16_len("a\u{e9}\u{1f600}".as_bytes()), Ok(4));
        assert_eq!(utf16_len(&[0xE2, 0x82]), Err(EncodingError::new(0, None)));
        assert_eq!(utf8_len(&[0x61, 0xE9, 0xD83D, 0xDE00]), Ok(7));
        assert_eq!(utf8_len(&[0xDE00]), Err(EncodingError::new(0, Some(1))));
        assert_eq!(utf8_len(&[0x61, 0xD83D]), Err(EncodingError::new(1, None)));
        assert!(validate(b"plain").is_ok());
        assert_eq!(validate(&[0x80]), Err(EncodingError::new(0, Some(1))));
    }
}
