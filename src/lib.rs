//! Byte-exact, resumable UTF-8 ⇄ UTF-16 transcoding.
//!
//! The engines ([`decode`] and [`encode`]) convert from a [`Source`] into a
//! [`Sink`] and stop at the first thing they cannot handle, reporting it as a
//! [`CoderResult`] with the input cursor left on the offending sequence. They
//! accept exactly the well-formed sequences of Unicode 3.0.1 Table 3.1B
//! (no overlongs, no encoded surrogates, nothing above U+10FFFF) and never
//! partially consume a code point, so a caller may refill and call again.
//!
//! On top of the engines sit:
//!
//! - [`decode_with`] and [`encode_with`], which apply a [`DecoderConfig`] or
//!   [`EncoderConfig`] policy (report, replace or ignore) and know about end
//!   of input;
//! - [`decode_to_vec`], [`encode_to_vec`], [`validate`], [`utf16_len`] and
//!   [`utf8_len`] for whole inputs;
//! - [`decode_bulk`] and [`encode_bulk`], lossy one-shot conversions into a
//!   caller buffer sized for the worst case.
//!
//! # Example
//!
//! ```
//! use utf8conv::{DecoderConfig, EncoderConfig, decode_to_vec, encode_to_vec};
//!
//! let text = "gr\u{fc}\u{df} \u{1f30d}";
//! let units = decode_to_vec(text.as_bytes(), &DecoderConfig::new()).unwrap();
//! assert_eq!(units, text.encode_utf16().collect::<Vec<_>>());
//!
//! let bytes = encode_to_vec(&units, &EncoderConfig::new()).unwrap();
//! assert_eq!(bytes, text.as_bytes());
//! ```

#![deny(missing_docs)]

extern crate alloc;

/// Source and sink cursors over caller-owned buffers.
pub mod buffer;
/// Lead-byte and unit classification tables.
pub mod classify;
/// Error policies and replacement values.
pub mod config;
/// UTF-8 → UTF-16 decoding.
pub mod decode;
/// Policy-applying entry points and whole-input helpers.
pub mod driver;
/// UTF-16 → UTF-8 encoding.
pub mod encode;
/// Error types.
pub mod error;
/// The outcome of one coding step.
pub mod result;
/// UTF-16 surrogate arithmetic and parsing.
pub mod surrogate;

pub use buffer::{Counter, Generic, QueueSource, Sink, SliceSink, SliceSource, Source};
pub use config::{CodingErrorAction, DecoderConfig, EncoderConfig};
pub use decode::{AVERAGE_UNITS_PER_BYTE, MAX_UNITS_PER_BYTE, decode, decode_bulk};
pub use driver::{
    decode_to_vec, decode_with, encode_to_vec, encode_with, utf8_len, utf16_len, validate,
};
pub use encode::{AVERAGE_BYTES_PER_UNIT, MAX_BYTES_PER_UNIT, can_encode, encode, encode_bulk};
pub use error::{CodingError, EncodingError, InvalidReplacement};
pub use result::CoderResult;
