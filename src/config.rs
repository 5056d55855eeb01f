//! Error-handling policy for the bulk entry points and the coding driver.
//!
//! The engines never consult configuration; they only report. A
//! [`DecoderConfig`] or [`EncoderConfig`] is an immutable value handed to each
//! call that decides what happens to what they report.
//!
//! # Example
//!
//! ```
//! use utf8conv::{CodingErrorAction, DecoderConfig, EncoderConfig};
//!
//! let decoder = DecoderConfig::new()
//!     .with_malformed_action(CodingErrorAction::Replace)
//!     .with_replacement(u16::from(b'?'))
//!     .unwrap();
//! assert_eq!(decoder.replacement(), 0x3F);
//!
//! let encoder = EncoderConfig::new();
//! assert_eq!(encoder.replacement(), b"?");
//! assert!(EncoderConfig::new().with_replacement(&[0xFF]).is_err());
//! ```

use alloc::vec::Vec;

use crate::buffer::{Counter, SliceSource, Source};
use crate::decode::decode;
use crate::encode::MAX_BYTES_PER_UNIT;
use crate::error::{CodingError, EncodingError, InvalidReplacement};
use crate::result::CoderResult;
use crate::surrogate;

/// What to do with malformed or unmappable input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CodingErrorAction {
    /// Stop and report the error.
    #[default]
    Report,
    /// Write the configured replacement and continue after the bad input.
    Replace,
    /// Skip the bad input and continue.
    ///
    /// The bulk entry points only distinguish `Replace` from everything else,
    /// so there `Ignore` fails like `Report`.
    Ignore,
}

/// Policy for decoding UTF-8 into UTF-16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "raw::DecoderConfig"))]
pub struct DecoderConfig {
    malformed_action: CodingErrorAction,
    unmappable_action: CodingErrorAction,
    replacement: u16,
}

impl DecoderConfig {
    /// U+FFFD REPLACEMENT CHARACTER.
    pub const DEFAULT_REPLACEMENT: u16 = 0xFFFD;

    /// Reports every error; replacement U+FFFD.
    #[inline]
    pub const fn new() -> Self {
        Self {
            malformed_action: CodingErrorAction::Report,
            unmappable_action: CodingErrorAction::Report,
            replacement: Self::DEFAULT_REPLACEMENT,
        }
    }

    /// Replaces every error with U+FFFD.
    #[inline]
    pub const fn replacing() -> Self {
        Self::new()
            .with_malformed_action(CodingErrorAction::Replace)
            .with_unmappable_action(CodingErrorAction::Replace)
    }

    /// Sets the action for malformed input.
    #[inline]
    pub const fn with_malformed_action(mut self, action: CodingErrorAction) -> Self {
        self.malformed_action = action;
        self
    }

    /// Sets the action for unmappable input.
    #[inline]
    pub const fn with_unmappable_action(mut self, action: CodingErrorAction) -> Self {
        self.unmappable_action = action;
        self
    }

    /// Sets the replacement unit. Surrogates are refused, since a lone
    /// surrogate in the output would itself be malformed UTF-16.
    pub const fn with_replacement(mut self, unit: u16) -> Result<Self, CodingError> {
        if surrogate::is_surrogate(unit) {
            return Err(CodingError::InvalidReplacement(
                InvalidReplacement::Surrogate(unit),
            ));
        }
        self.replacement = unit;
        Ok(self)
    }

    /// The action for malformed input.
    #[inline]
    pub const fn malformed_action(&self) -> CodingErrorAction {
        self.malformed_action
    }

    /// The action for unmappable input.
    #[inline]
    pub const fn unmappable_action(&self) -> CodingErrorAction {
        self.unmappable_action
    }

    /// The replacement unit.
    #[inline]
    pub const fn replacement(&self) -> u16 {
        self.replacement
    }

    /// The action that applies to `result`, or `None` for flow signals.
    #[inline]
    pub const fn action_for(&self, result: CoderResult) -> Option<CodingErrorAction> {
        action_for(self.malformed_action, self.unmappable_action, result)
    }

    pub(crate) const fn replaces(&self, result: CoderResult) -> bool {
        matches!(self.action_for(result), Some(CodingErrorAction::Replace))
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Policy for encoding UTF-16 into UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "raw::EncoderConfig"))]
pub struct EncoderConfig {
    malformed_action: CodingErrorAction,
    unmappable_action: CodingErrorAction,
    replacement: Vec<u8>,
}

impl EncoderConfig {
    /// `?`, as a one-byte replacement.
    pub const DEFAULT_REPLACEMENT: &'static [u8] = b"?";

    /// Reports every error; replacement `?`.
    pub fn new() -> Self {
        Self {
            malformed_action: CodingErrorAction::Report,
            unmappable_action: CodingErrorAction::Report,
            replacement: Self::DEFAULT_REPLACEMENT.to_vec(),
        }
    }

    /// Replaces every error with `?`.
    pub fn replacing() -> Self {
        Self::new()
            .with_malformed_action(CodingErrorAction::Replace)
            .with_unmappable_action(CodingErrorAction::Replace)
    }

    /// Sets the action for malformed input.
    #[inline]
    pub fn with_malformed_action(mut self, action: CodingErrorAction) -> Self {
        self.malformed_action = action;
        self
    }

    /// Sets the action for unmappable input.
    #[inline]
    pub fn with_unmappable_action(mut self, action: CodingErrorAction) -> Self {
        self.unmappable_action = action;
        self
    }

    /// Sets the replacement bytes.
    ///
    /// The replacement must be well-formed UTF-8 no longer than the most a
    /// single unit can encode to, so substituting it never produces more
    /// output than encoding would have.
    pub fn with_replacement(mut self, bytes: &[u8]) -> Result<Self, CodingError> {
        check_replacement(bytes)?;
        self.replacement = bytes.to_vec();
        Ok(self)
    }

    /// The action for malformed input.
    #[inline]
    pub fn malformed_action(&self) -> CodingErrorAction {
        self.malformed_action
    }

    /// The action for unmappable input.
    #[inline]
    pub fn unmappable_action(&self) -> CodingErrorAction {
        self.unmappable_action
    }

    /// The replacement bytes.
    #[inline]
    pub fn replacement(&self) -> &[u8] {
        &self.replacement
    }

    /// The action that applies to `result`, or `None` for flow signals.
    #[inline]
    pub fn action_for(&self, result: CoderResult) -> Option<CodingErrorAction> {
        action_for(self.malformed_action, self.unmappable_action, result)
    }

    pub(crate) fn replaces(&self, result: CoderResult) -> bool {
        matches!(self.action_for(result), Some(CodingErrorAction::Replace))
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

const fn action_for(
    malformed: CodingErrorAction,
    unmappable: CodingErrorAction,
    result: CoderResult,
) -> Option<CodingErrorAction> {
    match result {
        CoderResult::Malformed(_) => Some(malformed),
        CoderResult::Unmappable(_) => Some(unmappable),
        CoderResult::Underflow | CoderResult::Overflow => None,
    }
}

fn check_replacement(bytes: &[u8]) -> Result<(), CodingError> {
    let refuse = |why| Err(CodingError::InvalidReplacement(why));
    if bytes.is_empty() {
        return refuse(InvalidReplacement::Empty);
    }
    if bytes.len() > MAX_BYTES_PER_UNIT {
        return refuse(InvalidReplacement::TooLong(bytes.len()));
    }
    let mut src = SliceSource::new(bytes);
    let result = decode(&mut src, &mut Counter::new());
    match result.length() {
        Some(n) => refuse(InvalidReplacement::NotUtf8(EncodingError::new(
            src.position(),
            Some(n),
        ))),
        None if src.remaining_slice().is_empty() => Ok(()),
        None => refuse(InvalidReplacement::NotUtf8(EncodingError::new(
            src.position(),
            None,
        ))),
    }
}

#[cfg(feature = "serde")]
mod raw {
    use alloc::vec::Vec;

    use super::CodingErrorAction;
    use crate::error::CodingError;

    #[derive(serde::Deserialize)]
    pub(super) struct DecoderConfig {
        malformed_action: CodingErrorAction,
        unmappable_action: CodingErrorAction,
        replacement: u16,
    }

    #[derive(serde::Deserialize)]
    pub(super) struct EncoderConfig {
        malformed_action: CodingErrorAction,
        unmappable_action: CodingErrorAction,
        replacement: Vec<u8>,
    }

    impl TryFrom<DecoderConfig> for super::DecoderConfig {
        type Error = CodingError;

        fn try_from(raw: DecoderConfig) -> Result<Self, Self::Error> {
            Self::new()
                .with_malformed_action(raw.malformed_action)
                .with_unmappable_action(raw.unmappable_action)
                .with_replacement(raw.replacement)
        }
    }

    impl TryFrom<EncoderConfig> for super::EncoderConfig {
        type Error = CodingError;

        fn try_from(raw: EncoderConfig) -> Result<Self, Self::Error> {
            Self::new()
                .with_malformed_action(raw.malformed_action)
                .with_unmappable_action(raw.unmappable_action)
                .with_replacement(&raw.replacement)
        }
    }
}
