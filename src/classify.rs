//! Pure byte and unit classification.
//!
//! Everything here is a free function of values the engines have already
//! fetched, so the same checks serve the complete-sequence path, the
//! truncated-at-end path and the bulk entry points.
//!
//! UTF-8 layout:
//!
//! | Lead byte      | Length | Second byte range        |
//! |----------------|--------|--------------------------|
//! | `00..=7F`      | 1      |                          |
//! | `C2..=DF`      | 2      | `80..=BF`                |
//! | `E0`           | 3      | `A0..=BF`                |
//! | `E1..=EF`      | 3      | `80..=BF` (`ED`: see below) |
//! | `F0`           | 4      | `90..=BF`                |
//! | `F1..=F3`      | 4      | `80..=BF`                |
//! | `F4`           | 4      | `80..=8F`                |
//!
//! `ED A0..=BF` passes the table but combines into a surrogate, which the
//! decoder rejects after combining.

/// The sequence class announced by a leading byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lead {
    /// `00..=7F`.
    Ascii,
    /// `C2..=DF`.
    Two,
    /// `E0..=EF`.
    Three,
    /// `F0..=F4`.
    Four,
    /// Continuation bytes, `C0`, `C1` and `F5..=FF`.
    Invalid,
}

impl Lead {
    /// Total sequence length for this class; 1 for invalid leaders, which
    /// are always rejected on their own.
    #[inline]
    pub const fn sequence_len(self) -> usize {
        match self {
            Self::Ascii | Self::Invalid => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }
}

/// Classifies a leading byte.
#[inline]
pub const fn lead(b1: u8) -> Lead {
    match b1 {
        0x00..=0x7F => Lead::Ascii,
        0xC2..=0xDF => Lead::Two,
        0xE0..=0xEF => Lead::Three,
        0xF0..=0xF4 => Lead::Four,
        _ => Lead::Invalid,
    }
}

/// Returns true if the byte is a UTF-8 continuation byte (10xxxxxx).
#[inline]
pub const fn is_continuation(b: u8) -> bool {
    (b & 0xC0) == 0x80
}

/// Returns true if `b2` cannot follow the 3-byte leader `b1`.
///
/// Rejects `E0 80..=9F`, the overlong forms of U+0000–U+07FF.
#[inline]
pub const fn bad_second_of_three(b1: u8, b2: u8) -> bool {
    (b1 == 0xE0 && (b2 & 0xE0) == 0x80) || !is_continuation(b2)
}

/// Returns true if `b2` cannot follow the 4-byte leader `b1`.
///
/// Rejects `F0 80..=8F` (overlong) and `F4 90..=BF` (above U+10FFFF).
#[inline]
pub const fn bad_second_of_four(b1: u8, b2: u8) -> bool {
    (b1 == 0xF0 && (b2 < 0x90 || b2 > 0xBF))
        || (b1 == 0xF4 && (b2 & 0xF0) != 0x80)
        || !is_continuation(b2)
}

/// Returns true if a complete 3-byte sequence fails its structural checks.
#[inline]
pub const fn bad_three(b1: u8, b2: u8, b3: u8) -> bool {
    bad_second_of_three(b1, b2) || !is_continuation(b3)
}

/// Returns true if a complete 4-byte sequence fails its structural checks.
#[inline]
pub const fn bad_four(b1: u8, b2: u8, b3: u8, b4: u8) -> bool {
    bad_second_of_four(b1, b2) || !is_continuation(b3) || !is_continuation(b4)
}

/// Malformed length of a 3-byte sequence that failed [`bad_three`]: the
/// number of bytes before the first one at fault.
#[inline]
pub const fn malformed_len_three(b1: u8, b2: u8) -> usize {
    if bad_second_of_three(b1, b2) { 1 } else { 2 }
}

/// Malformed length of a 4-byte sequence that failed [`bad_four`] or
/// combined outside the supplementary range.
#[inline]
pub const fn malformed_len_four(b1: u8, b2: u8, b3: u8) -> usize {
    if b1 > 0xF4 || bad_second_of_four(b1, b2) {
        1
    } else if !is_continuation(b3) {
        2
    } else {
        3
    }
}

/// Combines a checked 2-byte sequence.
#[inline]
pub const fn decode_two(b1: u8, b2: u8) -> u16 {
    (((b1 & 0x1F) as u16) << 6) | (b2 & 0x3F) as u16
}

/// Combines a checked 3-byte sequence. The result may be a surrogate.
#[inline]
pub const fn decode_three(b1: u8, b2: u8, b3: u8) -> u16 {
    (((b1 & 0x0F) as u16) << 12) | (((b2 & 0x3F) as u16) << 6) | (b3 & 0x3F) as u16
}

/// Combines a checked 4-byte sequence into a 21-bit scalar.
#[inline]
pub const fn decode_four(b1: u8, b2: u8, b3: u8, b4: u8) -> u32 {
    (((b1 & 0x07) as u32) << 18)
        | (((b2 & 0x3F) as u32) << 12)
        | (((b3 & 0x3F) as u32) << 6)
        | (b4 & 0x3F) as u32
}

/// The encoding class of a UTF-16 unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// `0000..=007F`, one byte.
    Ascii,
    /// `0080..=07FF`, two bytes.
    Two,
    /// `0800..=D7FF` and `E000..=FFFF`, three bytes.
    Three,
    /// `D800..=DBFF`, four bytes together with the following low surrogate.
    High,
    /// `DC00..=DFFF`, never valid on its own.
    Low,
}

/// Classifies a UTF-16 unit for encoding.
#[inline]
pub const fn unit(u: u16) -> Unit {
    match u {
        0x0000..=0x007F => Unit::Ascii,
        0x0080..=0x07FF => Unit::Two,
        0xD800..=0xDBFF => Unit::High,
        0xDC00..=0xDFFF => Unit::Low,
        _ => Unit::Three,
    }
}
