//! Streaming conversion between the supported charsets.
//!
//! Every conversion pivots through UTF-16 units: input bytes are turned into
//! units and queued, then the queue is drained into the output charset. Both
//! queues keep whatever a chunk boundary cut in half until the next chunk.

use log::debug;
use thiserror::Error;
use utf8conv::surrogate;
use utf8conv::{
    CoderResult, CodingErrorAction, DecoderConfig, EncoderConfig, QueueSource, Source,
    decode_with, encode_with,
};

/// A charset the converter can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// UTF-8 without a BOM.
    Utf8,
    /// Byte order from a leading BOM on input, big-endian otherwise. Written
    /// big-endian with a BOM.
    Utf16,
    /// Little-endian UTF-16, no BOM.
    Utf16Le,
    /// Big-endian UTF-16, no BOM.
    Utf16Be,
}

impl Charset {
    /// Every supported charset, in listing order.
    pub const ALL: [Charset; 4] = [
        Charset::Utf8,
        Charset::Utf16,
        Charset::Utf16Le,
        Charset::Utf16Be,
    ];

    /// Looks up a charset by name, ignoring case, `-` and `_`.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|&c| c != '-' && c != '_')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match key.as_str() {
            "UTF8" => Some(Charset::Utf8),
            "UTF16" => Some(Charset::Utf16),
            "UTF16LE" => Some(Charset::Utf16Le),
            "UTF16BE" => Some(Charset::Utf16Be),
            _ => None,
        }
    }

    /// The canonical name, as printed by `iconv -l`.
    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Utf16 => "UTF-16",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Utf16Be => "UTF-16BE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    fn unit(self, pair: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Big => u16::from_be_bytes(pair),
            ByteOrder::Little => u16::from_le_bytes(pair),
        }
    }

    fn write(self, unit: u16, out: &mut Vec<u8>) {
        match self {
            ByteOrder::Big => out.extend_from_slice(&unit.to_be_bytes()),
            ByteOrder::Little => out.extend_from_slice(&unit.to_le_bytes()),
        }
    }
}

const BOM: u16 = 0xFEFF;

/// Why a conversion stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// Invalid input at the given byte offset.
    #[error("cannot convert: illegal input sequence at position {0}")]
    Illegal(usize),
    /// The input ended partway through a character.
    #[error("incomplete character or shift sequence at end of buffer")]
    Incomplete,
}

/// Converts a byte stream fed in arbitrary chunks.
#[derive(Debug)]
pub struct Converter {
    from: Charset,
    to: Charset,
    action: CodingErrorAction,
    decoder: DecoderConfig,
    encoder: EncoderConfig,
    bytes: QueueSource<u8>,
    units: QueueSource<u16>,
    staged: Vec<u16>,
    input_order: Option<ByteOrder>,
    bom_len: usize,
    wrote_bom: bool,
}

impl Converter {
    /// A converter from `from` to `to` that handles bad input with `action`.
    pub fn new(from: Charset, to: Charset, action: CodingErrorAction) -> Self {
        Self {
            from,
            to,
            action,
            decoder: DecoderConfig::new()
                .with_malformed_action(action)
                .with_unmappable_action(action),
            encoder: EncoderConfig::new()
                .with_malformed_action(action)
                .with_unmappable_action(action),
            bytes: QueueSource::new(),
            units: QueueSource::new(),
            staged: Vec::new(),
            input_order: None,
            bom_len: 0,
            wrote_bom: false,
        }
    }

    /// Converts as much of `input` as possible, appending to `out`. A
    /// sequence cut off at the end of `input` waits for the next call.
    pub fn feed(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), ConvertError> {
        self.bytes.extend(input);
        self.run(out, false)
    }

    /// Converts everything still pending; nothing more is coming.
    pub fn finish(&mut self, out: &mut Vec<u8>) -> Result<(), ConvertError> {
        self.run(out, true)
    }

    fn run(&mut self, out: &mut Vec<u8>, last: bool) -> Result<(), ConvertError> {
        let read = match self.from {
            Charset::Utf8 => self.read_utf8(last),
            _ => self.read_utf16(last),
        };
        // Whatever was read before a failure is still written out.
        let written = self.write(out, last);
        read.and(written)
    }

    fn write(&mut self, out: &mut Vec<u8>, last: bool) -> Result<(), ConvertError> {
        match self.to {
            Charset::Utf8 => self.write_utf8(out, last),
            Charset::Utf16 => {
                if !self.wrote_bom {
                    ByteOrder::Big.write(BOM, out);
                    self.wrote_bom = true;
                }
                self.write_utf16(ByteOrder::Big, out, last)
            }
            Charset::Utf16Be => self.write_utf16(ByteOrder::Big, out, last),
            Charset::Utf16Le => self.write_utf16(ByteOrder::Little, out, last),
        }
    }

    fn read_utf8(&mut self, last: bool) -> Result<(), ConvertError> {
        self.staged.clear();
        self.staged.reserve(self.bytes.remaining() + 1);
        loop {
            match decode_with(&self.decoder, &mut self.bytes, &mut self.staged, last) {
                CoderResult::Underflow => break,
                CoderResult::Overflow => self.staged.reserve(self.bytes.remaining() + 1),
                CoderResult::Malformed(n) | CoderResult::Unmappable(n) => {
                    // Keep what converted cleanly before reporting.
                    self.units.extend(&self.staged);
                    let position = self.bytes.position();
                    return Err(self.failure(position, n, self.bytes.remaining(), last));
                }
            }
        }
        self.units.extend(&self.staged);
        Ok(())
    }

    fn read_utf16(&mut self, last: bool) -> Result<(), ConvertError> {
        let order = match self.input_order {
            Some(order) => order,
            None => {
                if self.bytes.remaining() < 2 && !last {
                    return Ok(());
                }
                let order = self.detect_order();
                self.input_order = Some(order);
                order
            }
        };

        self.staged.clear();
        while self.bytes.remaining() >= 2 {
            self.staged.push(order.unit([self.bytes.peek(0), self.bytes.peek(1)]));
            self.bytes.advance(2);
        }
        self.units.extend(&self.staged);

        if last && self.bytes.has_remaining() {
            debug!("odd trailing byte at {}", self.bytes.position());
            match self.action {
                CodingErrorAction::Report => return Err(ConvertError::Incomplete),
                CodingErrorAction::Replace => self.units.extend(&[self.decoder.replacement()]),
                CodingErrorAction::Ignore => {}
            }
            self.bytes.advance(1);
        }
        Ok(())
    }

    fn detect_order(&mut self) -> ByteOrder {
        match self.from {
            Charset::Utf16Le => ByteOrder::Little,
            Charset::Utf16Be => ByteOrder::Big,
            _ => {
                let mark = if self.bytes.remaining() >= 2 {
                    Some([self.bytes.peek(0), self.bytes.peek(1)])
                } else {
                    None
                };
                let order = match mark {
                    Some([0xFF, 0xFE]) => ByteOrder::Little,
                    Some([0xFE, 0xFF]) => ByteOrder::Big,
                    _ => {
                        debug!("no byte order mark, assuming big-endian");
                        return ByteOrder::Big;
                    }
                };
                debug!("byte order mark selects {:?}", order);
                self.bytes.advance(2);
                self.bom_len = 2;
                order
            }
        }
    }

    fn write_utf8(&mut self, out: &mut Vec<u8>, last: bool) -> Result<(), ConvertError> {
        loop {
            match encode_with(&self.encoder, &mut self.units, out, last) {
                CoderResult::Underflow => return Ok(()),
                CoderResult::Overflow => out.reserve(self.units.remaining() * 3 + 4),
                CoderResult::Malformed(n) | CoderResult::Unmappable(n) => {
                    let position = self.unit_offset(self.units.position());
                    return Err(self.failure(position, n, self.units.remaining(), last));
                }
            }
        }
    }

    fn write_utf16(
        &mut self,
        order: ByteOrder,
        out: &mut Vec<u8>,
        last: bool,
    ) -> Result<(), ConvertError> {
        out.reserve(self.units.remaining() * 2);
        while self.units.has_remaining() {
            let unit = self.units.peek(0);
            let next = if self.units.remaining() > 1 {
                Some(self.units.peek(1))
            } else {
                None
            };
            match surrogate::parse(unit, next) {
                Ok(parsed) => {
                    for i in 0..parsed.width {
                        order.write(self.units.peek(i), out);
                    }
                    self.units.advance(parsed.width);
                }
                Err(CoderResult::Underflow) if !last => break,
                Err(_) => match self.action {
                    CodingErrorAction::Report => {
                        let position = self.unit_offset(self.units.position());
                        return Err(self.failure(position, 1, self.units.remaining(), last));
                    }
                    CodingErrorAction::Replace => {
                        order.write(self.decoder.replacement(), out);
                        self.units.advance(1);
                    }
                    CodingErrorAction::Ignore => self.units.advance(1),
                },
            }
        }
        Ok(())
    }

    /// Byte offset in the original input of a unit index, for UTF-16 input.
    /// UTF-8 input never produces an invalid unit, so the index is only ever
    /// asked for there.
    fn unit_offset(&self, index: usize) -> usize {
        self.bom_len + index * 2
    }

    fn failure(
        &self,
        position: usize,
        length: usize,
        remaining: usize,
        last: bool,
    ) -> ConvertError {
        if last && length == remaining {
            ConvertError::Incomplete
        } else {
            ConvertError::Illegal(position)
        }
    }
}
