//! Multi-field packed words.
//!
//! Each layout stores one item in a single little-endian word, with one
//! contiguous bit field per channel assigned from the least significant bit
//! upwards. Bits above the last field are always written as zero.

use crate::kind::{NumericKind, field_mask, pack, sign_extend, unpack};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackedLayout {
    R10G10B10A2,
    R10G10B10,
    R11G11B10,
    R21G21B22,
}

impl PackedLayout {
    pub const ALL: [PackedLayout; 4] = [
        Self::R10G10B10A2,
        Self::R10G10B10,
        Self::R11G11B10,
        Self::R21G21B22,
    ];

    pub fn from_encoding(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.encoding() == token)
    }

    pub const fn encoding(self) -> &'static str {
        match self {
            Self::R10G10B10A2 => "R10G10B10A2",
            Self::R10G10B10 => "R10G10B10",
            Self::R11G11B10 => "R11G11B10",
            Self::R21G21B22 => "R21G21B22",
        }
    }

    /// Field widths in bits, least significant first.
    pub const fn fields(self) -> &'static [u32] {
        match self {
            Self::R10G10B10A2 => &[10, 10, 10, 2],
            Self::R10G10B10 => &[10, 10, 10],
            Self::R11G11B10 => &[11, 11, 10],
            Self::R21G21B22 => &[21, 21, 22],
        }
    }

    pub const fn channels(self) -> usize {
        self.fields().len()
    }

    /// Returns the byte size of one packed word.
    pub const fn word_size(self) -> usize {
        match self {
            Self::R21G21B22 => 8,
            _ => 4,
        }
    }

    /// Kind used for a single channel.
    ///
    /// The 2-bit alpha of 10-10-10-2 is unsigned whatever the format says.
    pub const fn field_kind(self, channel: usize, kind: NumericKind) -> NumericKind {
        match (self, channel) {
            (Self::R10G10B10A2, 3) => kind.unsigned(),
            _ => kind,
        }
    }

    pub fn read_word(self, bytes: &[u8]) -> u64 {
        match self.word_size() {
            8 => u64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6],
                bytes[7],
            ]),
            _ => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as u64,
        }
    }

    pub fn write_word(self, word: u64, bytes: &mut [u8]) {
        match self.word_size() {
            8 => bytes[..8].copy_from_slice(&word.to_le_bytes()),
            _ => bytes[..4].copy_from_slice(&(word as u32).to_le_bytes()),
        }
    }

    /// Split a word into its raw integer fields.
    ///
    /// Signed kinds are sign-extended from each field's own width.
    pub fn split(self, word: u64, kind: NumericKind) -> impl Iterator<Item = i64> {
        let mut shift = 0;
        self.fields().iter().enumerate().map(move |(channel, &bits)| {
            let raw = (word >> shift) & field_mask(bits);
            shift += bits;
            if self.field_kind(channel, kind).is_signed() {
                sign_extend(raw, bits)
            } else {
                raw as i64
            }
        })
    }

    /// Assemble raw integer fields into a word, masking each to its width.
    pub fn join(self, raw: impl IntoIterator<Item = i64>) -> u64 {
        let mut word = 0u64;
        let mut shift = 0;
        for (&bits, value) in self.fields().iter().zip(raw) {
            word |= (value as u64 & field_mask(bits)) << shift;
            shift += bits;
        }
        word
    }

    pub fn unpack_word(self, word: u64, kind: NumericKind, out: &mut Vec<f32>) {
        let fields = self.fields();
        for (channel, raw) in self.split(word, kind).enumerate() {
            out.push(unpack(raw, fields[channel], self.field_kind(channel, kind)));
        }
    }

    /// Pack one item. `values` must hold at least [`Self::channels`] floats.
    pub fn pack_word(self, values: &[f32], kind: NumericKind) -> u64 {
        let fields = self.fields();
        self.join((0..fields.len()).map(|channel| {
            pack(values[channel], fields[channel], self.field_kind(channel, kind))
        }))
    }

    /// First channel of one item whose packed integer does not fit its field.
    pub fn field_overflow(self, values: &[f32], kind: NumericKind) -> Option<usize> {
        let fields = self.fields();
        (0..fields.len()).find(|&channel| {
            let kind = self.field_kind(channel, kind);
            let bits = fields[channel];
            let (min, max) = kind.int_range(bits);
            let v = pack(values[channel], bits, kind);
            v < min || v > max
        })
    }
}
