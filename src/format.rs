use std::fmt;
use std::str::FromStr;

use half::f16;

use crate::FORMAT_DELIMITER;
use crate::error::{CodecError, check_span};
use crate::kind::{NumericKind, pack, unpack};
use crate::packed::PackedLayout;

/// Channel count of a per-channel layout, always between 1 and 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Channels(u8);

impl Channels {
    pub const fn new(n: u8) -> Option<Self> {
        match n {
            1..=4 => Some(Self(n)),
            _ => None,
        }
    }

    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

/// Physical layout of one item in a vertex stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// One byte per channel.
    Bits8 { channels: Channels },
    /// One halfword per channel.
    Bits16 { channels: Channels },
    /// One word per channel.
    Bits32 { channels: Channels },
    Packed(PackedLayout),
}

impl Layout {
    /// Parse the encoding token of a format name.
    ///
    /// Packed layouts match exactly. Anything else must be one to four
    /// channel letters (`R`, `G`, `B`, `A`), each followed by the same
    /// width of 8, 16 or 32 bits.
    pub fn from_encoding(token: &str) -> Option<Self> {
        if let Some(packed) = PackedLayout::from_encoding(token) {
            return Some(Self::Packed(packed));
        }
        let mut width = None;
        let mut channels = 0u8;
        let mut rest = token;
        while let Some(letter) = rest.chars().next() {
            if !matches!(letter.to_ascii_uppercase(), 'R' | 'G' | 'B' | 'A') {
                return None;
            }
            rest = &rest[1..];
            let digits = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            let bits: u32 = rest[..digits].parse().ok()?;
            if *width.get_or_insert(bits) != bits {
                return None;
            }
            rest = &rest[digits..];
            channels += 1;
            if channels > 4 {
                return None;
            }
        }
        let channels = Channels::new(channels)?;
        match width? {
            8 => Some(Self::Bits8 { channels }),
            16 => Some(Self::Bits16 { channels }),
            32 => Some(Self::Bits32 { channels }),
            _ => None,
        }
    }

    pub const fn channel_count(self) -> usize {
        match self {
            Self::Bits8 { channels }
            | Self::Bits16 { channels }
            | Self::Bits32 { channels } => channels.get(),
            Self::Packed(p) => p.channels(),
        }
    }

    /// Bit width of a single channel.
    pub const fn channel_bits(self, channel: usize) -> u32 {
        match self {
            Self::Bits8 { .. } => 8,
            Self::Bits16 { .. } => 16,
            Self::Bits32 { .. } => 32,
            Self::Packed(p) => p.fields()[channel],
        }
    }

    /// Returns the byte size of one tightly packed item.
    pub const fn item_size(self) -> usize {
        match self {
            Self::Bits8 { channels } => channels.get(),
            Self::Bits16 { channels } => channels.get() * 2,
            Self::Bits32 { channels } => channels.get() * 4,
            Self::Packed(p) => p.word_size(),
        }
    }

    pub const fn is_packed(self) -> bool {
        matches!(self, Self::Packed(_))
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Packed(p) => f.write_str(p.encoding()),
            _ => {
                let bits = self.channel_bits(0);
                for letter in ['R', 'G', 'B', 'A'].iter().take(self.channel_count()) {
                    write!(f, "{letter}{bits}")?;
                }
                Ok(())
            }
        }
    }
}

/// A resolved vertex attribute format: layout plus numeric interpretation.
///
/// Descriptors are plain values with no buffer ownership. Resolve one per
/// attribute and reuse it freely, including across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatDescriptor {
    pub layout: Layout,
    pub kind: NumericKind,
}

impl FromStr for FormatDescriptor {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.layout, FORMAT_DELIMITER, self.kind)
    }
}

impl FormatDescriptor {
    pub const fn new(layout: Layout, kind: NumericKind) -> Self {
        Self { layout, kind }
    }

    /// Resolve a format name such as `"R16G16B16A16_SNORM"`.
    ///
    /// The encoding is the text before the first delimiter, the type is the
    /// text after the last one.
    pub fn resolve(name: &str) -> Result<Self, CodecError> {
        let encoding = name.split(FORMAT_DELIMITER).next().unwrap_or(name);
        let type_token = name.rsplit(FORMAT_DELIMITER).next().unwrap_or(name);
        let layout = Layout::from_encoding(encoding)
            .ok_or_else(|| CodecError::UnknownFormat(name.to_owned()))?;
        Ok(Self {
            layout,
            kind: NumericKind::from_type_token(type_token),
        })
    }

    pub const fn channel_count(&self) -> usize {
        self.layout.channel_count()
    }

    pub const fn item_size(&self) -> usize {
        self.layout.item_size()
    }

    /// Returns the byte size of `items` tightly packed items.
    pub const fn byte_size(&self, items: usize) -> usize {
        items * self.item_size()
    }

    /// Number of whole items in a flat sequence of `len` values.
    pub const fn item_count(&self, len: usize) -> usize {
        len / self.channel_count()
    }

    /// Like [`Self::item_count`], but refuses a trailing partial item.
    pub fn checked_item_count(&self, len: usize) -> Result<usize, CodecError> {
        let channels = self.channel_count();
        if len % channels != 0 {
            return Err(CodecError::ChannelCountMismatch { len, channels });
        }
        Ok(len / channels)
    }

    fn stride_or_tight(&self, stride: usize) -> usize {
        if stride == 0 { self.item_size() } else { stride }
    }

    /// Decode `items` items into a new flat sequence.
    ///
    /// Item `i` is read at `i * stride + offset`. A `stride` of zero means
    /// tightly packed.
    pub fn decode(
        &self,
        buf: &[u8],
        items: usize,
        stride: usize,
        offset: usize,
    ) -> Result<Vec<f32>, CodecError> {
        let mut out = Vec::new();
        self.decode_into(buf, items, stride, offset, &mut out)?;
        Ok(out)
    }

    /// Decode, appending to `out`. Nothing is appended on error.
    pub fn decode_into(
        &self,
        buf: &[u8],
        items: usize,
        stride: usize,
        offset: usize,
        out: &mut Vec<f32>,
    ) -> Result<(), CodecError> {
        let stride = self.stride_or_tight(stride);
        check_span(buf.len(), items, stride, offset, self.item_size())?;
        log::debug!(
            "decode {self}: {items} items, stride {stride}, offset {offset}"
        );
        out.reserve(items * self.channel_count());
        let kind = self.kind;
        for i in 0..items {
            let start = i * stride + offset;
            let item = &buf[start..start + self.item_size()];
            match self.layout {
                Layout::Bits8 { .. } => {
                    for &b in item {
                        let raw = match kind {
                            NumericKind::Sint | NumericKind::Snorm => b as i8 as i64,
                            _ => b as i64,
                        };
                        out.push(unpack(raw, 8, kind));
                    }
                }
                Layout::Bits16 { .. } => {
                    for c in item.chunks_exact(2) {
                        let bytes = [c[0], c[1]];
                        out.push(match kind {
                            NumericKind::Float => f16::from_le_bytes(bytes).to_f32(),
                            NumericKind::Sint | NumericKind::Snorm => {
                                unpack(i16::from_le_bytes(bytes) as i64, 16, kind)
                            }
                            _ => unpack(u16::from_le_bytes(bytes) as i64, 16, kind),
                        });
                    }
                }
                Layout::Bits32 { .. } => {
                    for c in item.chunks_exact(4) {
                        let bytes = [c[0], c[1], c[2], c[3]];
                        out.push(match kind {
                            NumericKind::Sint => i32::from_le_bytes(bytes) as f32,
                            NumericKind::Uint => u32::from_le_bytes(bytes) as f32,
                            _ => f32::from_le_bytes(bytes),
                        });
                    }
                }
                Layout::Packed(p) => {
                    p.unpack_word(p.read_word(item), kind, out);
                }
            }
        }
        Ok(())
    }

    /// Re-encode a flat sequence into an existing buffer.
    ///
    /// Only the `[offset, offset + item_size)` window of each stride is
    /// written. A trailing partial item is dropped with a warning. Returns
    /// the number of items written.
    pub fn update(
        &self,
        buf: &mut [u8],
        values: &[f32],
        stride: usize,
        offset: usize,
    ) -> Result<usize, CodecError> {
        let items = self.item_count(values.len());
        let stride = self.stride_or_tight(stride);
        check_span(buf.len(), items, stride, offset, self.item_size())?;
        Ok(self.write_items(buf, values, stride, offset))
    }

    /// Encode a flat sequence into a new tightly packed buffer.
    pub fn encode(&self, values: &[f32]) -> Vec<u8> {
        let mut buf = vec![0; self.byte_size(self.item_count(values.len()))];
        self.write_items(&mut buf, values, self.item_size(), 0);
        buf
    }

    /// Write every whole item of `values`. The span must already be checked.
    fn write_items(
        &self,
        buf: &mut [u8],
        values: &[f32],
        stride: usize,
        offset: usize,
    ) -> usize {
        let channels = self.channel_count();
        let items = self.item_count(values.len());
        if items * channels != values.len() {
            log::warn!(
                "{self}: dropping {} trailing values of a partial item",
                values.len() - items * channels
            );
        }
        log::debug!(
            "encode {self}: {items} items, stride {stride}, offset {offset}"
        );
        let kind = self.kind;
        for (i, item) in values.chunks_exact(channels).enumerate() {
            let start = i * stride + offset;
            let dst = &mut buf[start..start + self.item_size()];
            match self.layout {
                Layout::Bits8 { .. } => {
                    for (d, &v) in dst.iter_mut().zip(item) {
                        *d = pack(v, 8, kind) as u8;
                    }
                }
                Layout::Bits16 { .. } => {
                    for (d, &v) in dst.chunks_exact_mut(2).zip(item) {
                        let bytes = match kind {
                            NumericKind::Float => f16::from_f32(v).to_le_bytes(),
                            _ => (pack(v, 16, kind) as u16).to_le_bytes(),
                        };
                        d.copy_from_slice(&bytes);
                    }
                }
                Layout::Bits32 { .. } => {
                    for (d, &v) in dst.chunks_exact_mut(4).zip(item) {
                        let bytes = match kind {
                            NumericKind::Sint => (v as i32).to_le_bytes(),
                            NumericKind::Uint => (v as u32).to_le_bytes(),
                            _ => v.to_le_bytes(),
                        };
                        d.copy_from_slice(&bytes);
                    }
                }
                Layout::Packed(p) => {
                    p.write_word(p.pack_word(item, kind), dst);
                }
            }
        }
        items
    }

    /// Index of the first value that does not fit its channel when encoded.
    ///
    /// Encoding never checks this itself and wraps out-of-range values into
    /// the field. Float channels and 32-bit layouts never overflow.
    pub fn find_overflow(&self, values: &[f32]) -> Option<usize> {
        let channels = self.channel_count();
        let kind = self.kind;
        let bits = match self.layout {
            Layout::Packed(p) => {
                return values
                    .chunks_exact(channels)
                    .enumerate()
                    .find_map(|(i, item)| {
                        p.field_overflow(item, kind).map(|c| i * channels + c)
                    });
            }
            Layout::Bits32 { .. } => return None,
            Layout::Bits16 { .. } if kind == NumericKind::Float => return None,
            Layout::Bits8 { .. } => 8,
            Layout::Bits16 { .. } => 16,
        };
        let kind = if kind == NumericKind::Float { NumericKind::Uint } else { kind };
        let (min, max) = kind.int_range(bits);
        let whole = self.item_count(values.len()) * channels;
        values[..whole].iter().position(|&v| {
            let v = pack(v, bits, kind);
            v < min || v > max
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_channel_counts() {
        let f = FormatDescriptor::resolve("R11G11B10_FLOAT").unwrap();
        assert_eq!(f.channel_count(), 3);
        assert_eq!(f.kind, NumericKind::Float);
        let f = FormatDescriptor::resolve("R8G8B8A8_UNORM").unwrap();
        assert_eq!(f.channel_count(), 4);
        assert_eq!(f.layout, Layout::Bits8 { channels: Channels(4) });
        let f = FormatDescriptor::resolve("R32G32B32_FLOAT").unwrap();
        assert_eq!(f.channel_count(), 3);
        assert_eq!(f.item_size(), 12);
        let f = FormatDescriptor::resolve("R16G16_SNORM").unwrap();
        assert_eq!(f.layout, Layout::Bits16 { channels: Channels(2) });
        let f = FormatDescriptor::resolve("R32_UINT").unwrap();
        assert_eq!(f.layout, Layout::Bits32 { channels: Channels(1) });
    }

    #[test]
    fn resolve_rejects_unknown() {
        for name in [
            "bogus_FORMAT",
            "R16G8_UNORM",
            "R12G12_UINT",
            "R10G10B10A10_UINT",
            "R16G16B16A16R16_UINT",
            "_UINT",
            "",
        ] {
            assert_eq!(
                FormatDescriptor::resolve(name),
                Err(CodecError::UnknownFormat(name.to_owned())),
                "{name}"
            );
        }
    }

    #[test]
    fn display_round_trips() {
        for name in [
            "R16G16B16A16_SNORM",
            "R10G10B10A2_UINT",
            "R21G21B22_SNORM",
            "R8G8_UNORM",
            "R32G32B32_FLOAT",
        ] {
            let f: FormatDescriptor = name.parse().unwrap();
            assert_eq!(f.to_string(), name);
        }
    }

    #[test]
    fn sizes() {
        let f = FormatDescriptor::resolve("R16G16B16A16_SNORM").unwrap();
        assert_eq!(f.item_size(), 8);
        assert_eq!(f.byte_size(10), 80);
        let f = FormatDescriptor::resolve("R21G21B22_SNORM").unwrap();
        assert_eq!(f.item_size(), 8);
        let f = FormatDescriptor::resolve("R11G11B10_UNORM").unwrap();
        assert_eq!(f.item_size(), 4);
    }

    #[test]
    fn decode_snorm16_interleaved() {
        let f = FormatDescriptor::resolve("R16G16_SNORM").unwrap();
        // stride 8: [pad pad | x y | pad pad pad pad]
        let mut buf = vec![0xAA; 16];
        buf[2..4].copy_from_slice(&32767i16.to_le_bytes());
        buf[4..6].copy_from_slice(&(-32767i16).to_le_bytes());
        buf[10..12].copy_from_slice(&0i16.to_le_bytes());
        buf[12..14].copy_from_slice(&16384i16.to_le_bytes());
        let v = f.decode(&buf, 2, 8, 2).unwrap();
        assert_eq!(v[0], 1.0);
        assert_eq!(v[1], -1.0);
        assert_eq!(v[2], 0.0);
        assert!((v[3] - 16384.0 / 32767.0).abs() < 1e-6);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let f = FormatDescriptor::resolve("R16G16B16A16_SNORM").unwrap();
        let buf = [0u8; 15];
        assert_eq!(
            f.decode(&buf, 2, 0, 0),
            Err(CodecError::BufferTooSmall { required: 16, actual: 15 })
        );
        // the offset counts towards the last item
        assert_eq!(
            f.decode(&[0u8; 16], 2, 8, 1),
            Err(CodecError::BufferTooSmall { required: 17, actual: 16 })
        );
        assert_eq!(f.decode(&[], 0, 0, 0), Ok(vec![]));
    }

    #[test]
    fn decode_32bit_ints_unscaled() {
        let f = FormatDescriptor::resolve("R32G32_SINT").unwrap();
        let mut buf = vec![];
        buf.extend_from_slice(&(-5i32).to_le_bytes());
        buf.extend_from_slice(&70000i32.to_le_bytes());
        assert_eq!(f.decode(&buf, 1, 0, 0).unwrap(), vec![-5.0, 70000.0]);
        // normalized 32-bit formats fall back to IEEE floats
        let f = FormatDescriptor::resolve("R32_SNORM").unwrap();
        assert_eq!(f.decode(&0.25f32.to_le_bytes(), 1, 0, 0).unwrap(), vec![0.25]);
    }

    #[test]
    fn half_float_channels() {
        let f = FormatDescriptor::resolve("R16G16_FLOAT").unwrap();
        let buf = f.encode(&[0.5, -2.0]);
        assert_eq!(buf.len(), 4);
        assert_eq!(f.decode(&buf, 1, 0, 0).unwrap(), vec![0.5, -2.0]);
    }

    #[test]
    fn update_preserves_neighbours() {
        let f = FormatDescriptor::resolve("R8G8_UINT").unwrap();
        let mut buf = vec![0xEE; 8];
        let written = f.update(&mut buf, &[1.0, 2.0, 3.0, 4.0], 4, 1).unwrap();
        assert_eq!(written, 2);
        assert_eq!(buf, vec![0xEE, 1, 2, 0xEE, 0xEE, 3, 4, 0xEE]);
    }

    #[test]
    fn partial_item_is_dropped() {
        let f = FormatDescriptor::resolve("R16G16B16_UINT").unwrap();
        let buf = f.encode(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(buf.len(), 6);
        assert_eq!(f.decode(&buf, 1, 0, 0).unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(
            f.checked_item_count(5),
            Err(CodecError::ChannelCountMismatch { len: 5, channels: 3 })
        );
        assert_eq!(f.checked_item_count(6), Ok(2));
    }

    #[test]
    fn update_rejects_short_buffer() {
        let f = FormatDescriptor::resolve("R10G10B10A2_UINT").unwrap();
        let mut buf = [0u8; 7];
        assert_eq!(
            f.update(&mut buf, &[0.0; 8], 0, 0),
            Err(CodecError::BufferTooSmall { required: 8, actual: 7 })
        );
    }

    #[test]
    fn overflow_reporting() {
        let f = FormatDescriptor::resolve("R8G8_UNORM").unwrap();
        assert_eq!(f.find_overflow(&[0.0, 1.0, 0.5, 1.5]), Some(3));
        assert_eq!(f.find_overflow(&[0.0, 1.0, 0.5, 0.25]), None);
        let f = FormatDescriptor::resolve("R10G10B10_SINT").unwrap();
        assert_eq!(f.find_overflow(&[0.0, 0.0, 0.0, 511.0, -512.0, 512.0]), Some(5));
        let f = FormatDescriptor::resolve("R32G32_FLOAT").unwrap();
        assert_eq!(f.find_overflow(&[1e30, -1e30]), None);
    }

    #[test]
    fn huge_item_count_is_rejected_before_allocating() {
        let f = FormatDescriptor::resolve("R16G16B16A16_SNORM").unwrap();
        let err = f.decode(&[0u8; 8], 1 << 40, 0, 0).unwrap_err();
        assert!(matches!(err, CodecError::BufferTooSmall { actual: 8, .. }));
        let err = f.decode(&[0u8; 8], usize::MAX, 3, 0).unwrap_err();
        assert!(matches!(err, CodecError::BufferTooSmall { actual: 8, .. }));
    }

    #[test]
    fn channel_counts_are_bounded() {
        assert_eq!(Channels::new(0), None);
        assert_eq!(Channels::new(5), None);
        assert_eq!(Channels::new(4).map(Channels::get), Some(4));
        let layout = Layout::Bits8 { channels: Channels::new(1).unwrap() };
        let f = FormatDescriptor::new(layout, NumericKind::Uint);
        assert_eq!(f.encode(&[1.0]), vec![1]);
    }

    #[test]
    fn encode_writes_whole_items_only() {
        let f = FormatDescriptor::resolve("R10G10B10A2_UNORM").unwrap();
        assert!(f.encode(&[0.5, 0.5, 0.5]).is_empty());
        let buf = f.encode(&[1.0, 0.0, 0.0, 1.0, 0.25]);
        assert_eq!(buf, (0x3FFu32 | (3 << 30)).to_le_bytes().to_vec());
    }
}
