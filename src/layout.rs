use std::fmt;

use crate::HashMap;
use crate::error::CodecError;
use crate::stream::AttributeStream;

/// Vertex attribute semantic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, bitcode::Encode, bitcode::Decode)]
pub enum Semantic {
    Position,
    Normal,
    Tangent,
    Binormal,
    TangentFrame,
    TexCoord,
    Color,
    WeightData,
}

impl Semantic {
    pub const ALL: [Semantic; 8] = [
        Self::Position,
        Self::Normal,
        Self::Tangent,
        Self::Binormal,
        Self::TangentFrame,
        Self::TexCoord,
        Self::Color,
        Self::WeightData,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "POSITION",
            Self::Normal => "NORMAL",
            Self::Tangent => "TANGENT",
            Self::Binormal => "BINORMAL",
            Self::TangentFrame => "TANGENTFRAME",
            Self::TexCoord => "TEXCOORD",
            Self::Color => "COLOR",
            Self::WeightData => "WEIGHTDATA",
        }
    }
}

/// A semantic plus its set index, e.g. `TEXCOORD1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, bitcode::Encode, bitcode::Decode)]
pub struct AttributeUsage {
    pub semantic: Semantic,
    pub index: u8,
}

impl AttributeUsage {
    pub const fn new(semantic: Semantic, index: u8) -> Self {
        Self { semantic, index }
    }

    /// Parse a scene attribute name such as `"POSITION0"` or `"texcoord1"`.
    ///
    /// A missing index means set 0.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        let split = upper
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(upper.len());
        let (head, digits) = upper.split_at(split);
        // TANGENT is a prefix of TANGENTFRAME, so compare whole heads
        let semantic = Semantic::ALL.into_iter().find(|s| s.name() == head)?;
        let index = if digits.is_empty() { 0 } else { digits.parse().ok()? };
        Some(Self { semantic, index })
    }
}

impl fmt::Display for AttributeUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.semantic.name(), self.index)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutParseError {
    #[error("Bitcode decode error: {0}")]
    Bitcode(#[from] bitcode::Error),
}

/// The attribute streams making up one mesh's vertices.
#[derive(Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct VertexLayout {
    pub n_vertices: u32,
    pub attributes: HashMap<AttributeUsage, AttributeStream>,
}

pub type DecodedAttributes = HashMap<AttributeUsage, Vec<f32>>;

impl VertexLayout {
    pub fn from_bytes(buf: &[u8]) -> Result<Self, LayoutParseError> {
        let layout = bitcode::decode(buf)?;
        Ok(layout)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    pub fn insert(&mut self, usage: AttributeUsage, stream: AttributeStream) {
        self.attributes.insert(usage, stream);
    }

    pub fn with_attribute(mut self, usage: AttributeUsage, stream: AttributeStream) -> Self {
        self.insert(usage, stream);
        self
    }

    pub fn get(&self, usage: AttributeUsage) -> Option<&AttributeStream> {
        self.attributes.get(&usage)
    }

    /// Channel count of `POSITION0`: 3 for XYZ, 4 for XYZW.
    pub fn vertex_components(&self) -> Option<usize> {
        let stream = self.get(AttributeUsage::new(Semantic::Position, 0))?;
        stream.descriptor().ok().map(|d| d.channel_count())
    }

    /// Number of bytes of stream `stream` the layout's attributes touch.
    pub fn compute_stream_buf_size(&self, stream: u32) -> Result<usize, CodecError> {
        let mut size = 0usize;
        for attr in self.attributes.values().filter(|a| a.stream == stream) {
            let fmt = attr.descriptor()?;
            let items = attr.item_count()?;
            if items > 0 {
                let end = (items - 1) * attr.effective_stride()?
                    + attr.offset as usize
                    + fmt.item_size();
                size = size.max(end);
            }
        }
        Ok(size)
    }

    /// Decode every attribute, reading each from `buffers[stream]`.
    pub fn decode_all(&self, buffers: &[&[u8]]) -> Result<DecodedAttributes, CodecError> {
        let mut out = DecodedAttributes::default();
        for (usage, attr) in self.attributes.iter() {
            let buf = buffers
                .get(attr.stream as usize)
                .ok_or(CodecError::MissingStream(attr.stream))?;
            let mut values = attr.decode(buf)?;
            if attr.scale.is_some() || attr.translate.is_some() {
                let channels = attr.descriptor()?.channel_count();
                attr.dequantize(&mut values, channels);
            }
            out.insert(*usage, values);
        }
        Ok(out)
    }
}
