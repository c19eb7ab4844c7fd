use crate::error::CodecError;
use crate::format::FormatDescriptor;

/// One vertex attribute inside an interleaved vertex buffer.
#[derive(Debug, Clone, PartialEq, bitcode::Encode, bitcode::Decode)]
pub struct AttributeStream {
    /// Format name, e.g. `"R16G16B16A16_SNORM"`.
    pub format: String,
    /// Index of the vertex buffer holding this attribute.
    pub stream: u32,
    /// Bytes between consecutive items. Zero means tightly packed.
    pub stride: u32,
    /// Byte offset of the attribute within each item.
    pub offset: u32,
    /// Byte length of the stream region.
    pub size: u32,
    /// Per-channel dequantization scale.
    pub scale: Option<[f32; 4]>,
    /// Per-channel dequantization offset, added after scaling.
    pub translate: Option<[f32; 4]>,
}

impl AttributeStream {
    pub fn new(format: impl Into<String>, size: u32) -> Self {
        Self {
            format: format.into(),
            stream: 0,
            stride: 0,
            offset: 0,
            size,
            scale: None,
            translate: None,
        }
    }

    pub fn with_stream(mut self, stream: u32) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_stride(mut self, stride: u32, offset: u32) -> Self {
        self.stride = stride;
        self.offset = offset;
        self
    }

    pub fn with_transform(mut self, scale: [f32; 4], translate: [f32; 4]) -> Self {
        self.scale = Some(scale);
        self.translate = Some(translate);
        self
    }

    pub fn descriptor(&self) -> Result<FormatDescriptor, CodecError> {
        FormatDescriptor::resolve(&self.format)
    }

    /// The declared stride, or the tightly packed item size if none is set.
    pub fn effective_stride(&self) -> Result<usize, CodecError> {
        if self.stride > 0 {
            return Ok(self.stride as usize);
        }
        Ok(self.descriptor()?.item_size())
    }

    pub fn item_count(&self) -> Result<usize, CodecError> {
        Ok(self.size as usize / self.effective_stride()?)
    }

    /// Decode every item of the stream from `buf`.
    pub fn decode(&self, buf: &[u8]) -> Result<Vec<f32>, CodecError> {
        let fmt = self.descriptor()?;
        let items = self.item_count()?;
        let values = fmt.decode(
            buf,
            items,
            self.effective_stride()?,
            self.offset as usize,
        )?;
        log::debug!(
            "stream {} ({}): decoded {} values from {} bytes",
            self.stream,
            self.format,
            values.len(),
            buf.len(),
        );
        Ok(values)
    }

    /// Overwrite the stream's items in `buf` with `values`.
    ///
    /// Returns the number of items written.
    pub fn update(&self, buf: &mut [u8], values: &[f32]) -> Result<usize, CodecError> {
        let fmt = self.descriptor()?;
        fmt.update(buf, values, self.effective_stride()?, self.offset as usize)
    }

    /// Apply scale then translate to decoded values, in place.
    pub fn dequantize(&self, values: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        for item in values.chunks_exact_mut(channels) {
            for (c, v) in item.iter_mut().enumerate().take(4) {
                if let Some(scale) = self.scale {
                    *v *= scale[c];
                }
                if let Some(translate) = self.translate {
                    *v += translate[c];
                }
            }
        }
    }

    /// Inverse of [`Self::dequantize`]. Lanes with a zero scale are only
    /// untranslated.
    pub fn quantize(&self, values: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        for item in values.chunks_exact_mut(channels) {
            for (c, v) in item.iter_mut().enumerate().take(4) {
                if let Some(translate) = self.translate {
                    *v -= translate[c];
                }
                if let Some(scale) = self.scale {
                    if scale[c] != 0.0 {
                        *v /= scale[c];
                    }
                }
            }
        }
    }
}
