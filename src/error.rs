#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Unknown vertex format: {0:?}")]
    UnknownFormat(String),
    #[error("Buffer too small: need {required} bytes, have {actual}")]
    BufferTooSmall { required: usize, actual: usize },
    #[error("{len} values do not divide into items of {channels} channels")]
    ChannelCountMismatch { len: usize, channels: usize },
    #[error("No buffer supplied for vertex stream {0}")]
    MissingStream(u32),
}

/// Bounds check shared by every strided read/write.
///
/// Returns the number of bytes the access touches, counted from the start
/// of `buf`.
pub(crate) fn check_span(
    buf_len: usize,
    items: usize,
    stride: usize,
    offset: usize,
    item_size: usize,
) -> Result<usize, CodecError> {
    if items == 0 {
        return Ok(0);
    }
    let required = (items - 1)
        .checked_mul(stride)
        .and_then(|n| n.checked_add(offset))
        .and_then(|n| n.checked_add(item_size))
        .unwrap_or(usize::MAX);
    if required > buf_len {
        return Err(CodecError::BufferTooSmall {
            required,
            actual: buf_len,
        });
    }
    Ok(required)
}
