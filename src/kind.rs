//! Numeric interpretation of raw channel bits.
//!
//! The same bit pattern can be read as a plain integer or as a fraction of
//! the integer range. The only difference is the scale factor returned by
//! [`max_int_value`].

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Sint,
    Uint,
    Snorm,
    Unorm,
    Float,
}

impl NumericKind {
    /// Interpret the type token of a format name (`"SNORM"`, `"uint"`, ...).
    ///
    /// Matching is case-insensitive and by substring. Anything unrecognized
    /// is raw float passthrough.
    pub fn from_type_token(token: &str) -> Self {
        let token = token.to_ascii_lowercase();
        if token.contains("snorm") {
            Self::Snorm
        } else if token.contains("unorm") {
            Self::Unorm
        } else if token.contains("sint") {
            Self::Sint
        } else if token.contains("uint") {
            Self::Uint
        } else {
            Self::Float
        }
    }

    pub const fn type_token(self) -> &'static str {
        match self {
            Self::Sint => "SINT",
            Self::Uint => "UINT",
            Self::Snorm => "SNORM",
            Self::Unorm => "UNORM",
            Self::Float => "FLOAT",
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Sint | Self::Snorm)
    }

    pub const fn is_normalized(self) -> bool {
        matches!(self, Self::Snorm | Self::Unorm)
    }

    /// The unsigned kind with the same normalization.
    pub const fn unsigned(self) -> Self {
        match self {
            Self::Sint => Self::Uint,
            Self::Snorm => Self::Unorm,
            other => other,
        }
    }

    /// Divisor applied on decode (and multiplier on encode), if any.
    pub const fn scale(self, bits: u32) -> Option<u64> {
        match self {
            Self::Snorm => Some(max_int_value(bits, true)),
            Self::Unorm => Some(max_int_value(bits, false)),
            _ => None,
        }
    }

    /// Smallest and largest integer a field of `bits` can hold.
    pub const fn int_range(self, bits: u32) -> (i64, i64) {
        if self.is_signed() {
            (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
        } else {
            (0, field_mask(bits) as i64)
        }
    }
}

impl std::fmt::Display for NumericKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_token())
    }
}

pub const fn max_int_value(bits: u32, signed: bool) -> u64 {
    if signed {
        (1u64 << (bits - 1)) - 1
    } else {
        field_mask(bits)
    }
}

/// Mask with the low `bits` bits set. Valid for `1..=64`.
pub const fn field_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Sign-extend the low `bits` bits of `raw` to a full `i64`.
pub const fn sign_extend(raw: u64, bits: u32) -> i64 {
    let shift = 64 - bits;
    ((raw << shift) as i64) >> shift
}

/// Convert an integer sample to its float value.
#[inline]
pub fn unpack(raw: i64, bits: u32, kind: NumericKind) -> f32 {
    match kind.scale(bits) {
        Some(scale) => (raw as f64 / scale as f64) as f32,
        None => raw as f32,
    }
}

/// Convert a float back to an integer sample.
///
/// Normalized kinds are scaled and then truncated toward zero. The result
/// is not range checked; callers narrow or mask it to the field width.
#[inline]
pub fn pack(value: f32, bits: u32, kind: NumericKind) -> i64 {
    match kind.scale(bits) {
        Some(scale) => (value as f64 * scale as f64) as i64,
        None => value as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_int_values() {
        assert_eq!(max_int_value(8, true), 127);
        assert_eq!(max_int_value(8, false), 255);
        assert_eq!(max_int_value(10, true), 511);
        assert_eq!(max_int_value(16, true), 32767);
        assert_eq!(max_int_value(22, false), 0x3FFFFF);
    }

    #[test]
    fn type_token_matching() {
        assert_eq!(NumericKind::from_type_token("SNORM"), NumericKind::Snorm);
        assert_eq!(NumericKind::from_type_token("unorm"), NumericKind::Unorm);
        assert_eq!(NumericKind::from_type_token("SInt"), NumericKind::Sint);
        assert_eq!(NumericKind::from_type_token("UINT"), NumericKind::Uint);
        assert_eq!(NumericKind::from_type_token("FLOAT"), NumericKind::Float);
        assert_eq!(NumericKind::from_type_token("TYPELESS"), NumericKind::Float);
    }

    #[test]
    fn sign_extension() {
        assert_eq!(sign_extend(0x3FF, 10), -1);
        assert_eq!(sign_extend(0x200, 10), -512);
        assert_eq!(sign_extend(0x1FF, 10), 511);
        assert_eq!(sign_extend(0x3FFFFF, 22), -1);
        assert_eq!(sign_extend(0x1FFFFF, 22), 0x1FFFFF);
    }

    #[test]
    fn unpack_scaling() {
        assert_eq!(unpack(127, 8, NumericKind::Snorm), 1.0);
        assert_eq!(unpack(255, 8, NumericKind::Unorm), 1.0);
        assert_eq!(unpack(-32767, 16, NumericKind::Snorm), -1.0);
        assert_eq!(unpack(1234, 16, NumericKind::Uint), 1234.0);
        assert_eq!(unpack(-7, 16, NumericKind::Sint), -7.0);
    }

    #[test]
    fn pack_truncates() {
        assert_eq!(pack(1.0, 16, NumericKind::Snorm), 32767);
        assert_eq!(pack(-1.0, 8, NumericKind::Snorm), -127);
        // 0.5 * 255 = 127.5, truncated
        assert_eq!(pack(0.5, 8, NumericKind::Unorm), 127);
        assert_eq!(pack(42.9, 16, NumericKind::Uint), 42);
    }
}
