//! Octahedral unit-vector encoding
//!
//! Maps a direction onto the unit square `[-1, 1]²` so it fits in two
//! channels. Used with the 10-10-10(-2) packed layouts to store normals
//! and tangent frames.

use glam::{Vec2, Vec3};

use crate::format::FormatDescriptor;
use crate::kind::{NumericKind, max_int_value};

/// Vectors shorter than this are left as they are instead of normalized.
const MIN_LENGTH: f32 = 1e-4;

#[inline]
fn sign_not_zero(v: f32) -> f32 {
    if v >= 0.0 { 1.0 } else { -1.0 }
}

#[inline]
fn normalize_if_long(v: Vec3) -> Vec3 {
    let len = v.length();
    if len < MIN_LENGTH { v } else { v / len }
}

/// Encode a direction to octahedral coordinates in `[-1, 1]²`.
pub fn encode(n: Vec3) -> Vec2 {
    let n = normalize_if_long(n);
    let l1 = n.x.abs() + n.y.abs() + n.z.abs();
    if l1 == 0.0 {
        return Vec2::ZERO;
    }
    let o = Vec2::new(n.x, n.y) / l1;
    if n.z < 0.0 {
        Vec2::new(
            (1.0 - o.y.abs()) * sign_not_zero(o.x),
            (1.0 - o.x.abs()) * sign_not_zero(o.y),
        )
    } else {
        o
    }
}

/// Decode octahedral coordinates back to a unit direction.
pub fn decode(o: Vec2) -> Vec3 {
    let z = 1.0 - o.x.abs() - o.y.abs();
    let t = (-z).max(0.0);
    let x = o.x - t * sign_not_zero(o.x);
    let y = o.y - t * sign_not_zero(o.y);
    normalize_if_long(Vec3::new(x, y, z))
}

/// Map a stored channel value to an octahedral coordinate in `[-1, 1]`.
fn to_signed_unit(v: f32, bits: u32, kind: NumericKind) -> f32 {
    match kind {
        NumericKind::Snorm | NumericKind::Float => v,
        NumericKind::Unorm => v * 2.0 - 1.0,
        NumericKind::Sint | NumericKind::Uint => {
            v / max_int_value(bits, false) as f32 * 2.0 - 1.0
        }
    }
}

fn from_signed_unit(v: f32, bits: u32, kind: NumericKind) -> f32 {
    match kind {
        NumericKind::Snorm | NumericKind::Float => v,
        NumericKind::Unorm => (v + 1.0) * 0.5,
        NumericKind::Sint | NumericKind::Uint => {
            ((v + 1.0) * 0.5 * max_int_value(bits, false) as f32).round()
        }
    }
}

/// Decode a flat tangent-frame sequence into flat unit normals.
///
/// The first two channels of each item hold the octahedral coordinates in
/// the descriptor's numeric kind. Remaining channels are ignored.
pub fn frames_to_normals(format: &FormatDescriptor, frames: &[f32]) -> Vec<f32> {
    let channels = format.channel_count();
    if channels < 2 {
        return vec![];
    }
    let bits = format.layout.channel_bits(0);
    let kind = format.kind;
    let mut out = Vec::with_capacity(frames.len() / channels * 3);
    for item in frames.chunks_exact(channels) {
        let o = Vec2::new(
            to_signed_unit(item[0], bits, kind),
            to_signed_unit(item[1], bits, kind),
        );
        out.extend_from_slice(&decode(o).to_array());
    }
    out
}

/// Encode flat xyz normals into a flat tangent-frame sequence for `format`.
///
/// Channels past the octahedral pair are written as zero.
pub fn normals_to_frames(format: &FormatDescriptor, normals: &[f32]) -> Vec<f32> {
    let channels = format.channel_count();
    if channels < 2 {
        return vec![];
    }
    let bits = format.layout.channel_bits(0);
    let kind = format.kind;
    let mut out = Vec::with_capacity(normals.len() / 3 * channels);
    for n in normals.chunks_exact(3) {
        let o = encode(Vec3::new(n[0], n[1], n[2]));
        out.push(from_signed_unit(o.x, bits, kind));
        out.push(from_signed_unit(o.y, bits, kind));
        out.extend(std::iter::repeat_n(0.0, channels - 2));
    }
    out
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn random_unit_vectors(count: usize) -> Vec<Vec3> {
        let mut rng = StdRng::seed_from_u64(0x0C7A);
        let mut out = Vec::with_capacity(count);
        while out.len() < count {
            let v = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if v.length() > 0.1 {
                out.push(v.normalize());
            }
        }
        out
    }

    fn angle_degrees(a: Vec3, b: Vec3) -> f32 {
        a.dot(b).clamp(-1.0, 1.0).acos().to_degrees()
    }

    #[test]
    fn axes_round_trip() {
        for v in [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z] {
            let back = decode(encode(v));
            assert!((back - v).length() < 1e-6, "{v:?} -> {back:?}");
        }
    }

    #[test]
    fn encode_stays_in_square() {
        for v in random_unit_vectors(200) {
            let o = encode(v);
            assert!(o.x.abs() <= 1.0 && o.y.abs() <= 1.0, "{v:?} -> {o:?}");
        }
    }

    #[test]
    fn lower_hemisphere_folds() {
        let o = encode(Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(o, Vec2::new(1.0, 1.0));
        let o = encode(Vec3::new(-0.5, 0.0, -0.5));
        assert!((o - Vec2::new(-1.0, 0.5)).length() < 1e-6);
        let back = decode(o);
        assert!((back - Vec3::new(-1.0, 0.0, -1.0).normalize()).length() < 1e-6);
    }

    #[test]
    fn unnormalized_input_is_normalized() {
        let back = decode(encode(Vec3::new(0.0, 3.0, 4.0)));
        assert!((back - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-5);
    }

    #[test]
    fn quantized_round_trip_within_one_degree() {
        let format = FormatDescriptor::resolve("R10G10B10A2_SNORM").unwrap();
        let vectors = random_unit_vectors(1000);
        let normals: Vec<f32> = vectors.iter().flat_map(|v| v.to_array()).collect();
        let frames = normals_to_frames(&format, &normals);
        let buf = format.encode(&frames);
        let decoded = format.decode(&buf, vectors.len(), 0, 0).unwrap();
        let back = frames_to_normals(&format, &decoded);
        for (i, v) in vectors.iter().enumerate() {
            let b = Vec3::from_slice(&back[i * 3..i * 3 + 3]);
            let deg = angle_degrees(*v, b);
            assert!(deg < 1.0, "{v:?} -> {b:?}: {deg} degrees");
        }
    }

    #[test]
    fn uint_frames_remap() {
        let format = FormatDescriptor::resolve("R10G10B10A2_UINT").unwrap();
        let frames = normals_to_frames(&format, &[0.0, 0.0, 1.0]);
        assert_eq!(frames.len(), 4);
        // the centre of the square sits halfway up the 10-bit range
        assert_eq!(frames[0], 512.0);
        assert_eq!(frames[2], 0.0);
        assert_eq!(frames[3], 0.0);
        let n = frames_to_normals(&format, &frames);
        assert!((Vec3::from_slice(&n) - Vec3::Z).length() < 0.01);
    }
}
