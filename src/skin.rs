//! Packed skin weights.
//!
//! Each vertex has one entry in the weight-data stream: the low 8 bits hold
//! the influence count minus one, the rest an index into the matrix-weight
//! stream. Each matrix-weight entry packs a bone index in its high 16 bits
//! and a unorm16 weight in its low 16 bits. A vertex with a count of zero
//! is fully bound to the bone its index names, without a matrix-weight
//! lookup.
//!
//! Both streams arrive as flat float sequences (`R32_UINT` decoded), so
//! entries above 2^24 lose precision.

use crate::error::CodecError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlendVertex {
    pub indices: Vec<u32>,
    pub weights: Vec<f32>,
}

#[inline]
fn unpack_weight(packed: u32) -> f32 {
    (packed & 0xFFFF) as f32 / 65535.0
}

pub fn decode_blend_vertices(
    weight_data: &[f32],
    matrix_weights: &[f32],
    n_vertices: usize,
) -> Result<Vec<BlendVertex>, CodecError> {
    if n_vertices > weight_data.len() {
        return Err(CodecError::BufferTooSmall {
            required: n_vertices,
            actual: weight_data.len(),
        });
    }
    let mut out = Vec::with_capacity(n_vertices);
    let mut missing = 0usize;
    for &packed in &weight_data[..n_vertices] {
        let packed = packed as u32;
        let count = packed & 0xFF;
        let index = (packed >> 8) as usize;
        let mut vtx = BlendVertex::default();
        if count == 0 {
            vtx.indices.push(index as u32);
            vtx.weights.push(1.0);
        } else {
            for i in index..index + count as usize + 1 {
                match matrix_weights.get(i) {
                    Some(&entry) => {
                        let entry = entry as u32;
                        vtx.indices.push(entry >> 16);
                        vtx.weights.push(unpack_weight(entry));
                    }
                    None => {
                        missing += 1;
                        vtx.indices.push(0);
                        vtx.weights.push(0.0);
                    }
                }
            }
        }
        out.push(vtx);
    }
    if missing > 0 {
        log::warn!(
            "{missing} skin weight entries point past the matrix weight stream ({} entries)",
            matrix_weights.len()
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(bone: u32, weight: u32) -> f32 {
        ((bone << 16) | weight) as f32
    }

    #[test]
    fn single_bone_binding() {
        let weight_data = [(7 << 8) as f32];
        let v = decode_blend_vertices(&weight_data, &[], 1).unwrap();
        assert_eq!(v[0].indices, vec![7]);
        assert_eq!(v[0].weights, vec![1.0]);
    }

    #[test]
    fn multiple_influences() {
        // vertex 0: two influences starting at entry 1
        let weight_data = [((1 << 8) | 1) as f32];
        let matrix = [entry(99, 0), entry(3, 65535), entry(4, 0)];
        let v = decode_blend_vertices(&weight_data, &matrix, 1).unwrap();
        assert_eq!(v[0].indices, vec![3, 4]);
        assert_eq!(v[0].weights, vec![1.0, 0.0]);

        let matrix = [entry(5, 32768), entry(6, 32767)];
        let v = decode_blend_vertices(&[1.0], &matrix, 1).unwrap();
        assert_eq!(v[0].indices, vec![5, 6]);
        let sum: f32 = v[0].weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
    }

    #[test]
    fn out_of_range_entries_are_zeroed() {
        let weight_data = [((2 << 8) | 2) as f32];
        let matrix = [entry(0, 0), entry(0, 0), entry(8, 65535)];
        let v = decode_blend_vertices(&weight_data, &matrix, 1).unwrap();
        assert_eq!(v[0].indices, vec![8, 0, 0]);
        assert_eq!(v[0].weights, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn too_few_vertices() {
        assert_eq!(
            decode_blend_vertices(&[0.0], &[], 2),
            Err(CodecError::BufferTooSmall { required: 2, actual: 1 })
        );
    }
}
