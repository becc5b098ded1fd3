//! Backend kernels.
//!
//! Every backend exposes the same three safe entry points over equal-length
//! slices. When the slices differ in length only the common prefix is
//! reduced; nothing is ever read past either slice.

pub(crate) mod portable;
pub(crate) mod scalar;

#[cfg(target_arch = "x86_64")]
pub(crate) mod avx2;
#[cfg(target_arch = "aarch64")]
pub(crate) mod neon;
#[cfg(all(target_arch = "wasm32", target_feature = "simd128"))]
pub(crate) mod simd128;
#[cfg(target_arch = "x86_64")]
pub(crate) mod sse;

/// Pairwise reduction: distance or similarity.
pub type PairFn = fn(&[f32], &[f32]) -> f32;

/// In-place L2 normalization.
pub type NormalizeFn = fn(&mut [f32]);

#[inline(always)]
pub(crate) fn finish_distance(sum_sq: f32) -> f32 {
    sum_sq.sqrt()
}

/// No guard: a zero vector on either side gives `0 / 0 = NaN`.
#[inline(always)]
pub(crate) fn finish_similarity(dot: f32, norm_a_sq: f32, norm_b_sq: f32) -> f32 {
    dot / (norm_a_sq.sqrt() * norm_b_sq.sqrt())
}

/// Reciprocal norm to scale by, or `None` when the norm is not strictly
/// positive (zero, empty or `NaN`) and the vector must stay untouched.
#[inline(always)]
pub(crate) fn inverse_norm(sum_sq: f32) -> Option<f32> {
    let norm = sum_sq.sqrt();
    if norm > 0.0 {
        Some(1.0 / norm)
    } else {
        None
    }
}
