//! Vortex Kernel: SIMD reductions over `f32` vectors.
//!
//! Three operations, each a single pass over caller-owned buffers:
//! Euclidean distance, cosine similarity and in-place L2 normalization.
//!
//! Lanes accumulate independently across the whole vector and are combined
//! once at the end, left to right; a scalar pass handles any tail that does
//! not fill a lane group. All 4-lane backends therefore produce identical
//! bits on every platform.
//!
//! ```rust
//! let a = [1.0f32, 0.0, 0.0, 0.0];
//! let b = [0.0f32, 1.0, 0.0, 0.0];
//!
//! let d = vortex_kernel::euclidean_distance(&a, &b, 4)?;
//! assert!((d - std::f32::consts::SQRT_2).abs() < 1e-6);
//! assert_eq!(vortex_kernel::cosine_similarity(&a, &b, 4)?, 0.0);
//!
//! let mut v = [3.0f32, 4.0, 0.0, 0.0];
//! vortex_kernel::normalize(&mut v, 4)?;
//! assert!((v[0] - 0.6).abs() < 1e-6);
//! # Ok::<(), vortex_kernel::KernelError>(())
//! ```
//!
//! Degenerate inputs are not errors: a zero vector makes cosine similarity
//! `NaN`, and normalizing a zero vector leaves it unchanged.
//!
//! The kernel keeps no mutable state. `normalize` takes `&mut [f32]`, so the
//! borrow checker already rules out concurrent readers of the buffer being
//! scaled.

pub mod backend;
pub mod error;
pub mod kernel;
pub mod lanes;

mod kernels;

pub use backend::Backend;
pub use error::{KernelError, Result};
pub use kernel::Kernel;
pub use kernels::{NormalizeFn, PairFn};
pub use lanes::{F32x4, LANES};

/// Euclidean (L2) distance over the first `length` elements of `a` and `b`.
///
/// # Errors
/// [`KernelError::OutOfBounds`] if either slice holds fewer than `length`
/// elements.
pub fn euclidean_distance(a: &[f32], b: &[f32], length: usize) -> Result<f32> {
    Kernel::global().euclidean_distance(a, b, length)
}

/// Cosine similarity over the first `length` elements of `a` and `b`.
///
/// Not clamped. `NaN` when either prefix is the zero vector.
///
/// # Errors
/// [`KernelError::OutOfBounds`] if either slice holds fewer than `length`
/// elements.
pub fn cosine_similarity(a: &[f32], b: &[f32], length: usize) -> Result<f32> {
    Kernel::global().cosine_similarity(a, b, length)
}

/// Scales the first `length` elements of `v` to unit L2 norm.
///
/// # Errors
/// [`KernelError::OutOfBounds`] if `v` holds fewer than `length` elements.
pub fn normalize(v: &mut [f32], length: usize) -> Result<()> {
    Kernel::global().normalize(v, length)
}
