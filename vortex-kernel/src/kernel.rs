use std::fmt;

use lazy_static::lazy_static;
use log::{info, warn};

use crate::backend::Backend;
use crate::error::{KernelError, Result};
use crate::kernels::{self, NormalizeFn, PairFn};

lazy_static! {
    static ref GLOBAL_KERNEL: Kernel = Kernel::detect();
}

/// Dispatch table for one backend: three function pointers, resolved once.
///
/// `Kernel` is `Copy` and holds no mutable state, so one instance can be
/// shared freely across threads.
#[derive(Clone, Copy)]
pub struct Kernel {
    backend: Backend,
    distance_fn: PairFn,
    similarity_fn: PairFn,
    normalize_fn: NormalizeFn,
}

impl Kernel {
    /// The 4-lane reference kernel, available everywhere.
    pub const PORTABLE: Kernel = Kernel {
        backend: Backend::Portable,
        distance_fn: kernels::portable::distance,
        similarity_fn: kernels::portable::similarity,
        normalize_fn: kernels::portable::normalize,
    };

    /// Resolves the kernel for `backend`.
    ///
    /// # Errors
    /// [`KernelError::Unsupported`] when the backend was not compiled in or
    /// the CPU lacks the required features.
    pub fn new(backend: Backend) -> Result<Self> {
        let table = match backend {
            Backend::Scalar => Some((
                kernels::scalar::distance as PairFn,
                kernels::scalar::similarity as PairFn,
                kernels::scalar::normalize as NormalizeFn,
            )),
            Backend::Portable => Some((
                kernels::portable::distance as PairFn,
                kernels::portable::similarity as PairFn,
                kernels::portable::normalize as NormalizeFn,
            )),
            #[cfg(target_arch = "x86_64")]
            Backend::Sse => Some((
                kernels::sse::distance as PairFn,
                kernels::sse::similarity as PairFn,
                kernels::sse::normalize as NormalizeFn,
            )),
            #[cfg(target_arch = "x86_64")]
            Backend::Avx2 if backend.is_available() => Some((
                kernels::avx2::distance as PairFn,
                kernels::avx2::similarity as PairFn,
                kernels::avx2::normalize as NormalizeFn,
            )),
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => Some((
                kernels::neon::distance as PairFn,
                kernels::neon::similarity as PairFn,
                kernels::neon::normalize as NormalizeFn,
            )),
            #[cfg(all(target_arch = "wasm32", target_feature = "simd128"))]
            Backend::Simd128 => Some((
                kernels::simd128::distance as PairFn,
                kernels::simd128::similarity as PairFn,
                kernels::simd128::normalize as NormalizeFn,
            )),
            _ => None,
        };

        match table {
            Some((distance_fn, similarity_fn, normalize_fn)) => Ok(Self {
                backend,
                distance_fn,
                similarity_fn,
                normalize_fn,
            }),
            None => {
                warn!("Vector kernel backend '{}' is not available on this machine.", backend);
                Err(KernelError::Unsupported(backend))
            }
        }
    }

    /// Kernel for [`Backend::detect`], falling back to [`Kernel::PORTABLE`].
    pub fn detect() -> Self {
        let backend = Backend::detect();
        let kernel = Self::new(backend).unwrap_or(Self::PORTABLE);
        info!(
            "Vector kernel dispatch: {} ({} lanes)",
            kernel.backend,
            kernel.backend.lane_width()
        );
        kernel
    }

    /// Process-wide kernel, detected on first use.
    pub fn global() -> &'static Kernel {
        &GLOBAL_KERNEL
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    // =========================================================================
    // Checked boundary
    // =========================================================================

    /// Euclidean distance over the first `length` elements of `a` and `b`.
    ///
    /// # Errors
    /// [`KernelError::OutOfBounds`] if either slice is shorter than `length`.
    pub fn euclidean_distance(&self, a: &[f32], b: &[f32], length: usize) -> Result<f32> {
        let a = prefix(a, length, "a")?;
        let b = prefix(b, length, "b")?;
        Ok((self.distance_fn)(a, b))
    }

    /// Cosine similarity over the first `length` elements of `a` and `b`.
    ///
    /// A zero vector on either side yields `NaN`, not an error.
    ///
    /// # Errors
    /// [`KernelError::OutOfBounds`] if either slice is shorter than `length`.
    pub fn cosine_similarity(&self, a: &[f32], b: &[f32], length: usize) -> Result<f32> {
        let a = prefix(a, length, "a")?;
        let b = prefix(b, length, "b")?;
        Ok((self.similarity_fn)(a, b))
    }

    /// Scales the first `length` elements of `v` to unit L2 norm, in place.
    ///
    /// A zero-norm prefix is left untouched. Elements past `length` are
    /// never read or written.
    ///
    /// # Errors
    /// [`KernelError::OutOfBounds`] if `v` is shorter than `length`.
    pub fn normalize(&self, v: &mut [f32], length: usize) -> Result<()> {
        let available = v.len();
        let v = v.get_mut(..length).ok_or(KernelError::OutOfBounds {
            operand: "v",
            length,
            available,
        })?;
        (self.normalize_fn)(v);
        Ok(())
    }

    // =========================================================================
    // Unchecked fast path (pre-sized slices)
    // =========================================================================

    /// Distance over two slices of equal length.
    ///
    /// Mismatched lengths are a caller bug: debug builds assert, release builds
    /// reduce the common prefix.
    #[inline]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");
        (self.distance_fn)(a, b)
    }

    /// Cosine similarity over two slices of equal length.
    #[inline]
    pub fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");
        (self.similarity_fn)(a, b)
    }

    /// Normalizes the whole slice in place.
    #[inline]
    pub fn normalize_in_place(&self, v: &mut [f32]) {
        (self.normalize_fn)(v)
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("backend", &self.backend)
            .field("lane_width", &self.backend.lane_width())
            .finish()
    }
}

impl Default for Kernel {
    fn default() -> Self {
        *Self::global()
    }
}

#[inline]
fn prefix<'a>(buf: &'a [f32], length: usize, operand: &'static str) -> Result<&'a [f32]> {
    buf.get(..length).ok_or(KernelError::OutOfBounds {
        operand,
        length,
        available: buf.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_uses_native_backend() {
        let kernel = Kernel::detect();
        assert_eq!(kernel.backend(), Backend::detect());
        assert_eq!(Kernel::global().backend(), kernel.backend());
    }

    #[test]
    fn test_every_available_backend_resolves() {
        for backend in Backend::ALL {
            match Kernel::new(backend) {
                Ok(kernel) => {
                    assert!(backend.is_available());
                    assert_eq!(kernel.backend(), backend);
                }
                Err(err) => {
                    assert!(!backend.is_available());
                    assert_eq!(err, KernelError::Unsupported(backend));
                }
            }
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_foreign_backend_rejected() {
        assert_eq!(
            Kernel::new(Backend::Neon).unwrap_err(),
            KernelError::Unsupported(Backend::Neon)
        );
    }

    #[test]
    fn test_out_of_bounds_names_operand() {
        let kernel = Kernel::PORTABLE;
        let a = [1.0f32; 8];
        let b = [1.0f32; 4];

        let err = kernel.euclidean_distance(&a, &b, 8).unwrap_err();
        assert_eq!(
            err,
            KernelError::OutOfBounds {
                operand: "b",
                length: 8,
                available: 4
            }
        );

        let err = kernel.cosine_similarity(&b, &a, 5).unwrap_err();
        assert!(matches!(err, KernelError::OutOfBounds { operand: "a", .. }));

        let mut v = [1.0f32; 3];
        let err = kernel.normalize(&mut v, 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Operand `v` holds 3 elements but length 4 was requested"
        );
        assert_eq!(v, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_length_limits_the_reduction() {
        let kernel = Kernel::PORTABLE;
        // Padding past `length` differs wildly and must be ignored.
        let a = [1.0, 2.0, 3.0, 4.0, 100.0, 100.0];
        let b = [1.0, 2.0, 3.0, 4.0, -100.0];
        assert_eq!(kernel.euclidean_distance(&a, &b, 4).unwrap(), 0.0);
    }

    #[test]
    fn test_normalize_leaves_padding_untouched() {
        let kernel = Kernel::default();
        let mut v = [3.0, 4.0, 0.0, 0.0, 9.0, 9.0];
        kernel.normalize(&mut v, 4).unwrap();
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert_eq!(&v[4..], &[9.0, 9.0]);
    }

    #[test]
    fn test_zero_length_is_not_an_error() {
        let kernel = Kernel::PORTABLE;
        assert_eq!(kernel.euclidean_distance(&[], &[], 0).unwrap(), 0.0);
        assert!(kernel.cosine_similarity(&[], &[], 0).unwrap().is_nan());
        kernel.normalize(&mut [], 0).unwrap();
    }

    #[test]
    fn test_unchecked_path_matches_checked() {
        let kernel = Kernel::global();
        let a = [0.5, -1.0, 2.0, 0.25, 3.0];
        let b = [1.5, 1.0, -2.0, 0.75, 1.0];
        assert_eq!(kernel.distance(&a, &b), kernel.euclidean_distance(&a, &b, 5).unwrap());
        assert_eq!(kernel.similarity(&a, &b), kernel.cosine_similarity(&a, &b, 5).unwrap());
    }
}
