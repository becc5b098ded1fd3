use std::fmt;
use std::str::FromStr;

use crate::error::KernelError;

/// Execution strategy behind a [`crate::Kernel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Serial left-to-right loops. Correct, not bit-identical to the lanes.
    Scalar,
    /// 4-lane reference grouping in plain Rust.
    Portable,
    /// x86_64 SSE, 4 lanes.
    Sse,
    /// aarch64 NEON, 4 lanes.
    Neon,
    /// wasm32 `simd128`, 4 lanes.
    Simd128,
    /// x86_64 AVX2 + FMA, 8 lanes. Opt-in only.
    Avx2,
}

impl Backend {
    pub const ALL: [Backend; 6] = [
        Backend::Scalar,
        Backend::Portable,
        Backend::Sse,
        Backend::Neon,
        Backend::Simd128,
        Backend::Avx2,
    ];

    /// Best 4-lane backend this build can run.
    ///
    /// Never picks [`Backend::Avx2`]: auto-detection keeps the reference
    /// grouping so results do not depend on the host CPU.
    #[allow(unreachable_code)]
    pub fn detect() -> Backend {
        #[cfg(target_arch = "x86_64")]
        {
            return Backend::Sse;
        }
        #[cfg(target_arch = "aarch64")]
        {
            return Backend::Neon;
        }
        #[cfg(all(target_arch = "wasm32", target_feature = "simd128"))]
        {
            return Backend::Simd128;
        }

        Backend::Portable
    }

    /// Whether this backend can run on the current machine.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Scalar | Backend::Portable => true,
            Backend::Sse => cfg!(target_arch = "x86_64"),
            Backend::Neon => cfg!(target_arch = "aarch64"),
            Backend::Simd128 => cfg!(all(target_arch = "wasm32", target_feature = "simd128")),
            Backend::Avx2 => avx2_detected(),
        }
    }

    pub fn lane_width(self) -> usize {
        match self {
            Backend::Scalar => 1,
            Backend::Portable | Backend::Sse | Backend::Neon | Backend::Simd128 => 4,
            Backend::Avx2 => 8,
        }
    }

    /// True when results match the 4-lane reference grouping bit for bit.
    pub fn is_reference_exact(self) -> bool {
        self.lane_width() == 4
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Scalar => "scalar",
            Backend::Portable => "portable",
            Backend::Sse => "sse",
            Backend::Neon => "neon",
            Backend::Simd128 => "simd128",
            Backend::Avx2 => "avx2",
        }
    }
}

#[allow(unreachable_code)]
fn avx2_detected() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        return is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma");
    }

    false
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = KernelError;

    /// Parses a backend name; `auto` and `native` resolve to [`Backend::detect`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "auto" | "native" => Ok(Backend::detect()),
            "scalar" => Ok(Backend::Scalar),
            "portable" => Ok(Backend::Portable),
            "sse" => Ok(Backend::Sse),
            "neon" => Ok(Backend::Neon),
            "simd128" | "wasm" => Ok(Backend::Simd128),
            "avx2" => Ok(Backend::Avx2),
            _ => Err(KernelError::UnknownBackend(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_roundtrip() {
        for backend in Backend::ALL {
            let parsed: Backend = backend.to_string().parse().unwrap();
            assert_eq!(parsed, backend);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(" SSE ".parse::<Backend>().unwrap(), Backend::Sse);
        assert_eq!("Portable".parse::<Backend>().unwrap(), Backend::Portable);
    }

    #[test]
    fn test_auto_resolves_to_detected() {
        assert_eq!("auto".parse::<Backend>().unwrap(), Backend::detect());
        assert_eq!("native".parse::<Backend>().unwrap(), Backend::detect());
    }

    #[test]
    fn test_unknown_name() {
        let err = "avx512".parse::<Backend>().unwrap_err();
        assert_eq!(err, KernelError::UnknownBackend("avx512".to_string()));
    }

    #[test]
    fn test_detected_backend_is_available_and_exact() {
        let backend = Backend::detect();
        assert!(backend.is_available());
        assert!(backend.is_reference_exact());
        assert_ne!(backend, Backend::Avx2);
    }

    #[test]
    fn test_lane_widths() {
        assert_eq!(Backend::Scalar.lane_width(), 1);
        assert_eq!(Backend::Portable.lane_width(), crate::lanes::LANES);
        assert_eq!(Backend::Avx2.lane_width(), 8);
        assert!(!Backend::Scalar.is_reference_exact());
        assert!(!Backend::Avx2.is_reference_exact());
    }

    #[test]
    fn test_foreign_arch_backends_unavailable() {
        #[cfg(target_arch = "x86_64")]
        {
            assert!(Backend::Sse.is_available());
            assert!(!Backend::Neon.is_available());
            assert!(!Backend::Simd128.is_available());
        }
        #[cfg(target_arch = "aarch64")]
        {
            assert!(Backend::Neon.is_available());
            assert!(!Backend::Sse.is_available());
            assert!(!Backend::Avx2.is_available());
        }
    }
}
