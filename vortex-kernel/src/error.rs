use thiserror::Error;

use crate::backend::Backend;

/// Conditions reported at the checked kernel boundary.
///
/// The numeric routines themselves never fail: zero vectors and empty
/// inputs produce `NaN` or leave the buffer untouched instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("Operand `{operand}` holds {available} elements but length {length} was requested")]
    OutOfBounds {
        operand: &'static str,
        length: usize,
        available: usize,
    },
    #[error("Backend {0} is not available on this machine")]
    Unsupported(Backend),
    #[error("Unknown kernel backend: {0}")]
    UnknownBackend(String),
}

pub type Result<T> = std::result::Result<T, KernelError>;
