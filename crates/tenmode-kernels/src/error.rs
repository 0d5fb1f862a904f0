//! Error types for tensor kernel operations
//!
//! Every precondition of the contraction, permutation and product wrappers is
//! reported through [`KernelError`]. All variants belong to the same broad
//! "invalid shape or argument" family; the variant and its message say which
//! check failed. Checks always run before any kernel touches the output.

use thiserror::Error;

/// Error type for tensor kernel operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// Contraction mode of zero (modes are one-based)
    #[error("{operation}: contraction mode must be greater than zero")]
    ZeroMode { operation: &'static str },

    /// Operand of rank zero
    #[error("{operation}: rank of {operand} must be greater than zero")]
    ZeroRank {
        operation: &'static str,
        operand: &'static str,
    },

    /// Contraction mode larger than the rank of the contracted tensor
    #[error("{operation}: rank {rank} must be greater than or equal to the mode {mode}")]
    ModeExceedsRank {
        operation: &'static str,
        mode: usize,
        rank: usize,
    },

    /// Operand without backing storage
    #[error("{operation}: buffer of {operand} must not be null")]
    NullBuffer {
        operation: &'static str,
        operand: &'static str,
    },

    /// Operand whose extents and strides reach outside its buffer, or do not
    /// pair up axis by axis
    #[error("{operation}: extents and strides of {operand} address elements outside its buffer")]
    OutOfBounds {
        operation: &'static str,
        operand: &'static str,
    },

    /// Operand with a zero extent
    #[error("{operation}: {operand} should not be empty")]
    EmptyOperand {
        operation: &'static str,
        operand: &'static str,
    },

    /// Free axes of the input and output tensors disagree
    #[error(
        "{operation}: extents (except of mode {mode}) of A {a:?} and C {c:?} must be equal"
    )]
    ExtentMismatch {
        operation: &'static str,
        mode: usize,
        a: Vec<usize>,
        c: Vec<usize>,
    },

    /// Contracted or replaced axis disagrees with the vector/matrix operand
    #[error("{operation}: mode-{mode} extent of {tensor} ({expected}) must equal the {operand} ({actual})")]
    OperandExtentMismatch {
        operation: &'static str,
        mode: usize,
        tensor: &'static str,
        operand: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Operand with the wrong number of axes
    #[error("{operation}: {operand} must have rank {expected}, got {actual}")]
    OperandRank {
        operation: &'static str,
        operand: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Two tensors that must share a rank do not
    #[error("{operation}: rank of both tensors must be the same, got {rank_a} and {rank_b}")]
    RankMismatch {
        operation: &'static str,
        rank_a: usize,
        rank_b: usize,
    },

    /// Two tensors that must share extents do not
    #[error("{operation}: tensor extents should be the same, got {a:?} and {b:?}")]
    ShapeMismatch {
        operation: &'static str,
        a: Vec<usize>,
        b: Vec<usize>,
    },

    /// Axis order that is not a bijection on `1..=rank`
    #[error("{operation}: {tau:?} is not a one-based permutation of rank {rank}")]
    InvalidPermutation {
        operation: &'static str,
        tau: Vec<usize>,
        rank: usize,
    },
}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

impl KernelError {
    /// Name of the operation that rejected its arguments.
    pub fn operation(&self) -> &'static str {
        match self {
            KernelError::ZeroMode { operation }
            | KernelError::ZeroRank { operation, .. }
            | KernelError::ModeExceedsRank { operation, .. }
            | KernelError::NullBuffer { operation, .. }
            | KernelError::OutOfBounds { operation, .. }
            | KernelError::EmptyOperand { operation, .. }
            | KernelError::ExtentMismatch { operation, .. }
            | KernelError::OperandExtentMismatch { operation, .. }
            | KernelError::OperandRank { operation, .. }
            | KernelError::RankMismatch { operation, .. }
            | KernelError::ShapeMismatch { operation, .. }
            | KernelError::InvalidPermutation { operation, .. } => *operation,
        }
    }
}
