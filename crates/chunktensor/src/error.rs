//! Error types for chunktensor.

use std::fmt;

use thiserror::Error;

use crate::coords::{Dimension, DimensionSize};

/// Which side of a contraction an axis reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Left,
    Right,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Left => write!(f, "left"),
            Operand::Right => write!(f, "right"),
        }
    }
}

/// Errors that can occur in sparse tensor operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TensorError {
    /// Coordinate tuple length does not match the tensor rank.
    #[error("wrong number of indices: expected {expected}, got {actual}")]
    RankMismatch { expected: usize, actual: usize },

    /// Per-axis sizes of two tensors differ.
    #[error("size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: Vec<DimensionSize>,
        actual: Vec<DimensionSize>,
    },

    /// Left and right join-axis lists have different lengths.
    #[error("join axis lists differ in length: left has {left}, right has {right}")]
    JoinRankMismatch { left: usize, right: usize },

    /// An axis reference is outside its operand's rank.
    #[error("axis {axis} is out of range for the {operand} operand of rank {rank}")]
    AxisOutOfRange {
        operand: Operand,
        axis: Dimension,
        rank: usize,
    },

    /// Twice the join rank exceeds the combined operand rank.
    #[error("join rank {join_rank} is too large for operands of rank {left_rank} and {right_rank}")]
    JoinRankTooLarge {
        join_rank: usize,
        left_rank: usize,
        right_rank: usize,
    },

    /// Provenance list length does not match the result rank.
    #[error("expected {expected} result axis provenances, got {actual}")]
    ProvenanceLengthMismatch { expected: usize, actual: usize },

    /// A merged axis would have more than `u64::MAX` indices.
    #[error(
        "merging left axis {left_axis} (size {left_size}) with right axis {right_axis} \
         (size {right_size}) overflows the index range"
    )]
    MergedSizeOverflow {
        left_axis: Dimension,
        right_axis: Dimension,
        left_size: DimensionSize,
        right_size: DimensionSize,
    },
}
