//! Per-axis provenance of a contraction result.
//!
//! Every axis of a contraction's result says where its coordinate comes
//! from: a left axis, a right axis, or a [`MergeRule`] fusing one axis of
//! each operand into a single axis.

use std::collections::{HashMap, HashSet};

use crate::coords::{Dimension, DimensionSize, Index};
use crate::error::{Operand, TensorError};

/// How one result axis is derived from the operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisProvenance {
    /// Copy axis `d` of the left operand.
    FromLeft(Dimension),
    /// Copy axis `d` of the right operand.
    FromRight(Dimension),
    /// Fuse one left axis with one right axis.
    Merge(MergeRule),
}

/// Rule for fusing a left axis and a right axis into one result axis.
///
/// For a pairing with left index `l` and right index `r`:
/// - `(l, r)` in the ignore set vetoes the whole chunk pairing;
/// - `(l, r)` in the sum table lands on the mapped destination index, so
///   several pairings may accumulate into one chunk;
/// - otherwise the result index is `l * right_size + r`, where
///   `right_size` is the declared size of the right axis.
///
/// # Example
///
/// ```
/// use chunktensor::MergeRule;
///
/// let rule = MergeRule::new(0, 1)
///     .ignoring(2, 3)
///     .summing(1, 2, 9)
///     .summing(1, 5, 9);
/// assert_eq!(rule.merged_index(2, 3, 10), None);
/// assert_eq!(rule.merged_index(1, 5, 10), Some(9));
/// assert_eq!(rule.merged_index(4, 7, 10), Some(47));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRule {
    pub left_axis: Dimension,
    pub right_axis: Dimension,
    pub ignore: HashSet<(Index, Index)>,
    pub sum: HashMap<(Index, Index), Index>,
}

impl MergeRule {
    /// Merge `left_axis` and `right_axis` with no ignore or sum entries.
    pub fn new(left_axis: Dimension, right_axis: Dimension) -> Self {
        Self {
            left_axis,
            right_axis,
            ignore: HashSet::new(),
            sum: HashMap::new(),
        }
    }

    /// Veto every pairing whose merged indices are `(left, right)`.
    pub fn ignoring(mut self, left: Index, right: Index) -> Self {
        self.ignore.insert((left, right));
        self
    }

    /// Send pairings with merged indices `(left, right)` to `destination`.
    pub fn summing(mut self, left: Index, right: Index, destination: Index) -> Self {
        self.sum.insert((left, right), destination);
        self
    }

    /// Resolve the merged index for one `(left, right)` pair.
    ///
    /// Returns `None` when the pair is ignored.
    pub fn merged_index(
        &self,
        left: Index,
        right: Index,
        right_size: DimensionSize,
    ) -> Option<Index> {
        let pair = (left, right);
        if self.ignore.contains(&pair) {
            return None;
        }
        if let Some(&destination) = self.sum.get(&pair) {
            return Some(destination);
        }
        Some(left * right_size + right)
    }
}

impl From<MergeRule> for AxisProvenance {
    fn from(rule: MergeRule) -> Self {
        AxisProvenance::Merge(rule)
    }
}

impl AxisProvenance {
    /// Declared size of the result axis.
    ///
    /// A merged axis gets the full `left * right` extent; pairs dropped by
    /// the ignore set or folded by the sum table do not shrink it.
    ///
    /// # Errors
    ///
    /// [`TensorError::MergedSizeOverflow`] if a merged extent does not fit
    /// in a [`DimensionSize`]. Within that extent the default merged index
    /// `l * right_size + r` cannot overflow either.
    pub fn resolve_size(
        &self,
        left_sizes: &[DimensionSize],
        right_sizes: &[DimensionSize],
    ) -> Result<DimensionSize, TensorError> {
        match self {
            AxisProvenance::FromLeft(axis) => Ok(left_sizes[*axis]),
            AxisProvenance::FromRight(axis) => Ok(right_sizes[*axis]),
            AxisProvenance::Merge(rule) => {
                let left_size = left_sizes[rule.left_axis];
                let right_size = right_sizes[rule.right_axis];
                let Some(size) = left_size.checked_mul(right_size) else {
                    return Err(TensorError::MergedSizeOverflow {
                        left_axis: rule.left_axis,
                        right_axis: rule.right_axis,
                        left_size,
                        right_size,
                    });
                };
                Ok(size)
            }
        }
    }

    /// Result coordinate along this axis for one (left, right) chunk pairing.
    ///
    /// `None` means the pairing must be dropped.
    #[inline]
    pub fn resolve_index(
        &self,
        left_coords: &[Index],
        right_coords: &[Index],
        right_sizes: &[DimensionSize],
    ) -> Option<Index> {
        match self {
            AxisProvenance::FromLeft(axis) => Some(left_coords[*axis]),
            AxisProvenance::FromRight(axis) => Some(right_coords[*axis]),
            AxisProvenance::Merge(rule) => rule.merged_index(
                left_coords[rule.left_axis],
                right_coords[rule.right_axis],
                right_sizes[rule.right_axis],
            ),
        }
    }

    /// Check every axis reference against the operand ranks.
    pub(crate) fn check_axes(
        &self,
        left_rank: usize,
        right_rank: usize,
    ) -> Result<(), TensorError> {
        match self {
            AxisProvenance::FromLeft(axis) => check_axis(Operand::Left, *axis, left_rank),
            AxisProvenance::FromRight(axis) => check_axis(Operand::Right, *axis, right_rank),
            AxisProvenance::Merge(rule) => {
                check_axis(Operand::Left, rule.left_axis, left_rank)?;
                check_axis(Operand::Right, rule.right_axis, right_rank)
            }
        }
    }
}

pub(crate) fn check_axis(
    operand: Operand,
    axis: Dimension,
    rank: usize,
) -> Result<(), TensorError> {
    if axis >= rank {
        return Err(TensorError::AxisOutOfRange {
            operand,
            axis,
            rank,
        });
    }
    Ok(())
}
