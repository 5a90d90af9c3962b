//! Contraction planning: precondition checks and result sizes.
//!
//! A [`ContractionPlan`] is computed once per contraction call, before any
//! chunk is touched. Building it is where every contract violation
//! surfaces, so an invalid call fails without doing work.

use crate::coords::{Dimension, DimensionSize};
use crate::error::{Operand, TensorError};

use super::provenance::{AxisProvenance, check_axis};

/// Validated shape information for one contraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractionPlan {
    /// Number of paired join axes.
    pub join_rank: usize,

    /// Rank of the result: `left_rank + right_rank - 2 * join_rank`.
    pub result_rank: usize,

    /// Declared sizes of the result axes, one per provenance entry.
    pub result_sizes: Vec<DimensionSize>,
}

impl ContractionPlan {
    /// Validate a contraction request and compute the result sizes.
    ///
    /// # Errors
    ///
    /// - [`TensorError::JoinRankMismatch`] if the join-axis lists differ in length
    /// - [`TensorError::AxisOutOfRange`] if a join axis or provenance entry
    ///   references an axis outside its operand
    /// - [`TensorError::JoinRankTooLarge`] if `2 * join_rank` exceeds the
    ///   combined operand rank
    /// - [`TensorError::ProvenanceLengthMismatch`] if the provenance list
    ///   does not have one entry per result axis
    /// - [`TensorError::MergedSizeOverflow`] if a merged axis extent does not
    ///   fit in a `u64`
    ///
    /// # Example
    ///
    /// ```
    /// use chunktensor::{AxisProvenance, ContractionPlan};
    ///
    /// // Matrix product: C[i,k] = A[i,j] * B[j,k]
    /// let plan = ContractionPlan::compute(
    ///     &[2, 3], &[3, 4],
    ///     &[1], &[0],
    ///     &[AxisProvenance::FromLeft(0), AxisProvenance::FromRight(1)],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(plan.join_rank, 1);
    /// assert_eq!(plan.result_sizes, vec![2, 4]);
    /// ```
    pub fn compute(
        left_sizes: &[DimensionSize],
        right_sizes: &[DimensionSize],
        left_join: &[Dimension],
        right_join: &[Dimension],
        provenance: &[AxisProvenance],
    ) -> Result<Self, TensorError> {
        let left_rank = left_sizes.len();
        let right_rank = right_sizes.len();

        if left_join.len() != right_join.len() {
            return Err(TensorError::JoinRankMismatch {
                left: left_join.len(),
                right: right_join.len(),
            });
        }
        let join_rank = left_join.len();

        for &axis in left_join {
            check_axis(Operand::Left, axis, left_rank)?;
        }
        for &axis in right_join {
            check_axis(Operand::Right, axis, right_rank)?;
        }

        let Some(result_rank) = (left_rank + right_rank).checked_sub(2 * join_rank) else {
            return Err(TensorError::JoinRankTooLarge {
                join_rank,
                left_rank,
                right_rank,
            });
        };

        if provenance.len() != result_rank {
            return Err(TensorError::ProvenanceLengthMismatch {
                expected: result_rank,
                actual: provenance.len(),
            });
        }
        for entry in provenance {
            entry.check_axes(left_rank, right_rank)?;
        }

        let result_sizes = provenance
            .iter()
            .map(|entry| entry.resolve_size(left_sizes, right_sizes))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            join_rank,
            result_rank,
            result_sizes,
        })
    }
}

/// Conventional provenance for a plain contraction.
///
/// Keeps every non-join left axis in order, then every non-join right axis
/// in order, the same layout as a matrix product `A[i,j] * B[j,k] -> C[i,k]`.
///
/// # Example
///
/// ```
/// use chunktensor::{AxisProvenance, pair_provenance};
///
/// let provenance = pair_provenance(3, 2, &[1], &[0]);
/// assert_eq!(
///     provenance,
///     vec![
///         AxisProvenance::FromLeft(0),
///         AxisProvenance::FromLeft(2),
///         AxisProvenance::FromRight(1),
///     ]
/// );
/// ```
pub fn pair_provenance(
    left_rank: usize,
    right_rank: usize,
    left_join: &[Dimension],
    right_join: &[Dimension],
) -> Vec<AxisProvenance> {
    let free_left = (0..left_rank)
        .filter(|axis| !left_join.contains(axis))
        .map(AxisProvenance::FromLeft);
    let free_right = (0..right_rank)
        .filter(|axis| !right_join.contains(axis))
        .map(AxisProvenance::FromRight);
    free_left.chain(free_right).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::provenance::MergeRule;

    #[test]
    fn test_plan_scalar() {
        let plan = ContractionPlan::compute(&[], &[], &[], &[], &[]).unwrap();
        assert_eq!(plan.join_rank, 0);
        assert_eq!(plan.result_rank, 0);
        assert!(plan.result_sizes.is_empty());
    }

    #[test]
    fn test_plan_with_merge_axis() {
        let provenance = vec![
            AxisProvenance::FromLeft(0),
            AxisProvenance::from(MergeRule::new(1, 1)),
            AxisProvenance::FromRight(1),
        ];
        let plan = ContractionPlan::compute(&[2, 3, 4], &[4, 5], &[2], &[0], &provenance).unwrap();
        assert_eq!(plan.result_rank, 3);
        assert_eq!(plan.result_sizes, vec![2, 15, 5]);
    }

    #[test]
    fn test_plan_join_rank_mismatch() {
        let err = ContractionPlan::compute(&[2], &[2], &[0], &[], &[]).unwrap_err();
        assert_eq!(err, TensorError::JoinRankMismatch { left: 1, right: 0 });
    }

    #[test]
    fn test_plan_join_axis_out_of_range() {
        let err = ContractionPlan::compute(&[2], &[2, 2], &[0], &[2], &[]).unwrap_err();
        assert_eq!(
            err,
            TensorError::AxisOutOfRange {
                operand: Operand::Right,
                axis: 2,
                rank: 2
            }
        );
    }

    #[test]
    fn test_plan_provenance_length_mismatch() {
        let err = ContractionPlan::compute(
            &[2, 3],
            &[3],
            &[1],
            &[0],
            &[AxisProvenance::FromLeft(0), AxisProvenance::FromLeft(1)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            TensorError::ProvenanceLengthMismatch {
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn test_plan_provenance_axis_out_of_range() {
        let provenance = [AxisProvenance::FromLeft(0), AxisProvenance::FromRight(1)];
        let result = ContractionPlan::compute(&[2], &[3], &[], &[], &provenance);
        assert_eq!(
            result,
            Err(TensorError::AxisOutOfRange {
                operand: Operand::Right,
                axis: 1,
                rank: 1
            })
        );
    }

    #[test]
    fn test_plan_join_rank_too_large() {
        let result = ContractionPlan::compute(&[2], &[2], &[0, 0], &[0, 0], &[]);
        assert_eq!(
            result,
            Err(TensorError::JoinRankTooLarge {
                join_rank: 2,
                left_rank: 1,
                right_rank: 1
            })
        );
    }

    #[test]
    fn test_plan_merged_size_overflow() {
        let huge = 1 << 33;
        let provenance = [
            AxisProvenance::from(MergeRule::new(0, 0)),
            AxisProvenance::FromLeft(0),
        ];
        let result = ContractionPlan::compute(&[huge], &[huge], &[], &[], &provenance);
        assert_eq!(
            result,
            Err(TensorError::MergedSizeOverflow {
                left_axis: 0,
                right_axis: 0,
                left_size: huge,
                right_size: huge
            })
        );
    }

    #[test]
    fn test_pair_provenance_full_contraction() {
        assert!(pair_provenance(2, 2, &[0, 1], &[1, 0]).is_empty());
    }
}
