//! Parallel contraction using Rayon.
//!
//! Each join key present on both sides is an independent work unit: its
//! Cartesian-product block is combined into a private partial result on a
//! worker thread. Partials are then reduced pairwise with
//! [`SparseTensor::accumulate`], so the only shared state is touched during
//! the reduction.
//!
//! Worth it when matched blocks are large or `combine` is expensive (for
//! example dense block products). For small operands the sequential
//! [`contract`](super::contract) avoids the thread-pool overhead.

use rayon::prelude::*;
use tracing::debug;

use crate::chunk::Chunk;
use crate::coords::Dimension;
use crate::error::TensorError;
use crate::tensor::SparseTensor;

use super::engine::{JoinStats, join_group};
use super::grouping::group_by_axes;
use super::plan::ContractionPlan;
use super::provenance::AxisProvenance;

/// Contract two sparse tensors, processing join-key blocks in parallel.
///
/// Same inputs, preconditions, and result as [`contract`](super::contract);
/// `combine` must be shareable across threads.
///
/// # Example
///
/// ```
/// use chunktensor::{Coords, SparseTensor, par_contract};
///
/// let a = SparseTensor::from_chunks(
///     &[4],
///     (0..4).map(|i| (Coords::new(&[i]), i as f64)),
/// )
/// .unwrap();
/// let b = a.deep_clone();
///
/// let norm2 = par_contract(&a, &b, &[0], &[0], &[], |x, y| x * y).unwrap();
/// assert_eq!(norm2.get(&Coords::scalar()), Some(&14.0));
/// ```
pub fn par_contract<L, R, C, F>(
    left: &SparseTensor<L>,
    right: &SparseTensor<R>,
    left_join: &[Dimension],
    right_join: &[Dimension],
    provenance: &[AxisProvenance],
    combine: F,
) -> Result<SparseTensor<C>, TensorError>
where
    L: Sync,
    R: Sync,
    C: Chunk + Send,
    F: Fn(&L, &R) -> C + Sync,
{
    try_par_contract(left, right, left_join, right_join, provenance, |l, r| {
        Ok(combine(l, r))
    })
}

/// Parallel counterpart of [`try_contract`](super::try_contract).
///
/// When several blocks fail, which error is returned is unspecified.
pub fn try_par_contract<L, R, C, E, F>(
    left: &SparseTensor<L>,
    right: &SparseTensor<R>,
    left_join: &[Dimension],
    right_join: &[Dimension],
    provenance: &[AxisProvenance],
    combine: F,
) -> Result<SparseTensor<C>, E>
where
    L: Sync,
    R: Sync,
    C: Chunk + Send,
    E: From<TensorError> + Send,
    F: Fn(&L, &R) -> Result<C, E> + Sync,
{
    let plan = ContractionPlan::compute(
        left.sizes(),
        right.sizes(),
        left_join,
        right_join,
        provenance,
    )?;
    let left_groups = group_by_axes(left, left_join);
    let right_groups = group_by_axes(right, right_join);

    let blocks: Vec<_> = left_groups
        .iter()
        .filter_map(|(key, left_group)| {
            right_groups
                .get(key)
                .map(|right_group| (left_group.as_slice(), right_group.as_slice()))
        })
        .collect();
    debug!(
        left_chunks = left.nnzchunks(),
        right_chunks = right.nnzchunks(),
        blocks = blocks.len(),
        result_rank = plan.result_rank,
        "contracting sparse tensors in parallel"
    );

    let sizes = plan.result_sizes.as_slice();
    let empty = || (SparseTensor::<C>::new(sizes), JoinStats::default());
    let (result, stats) = blocks
        .par_iter()
        .map(|&(left_group, right_group)| {
            let (mut partial, mut stats) = empty();
            stats.matched_keys = 1;
            join_group(
                left_group,
                right_group,
                provenance,
                right.sizes(),
                &mut partial,
                &mut |l: &L, r: &R| combine(l, r),
                &mut stats,
            )?;
            Ok::<_, E>((partial, stats))
        })
        .try_reduce(&empty, |(mut acc, acc_stats), (partial, stats)| {
            acc.accumulate(partial)?;
            Ok::<_, E>((acc, acc_stats + stats))
        })?;

    stats.report(&result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::contract;
    use crate::contract::plan::pair_provenance;
    use crate::coords::Coords;

    fn matrix(rows: u64, cols: u64) -> SparseTensor<i64> {
        SparseTensor::from_chunks(
            &[rows, cols],
            (0..rows).flat_map(|i| {
                (0..cols)
                    .filter(move |j| (i + j) % 3 != 0)
                    .map(move |j| (Coords::new(&[i, j]), (i * 7 + j) as i64))
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_par_matches_sequential() {
        let a = matrix(6, 5);
        let b = matrix(5, 4);
        let provenance = pair_provenance(2, 2, &[1], &[0]);

        let seq = contract(&a, &b, &[1], &[0], &provenance, |x, y| x * y).unwrap();
        let par = par_contract(&a, &b, &[1], &[0], &provenance, |x, y| x * y).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_par_no_matches() {
        let a = SparseTensor::from_chunks(&[3], vec![(Coords::new(&[0]), 1i64)]).unwrap();
        let b = SparseTensor::from_chunks(&[3], vec![(Coords::new(&[2]), 1i64)]).unwrap();
        let c = par_contract(&a, &b, &[0], &[0], &[], |x, y| x * y).unwrap();
        assert!(c.is_empty());
        assert_eq!(c.rank(), 0);
    }

    #[test]
    fn test_par_precondition_error() {
        let a: SparseTensor<i64> = SparseTensor::new(&[3]);
        let result = par_contract(&a, &a, &[0], &[1], &[], |x, y| x * y);
        assert!(matches!(result, Err(TensorError::AxisOutOfRange { .. })));
    }

    #[test]
    fn test_par_combine_error() {
        let a = matrix(4, 4);
        let provenance = pair_provenance(2, 2, &[1], &[0]);
        let result: Result<SparseTensor<i64>, TensorError> =
            try_par_contract(&a, &a, &[1], &[0], &provenance, |_, _| {
                Err(TensorError::JoinRankMismatch { left: 0, right: 1 })
            });
        assert_eq!(
            result.unwrap_err(),
            TensorError::JoinRankMismatch { left: 0, right: 1 }
        );
    }
}
