//! Sequential sparse hash-join contraction.

use std::ops::Add;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::chunk::Chunk;
use crate::coords::{Coords, Dimension, DimensionSize, Index};
use crate::error::TensorError;
use crate::tensor::SparseTensor;

use super::grouping::group_by_axes;
use super::plan::ContractionPlan;
use super::provenance::AxisProvenance;

/// Contract two sparse tensors.
///
/// Chunks of `left` and `right` are paired whenever their coordinates agree
/// on the join axes: `left_join[i]` of the left chunk must equal
/// `right_join[i]` of the right chunk for every `i`. Each pair is placed in
/// the result according to `provenance` (one entry per result axis) and its
/// chunk is `combine(left_chunk, right_chunk)`. Pairs landing on the same
/// result coordinate are accumulated with `+=`.
///
/// A pair vetoed by a [`MergeRule`](super::MergeRule) ignore entry is
/// dropped without calling `combine`.
///
/// # Errors
///
/// Returns the [`ContractionPlan`] validation errors before any chunk is
/// visited.
///
/// # Example
///
/// ```
/// use chunktensor::{AxisProvenance, Coords, SparseTensor, contract};
///
/// // Sparse matrix-vector product y[i] = A[i,j] x[j]
/// let a = SparseTensor::from_chunks(
///     &[2, 3],
///     vec![(Coords::new(&[0, 1]), 2.0), (Coords::new(&[1, 2]), 3.0)],
/// )
/// .unwrap();
/// let x = SparseTensor::from_chunks(&[3], vec![(Coords::new(&[1]), 10.0)]).unwrap();
///
/// let y = contract(&a, &x, &[1], &[0], &[AxisProvenance::FromLeft(0)], |a, x| a * x).unwrap();
///
/// assert_eq!(y.sizes(), &[2]);
/// assert_eq!(y.get(&Coords::new(&[0])), Some(&20.0));
/// assert_eq!(y.get(&Coords::new(&[1])), None);
/// ```
pub fn contract<L, R, C, F>(
    left: &SparseTensor<L>,
    right: &SparseTensor<R>,
    left_join: &[Dimension],
    right_join: &[Dimension],
    provenance: &[AxisProvenance],
    mut combine: F,
) -> Result<SparseTensor<C>, TensorError>
where
    C: Chunk,
    F: FnMut(&L, &R) -> C,
{
    try_contract(left, right, left_join, right_join, provenance, |l, r| {
        Ok(combine(l, r))
    })
}

/// Contract two sparse tensors with a fallible combine function.
///
/// Same as [`contract`], but the first error returned by `combine` aborts
/// the contraction and is returned unchanged. The partially built result is
/// dropped.
///
/// # Example
///
/// ```
/// use chunktensor::{Coords, SparseTensor, TensorError, try_contract};
///
/// #[derive(Debug)]
/// enum MyError {
///     Overflow,
///     Tensor(TensorError),
/// }
///
/// impl From<TensorError> for MyError {
///     fn from(e: TensorError) -> Self {
///         MyError::Tensor(e)
///     }
/// }
///
/// let a = SparseTensor::scalar(u8::MAX);
/// let b = SparseTensor::scalar(2u8);
/// let result = try_contract(&a, &b, &[], &[], &[], |x, y| {
///     x.checked_mul(*y).ok_or(MyError::Overflow)
/// });
/// assert!(matches!(result, Err(MyError::Overflow)));
/// ```
pub fn try_contract<L, R, C, E, F>(
    left: &SparseTensor<L>,
    right: &SparseTensor<R>,
    left_join: &[Dimension],
    right_join: &[Dimension],
    provenance: &[AxisProvenance],
    mut combine: F,
) -> Result<SparseTensor<C>, E>
where
    C: Chunk,
    E: From<TensorError>,
    F: FnMut(&L, &R) -> Result<C, E>,
{
    let plan = ContractionPlan::compute(
        left.sizes(),
        right.sizes(),
        left_join,
        right_join,
        provenance,
    )?;
    debug!(
        left_chunks = left.nnzchunks(),
        right_chunks = right.nnzchunks(),
        join_rank = plan.join_rank,
        result_rank = plan.result_rank,
        "contracting sparse tensors"
    );

    let left_groups = group_by_axes(left, left_join);
    let right_groups = group_by_axes(right, right_join);

    let mut result = SparseTensor::new(&plan.result_sizes);
    let mut stats = JoinStats::default();
    for (key, left_group) in &left_groups {
        let Some(right_group) = right_groups.get(key) else {
            continue;
        };
        stats.matched_keys += 1;
        join_group(
            left_group,
            right_group,
            provenance,
            right.sizes(),
            &mut result,
            &mut combine,
            &mut stats,
        )?;
    }

    stats.report(&result);
    Ok(result)
}

/// Counters for one contraction, reported at debug level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct JoinStats {
    pub matched_keys: usize,
    pub pairs: usize,
    pub vetoed: usize,
}

impl JoinStats {
    pub(crate) fn report<C>(&self, result: &SparseTensor<C>) {
        debug!(
            matched_keys = self.matched_keys,
            pairs = self.pairs,
            vetoed = self.vetoed,
            result_chunks = result.nnzchunks(),
            "contraction finished"
        );
    }
}

impl Add for JoinStats {
    type Output = JoinStats;

    fn add(self, rhs: JoinStats) -> JoinStats {
        JoinStats {
            matched_keys: self.matched_keys + rhs.matched_keys,
            pairs: self.pairs + rhs.pairs,
            vetoed: self.vetoed + rhs.vetoed,
        }
    }
}

/// Combine the Cartesian product of one matched join-key block into `result`.
pub(crate) fn join_group<L, R, C, E, F>(
    left_group: &[(&Coords, &L)],
    right_group: &[(&Coords, &R)],
    provenance: &[AxisProvenance],
    right_sizes: &[DimensionSize],
    result: &mut SparseTensor<C>,
    combine: &mut F,
    stats: &mut JoinStats,
) -> Result<(), E>
where
    C: Chunk,
    F: FnMut(&L, &R) -> Result<C, E>,
{
    for &(left_coords, left_chunk) in left_group {
        for &(right_coords, right_chunk) in right_group {
            stats.pairs += 1;
            let Some(coords) = resolve_coords(provenance, left_coords, right_coords, right_sizes)
            else {
                stats.vetoed += 1;
                trace!(left = %left_coords, right = %right_coords, "pairing vetoed by merge rule");
                continue;
            };
            let chunk = combine(left_chunk, right_chunk)?;
            result.upsert_unchecked(coords, chunk);
        }
    }
    Ok(())
}

/// Result coordinates of one pairing, or `None` if any axis vetoes it.
fn resolve_coords(
    provenance: &[AxisProvenance],
    left: &Coords,
    right: &Coords,
    right_sizes: &[DimensionSize],
) -> Option<Coords> {
    let indices = provenance
        .iter()
        .map(|axis| axis.resolve_index(left.as_slice(), right.as_slice(), right_sizes))
        .collect::<Option<SmallVec<[Index; 8]>>>()?;
    Some(Coords::collect_from(indices))
}
