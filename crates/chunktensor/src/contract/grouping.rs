//! Join-key grouping: the build phase of the sparse hash join.

use std::collections::HashMap;

use crate::coords::{Coords, Dimension};
use crate::tensor::SparseTensor;

/// Chunks of one operand bucketed by their projection onto the join axes.
pub type JoinGroups<'a, C> = HashMap<Coords, Vec<(&'a Coords, &'a C)>>;

/// Group every stored chunk of `tensor` by its coordinates on `axes`.
///
/// Chunks that agree on all of `axes` share a key; the key order follows
/// `axes`, so the i-th component of a left key lines up with the i-th
/// component of a right key built from the paired axis list.
///
/// # Panics
///
/// Panics if any axis is `>= tensor.rank()`.
///
/// # Example
///
/// ```
/// use chunktensor::{Coords, SparseTensor, group_by_axes};
///
/// let t = SparseTensor::from_chunks(
///     &[3, 3],
///     vec![
///         (Coords::new(&[0, 1]), 1),
///         (Coords::new(&[2, 1]), 2),
///         (Coords::new(&[2, 0]), 3),
///     ],
/// )
/// .unwrap();
///
/// let groups = group_by_axes(&t, &[1]);
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[&Coords::new(&[1])].len(), 2);
/// ```
pub fn group_by_axes<'a, C>(tensor: &'a SparseTensor<C>, axes: &[Dimension]) -> JoinGroups<'a, C> {
    let mut groups: JoinGroups<'a, C> = HashMap::new();
    for (coords, chunk) in tensor.iter() {
        groups
            .entry(coords.project(axes))
            .or_default()
            .push((coords, chunk));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SparseTensor<i32> {
        SparseTensor::from_chunks(
            &[2, 3, 4],
            vec![
                (Coords::new(&[0, 1, 2]), 1),
                (Coords::new(&[1, 1, 2]), 2),
                (Coords::new(&[1, 2, 2]), 3),
                (Coords::new(&[0, 1, 3]), 4),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_group_by_two_axes() {
        let t = sample();
        let groups = group_by_axes(&t, &[1, 2]);
        assert_eq!(groups.len(), 3);

        let mut shared: Vec<i32> = groups[&Coords::new(&[1, 2])]
            .iter()
            .map(|&(_, chunk)| *chunk)
            .collect();
        shared.sort();
        assert_eq!(shared, vec![1, 2]);
    }

    #[test]
    fn test_group_key_follows_axis_order() {
        let t = sample();
        let groups = group_by_axes(&t, &[2, 0]);
        assert!(groups.contains_key(&Coords::new(&[3, 0])));
        assert!(!groups.contains_key(&Coords::new(&[0, 3])));
    }

    #[test]
    fn test_group_by_no_axes_is_single_group() {
        let t = sample();
        let groups = group_by_axes(&t, &[]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&Coords::scalar()].len(), 4);
    }

    #[test]
    fn test_group_empty_tensor() {
        let t: SparseTensor<i32> = SparseTensor::new(&[2]);
        assert!(group_by_axes(&t, &[0]).is_empty());
    }
}
