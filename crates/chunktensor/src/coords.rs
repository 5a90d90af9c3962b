//! Coordinate model for sparse chunk tensors.
//!
//! A [`Coords`] value identifies one chunk of a [`SparseTensor`](crate::SparseTensor):
//! one [`Index`] per axis, fixed in length for the lifetime of the tensor.

use smallvec::SmallVec;
use std::hash::{Hash, Hasher};

/// Axis identifier, in `[0, rank)`.
pub type Dimension = usize;

/// Extent of one axis.
pub type DimensionSize = u64;

/// Coordinate value along one axis.
pub type Index = DimensionSize;

/// A coordinate tuple with precomputed hash.
///
/// Uses `SmallVec<[Index; 8]>` so tensors of rank 8 or less never
/// allocate per key.
///
/// # Example
/// ```
/// use chunktensor::Coords;
///
/// let coords = Coords::new(&[4, 0, 7]);
/// assert_eq!(coords.rank(), 3);
/// assert_eq!(coords[2], 7);
/// assert_eq!(coords.project(&[2, 0]), Coords::new(&[7, 4]));
/// ```
#[derive(Clone, Debug)]
pub struct Coords {
    indices: SmallVec<[Index; 8]>,
    hash: u64,
}

impl Coords {
    /// Create coordinates from a slice of indices.
    pub fn new(indices: &[Index]) -> Self {
        Self::collect_from(indices.iter().copied())
    }

    /// The empty tuple addressing the single chunk of a rank-0 tensor.
    pub fn scalar() -> Self {
        Self::collect_from(std::iter::empty())
    }

    /// Create coordinates by collecting indices from an iterator.
    pub fn collect_from<I: IntoIterator<Item = Index>>(iter: I) -> Self {
        let indices: SmallVec<[Index; 8]> = iter.into_iter().collect();
        let hash = fnv1a(&indices);
        Self { indices, hash }
    }

    /// Number of axes addressed.
    #[inline]
    pub fn rank(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Index] {
        &self.indices
    }

    /// Keep only the components on `axes`, in the order given.
    ///
    /// # Panics
    ///
    /// Panics if any axis is `>= self.rank()`.
    pub fn project(&self, axes: &[Dimension]) -> Self {
        Self::collect_from(axes.iter().map(|&axis| self.indices[axis]))
    }
}

impl std::ops::Index<Dimension> for Coords {
    type Output = Index;

    #[inline]
    fn index(&self, axis: Dimension) -> &Self::Output {
        &self.indices[axis]
    }
}

impl PartialEq for Coords {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.indices == other.indices
    }
}

impl Eq for Coords {}

impl Hash for Coords {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialOrd for Coords {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coords {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.indices.cmp(&other.indices)
    }
}

impl std::fmt::Display for Coords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("(")?;
        if let Some((first, rest)) = self.indices.split_first() {
            write!(f, "{first}")?;
            for index in rest {
                write!(f, ", {index}")?;
            }
        }
        f.write_str(")")
    }
}

// FNV-1a over the raw index words.
fn fnv1a(indices: &[Index]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    indices.iter().fold(FNV_OFFSET, |hash, &index| {
        (hash ^ index).wrapping_mul(FNV_PRIME)
    })
}

impl<const N: usize> From<[Index; N]> for Coords {
    fn from(indices: [Index; N]) -> Self {
        Self::new(&indices)
    }
}
