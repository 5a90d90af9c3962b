//! SparseTensor - the chunk store.
//!
//! A `SparseTensor<C>` has a fixed rank, a declared size per axis, and a map
//! from [`Coords`] to chunks. Coordinates that are absent hold the implicit
//! zero of whatever algebra `C` belongs to; nothing is ever materialized for
//! them.
//!
//! The tensor is deliberately not `Clone`: its chunk map may be large, so
//! duplicating it goes through [`SparseTensor::deep_clone`]. Moving a tensor
//! transfers the sizes and the map. `std::mem::take` leaves an empty rank-0
//! tensor behind.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use smallvec::SmallVec;

use crate::chunk::Chunk;
use crate::coords::{Coords, Dimension, DimensionSize};
use crate::error::TensorError;

/// A sparse tensor storing only its nonzero chunks.
///
/// # Example
///
/// ```
/// use chunktensor::{Coords, SparseTensor};
///
/// let mut t: SparseTensor<f64> = SparseTensor::new(&[3, 4]);
/// t.upsert(Coords::new(&[1, 2]), 5.0).unwrap();
/// t.upsert(Coords::new(&[1, 2]), 0.5).unwrap();
///
/// assert_eq!(t.rank(), 2);
/// assert_eq!(t.nnzchunks(), 1);
/// assert_eq!(t.get(&Coords::new(&[1, 2])), Some(&5.5));
/// assert_eq!(t.get(&Coords::new(&[0, 0])), None);
/// ```
#[derive(Debug)]
pub struct SparseTensor<C> {
    sizes: SmallVec<[DimensionSize; 8]>,
    chunks: HashMap<Coords, C>,
}

impl<C> SparseTensor<C> {
    /// Create an empty tensor with the given per-axis sizes.
    pub fn new(sizes: &[DimensionSize]) -> Self {
        Self {
            sizes: sizes.iter().copied().collect(),
            chunks: HashMap::new(),
        }
    }

    /// Create a rank-0 tensor holding a single chunk.
    pub fn scalar(chunk: C) -> Self {
        let mut chunks = HashMap::with_capacity(1);
        chunks.insert(Coords::scalar(), chunk);
        Self {
            sizes: SmallVec::new(),
            chunks,
        }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.sizes.len()
    }

    /// Declared per-axis sizes.
    #[inline]
    pub fn sizes(&self) -> &[DimensionSize] {
        &self.sizes
    }

    /// Declared size of one axis.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= self.rank()`.
    #[inline]
    pub fn size(&self, axis: Dimension) -> DimensionSize {
        self.sizes[axis]
    }

    /// Number of stored chunks.
    #[inline]
    pub fn nnzchunks(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Look up the chunk at `coords`.
    ///
    /// `None` means the value there is the implicit zero.
    ///
    /// # Panics
    ///
    /// Panics if `coords` does not have exactly `rank` components.
    pub fn get(&self, coords: &Coords) -> Option<&C> {
        self.assert_rank(coords);
        self.chunks.get(coords)
    }

    /// Mutable lookup.
    ///
    /// # Panics
    ///
    /// Panics if `coords` does not have exactly `rank` components.
    pub fn get_mut(&mut self, coords: &Coords) -> Option<&mut C> {
        self.assert_rank(coords);
        self.chunks.get_mut(coords)
    }

    /// Check whether a chunk is stored at `coords`.
    pub fn contains(&self, coords: &Coords) -> bool {
        self.get(coords).is_some()
    }

    /// Remove and return the chunk at `coords`.
    pub fn remove(&mut self, coords: &Coords) -> Option<C> {
        self.assert_rank(coords);
        self.chunks.remove(coords)
    }

    /// Iterate over stored `(coords, chunk)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&Coords, &C)> {
        self.chunks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Coords, &mut C)> {
        self.chunks.iter_mut()
    }

    /// Consume the tensor, yielding its chunks.
    pub fn into_chunks(self) -> impl Iterator<Item = (Coords, C)> {
        self.chunks.into_iter()
    }

    /// Build a tensor with the same sizes and keys, mapping every chunk.
    ///
    /// # Example
    ///
    /// ```
    /// use chunktensor::{Coords, SparseTensor};
    ///
    /// let mut t: SparseTensor<i64> = SparseTensor::new(&[2]);
    /// t.upsert(Coords::new(&[1]), 21).unwrap();
    /// let doubled = t.map_chunks(|x| x * 2);
    /// assert_eq!(doubled.get(&Coords::new(&[1])), Some(&42));
    /// ```
    pub fn map_chunks<D, F>(&self, mut f: F) -> SparseTensor<D>
    where
        F: FnMut(&C) -> D,
    {
        SparseTensor {
            sizes: self.sizes.clone(),
            chunks: self
                .chunks
                .iter()
                .map(|(coords, chunk)| (coords.clone(), f(chunk)))
                .collect(),
        }
    }

    /// Explicit deep copy of sizes and every chunk.
    pub fn deep_clone(&self) -> Self
    where
        C: Clone,
    {
        Self {
            sizes: self.sizes.clone(),
            chunks: self.chunks.clone(),
        }
    }

    fn check_rank(&self, coords: &Coords) -> Result<(), TensorError> {
        if coords.rank() != self.rank() {
            return Err(TensorError::RankMismatch {
                expected: self.rank(),
                actual: coords.rank(),
            });
        }
        Ok(())
    }

    fn assert_rank(&self, coords: &Coords) {
        assert_eq!(
            coords.rank(),
            self.rank(),
            "coordinates {} do not match tensor rank {}",
            coords,
            self.rank()
        );
    }
}

impl<C: Chunk> SparseTensor<C> {
    /// Build a tensor from `(coords, chunk)` pairs, accumulating duplicates.
    pub fn from_chunks<I>(sizes: &[DimensionSize], chunks: I) -> Result<Self, TensorError>
    where
        I: IntoIterator<Item = (Coords, C)>,
    {
        let mut tensor = Self::new(sizes);
        for (coords, chunk) in chunks {
            tensor.upsert(coords, chunk)?;
        }
        Ok(tensor)
    }

    /// Insert `chunk` at `coords`, or add it onto the chunk already there.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::RankMismatch`] if `coords` does not have
    /// exactly `rank` components. The tensor is unchanged in that case.
    pub fn upsert(&mut self, coords: Coords, chunk: C) -> Result<(), TensorError> {
        self.check_rank(&coords)?;
        self.upsert_unchecked(coords, chunk);
        Ok(())
    }

    /// Upsert for coordinates already known to have the right rank.
    pub(crate) fn upsert_unchecked(&mut self, coords: Coords, chunk: C) {
        debug_assert_eq!(coords.rank(), self.rank());
        match self.chunks.entry(coords) {
            Entry::Occupied(mut existing) => *existing.get_mut() += chunk,
            Entry::Vacant(slot) => {
                slot.insert(chunk);
            }
        }
    }

    /// Upsert every chunk of `other` into `self`.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::SizeMismatch`] if the declared sizes differ.
    pub fn accumulate(&mut self, other: SparseTensor<C>) -> Result<(), TensorError> {
        if self.sizes != other.sizes {
            return Err(TensorError::SizeMismatch {
                expected: self.sizes.to_vec(),
                actual: other.sizes.to_vec(),
            });
        }
        if self.chunks.len() < other.chunks.len() {
            // Fold the smaller map into the larger one.
            let mine = std::mem::replace(&mut self.chunks, other.chunks);
            for (coords, chunk) in mine {
                self.upsert_unchecked(coords, chunk);
            }
        } else {
            for (coords, chunk) in other.chunks {
                self.upsert_unchecked(coords, chunk);
            }
        }
        Ok(())
    }
}

impl<C> Default for SparseTensor<C> {
    fn default() -> Self {
        Self {
            sizes: SmallVec::new(),
            chunks: HashMap::new(),
        }
    }
}

impl<C: PartialEq> PartialEq for SparseTensor<C> {
    fn eq(&self, other: &Self) -> bool {
        self.sizes == other.sizes && self.chunks == other.chunks
    }
}

impl<C> std::fmt::Display for SparseTensor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SparseTensor(sizes={:?}, nnzchunks={})",
            self.sizes.as_slice(),
            self.nnzchunks()
        )
    }
}
