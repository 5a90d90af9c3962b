//! Chunk capability and the empty chunk marker.
//!
//! Any type with an in-place `+=` can be stored in a
//! [`SparseTensor`](crate::SparseTensor). Accumulation must be associative
//! and commutative: contraction visits matching pairs in hash-map order, so
//! several contributions to one coordinate land in an unspecified order.
//!
//! [`EmptyChunk`] records only which coordinates are structurally present.
//! It is what a sparsity pattern looks like with the payload stripped away.
//!
//! # Properties
//!
//! - EmptyChunk + EmptyChunk = EmptyChunk
//! - EmptyChunk * EmptyChunk = EmptyChunk
//!
//! # Example
//!
//! ```
//! use chunktensor::{Coords, EmptyChunk, SparseTensor};
//!
//! let mut pattern = SparseTensor::new(&[2, 2]);
//! pattern.upsert(Coords::new(&[0, 1]), EmptyChunk).unwrap();
//! pattern.upsert(Coords::new(&[0, 1]), EmptyChunk).unwrap();
//! assert_eq!(pattern.nnzchunks(), 1);
//! ```

use std::fmt;
use std::ops::{AddAssign, Mul};

/// A value that can live in a sparse tensor.
///
/// Blanket-implemented for every `AddAssign` type.
pub trait Chunk: AddAssign + Sized {}

impl<T: AddAssign> Chunk for T {}

/// A chunk with no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct EmptyChunk;

impl fmt::Display for EmptyChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmptyChunk")
    }
}

impl AddAssign for EmptyChunk {
    fn add_assign(&mut self, _rhs: EmptyChunk) {}
}

impl Mul for EmptyChunk {
    type Output = EmptyChunk;

    fn mul(self, _rhs: EmptyChunk) -> EmptyChunk {
        EmptyChunk
    }
}
