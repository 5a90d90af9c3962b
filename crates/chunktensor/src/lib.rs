//! chunktensor - sparse chunked tensors with a generalized contraction.
//!
//! A [`SparseTensor`] stores only the nonzero chunks of an N-dimensional
//! array, keyed by coordinate tuples. The chunk type is arbitrary: a
//! number, a dense block, or [`EmptyChunk`] for a bare sparsity pattern.
//! The only requirement is an associative, commutative `+=`.
//!
//! # Architecture
//!
//! ```text
//! coords    → Coords, Dimension, DimensionSize, Index
//! tensor    → SparseTensor (chunk store, move-only)
//! contract  → AxisProvenance / MergeRule   (per-axis result rules)
//!           → group_by_axes                (hash-join build phase)
//!           → contract, par_contract       (hash-join probe + accumulate)
//! ```
//!
//! # Example
//!
//! ```
//! use chunktensor::{AxisProvenance, Coords, MergeRule, SparseTensor, contract};
//!
//! let left = SparseTensor::from_chunks(
//!     &[3],
//!     vec![(Coords::new(&[1]), 5), (Coords::new(&[2]), 6)],
//! )
//! .unwrap();
//! let right = SparseTensor::from_chunks(&[4], vec![(Coords::new(&[3]), 7)]).unwrap();
//!
//! // Fuse the two axes into one of size 3 * 4, skipping the (2, 3) pairing,
//! // and keep the right axis alongside it.
//! let provenance = [
//!     AxisProvenance::from(MergeRule::new(0, 0).ignoring(2, 3)),
//!     AxisProvenance::FromRight(0),
//! ];
//! let result = contract(&left, &right, &[], &[], &provenance, |l, r| l * r).unwrap();
//!
//! assert_eq!(result.sizes(), &[12, 4]);
//! // (1, 3) lands on 1 * 4 + 3 = 7
//! assert_eq!(result.get(&Coords::new(&[7, 3])), Some(&35));
//! assert_eq!(result.nnzchunks(), 1);
//! ```

pub mod chunk;
pub mod contract;
pub mod coords;
pub mod error;
pub mod tensor;

pub use chunk::{Chunk, EmptyChunk};
pub use contract::{
    AxisProvenance, ContractionPlan, JoinGroups, MergeRule, contract, group_by_axes,
    pair_provenance, par_contract, try_contract, try_par_contract,
};
pub use coords::{Coords, Dimension, DimensionSize, Index};
pub use error::{Operand, TensorError};
pub use tensor::SparseTensor;
