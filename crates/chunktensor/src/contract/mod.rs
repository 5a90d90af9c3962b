//! Sparse tensor contraction.
//!
//! A contraction pairs chunks of a left and a right tensor that agree on a
//! list of join axes, combines each pair with a caller-supplied function,
//! and places the combined chunk in a new tensor according to a per-axis
//! [`AxisProvenance`] list.
//!
//! The algorithm is a hash join:
//!
//! 1. validate the request and compute result sizes ([`ContractionPlan`])
//! 2. group both operands by their join-axis projection ([`group_by_axes`])
//! 3. for every key present on both sides, combine the Cartesian product
//!    of the two groups
//! 4. accumulate pairs that land on the same result coordinate
//!
//! Cost scales with the sum over matched keys of the product of group
//! sizes, not with the product of the operands' chunk counts.
//!
//! # Example
//!
//! ```
//! use chunktensor::{Coords, SparseTensor, contract, pair_provenance};
//!
//! // Matrix product C[i,k] = A[i,j] * B[j,k] on 2x2 sparse matrices
//! let a = SparseTensor::from_chunks(
//!     &[2, 2],
//!     vec![(Coords::new(&[0, 0]), 1.0), (Coords::new(&[1, 1]), 2.0)],
//! )
//! .unwrap();
//! let b = SparseTensor::from_chunks(
//!     &[2, 2],
//!     vec![(Coords::new(&[0, 1]), 3.0), (Coords::new(&[1, 1]), 4.0)],
//! )
//! .unwrap();
//!
//! let provenance = pair_provenance(2, 2, &[1], &[0]);
//! let c = contract(&a, &b, &[1], &[0], &provenance, |x, y| x * y).unwrap();
//!
//! assert_eq!(c.get(&Coords::new(&[0, 1])), Some(&3.0));
//! assert_eq!(c.get(&Coords::new(&[1, 1])), Some(&8.0));
//! assert_eq!(c.nnzchunks(), 2);
//! ```

mod engine;
mod grouping;
mod parallel;
mod plan;
mod provenance;

pub use engine::{contract, try_contract};
pub use grouping::{JoinGroups, group_by_axes};
pub use parallel::{par_contract, try_par_contract};
pub use plan::{ContractionPlan, pair_provenance};
pub use provenance::{AxisProvenance, MergeRule};
