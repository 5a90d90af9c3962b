//! Tests for the SparseTensor chunk store.
//!
//! # Coverage
//!
//! - Ownership transfer and explicit deep copies
//! - Insert-or-accumulate semantics
//! - Chunk mapping and tensor accumulation

use chunktensor::{Coords, EmptyChunk, SparseTensor, TensorError};

fn sample() -> SparseTensor<f64> {
    SparseTensor::from_chunks(
        &[3, 4],
        vec![(Coords::new(&[0, 1]), 1.5), (Coords::new(&[2, 3]), -2.0)],
    )
    .unwrap()
}

/// Moving a tensor carries its sizes and every chunk.
#[test]
fn test_move_transfers_everything() {
    let source = sample();
    let destination = source;

    assert_eq!(destination.sizes(), &[3, 4]);
    assert_eq!(destination.nnzchunks(), 2);
    assert_eq!(destination.get(&Coords::new(&[2, 3])), Some(&-2.0));
}

/// Taking a tensor leaves an empty, reusable one behind.
#[test]
fn test_take_leaves_reusable_source() {
    let mut source = sample();
    let destination = std::mem::take(&mut source);

    assert_eq!(destination, sample());
    assert!(source.is_empty());

    source = SparseTensor::new(&[2]);
    source.upsert(Coords::new(&[1]), 4.0).unwrap();
    assert_eq!(source.nnzchunks(), 1);
}

/// Deep copies share nothing with the original.
#[test]
fn test_deep_clone() {
    let original = sample();
    let mut copy = original.deep_clone();
    copy.upsert(Coords::new(&[0, 1]), 1.0).unwrap();

    assert_eq!(original.get(&Coords::new(&[0, 1])), Some(&1.5));
    assert_eq!(copy.get(&Coords::new(&[0, 1])), Some(&2.5));
}

/// Absent coordinates read as missing rather than a stored zero.
#[test]
fn test_absent_coordinates() {
    let t = sample();
    assert_eq!(t.get(&Coords::new(&[1, 1])), None);
    assert!(!t.contains(&Coords::new(&[1, 1])));
}

/// Upserting with the wrong rank is rejected.
#[test]
fn test_upsert_wrong_rank() {
    let mut t = sample();
    assert_eq!(
        t.upsert(Coords::new(&[0, 1, 2]), 1.0),
        Err(TensorError::RankMismatch {
            expected: 2,
            actual: 3
        })
    );
    assert_eq!(t, sample());
}

/// A sparsity pattern collapses repeated coordinates.
#[test]
fn test_empty_chunk_pattern() {
    let ring = (0..4).map(|i| Coords::new(&[i, (i + 1) % 4]));
    let repeated = [Coords::new(&[0, 1])];
    let chunks = ring.chain(repeated).map(|c| (c, EmptyChunk));
    let pattern = SparseTensor::from_chunks(&[4, 4], chunks).unwrap();
    assert_eq!(pattern.nnzchunks(), 4);
}

/// Mapping chunks keeps sizes and keys.
#[test]
fn test_map_chunks() {
    let t = sample();
    let signs = t.map_chunks(|x| x.signum() as i32);

    assert_eq!(signs.sizes(), t.sizes());
    assert_eq!(signs.get(&Coords::new(&[0, 1])), Some(&1));
    assert_eq!(signs.get(&Coords::new(&[2, 3])), Some(&-1));
}

/// Accumulating one tensor into another adds overlapping chunks.
#[test]
fn test_accumulate() {
    let mut total = sample();
    total.accumulate(sample()).unwrap();

    assert_eq!(total.nnzchunks(), 2);
    assert_eq!(total.get(&Coords::new(&[0, 1])), Some(&3.0));
    assert_eq!(total.get(&Coords::new(&[2, 3])), Some(&-4.0));
}

/// Iteration visits every stored chunk exactly once.
#[test]
fn test_iteration() {
    let mut t = sample();
    for (_, chunk) in t.iter_mut() {
        *chunk *= 2.0;
    }
    let mut coords: Vec<Coords> = t.iter().map(|(c, _)| c.clone()).collect();
    coords.sort();
    assert_eq!(coords, vec![Coords::new(&[0, 1]), Coords::new(&[2, 3])]);

    let sum: f64 = t.into_chunks().map(|(_, chunk)| chunk).sum();
    assert_eq!(sum, -1.0);
}
