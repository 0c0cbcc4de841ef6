//! Combining sketches that shard with the same layout.

use crate::error::Error;
use crate::hll::HllSketch;
use crate::hll::alpha_num_buckets2;
use crate::hll::estimate_counters;

/// Estimates the cardinality of the union of the streams observed by
/// `sketches`.
///
/// The merge takes the elementwise maximum of the bucket arrays, which is
/// exact: the result equals the estimate a single sketch would report after
/// observing every input stream itself. The merge is commutative,
/// associative, and idempotent, and never mutates its inputs, so periodic
/// cross-shard merging is lossless.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
/// if `sketches` is empty or the sketches disagree on `num_sharding_bits`.
///
/// # Examples
///
/// ```
/// use cardinality_sketch::hll::{merged_estimate, HllSketch};
///
/// let mut shard_a = HllSketch::new(12).unwrap();
/// let mut shard_b = HllSketch::new(12).unwrap();
/// for block in 0..500u64 {
///     shard_a.add(block);
///     shard_b.add(block + 250);
/// }
/// let merged = merged_estimate(&[&shard_a, &shard_b]).unwrap();
/// assert!(merged > 600 && merged < 900);
/// ```
pub fn merged_estimate(sketches: &[&HllSketch]) -> Result<u64, Error> {
    if sketches.is_empty() {
        return Err(Error::invalid_argument(
            "merged_estimate requires at least one sketch",
        ));
    }
    let first = sketches[0];
    for sketch in &sketches[1..] {
        if sketch.num_sharding_bits() != first.num_sharding_bits() {
            return Err(
                Error::invalid_argument("sketches must share num_sharding_bits")
                    .with_context("expected", first.num_sharding_bits())
                    .with_context("got", sketch.num_sharding_bits()),
            );
        }
    }

    let mut merged = first.counters().to_vec();
    for sketch in &sketches[1..] {
        for (merged_rank, &rank) in merged.iter_mut().zip(sketch.counters()) {
            *merged_rank = (*merged_rank).max(rank);
        }
    }

    // Equal to the constant every input precomputed at construction.
    let alpha_num_buckets2 = alpha_num_buckets2(first.num_buckets());
    Ok(estimate_counters(&merged, true, alpha_num_buckets2))
}
