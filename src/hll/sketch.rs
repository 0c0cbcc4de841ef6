//! The HyperLogLog sketch itself: one byte-sized bucket per shard, updated
//! in place and read without mutation.

use std::hash::Hash;

use crate::error::Error;
use crate::error::ErrorKind;
use crate::hll::MAX_SHARDING_BITS;
use crate::hll::MIN_SHARDING_BITS;
use crate::hll::alpha_num_buckets2;
use crate::hll::estimate_counters;
use crate::hll::key_hash;

/// A HyperLogLog cardinality sketch.
///
/// The sketch shards incoming 64-bit hashes into `2^num_sharding_bits`
/// buckets and keeps, per bucket, the maximum rank observed. Memory use is
/// fixed at construction; buckets only ever grow, so feeding the same element
/// twice cannot change the state.
///
/// # Examples
///
/// ```
/// use cardinality_sketch::hll::HllSketch;
///
/// let mut sketch = HllSketch::new(12).unwrap();
/// for block in 0..1_000u64 {
///     sketch.add(block);
/// }
/// let estimate = sketch.estimate();
/// assert!(estimate > 900 && estimate < 1_100);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HllSketch {
    /// The number of bits (b from Flajolet) used for sharding the input into
    /// buckets. More bits use more memory but give a more accurate estimate.
    num_sharding_bits: u8,
    /// The number of buckets (m = 2^b from Flajolet).
    num_buckets: usize,
    /// Mask extracting the bucket selector from the low end of a hash.
    bucket_mask: u64,
    /// Maximum rank observed per bucket, each in [0, 64 - b].
    counters: Box<[u8]>,
    /// alpha(m) * m^2, precomputed for the estimator.
    alpha_num_buckets2: f64,
}

impl HllSketch {
    /// Creates a sketch with `2^num_sharding_bits` one-byte buckets.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `num_sharding_bits` is outside `[4, 16]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardinality_sketch::hll::HllSketch;
    ///
    /// let sketch = HllSketch::new(12).unwrap();
    /// assert_eq!(sketch.num_buckets(), 4096);
    /// assert!(HllSketch::new(17).is_err());
    /// ```
    pub fn new(num_sharding_bits: u8) -> Result<Self, Error> {
        if !(MIN_SHARDING_BITS..=MAX_SHARDING_BITS).contains(&num_sharding_bits) {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "num_sharding_bits out of range",
            )
            .with_context("num_sharding_bits", num_sharding_bits)
            .with_context("min", MIN_SHARDING_BITS)
            .with_context("max", MAX_SHARDING_BITS));
        }

        let num_buckets = 1usize << num_sharding_bits;
        Ok(Self {
            num_sharding_bits,
            num_buckets,
            bucket_mask: num_buckets as u64 - 1,
            counters: vec![0u8; num_buckets].into_boxed_slice(),
            alpha_num_buckets2: alpha_num_buckets2(num_buckets),
        })
    }

    /// Records a pre-computed 64-bit hash.
    ///
    /// The low `num_sharding_bits` bits select the bucket; the remaining
    /// high-order bits determine the rank (one plus the number of leading
    /// zeros among the retained bits, clamped to `64 - num_sharding_bits`
    /// when they are all zero). Accuracy rests on the hash being close to
    /// uniformly distributed.
    ///
    /// Returns `true` if a bucket changed, meaning the cardinality estimate
    /// has likely changed and any cached value should be recomputed. Callers
    /// that maintain several sketches can hash once and feed the same value
    /// to each of them.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardinality_sketch::hll::HllSketch;
    ///
    /// let mut sketch = HllSketch::new(4).unwrap();
    /// assert!(sketch.add_hash(0x10));
    /// assert!(!sketch.add_hash(0x10));
    /// ```
    pub fn add_hash(&mut self, hash: u64) -> bool {
        let bucket = (hash & self.bucket_mask) as usize;
        let remaining = hash >> self.num_sharding_bits;
        let rank = if remaining == 0 {
            64 - self.num_sharding_bits
        } else {
            remaining.leading_zeros() as u8 - self.num_sharding_bits + 1
        };

        if rank > self.counters[bucket] {
            self.counters[bucket] = rank;
            true
        } else {
            false
        }
    }

    /// Hashes `item` with the crate's default hash function and records it.
    ///
    /// Returns `true` if a bucket changed, as [`add_hash`](Self::add_hash)
    /// does.
    pub fn add<T: Hash>(&mut self, item: T) -> bool {
        self.add_hash(key_hash(item))
    }

    /// Returns the current cardinality estimate.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardinality_sketch::hll::HllSketch;
    ///
    /// let sketch = HllSketch::new(8).unwrap();
    /// assert_eq!(sketch.estimate(), 0);
    /// ```
    pub fn estimate(&self) -> u64 {
        estimate_counters(&self.counters, true, self.alpha_num_buckets2)
    }

    /// Returns the cardinality estimate for each tracked interval.
    ///
    /// This sketch tracks a single interval, so the vector always has one
    /// entry, equal to [`estimate`](Self::estimate).
    pub fn cardinality(&self) -> Vec<u64> {
        vec![self.estimate()]
    }

    /// Returns true if no hash has set any bucket yet.
    pub fn is_empty(&self) -> bool {
        self.counters.iter().all(|&rank| rank == 0)
    }

    /// Return the configured number of sharding bits.
    pub fn num_sharding_bits(&self) -> u8 {
        self.num_sharding_bits
    }

    /// Return the number of buckets (`2^num_sharding_bits`).
    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    /// Read-only view of the per-bucket maximum ranks.
    pub fn counters(&self) -> &[u8] {
        &self.counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::RandomSource;
    use crate::common::XorShift64;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_derives_bucket_layout() {
        for bits in 4..=16u8 {
            let mut sketch = HllSketch::new(bits).unwrap();
            assert_eq!(sketch.num_sharding_bits(), bits);
            assert_eq!(sketch.num_buckets(), 1usize << bits);
            assert_eq!(sketch.counters().len(), sketch.num_buckets());
            assert!(sketch.is_empty());
            assert_eq!(sketch.estimate(), 0);

            // A hash equal to a bucket id has no retained bits, so it lands
            // in that bucket with the clamped maximum rank.
            assert!(sketch.add_hash(3));
            assert_eq!(sketch.counters()[3], 64 - bits, "bits = {bits}");
            assert!(!sketch.is_empty());
        }
    }

    #[test]
    fn test_widest_layout_estimates_one_item() {
        // At 16 bits the normalization constant spans alpha * 2^32. One
        // occupied bucket reads back through linear counting as
        // 65536 * ln(65536 / 65535) = 1.0000076.
        let mut sketch = HllSketch::new(16).unwrap();
        assert!(sketch.add_hash(0x2a));
        assert_eq!(sketch.estimate(), 1);
    }

    #[test]
    fn test_new_rejects_out_of_range_bits() {
        for bits in [0u8, 1, 2, 3, 17, 18, 255] {
            let error = HllSketch::new(bits).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::InvalidArgument, "bits = {bits}");
        }
        assert!(HllSketch::new(4).is_ok());
        assert!(HllSketch::new(16).is_ok());
    }

    #[test]
    fn test_add_hash_selects_bucket_from_low_bits() {
        let mut sketch = HllSketch::new(4).unwrap();
        // Bucket id 5, all retained bits zero: clamped rank 64 - 4 = 60.
        assert!(sketch.add_hash(0b0101));
        for (bucket, &rank) in sketch.counters().iter().enumerate() {
            if bucket == 5 {
                assert_eq!(rank, 60);
            } else {
                assert_eq!(rank, 0, "bucket {bucket} should be untouched");
            }
        }
    }

    #[test]
    fn test_add_hash_derives_rank_from_leading_zeros() {
        let mut sketch = HllSketch::new(4).unwrap();

        // Top bit of the hash set: no leading zeros in the retained bits.
        sketch.add_hash((1u64 << 63) | 0x3);
        assert_eq!(sketch.counters()[3], 1);

        // Bit 44 set: the retained value is 1 << 40, which has 19 zeros above
        // its highest set bit inside the 60-bit field.
        sketch.add_hash((1u64 << 44) | 0x5);
        assert_eq!(sketch.counters()[5], 20);

        // All retained bits zero: clamped to the register maximum.
        sketch.add_hash(0x7);
        assert_eq!(sketch.counters()[7], 60);
    }

    #[test]
    fn test_add_hash_is_idempotent() {
        let mut sketch = HllSketch::new(8).unwrap();
        assert!(sketch.add_hash(0xdead_beef_cafe_f00d));
        let snapshot = sketch.counters().to_vec();
        assert!(!sketch.add_hash(0xdead_beef_cafe_f00d));
        assert_eq!(sketch.counters(), snapshot.as_slice());
    }

    #[test]
    fn test_add_hash_keeps_the_maximum_rank() {
        let mut sketch = HllSketch::new(4).unwrap();

        // Rank 20 into bucket 2.
        assert!(sketch.add_hash((1u64 << 44) | 0x2));
        assert_eq!(sketch.counters()[2], 20);

        // Rank 1 into the same bucket loses.
        assert!(!sketch.add_hash((1u64 << 63) | 0x2));
        assert_eq!(sketch.counters()[2], 20);

        // Rank 60 wins.
        assert!(sketch.add_hash(0x2));
        assert_eq!(sketch.counters()[2], 60);
    }

    #[test]
    fn test_counters_never_decrease_under_a_stream() {
        let mut sketch = HllSketch::new(6).unwrap();
        let mut rng = XorShift64::seeded(99);
        let mut previous = sketch.counters().to_vec();
        for _ in 0..200 {
            sketch.add_hash(rng.next_u64());
            for (bucket, (&now, &before)) in
                sketch.counters().iter().zip(previous.iter()).enumerate()
            {
                assert!(now >= before, "bucket {bucket} decreased");
            }
            previous = sketch.counters().to_vec();
        }
    }

    #[test]
    fn test_add_matches_add_hash_on_the_key_hash() {
        let mut direct = HllSketch::new(10).unwrap();
        let mut hashed = HllSketch::new(10).unwrap();
        for item in 0..100u64 {
            direct.add(item);
            hashed.add_hash(crate::hll::key_hash(item));
        }
        assert_eq!(direct, hashed);
    }

    #[test]
    fn test_linear_counting_on_half_filled_sketch() {
        let mut sketch = HllSketch::new(4).unwrap();
        // Fill eight distinct buckets with the clamped rank; the raw
        // harmonic estimate stays under 2.5 * 16, so linear counting with
        // V = 8 gives 16 * ln(2) = 11.09.
        for bucket in 0..8u64 {
            sketch.add_hash(bucket);
        }
        assert_eq!(sketch.estimate(), 11);
    }

    #[test]
    fn test_cardinality_is_a_single_interval_vector() {
        let mut sketch = HllSketch::new(8).unwrap();
        assert_eq!(sketch.cardinality(), vec![0]);
        sketch.add("a");
        assert_eq!(sketch.cardinality(), vec![sketch.estimate()]);
        assert_eq!(sketch.cardinality().len(), 1);
    }
}
