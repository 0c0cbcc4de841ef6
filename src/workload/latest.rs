//! Recency-skewed key generation.

use crate::common::RandomSource;
use crate::common::XorShift64;
use crate::error::Error;
use crate::workload::ZipfianGenerator;

/// A generator of integers in `[0, item_count)` skewed toward the most
/// recently added items: the highest value is drawn most often, the one
/// below it next, and so on with Zipfian decay.
///
/// Each draw mirrors a Zipfian draw through the top of the range, so growing
/// the range with [`grow`](Self::grow) shifts the popular values upward.
/// This models workloads where newly inserted keys are the hot ones.
///
/// # Examples
///
/// ```
/// use cardinality_sketch::workload::SkewedLatestGenerator;
///
/// let mut keys = SkewedLatestGenerator::new(1_000).unwrap();
/// let key = keys.next_value();
/// assert!(key < 1_000);
/// ```
#[derive(Clone, Debug)]
pub struct SkewedLatestGenerator<R = XorShift64> {
    /// Number of items; draws fall in `[0, count_basis)`.
    count_basis: u64,
    /// Most recent draw.
    last_value: u64,
    zipfian: ZipfianGenerator<R>,
}

impl SkewedLatestGenerator {
    /// Creates a generator over `[0, item_count)` with a time-derived seed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `item_count` is zero or exceeds
    /// [`MAX_ITEM_COUNT`](crate::workload::MAX_ITEM_COUNT).
    pub fn new(item_count: u64) -> Result<Self, Error> {
        Self::with_rng(item_count, XorShift64::default())
    }
}

impl<R: RandomSource> SkewedLatestGenerator<R> {
    /// Creates a generator over `[0, item_count)` drawing randomness from
    /// `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `item_count` is zero or exceeds
    /// [`MAX_ITEM_COUNT`](crate::workload::MAX_ITEM_COUNT).
    pub fn with_rng(item_count: u64, rng: R) -> Result<Self, Error> {
        if item_count == 0 {
            return Err(Error::invalid_argument(
                "a skewed-latest generator requires at least one item",
            ));
        }
        let mut generator = Self {
            count_basis: item_count,
            last_value: 0,
            zipfian: ZipfianGenerator::with_rng(0, item_count - 1, rng)?,
        };
        // Warm-up draw, so `last_value` reflects a real sample.
        generator.next_value();
        Ok(generator)
    }

    /// Draws the next value; the most recent item (`item_count - 1`) is the
    /// most likely outcome.
    pub fn next_value(&mut self) -> u64 {
        let max = self.count_basis - 1;
        let value = max - self.zipfian.scaled_draw(max);
        self.last_value = value;
        value
    }

    /// Raises the item count to `item_count`, growing the underlying Zipfian
    /// tables in lock step. Counts not exceeding the current one leave the
    /// generator unchanged.
    pub fn grow(&mut self, item_count: u64) {
        if item_count <= self.count_basis {
            return;
        }
        self.count_basis = item_count;
        self.zipfian.grow(item_count);
    }

    /// Number of items draws currently range over.
    pub fn item_count(&self) -> u64 {
        self.count_basis
    }

    /// The most recent draw.
    pub fn last_value(&self) -> u64 {
        self.last_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_rejects_zero_items() {
        let error = SkewedLatestGenerator::with_rng(0, XorShift64::seeded(1)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_values_stay_below_the_item_count() {
        let mut generator = SkewedLatestGenerator::with_rng(100, XorShift64::seeded(3)).unwrap();
        for _ in 0..1_000 {
            let value = generator.next_value();
            assert!(value < 100, "value out of range: {value}");
        }
    }

    struct AllOnesSource;

    impl RandomSource for AllOnesSource {
        fn next_u64(&mut self) -> u64 {
            u64::MAX
        }
    }

    #[test]
    fn test_largest_draw_stays_below_the_item_count() {
        // The underlying Zipfian index pins to the end of the item space on
        // the largest draw; mirrored through the top of the range it must
        // stay inside [0, item_count).
        let mut generator = SkewedLatestGenerator::with_rng(1_000, AllOnesSource).unwrap();
        for _ in 0..10 {
            let value = generator.next_value();
            assert!(value < 1_000, "value out of range: {value}");
        }
    }

    #[test]
    fn test_single_item_always_draws_zero() {
        let mut generator = SkewedLatestGenerator::with_rng(1, XorShift64::seeded(3)).unwrap();
        for _ in 0..100 {
            assert_eq!(generator.next_value(), 0);
        }
    }

    #[test]
    fn test_latest_item_is_most_frequent() {
        let mut generator = SkewedLatestGenerator::with_rng(1_000, XorShift64::seeded(5)).unwrap();
        let mut latest_draws = 0usize;
        for _ in 0..10_000 {
            if generator.next_value() == 999 {
                latest_draws += 1;
            }
        }
        // The latest item carries roughly 1/zeta(1000) ~ 13% of the mass.
        assert!(
            (800..2_500).contains(&latest_draws),
            "unexpected latest-item frequency: {latest_draws}"
        );
    }

    #[test]
    fn test_grow_shifts_draws_upward() {
        let mut generator = SkewedLatestGenerator::with_rng(10, XorShift64::seeded(7)).unwrap();
        generator.grow(100);
        assert_eq!(generator.item_count(), 100);
        let mut above_old_range = 0usize;
        for _ in 0..1_000 {
            let value = generator.next_value();
            assert!(value < 100, "value out of range: {value}");
            if value >= 10 {
                above_old_range += 1;
            }
        }
        assert!(above_old_range > 0, "growth never reached the new range");
    }

    #[test]
    fn test_deterministic_for_equal_seeds() {
        let mut a = SkewedLatestGenerator::with_rng(500, XorShift64::seeded(42)).unwrap();
        let mut b = SkewedLatestGenerator::with_rng(500, XorShift64::seeded(42)).unwrap();
        for _ in 0..50 {
            assert_eq!(a.next_value(), b.next_value());
        }
    }

    #[test]
    fn test_last_value_tracks_every_draw() {
        let mut generator = SkewedLatestGenerator::with_rng(50, XorShift64::seeded(11)).unwrap();
        for _ in 0..100 {
            let value = generator.next_value();
            assert_eq!(generator.last_value(), value);
        }
    }
}
