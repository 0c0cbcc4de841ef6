//! Zipfian-distributed key generation.

use crate::common::RandomSource;
use crate::common::XorShift64;
use crate::error::Error;

/// Skew exponent (theta) of the generated distribution.
pub const ZIPFIAN_CONSTANT: f64 = 0.99;

/// Largest item range a generator accepts; the zeta tables are computed by
/// summing one term per item.
pub const MAX_ITEM_COUNT: u64 = u64::MAX >> 24;

/// A generator of integers in `[min, max]` with a Zipfian popularity
/// distribution: item `min` is drawn most often, `min + 1` next, and so on
/// with probability proportional to `1 / rank^theta`.
///
/// Draws use the method of Gray et al., "Quickly Generating Billion-Record
/// Synthetic Databases" (SIGMOD '94), which needs the zeta sum over the item
/// range. The sum is precomputed for the constructed range
/// and can be extended with [`grow`](Self::grow) when items are added later;
/// [`next_for`](Self::next_for) then scales draws to any count inside the
/// grown range.
///
/// # Examples
///
/// ```
/// use cardinality_sketch::workload::ZipfianGenerator;
///
/// let mut keys = ZipfianGenerator::new(0, 99).unwrap();
/// let key = keys.next_value();
/// assert!(key <= 99);
/// ```
#[derive(Clone, Debug)]
pub struct ZipfianGenerator<R = XorShift64> {
    /// Number of items in the constructed range.
    items: u64,
    /// Smallest value generated.
    base: u64,
    /// Skew exponent.
    theta: f64,
    /// `1 / (1 - theta)`, the exponent of the inverse CDF.
    alpha: f64,
    /// `zeta(count_for_zeta, theta)`.
    zetan: f64,
    /// Normalization constant derived from `items`, `zeta_2_theta`, and
    /// `zetan`.
    eta: f64,
    /// `zeta(2, theta)`, used when recomputing `eta` after growth.
    zeta_2_theta: f64,
    /// Number of items `zetan` currently covers.
    count_for_zeta: u64,
    /// Most recent draw.
    last_value: u64,
    rng: R,
}

impl ZipfianGenerator {
    /// Creates a generator over `[min, max]` with a time-derived seed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `min > max` or the range holds more than [`MAX_ITEM_COUNT`] items.
    pub fn new(min: u64, max: u64) -> Result<Self, Error> {
        Self::with_rng(min, max, XorShift64::default())
    }
}

impl<R: RandomSource> ZipfianGenerator<R> {
    /// Creates a generator over `[min, max]` drawing randomness from `rng`.
    ///
    /// Generators built from equally seeded sources produce identical
    /// sequences.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `min > max` or the range holds more than [`MAX_ITEM_COUNT`] items.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardinality_sketch::common::XorShift64;
    /// use cardinality_sketch::workload::ZipfianGenerator;
    ///
    /// let mut a = ZipfianGenerator::with_rng(0, 99, XorShift64::seeded(7)).unwrap();
    /// let mut b = ZipfianGenerator::with_rng(0, 99, XorShift64::seeded(7)).unwrap();
    /// assert_eq!(a.next_value(), b.next_value());
    /// ```
    pub fn with_rng(min: u64, max: u64, rng: R) -> Result<Self, Error> {
        if min > max {
            return Err(
                Error::invalid_argument("zipfian range is inverted")
                    .with_context("min", min)
                    .with_context("max", max),
            );
        }
        if max - min >= MAX_ITEM_COUNT {
            return Err(
                Error::invalid_argument("zipfian range holds too many items")
                    .with_context("min", min)
                    .with_context("max", max)
                    .with_context("max_item_count", MAX_ITEM_COUNT),
            );
        }

        let items = max - min + 1;
        let theta = ZIPFIAN_CONSTANT;
        let zeta_2_theta = zeta_static(0, 2, theta, 0.0);
        let zetan = zeta_static(0, items, theta, 0.0);
        let mut generator = Self {
            items,
            base: min,
            theta,
            alpha: 1.0 / (1.0 - theta),
            zetan,
            eta: eta(items, theta, zeta_2_theta, zetan),
            zeta_2_theta,
            count_for_zeta: items,
            last_value: min,
            rng,
        };
        // Warm-up draw, so `last_value` reflects a real sample.
        generator.next_value();
        Ok(generator)
    }

    /// Draws the next value over the constructed item range.
    pub fn next_value(&mut self) -> u64 {
        self.scaled_draw(self.items)
    }

    /// Draws the next value scaled to the first `item_count` items of the
    /// range.
    ///
    /// The zeta tables must already cover `item_count`; after inserting items
    /// beyond the constructed range, call [`grow`](Self::grow) before drawing
    /// over the larger count.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `item_count` exceeds the count the tables were grown to.
    pub fn next_for(&mut self, item_count: u64) -> Result<u64, Error> {
        if item_count > self.count_for_zeta {
            return Err(
                Error::invalid_argument("item count exceeds the grown range; call grow first")
                    .with_context("item_count", item_count)
                    .with_context("grown_to", self.count_for_zeta),
            );
        }
        Ok(self.scaled_draw(item_count))
    }

    /// Extends the zeta tables to cover `item_count` items.
    ///
    /// The extension is incremental: only the terms between the current count
    /// and `item_count` are summed. Counts not exceeding the current one
    /// leave the generator unchanged.
    pub fn grow(&mut self, item_count: u64) {
        if item_count <= self.count_for_zeta {
            return;
        }
        self.zetan = zeta_static(self.count_for_zeta, item_count, self.theta, self.zetan);
        self.count_for_zeta = item_count;
        // `eta` keeps the constructed item count in its numerator; only the
        // zeta ratio changes.
        self.eta = eta(self.items, self.theta, self.zeta_2_theta, self.zetan);
    }

    /// Number of items the zeta tables currently cover.
    pub fn item_count(&self) -> u64 {
        self.count_for_zeta
    }

    /// The most recent draw.
    pub fn last_value(&self) -> u64 {
        self.last_value
    }

    /// Inverse-CDF draw scaled to `item_count`, against the current zeta
    /// tables.
    pub(super) fn scaled_draw(&mut self, item_count: u64) -> u64 {
        let u = self.rng.next_f64();
        let uz = u * self.zetan;
        let value = if uz < 1.0 {
            self.base
        } else if uz < 1.0 + 0.5f64.powf(self.theta) {
            self.base + 1
        } else {
            // The skew base rounds to exactly 1.0 when u is within an ulp of
            // 1, so pin the scaled index inside the item space.
            let skew = (self.eta * u - self.eta + 1.0).powf(self.alpha);
            let index = ((item_count as f64 * skew) as u64).min(item_count.saturating_sub(1));
            self.base.saturating_add(index)
        };
        self.last_value = value;
        value
    }
}

fn zeta_static(start: u64, count: u64, theta: f64, initial_sum: f64) -> f64 {
    let mut sum = initial_sum;
    for i in start..count {
        sum += 1.0 / ((i + 1) as f64).powf(theta);
    }
    sum
}

#[inline]
fn eta(items: u64, theta: f64, zeta_2_theta: f64, zetan: f64) -> f64 {
    (1.0 - (2.0 / items as f64).powf(1.0 - theta)) / (1.0 - zeta_2_theta / zetan)
}
