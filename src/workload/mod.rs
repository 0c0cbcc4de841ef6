//! Skewed key generators for exercising sketches with realistic streams.
//!
//! Uniform streams are the easy case for a cardinality sketch; production
//! key traffic is rarely uniform. This module provides two classic skewed
//! distributions over integer key spaces:
//!
//! - [`ZipfianGenerator`] draws keys with popularity proportional to
//!   `1 / rank^theta`, so a few keys dominate regardless of the range size.
//! - [`SkewedLatestGenerator`] applies the same decay from the top of the
//!   range downward, favoring the most recently added keys.
//!
//! Both are explicit objects owning their state and randomness source, so
//! independent streams never interfere, and both support growing the key
//! range as items are inserted.

mod latest;
mod zipf;

// Re-export public API
pub use latest::SkewedLatestGenerator;
pub use zipf::MAX_ITEM_COUNT;
pub use zipf::ZIPFIAN_CONSTANT;
pub use zipf::ZipfianGenerator;
