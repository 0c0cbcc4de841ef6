//! Streaming cardinality estimation in a fixed amount of memory.
//!
//! The centerpiece is [`hll::HllSketch`], a HyperLogLog sketch that
//! estimates the number of distinct elements in a stream without storing
//! them. Sketches built with the same layout combine exactly through
//! [`hll::merged_estimate`], so per-shard counting followed by a periodic
//! merge loses nothing. The [`workload`] module supplies skewed key
//! generators for exercising sketches under realistic traffic.
//!
//! # Quick start
//!
//! ```
//! use cardinality_sketch::hll::HllSketch;
//!
//! let mut sketch = HllSketch::new(12).unwrap();
//! for user_id in 0..10_000u64 {
//!     sketch.add(user_id);
//! }
//! let estimate = sketch.estimate();
//! assert!(estimate > 9_000 && estimate < 11_000);
//! ```
//!
//! Errors are reported through [`error::Error`]; no operation panics on bad
//! input.

pub mod common;
pub mod error;
pub mod hll;
pub mod workload;
