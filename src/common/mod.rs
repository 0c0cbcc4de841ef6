//! Shared utilities used across the crate.

mod random;

pub use random::RandomSource;
pub use random::XorShift64;
