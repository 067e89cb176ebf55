#![doc = include_str!("../README.md")]
#![warn(missing_debug_implementations, missing_docs)]

mod map;
mod raw;

#[cfg(feature = "serde")]
mod serde_impls;

pub use map::{ConfigError, IntMap, IntMapBuilder, Iter, Keys, Values, DEFAULT_FILL_FACTOR};
