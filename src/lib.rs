//! # bhpt-rs: Binary History Probability Tables in Rust
//!
//! **`bhpt-rs`** is a fixed-capacity, manager-centric data structure for stochastic policies
//! driven by recent observations. Each table entry tracks the last `L` binary states of one
//! variable in a bit-packed shift register, and the table selects entry indices at random with
//! probability proportional to a weight that grows with the truthy states among the `N` most
//! recent positions.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: All operations go through the [`Bhpt`][crate::table::Bhpt]
//!   manager, which owns the history store, validity bitmap, cached weights, distribution cache,
//!   and PRNG.
//! - **Bit-Packed Histories**: `I` entries of `L` states cost `I x L` bits plus one cached weight
//!   per entry, not one machine word per state.
//! - **Lazy Distribution Cache**: Weights can be recomputed eagerly per push or deferred in bulk;
//!   the cumulative distribution is only rebuilt when something changed, so repeated selections
//!   are one uniform draw and one binary search each.
//! - **Reproducible Selection**: Every table owns a seeded [`ChaCha8Rng`][rand_chacha::ChaCha8Rng].
//!   Same seed plus same call sequence means identical selections.
//! - **Replaceable Weight Function**: The default geometric estimator sits behind the
//!   [`WeightFunction`][crate::weights::WeightFunction] trait, so a different estimator can be
//!   injected without touching dirty tracking or the selector.
//!
//! ## Basic Usage
//!
//! ```rust
//! use bhpt_rs::{Bhpt, BhptConfig};
//!
//! // 1. Build a table: 16 entries, 8-bit histories, seeded for reproducibility.
//! let mut table = Bhpt::new(BhptConfig::new(16, 8).with_seed(42)).unwrap();
//!
//! // 2. Create an entry and record some observations (most recent last).
//! let e = table.insert().unwrap();
//! table.push(e, true).unwrap();
//! table.push(e, false).unwrap();
//! table.push(e, true).unwrap();
//!
//! // 3. Histories read most recent first.
//! assert_eq!(table.history_of(e).unwrap()[..3], [true, false, true]);
//!
//! // 4. Selection is weighted by recent truthy states; `e` is the only
//! //    non-zero entry, so it always wins.
//! assert_eq!(table.select().unwrap(), e);
//! ```
//!
//! ## Core Components
//!
//! - **[`table`]**: The heart of the library. Contains the [`Bhpt`][crate::table::Bhpt] manager.
//! - **[`weights`]**: The weight engine and the [`WeightFunction`][crate::weights::WeightFunction]
//!   seam.
//! - **[`distribution`]**: The cumulative weight cache and inverse-CDF sampler.
//! - **[`history`]**: The bit-packed history store.

pub mod bitset;
pub mod config;
pub mod distribution;
pub mod error;
pub mod history;
pub mod table;
pub mod weights;

pub use crate::config::BhptConfig;
pub use crate::error::{BhptError, Result};
pub use crate::table::Bhpt;
pub use crate::weights::{geometric_coefficients, GeometricWeights, WeightFunction};
