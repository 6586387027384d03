//! Construction parameters for a table.

use crate::error::{BhptError, Result};

/// Configuration for a [`Bhpt`][crate::table::Bhpt].
///
/// Capacity, history length, consideration depth, the auto-remove policy
/// and the seed are fixed once the table is built; the defer flag and the
/// minimal weight state position can be changed afterwards through the
/// table itself.
#[derive(Debug, Clone)]
pub struct BhptConfig {
    /// Number of entries the table can hold (`I`). Zero is legal: such a
    /// table rejects every `insert` and `select`.
    pub capacity: usize,
    /// History length per entry in bits (`L`), at least 1.
    pub history_length: usize,
    /// Number of most recent states the weight function considers (`N`),
    /// `1 <= N <= L`.
    pub consideration: usize,
    /// Minimal weight state position; negative disables the override,
    /// otherwise must be `< N`.
    pub mwsp: i32,
    /// Defer weight recomputation until the distribution is needed.
    pub defer: bool,
    /// On a full table, evict the lowest-weight entry instead of failing.
    pub auto_remove: bool,
    /// PRNG seed (`None` for OS entropy). Two tables built with the same
    /// seed and fed the same call sequence select identically.
    pub seed: Option<u64>,
}

impl BhptConfig {
    /// Creates a configuration with the given capacity and history length.
    ///
    /// Defaults: consideration depth equal to the history length, override
    /// disabled, eager recomputation, no auto-removal, entropy-seeded PRNG.
    pub fn new(capacity: usize, history_length: usize) -> Self {
        Self {
            capacity,
            history_length,
            consideration: history_length,
            mwsp: -1,
            defer: false,
            auto_remove: false,
            seed: None,
        }
    }

    /// Sets the consideration depth.
    pub fn with_consideration(mut self, consideration: usize) -> Self {
        self.consideration = consideration;
        self
    }

    /// Sets the minimal weight state position (negative disables).
    pub fn with_mwsp(mut self, mwsp: i32) -> Self {
        self.mwsp = mwsp;
        self
    }

    /// Sets the defer flag.
    pub fn with_defer(mut self, defer: bool) -> Self {
        self.defer = defer;
        self
    }

    /// Sets the auto-remove policy.
    pub fn with_auto_remove(mut self, auto_remove: bool) -> Self {
        self.auto_remove = auto_remove;
        self
    }

    /// Sets the PRNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the parameter ranges.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.history_length < 1 {
            return Err(BhptError::InvalidArgument(
                "history length must be > 0".into(),
            ));
        }
        if self.consideration < 1 {
            return Err(BhptError::InvalidArgument(
                "consideration depth must be > 0".into(),
            ));
        }
        if self.consideration > self.history_length {
            return Err(BhptError::InvalidArgument(format!(
                "consideration depth {} exceeds history length {}",
                self.consideration, self.history_length
            )));
        }
        if self.mwsp >= self.consideration as i32 {
            return Err(BhptError::InvalidArgument(format!(
                "minimal weight state position {} is outside [-1, {})",
                self.mwsp, self.consideration
            )));
        }
        Ok(())
    }
}
