//! Cumulative weight cache and inverse-CDF sampling.
//!
//! The selector never looks at raw weights: it samples against a cached
//! cumulative array that is rebuilt only when something changed since the
//! last rebuild. Repeated selections with no intervening mutation therefore
//! cost one uniform draw and one binary search each.

use rand::Rng;

/// Cached cumulative distribution over entry weights.
///
/// `cumulative[k]` is the sum of the weights of entries `0..k`, so
/// `cumulative` has `capacity + 1` elements and `cumulative[capacity]` is
/// the total. The cache starts stale and is rebuilt on demand; the rebuild
/// counter is kept for instrumentation and tests.
#[derive(Debug, Clone)]
pub struct Distribution {
    /// Prefix sums of the weights, `capacity + 1` elements.
    cumulative: Vec<f64>,
    /// Total weight, equal to the last prefix sum.
    total: f64,
    /// True if any weight may have changed since the last rebuild.
    stale: bool,
    /// Number of rebuilds performed.
    rebuilds: usize,
}

impl Distribution {
    /// Creates a stale distribution over `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            cumulative: vec![0.0; capacity + 1],
            total: 0.0,
            stale: true,
            rebuilds: 0,
        }
    }

    /// True if the cache must be rebuilt before sampling.
    #[inline]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Marks the cache stale.
    #[inline]
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Total weight as of the last rebuild.
    #[inline]
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Number of rebuilds performed so far.
    #[inline]
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// The prefix-sum array as of the last rebuild.
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Rebuilds the prefix sums from `weights` and clears the stale flag.
    pub fn rebuild(&mut self, weights: &[f64]) {
        debug_assert_eq!(weights.len() + 1, self.cumulative.len());
        let mut sum = 0.0;
        for (k, &w) in weights.iter().enumerate() {
            self.cumulative[k] = sum;
            sum += w;
        }
        self.cumulative[weights.len()] = sum;
        self.total = sum;
        self.stale = false;
        self.rebuilds += 1;
    }

    /// Draws one entry index with probability proportional to its weight.
    ///
    /// Returns `None` when the total weight is zero. Ties between
    /// equal-weight entries are resolved by the uniform draw alone; the
    /// prefix sums are in index order, so an exact boundary hit resolves to
    /// the lower index.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        if self.total <= 0.0 {
            return None;
        }
        let u = rng.random_range(0.0..self.total);
        // Smallest k with cumulative[k + 1] > u.
        let k = self.cumulative.partition_point(|&c| c <= u) - 1;
        Some(k)
    }
}
