//! Weight computation from recent history bits.
//!
//! The weight of an entry is a monotone function of its considered history:
//! the more recent truthy states a row holds, the larger its weight and the
//! likelier the entry is to be selected. The computation itself sits behind
//! the [`WeightFunction`] trait so a different estimator (e.g. a learned
//! model) can replace [`GeometricWeights`] without touching dirty tracking,
//! the distribution cache, or the selector.
//!
//! The default function sums a geometric coefficient table over the truthy
//! considered states:
//!
//! ```text
//! w = Σ_{n=0..N-1} 2^(3n/2) · s_n
//! ```
//!
//! where `s_n` is the state at age `n` (0 = most recent), optionally
//! overridden at the minimal weight state position.

use crate::bitset::BitSet;
use crate::history::HistoryStore;

/// Maps the considered states of one row to a non-negative weight.
///
/// `states` is position-ordered (most recent first) and exactly
/// [`depth`][WeightFunction::depth] items long.
pub trait WeightFunction {
    /// Number of history positions consumed (the consideration depth `N`).
    fn depth(&self) -> usize;

    /// Folds position-ordered states into a weight.
    fn weight<I>(&self, states: I) -> f64
    where
        I: Iterator<Item = bool>;
}

/// Returns the default coefficient table `W[n] = 2^(3n/2)` for `n ∈ [0, depth)`.
///
/// Exposed so callers can map external scores onto history patterns (e.g.
/// turning a fitness fraction into the bit pattern whose weight approximates
/// it).
pub fn geometric_coefficients(depth: usize) -> Vec<f64> {
    (0..depth).map(|n| 2f64.powf(1.5 * n as f64)).collect()
}

/// The default weight function: a precomputed geometric coefficient table.
#[derive(Debug, Clone)]
pub struct GeometricWeights {
    coefficients: Vec<f64>,
}

impl GeometricWeights {
    /// Creates the function for the given consideration depth.
    pub fn new(depth: usize) -> Self {
        Self {
            coefficients: geometric_coefficients(depth),
        }
    }

    /// The precomputed coefficient table.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

impl WeightFunction for GeometricWeights {
    fn depth(&self) -> usize {
        self.coefficients.len()
    }

    fn weight<I>(&self, states: I) -> f64
    where
        I: Iterator<Item = bool>,
    {
        self.coefficients
            .iter()
            .zip(states)
            .filter(|(_, s)| *s)
            .map(|(c, _)| c)
            .sum()
    }
}

/// Cached per-entry weights with two-level dirty tracking.
///
/// In eager mode the table recomputes an entry's weight on every push; in
/// deferred mode pushes only mark the entry dirty and the weights are
/// brought up to date in bulk the next time the distribution is needed.
/// Changing the minimal weight state position dirties every entry, so the
/// bulk path also runs for eager tables after `set_mwsp`.
#[derive(Debug)]
pub struct WeightEngine<W> {
    function: W,
    /// Cached weight per entry. Invalid entries are pinned at 0.
    weights: Vec<f64>,
    /// Entries whose cached weight is out of date.
    dirty: BitSet,
    /// Minimal weight state position; negative disables the override.
    mwsp: i32,
}

impl<W: WeightFunction> WeightEngine<W> {
    /// Creates an engine for `capacity` entries, all weights zero.
    pub fn new(capacity: usize, function: W, mwsp: i32) -> Self {
        Self {
            function,
            weights: vec![0.0; capacity],
            dirty: BitSet::new(capacity),
            mwsp,
        }
    }

    /// The consideration depth of the underlying weight function.
    #[inline]
    pub fn depth(&self) -> usize {
        self.function.depth()
    }

    /// The cached weights, one per entry.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// The cached weight of one entry.
    #[inline]
    pub fn weight(&self, entry: usize) -> f64 {
        self.weights[entry]
    }

    /// The current minimal weight state position (negative = disabled).
    #[inline]
    pub fn mwsp(&self) -> i32 {
        self.mwsp
    }

    /// Stores a new minimal weight state position and dirties every entry.
    ///
    /// The caller validates the upper bound; any negative value disables the
    /// override.
    pub fn set_mwsp(&mut self, mwsp: i32) {
        self.mwsp = mwsp;
        self.dirty.set_all();
    }

    /// Marks one entry's cached weight as out of date.
    #[inline]
    pub fn mark_dirty(&mut self, entry: usize) {
        self.dirty.insert(entry);
    }

    /// Computes the weight of `entry` from its current history.
    fn compute(&self, entry: usize, history: &HistoryStore) -> f64 {
        let mwsp = self.mwsp;
        let states = history
            .iter_row(entry)
            .take(self.function.depth())
            .enumerate()
            .map(|(n, s)| s || n as i32 == mwsp);
        self.function.weight(states)
    }

    /// Recomputes one entry's weight immediately (the eager path).
    ///
    /// An invalid entry's weight is pinned at 0 regardless of its history.
    pub fn recompute(&mut self, entry: usize, history: &HistoryStore, valid: bool) {
        self.weights[entry] = if valid { self.compute(entry, history) } else { 0.0 };
        self.dirty.remove(entry);
    }

    /// Recomputes every dirty entry's weight and clears all dirty bits.
    pub fn recompute_dirty(&mut self, history: &HistoryStore, valid: &BitSet) {
        if self.dirty.is_empty() {
            return;
        }
        for entry in 0..self.weights.len() {
            if self.dirty.contains(entry) {
                self.weights[entry] = if valid.contains(entry) {
                    self.compute(entry, history)
                } else {
                    0.0
                };
            }
        }
        self.dirty.clear();
    }

    /// Zeroes one entry's weight and clears its dirty bit (entry removed).
    pub fn reset(&mut self, entry: usize) {
        self.weights[entry] = 0.0;
        self.dirty.remove(entry);
    }
}
