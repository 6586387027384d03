//! The binary history probability table manager.
//!
//! [`Bhpt`] is the façade over the bit-packed history store, the validity
//! bitmap, the weight engine and the distribution cache. All operations go
//! through the manager; it owns every piece of state including the PRNG, so
//! two tables built with the same seed and fed the same call sequence make
//! identical selections.

use std::fmt::Debug;

use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::bitset::BitSet;
use crate::config::BhptConfig;
use crate::distribution::Distribution;
use crate::error::{BhptError, Result};
use crate::history::HistoryStore;
use crate::weights::{GeometricWeights, WeightEngine, WeightFunction};

/// A fixed-capacity table of binary state histories supporting weighted
/// random selection of an entry index.
///
/// Each of up to `capacity` entries tracks the last `history_length` binary
/// states observed for one variable. An entry's weight grows with the
/// truthy states among its `consideration` most recent positions, and
/// [`select`][Bhpt::select] draws an entry with probability proportional to
/// its weight.
///
/// Entries are `Free` until created by [`insert`][Bhpt::insert] or
/// implicitly by [`push`][Bhpt::push], and return to `Free` via
/// [`remove`][Bhpt::remove] or auto-eviction. Reading an out-of-range index
/// is an error; reading a free in-range index yields an all-zero history.
pub struct Bhpt<W: WeightFunction = GeometricWeights> {
    history: HistoryStore,
    valid: BitSet,
    engine: WeightEngine<W>,
    dist: Distribution,
    defer: bool,
    auto_remove: bool,
    rng: ChaCha8Rng,
}

impl Bhpt {
    /// Builds a table with the default geometric weight function.
    pub fn new(config: BhptConfig) -> Result<Self> {
        let function = GeometricWeights::new(config.consideration);
        Self::with_weight_function(config, function)
    }
}

impl<W: WeightFunction> Bhpt<W> {
    /// Builds a table with a custom weight function.
    ///
    /// The function's depth must equal the configured consideration depth.
    pub fn with_weight_function(config: BhptConfig, function: W) -> Result<Self> {
        config.validate()?;
        if function.depth() != config.consideration {
            return Err(BhptError::InvalidArgument(format!(
                "weight function depth {} does not match consideration depth {}",
                function.depth(),
                config.consideration
            )));
        }

        let float_bits = (config.capacity.max(1) as f64).log2()
            + 1.5 * config.consideration.saturating_sub(1) as f64;
        if float_bits > 56.0 {
            warn!(
                "capacity {} x consideration depth {} spans ~{:.0} bits; the oldest \
                 state coefficients may be lost to f64 rounding in the totals",
                config.capacity, config.consideration, float_bits
            );
        }

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };

        Ok(Self {
            history: HistoryStore::new(config.capacity, config.history_length),
            valid: BitSet::new(config.capacity),
            engine: WeightEngine::new(config.capacity, function, config.mwsp),
            dist: Distribution::new(config.capacity),
            defer: config.defer,
            auto_remove: config.auto_remove,
            rng,
        })
    }

    /// Number of entries the table can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.valid.capacity()
    }

    /// History length per entry, in bits.
    #[inline]
    pub fn history_length(&self) -> usize {
        self.history.bits()
    }

    /// Number of most recent states the weight function considers.
    #[inline]
    pub fn consideration(&self) -> usize {
        self.engine.depth()
    }

    /// Current minimal weight state position (negative = disabled).
    #[inline]
    pub fn mwsp(&self) -> i32 {
        self.engine.mwsp()
    }

    /// True if weight recomputation is deferred to selection time.
    #[inline]
    pub fn defer(&self) -> bool {
        self.defer
    }

    /// True if a full table evicts its lowest-weight entry on insert.
    #[inline]
    pub fn auto_remove(&self) -> bool {
        self.auto_remove
    }

    /// Number of valid entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.valid.len()
    }

    /// True if no entry is valid.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }

    /// Number of free entries.
    #[inline]
    pub fn free(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Number of distribution rebuilds performed so far.
    ///
    /// Selections with no intervening mutation reuse the cached
    /// distribution, so this counter only moves when something changed.
    #[inline]
    pub fn rebuilds(&self) -> usize {
        self.dist.rebuilds()
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.capacity() {
            return Err(BhptError::InvalidIndex {
                index,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    /// Returns the history of `index` in position order (most recent
    /// first).
    ///
    /// A valid entry that was never written reads all-zero, and so does a
    /// free in-range entry: a free entry simply has no meaningful state.
    pub fn history_of(&self, index: usize) -> Result<Vec<bool>> {
        self.check_index(index)?;
        Ok(self.history.row(index))
    }

    /// Records `state` as the most recent observation for `index`.
    ///
    /// Pushing to a free in-range entry re-validates it; its history before
    /// the push is all-zeros. In eager mode the entry's weight is
    /// recomputed immediately, in deferred mode it is only marked dirty.
    pub fn push(&mut self, index: usize, state: bool) -> Result<()> {
        self.check_index(index)?;
        debug!("push(index = {}, state = {})", index, state);

        self.history.shift_in(index, state);
        self.valid.insert(index);
        self.update_weight(index);
        Ok(())
    }

    /// Pushes a sequence of states to `index`, oldest first.
    ///
    /// Equivalent to pushing each state in order: the last element of
    /// `states` ends up at position 0. An empty slice is a no-op and does
    /// not validate the entry. Sequences longer than the history length are
    /// legal; only the trailing states survive, exactly as they would under
    /// repeated single pushes.
    pub fn assign(&mut self, index: usize, states: &[bool]) -> Result<()> {
        self.check_index(index)?;
        if states.is_empty() {
            return Ok(());
        }
        debug!("assign(index = {}, states = {} bits)", index, states.len());

        for &state in states {
            self.history.shift_in(index, state);
        }
        self.valid.insert(index);
        self.update_weight(index);
        Ok(())
    }

    /// Recomputes or dirties the weight of a just-mutated valid entry,
    /// per the current mode, and marks the distribution stale.
    fn update_weight(&mut self, index: usize) {
        if self.defer {
            self.engine.mark_dirty(index);
        } else {
            self.engine.recompute(index, &self.history, true);
        }
        self.dist.invalidate();
    }

    /// Brings dirty weights up to date and rebuilds the cumulative array if
    /// anything changed since the last rebuild.
    fn refresh(&mut self) {
        if self.dist.is_stale() {
            self.engine.recompute_dirty(&self.history, &self.valid);
            self.dist.rebuild(self.engine.weights());
            debug!(
                "refresh: rebuilt distribution, total weight = {}",
                self.dist.total()
            );
        }
    }

    /// Draws one entry index with probability proportional to its weight.
    ///
    /// Fails with [`NoSelectableEntry`][BhptError::NoSelectableEntry] when
    /// the total weight is zero: no valid entries, or every valid history
    /// all-zero with the minimal weight state position disabled.
    pub fn select(&mut self) -> Result<usize> {
        self.refresh();
        self.dist
            .sample(&mut self.rng)
            .ok_or(BhptError::NoSelectableEntry)
    }

    /// Draws `count` entry indices, rebuilding the distribution at most
    /// once.
    pub fn select_many(&mut self, count: usize) -> Result<Vec<usize>> {
        self.refresh();
        let mut selected = Vec::with_capacity(count);
        for _ in 0..count {
            selected.push(
                self.dist
                    .sample(&mut self.rng)
                    .ok_or(BhptError::NoSelectableEntry)?,
            );
        }
        Ok(selected)
    }

    /// Creates a new entry and returns its index.
    ///
    /// The fresh entry has an all-zero history and weight zero. If the
    /// table is full and auto-removal is enabled, the lowest-weight entry
    /// (random tie-break) is evicted and its index reused; otherwise the
    /// call fails with [`NoCapacity`][BhptError::NoCapacity].
    pub fn insert(&mut self) -> Result<usize> {
        if let Some(index) = self.valid.first_clear() {
            self.valid.insert(index);
            // The zero-filled history still carries weight when the minimal
            // weight state position is enabled.
            self.update_weight(index);
            debug!("insert: using free entry {}", index);
            return Ok(index);
        }

        if self.capacity() == 0 || !self.auto_remove {
            return Err(BhptError::NoCapacity {
                capacity: self.capacity(),
            });
        }

        let index = self.evict_min();
        self.valid.insert(index);
        self.update_weight(index);
        Ok(index)
    }

    /// Creates a new entry and pushes `states` to it, oldest first.
    pub fn insert_with(&mut self, states: &[bool]) -> Result<usize> {
        let index = self.insert()?;
        self.assign(index, states)?;
        Ok(index)
    }

    /// Evicts one entry whose cached weight equals the minimum over all
    /// valid entries, chosen uniformly among ties. The table must be full.
    fn evict_min(&mut self) -> usize {
        self.engine.recompute_dirty(&self.history, &self.valid);

        let mut minimum = f64::INFINITY;
        let mut ties: Vec<usize> = Vec::new();
        for entry in self.valid.iter() {
            let w = self.engine.weight(entry);
            if w < minimum {
                minimum = w;
                ties.clear();
                ties.push(entry);
            } else if w == minimum {
                ties.push(entry);
            }
        }

        let victim = if ties.len() == 1 {
            ties[0]
        } else {
            ties[self.rng.random_range(0..ties.len())]
        };
        debug!(
            "insert: evicting entry {} (weight {}, {} tied)",
            victim,
            minimum,
            ties.len()
        );
        self.remove_entry(victim);
        victim
    }

    /// Frees the entry at `index`.
    ///
    /// The history is zeroed and the cached weight drops to zero, so the
    /// entry can no longer be selected. Removing an already-free entry is a
    /// no-op.
    pub fn remove(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        if !self.valid.contains(index) {
            return Ok(());
        }
        self.remove_entry(index);
        Ok(())
    }

    fn remove_entry(&mut self, index: usize) {
        debug!("remove(index = {})", index);
        self.valid.remove(index);
        self.history.clear_row(index);
        self.engine.reset(index);
        self.dist.invalidate();
    }

    /// Sets the minimal weight state position.
    ///
    /// Any negative value disables the override; a non-negative value must
    /// be below the consideration depth. The weight function changed, so
    /// every weight is recomputed before the next selection.
    pub fn set_mwsp(&mut self, mwsp: i32) -> Result<()> {
        if mwsp >= self.consideration() as i32 {
            return Err(BhptError::InvalidArgument(format!(
                "minimal weight state position {} is outside [-1, {})",
                mwsp,
                self.consideration()
            )));
        }
        debug!("set_mwsp({})", mwsp);
        self.engine.set_mwsp(mwsp);
        self.dist.invalidate();
        Ok(())
    }

    /// Sets the defer flag.
    ///
    /// Toggling never invalidates existing weights; it only changes whether
    /// future pushes recompute immediately or in bulk at selection time.
    pub fn set_defer(&mut self, defer: bool) {
        debug!("set_defer({})", defer);
        self.defer = defer;
    }
}

impl<W: WeightFunction> Debug for Bhpt<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bhpt")
            .field("capacity", &self.capacity())
            .field("history_length", &self.history_length())
            .field("consideration", &self.consideration())
            .field("mwsp", &self.mwsp())
            .field("defer", &self.defer)
            .field("auto_remove", &self.auto_remove)
            .field("len", &self.len())
            .finish()
    }
}
