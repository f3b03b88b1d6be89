//! # Runtime-Tunable Simulation Parameters
//!
//! All workload and protocol cadence knobs live in one [`SimParams`]
//! snapshot behind a [`ParamsHandle`]. Inspection tooling is the single
//! writer (via the control path); actors take cheap snapshots each loop
//! iteration and tolerate eventually-applied updates.

use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Inclusive `[min, max]` range used for randomized periods (seconds) and
/// counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedRange {
    pub min: u64,
    pub max: u64,
}

impl BoundedRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Random period within `[min, max]` seconds, millisecond resolution.
    pub fn sample_period<R: Rng>(&self, rng: &mut R) -> Duration {
        let low = self.min * 1000;
        let high = self.max.max(self.min) * 1000;
        Duration::from_millis(rng.gen_range(low..=high))
    }

    /// Random count within `[min, max]`.
    pub fn sample_count<R: Rng>(&self, rng: &mut R) -> usize {
        rng.gen_range(self.min..=self.max.max(self.min)) as usize
    }
}

/// One coherent snapshot of every tunable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    /// Number of shard chains (actors are this many plus the beacon).
    pub shard_count: usize,
    /// Probability a finalization attempt succeeds; failures skip the
    /// round silently.
    pub finalize_probability: f64,
    /// Beacon finalization cadence, seconds.
    pub finalize_period: BoundedRange,
    /// Probability a block-generation tick produces a block.
    pub block_probability: f64,
    /// Shard block-generation cadence, seconds.
    pub block_period: BoundedRange,
    /// Probability a new block extends the longest valid chain rather than
    /// one of the two alternates (fork simulation).
    pub build_on_longest_probability: f64,
    /// Incoming transactions claimed per block.
    pub block_tx_in: BoundedRange,
    /// Outgoing transactions emitted per block.
    pub block_tx_out: BoundedRange,
    /// Shard transaction-generation cadence, seconds.
    pub tx_period: BoundedRange,
    /// Transactions created per generation tick.
    pub tx_batch: BoundedRange,
    /// Upper bound on a shard's outgoing-transaction pool.
    pub tx_pool_size: usize,
    /// Prune remote shard chains at each finalized block. Off by default:
    /// pruning trades replay-ability of the tree for bounded memory.
    pub prune_remote_on_finalize: bool,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            shard_count: 4,
            finalize_probability: 0.8,
            finalize_period: BoundedRange::new(3, 5),
            block_probability: 1.0,
            block_period: BoundedRange::new(1, 3),
            build_on_longest_probability: 0.9,
            block_tx_in: BoundedRange::new(1, 4),
            block_tx_out: BoundedRange::new(1, 4),
            tx_period: BoundedRange::new(1, 2),
            tx_batch: BoundedRange::new(1, 3),
            tx_pool_size: 20,
            prune_remote_on_finalize: false,
        }
    }
}

/// Shared, runtime-mutable view of [`SimParams`].
#[derive(Debug, Clone, Default)]
pub struct ParamsHandle {
    inner: Arc<RwLock<SimParams>>,
}

impl ParamsHandle {
    pub fn new(params: SimParams) -> Self {
        Self {
            inner: Arc::new(RwLock::new(params)),
        }
    }

    /// A coherent copy of the current parameters.
    pub fn snapshot(&self) -> SimParams {
        self.inner.read().clone()
    }

    /// Apply a mutation atomically. Single-writer by convention: only the
    /// control path calls this.
    pub fn update(&self, apply: impl FnOnce(&mut SimParams)) {
        apply(&mut self.inner.write());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sample_period_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = BoundedRange::new(1, 3);
        for _ in 0..100 {
            let period = range.sample_period(&mut rng);
            assert!(period >= Duration::from_secs(1));
            assert!(period <= Duration::from_secs(3));
        }
    }

    #[test]
    fn degenerate_range_is_constant() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = BoundedRange::new(2, 2);
        assert_eq!(range.sample_count(&mut rng), 2);
        assert_eq!(range.sample_period(&mut rng), Duration::from_secs(2));
    }

    #[test]
    fn params_updates_are_visible_to_other_handles() {
        let handle = ParamsHandle::new(SimParams::default());
        let reader = handle.clone();
        handle.update(|p| p.finalize_probability = 0.25);
        assert_eq!(reader.snapshot().finalize_probability, 0.25);
    }
}
