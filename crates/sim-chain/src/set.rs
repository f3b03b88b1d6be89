//! One [`Chain`] replica per shard, indexed by 1-based shard id.

use crate::chain::Chain;
use shared_types::ShardId;

/// An actor's private view of every shard's chain. Replicas converge only
/// through message application; no `ChainSet` is ever shared between two
/// actors.
pub struct ChainSet {
    chains: Vec<Chain>,
}

impl ChainSet {
    /// Fresh genesis-only replicas for shards `1..=shard_count`.
    pub fn new(shard_count: usize) -> Self {
        Self {
            chains: (1..=shard_count).map(Chain::new).collect(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.chains.len()
    }

    /// `None` when the shard id is out of range — callers degrade to a
    /// no-op rather than aborting.
    pub fn get(&self, shard: ShardId) -> Option<&Chain> {
        shard.checked_sub(1).and_then(|index| self.chains.get(index))
    }

    pub fn get_mut(&mut self, shard: ShardId) -> Option<&mut Chain> {
        shard
            .checked_sub(1)
            .and_then(|index| self.chains.get_mut(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chain> {
        self.chains.iter()
    }
}
