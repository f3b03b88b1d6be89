//! # Read-Only Query Surface
//!
//! The handle inspection tooling (e.g. a visualizer) uses to observe any
//! actor's private replicas without engaging the actor itself: queries
//! take short read locks on the observed state and work while the actor is
//! paused. Tooling mutates engine state only by sending control commands
//! through the hub.

use crate::beacon::BeaconState;
use crate::shard::ShardState;
use parking_lot::RwLock;
use shared_types::{Hash, QueryError, ShardId, BEACON_ID};
use sim_chain::{ChainSet, ChainSnapshot};
use std::sync::Arc;

/// Read-only access to every actor's replicas. Observer `0` is the beacon;
/// observers `1..=shard_count` are the shard actors.
#[derive(Clone)]
pub struct QueryHandle {
    beacon: Arc<RwLock<BeaconState>>,
    shards: Vec<Arc<RwLock<ShardState>>>,
}

impl QueryHandle {
    pub(crate) fn new(
        beacon: Arc<RwLock<BeaconState>>,
        shards: Vec<Arc<RwLock<ShardState>>>,
    ) -> Self {
        Self { beacon, shards }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn with_chains<T>(
        &self,
        observer: ShardId,
        read: impl FnOnce(&ChainSet) -> T,
    ) -> Result<T, QueryError> {
        if observer == BEACON_ID {
            return Ok(read(&self.beacon.read().chains));
        }
        match self.shards.get(observer - 1) {
            Some(state) => Ok(read(&state.read().chains)),
            None => Err(QueryError::UnknownObserver {
                observer,
                actor_max: self.shards.len(),
            }),
        }
    }

    fn require_shard<T>(&self, shard: ShardId, found: Option<T>) -> Result<T, QueryError> {
        found.ok_or(QueryError::UnknownShard {
            shard,
            shard_count: self.shards.len(),
        })
    }

    /// Serializable projection of `shard`'s chain as seen by `observer`.
    pub fn chain_snapshot(
        &self,
        observer: ShardId,
        shard: ShardId,
    ) -> Result<ChainSnapshot, QueryError> {
        let found = self.with_chains(observer, |chains| chains.get(shard).map(|c| c.snapshot()))?;
        self.require_shard(shard, found)
    }

    /// Box-drawing rendering of `shard`'s chain as seen by `observer`.
    pub fn render_chain(&self, observer: ShardId, shard: ShardId) -> Result<String, QueryError> {
        let found = self.with_chains(observer, |chains| chains.get(shard).map(|c| c.render()))?;
        self.require_shard(shard, found)
    }

    /// Digest and height of the longest valid tip of `shard`'s chain as
    /// seen by `observer`.
    pub fn longest_tip(
        &self,
        observer: ShardId,
        shard: ShardId,
    ) -> Result<(Hash, u64), QueryError> {
        let found = self.with_chains(observer, |chains| {
            chains.get(shard).map(|chain| {
                let tip = chain.longest_chains(1, true)[0];
                (chain.node(tip).block().digest, chain.node(tip).height())
            })
        })?;
        self.require_shard(shard, found)
    }

    /// Digests of every block in `shard`'s chain (as seen by `observer`)
    /// whose outgoing list contains the transaction digest.
    pub fn blocks_with_outgoing(
        &self,
        observer: ShardId,
        shard: ShardId,
        tx_digest: &Hash,
    ) -> Result<Vec<Hash>, QueryError> {
        let found = self.with_chains(observer, |chains| {
            chains.get(shard).map(|chain| {
                chain
                    .blocks_with_outgoing(tx_digest)
                    .into_iter()
                    .map(|id| chain.node(id).block().digest)
                    .collect()
            })
        })?;
        self.require_shard(shard, found)
    }

    /// Height of the most recent finalization round `observer` has applied.
    pub fn finalization_height(&self, observer: ShardId) -> Result<u64, QueryError> {
        if observer == BEACON_ID {
            return Ok(self.beacon.read().finalization.height);
        }
        match self.shards.get(observer - 1) {
            Some(state) => Ok(state.read().finalization.height),
            None => Err(QueryError::UnknownObserver {
                observer,
                actor_max: self.shards.len(),
            }),
        }
    }
}
