//! Per-shard working state for one finalization round.

use shared_types::{ShardId, Transaction};
use sim_chain::NodeId;

/// Transient coordinator-internal state for one shard during one round.
/// Created at round start, consumed at assembly; never outlives the
/// `propose_finalization` call that built it.
#[derive(Debug)]
pub struct ShardRound {
    /// The shard this state belongs to.
    pub shard: ShardId,
    /// The shard's longest chain tip, snapshotted at round start. The
    /// round never advances past it.
    pub canonical_tip: NodeId,
    /// Advances block by block during the fixed point; starts at the
    /// previously finalized tip.
    pub new_finalized: NodeId,
    /// Outgoing transactions this shard has published and no shard has
    /// consumed yet — seeded from last round's unmatched carryover, grown
    /// by every block this round finalizes, drained by consumers.
    pub outgoing_overflow: Vec<Transaction>,
    /// Incoming transactions matched for this shard during the round.
    pub incoming_matched: Vec<Transaction>,
}

impl ShardRound {
    pub fn new(shard: ShardId, canonical_tip: NodeId, new_finalized: NodeId) -> Self {
        Self {
            shard,
            canonical_tip,
            new_finalized,
            outgoing_overflow: Vec::new(),
            incoming_matched: Vec::new(),
        }
    }
}
