//! # Core Ledger Entities
//!
//! Immutable, content-addressed records exchanged between actors. A record's
//! digest is computed once over all other fields and is the sole identity and
//! equality key used anywhere in the system — lists are searched by digest,
//! chain nodes are located by digest, and an accidental digest collision is
//! treated as "same entity".

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A 32-byte content digest (SHA-256).
pub type Hash = [u8; 32];

/// Shard identifier. Shards are numbered `1..=shard_count`.
pub type ShardId = usize;

/// Actor id of the beacon; shard actors take `1..=shard_count`.
pub const BEACON_ID: ShardId = 0;

/// Control command broadcast to every actor. Fire-and-forget: no
/// acknowledgement is ever returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Resume processing blocks, finalizations, and timers.
    Run,
    /// Idle until the next command; consumes no other input.
    Pause,
    /// Terminal: stop the actor within one wait cycle.
    Exit,
}

/// A cross-shard transaction: produced by `source_shard`, addressed to
/// `target_shard`. Removed from pools and accounting lists only by digest
/// match, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Shard that emitted this transaction.
    pub source_shard: ShardId,
    /// Shard this transaction is addressed to.
    pub target_shard: ShardId,
    /// Content digest; sole identity key.
    pub digest: Hash,
    /// Opaque payload (the workload generator fills in arbitrary text).
    pub payload: String,
}

impl Transaction {
    /// Create a transaction and seal its digest.
    pub fn new(source_shard: ShardId, target_shard: ShardId, payload: impl Into<String>) -> Self {
        let mut tx = Self {
            source_shard,
            target_shard,
            digest: [0u8; 32],
            payload: payload.into(),
        };
        tx.digest = tx.compute_digest();
        tx
    }

    fn compute_digest(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update((self.source_shard as u64).to_le_bytes());
        hasher.update((self.target_shard as u64).to_le_bytes());
        hasher.update(self.payload.as_bytes());
        hasher.finalize().into()
    }
}

/// A block produced by one shard. `incoming` lists the cross-shard
/// transactions this block claims arrived from other shards; `outgoing`
/// lists the transactions it emits toward other shards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Producing shard.
    pub shard: ShardId,
    /// Content digest over all other fields; sole identity key.
    pub digest: Hash,
    /// Digest of the parent block in the producing shard's chain.
    pub parent_digest: Hash,
    /// Cross-shard transactions claimed as received.
    pub incoming: Vec<Transaction>,
    /// Cross-shard transactions emitted toward other shards.
    pub outgoing: Vec<Transaction>,
    /// Producer label. Identity only — no signature semantics.
    pub validator: String,
}

impl Block {
    /// Create a block and seal its digest.
    pub fn new(
        shard: ShardId,
        parent_digest: Hash,
        incoming: Vec<Transaction>,
        outgoing: Vec<Transaction>,
        validator: impl Into<String>,
    ) -> Self {
        let mut block = Self {
            shard,
            digest: [0u8; 32],
            parent_digest,
            incoming,
            outgoing,
            validator: validator.into(),
        };
        block.digest = block.compute_digest();
        block
    }

    /// The genesis block of a shard chain. Its digest is derived from the
    /// shard label alone, so every replica of the same shard's chain roots
    /// at an identical node.
    pub fn genesis(shard: ShardId) -> Self {
        let mut block = Self {
            shard,
            digest: [0u8; 32],
            parent_digest: [0u8; 32],
            incoming: Vec::new(),
            outgoing: Vec::new(),
            validator: String::from("genesis"),
        };
        let mut hasher = Sha256::new();
        hasher.update(b"shard genesis ");
        hasher.update((shard as u64).to_le_bytes());
        block.digest = hasher.finalize().into();
        block
    }

    fn compute_digest(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update((self.shard as u64).to_le_bytes());
        hasher.update(self.parent_digest);
        // length framing keeps the two variable-length sequences unambiguous
        hasher.update((self.incoming.len() as u64).to_le_bytes());
        for tx in &self.incoming {
            hasher.update(tx.digest);
        }
        hasher.update((self.outgoing.len() as u64).to_le_bytes());
        for tx in &self.outgoing {
            hasher.update(tx.digest);
        }
        hasher.update(self.validator.as_bytes());
        hasher.finalize().into()
    }
}

/// One finalization round: the newly finalized frontier (one block per
/// shard) plus the outgoing transactions that could not be matched to any
/// incoming claim this round and roll forward to the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finalization {
    /// Monotonically increasing round counter.
    pub height: u64,
    /// Newly finalized tip of each shard, in shard order.
    pub blocks: Vec<Block>,
    /// Outgoing transactions carried to the next round, unmatched.
    pub inconsistent_transactions: Vec<Transaction>,
}

impl Finalization {
    /// The round-zero record every actor starts from: nothing finalized
    /// beyond genesis, nothing carried over.
    pub fn genesis() -> Self {
        Self {
            height: 0,
            blocks: Vec::new(),
            inconsistent_transactions: Vec::new(),
        }
    }
}

impl Default for Finalization {
    fn default() -> Self {
        Self::genesis()
    }
}

/// Digest-equality membership test.
pub fn contains_tx(tx: &Transaction, list: &[Transaction]) -> bool {
    list.iter().any(|candidate| candidate.digest == tx.digest)
}

/// Remove the first digest-equal entry from `list`; returns whether an
/// entry was removed. Order of the remaining entries is not preserved.
pub fn remove_tx(tx: &Transaction, list: &mut Vec<Transaction>) -> bool {
    match list.iter().position(|candidate| candidate.digest == tx.digest) {
        Some(index) => {
            list.swap_remove(index);
            true
        }
        None => false,
    }
}
