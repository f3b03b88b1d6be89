//! # Test Support
//!
//! Scenario builders over a [`ChainSet`] and structural invariant checks
//! over [`ChainSnapshot`] projections, shared by the integration tests.

use shared_types::{Block, Hash, ShardId, Transaction};
use sim_chain::{Chain, ChainSet, ChainSnapshot};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Digest of a shard chain's root block.
pub fn genesis_digest(chain: &Chain) -> Hash {
    chain.node(chain.genesis()).block().digest
}

/// Digest of the last finalized block of `shard` in `chains`.
pub fn frontier_digest(chains: &ChainSet, shard: ShardId) -> Hash {
    let chain = chains.get(shard).unwrap();
    chain.node(chain.last_finalized()).block().digest
}

/// Insert a block extending `parent` on `shard`, panicking on orphans.
/// Returns the sealed block so callers can chain on its digest.
///
/// Every call stamps a unique validator tag: siblings with identical
/// transaction lists must still get distinct digests.
pub fn extend(
    chains: &mut ChainSet,
    shard: ShardId,
    parent: Hash,
    incoming: Vec<Transaction>,
    outgoing: Vec<Transaction>,
) -> Block {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let block = Block::new(shard, parent, incoming, outgoing, format!("test-v{shard}-{seq}"));
    chains
        .get_mut(shard)
        .unwrap()
        .insert(block.clone())
        .unwrap_or_else(|| panic!("block orphaned on shard {shard}"));
    block
}

/// Re-run consistency validation on `shard` against the outgoing lists of
/// every other shard's longest chain, the way a shard actor refreshes its
/// replica after applying remote blocks.
pub fn refresh_consistency(chains: &mut ChainSet, shard: ShardId) {
    let available: Vec<Transaction> = chains
        .iter()
        .filter(|chain| chain.shard() != shard)
        .flat_map(|chain| chain.longest_chain_outgoing())
        .filter(|tx| tx.target_shard == shard)
        .collect();
    chains
        .get_mut(shard)
        .unwrap()
        .update_consistency(&available);
}

/// Structural invariants every chain projection must satisfy:
///
/// - exactly one root, and it is the first node emitted;
/// - every non-root parent digest resolves within the snapshot;
/// - a finalized node's parent is finalized (prefix-closed finality);
/// - an invalid node's descendants are all invalid (downward-closed
///   invalidity).
pub fn assert_snapshot_invariants(snapshot: &ChainSnapshot) {
    let by_digest: HashMap<Hash, usize> = snapshot
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.digest, index))
        .collect();
    assert_eq!(by_digest.len(), snapshot.nodes.len(), "duplicate digests");

    for (index, node) in snapshot.nodes.iter().enumerate() {
        match node.parent_digest {
            None => assert_eq!(index, 0, "root must be emitted first"),
            Some(parent_digest) => {
                let parent = &snapshot.nodes[*by_digest
                    .get(&parent_digest)
                    .unwrap_or_else(|| panic!("dangling parent at height {}", node.height))];
                assert_eq!(parent.height + 1, node.height);
                if node.finalized {
                    assert!(parent.finalized, "finalized node under unfinalized parent");
                }
                if !parent.valid {
                    assert!(!node.valid, "valid node under invalid parent");
                }
            }
        }
    }
    assert!(
        by_digest.contains_key(&snapshot.last_finalized),
        "finalized frontier missing from snapshot"
    );
}
