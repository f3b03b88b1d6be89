//! # Fixed-Point Round Construction
//!
//! One successful finalization attempt:
//!
//! 1. Snapshot each shard's canonical tip and previously finalized tip;
//!    seed each producer's overflow with last round's unmatched
//!    transactions.
//! 2. Scan all shards repeatedly, advancing each shard's frontier one
//!    block toward its snapshot whenever every incoming claim of the
//!    candidate block is present in its producer's overflow; stop when a
//!    full pass advances nobody.
//! 3. Assemble the new frontier (one block per shard) and carry every
//!    still-unmatched overflow entry forward.

use crate::round::ShardRound;
use shared_types::{contains_tx, remove_tx, Finalization};
use sim_chain::{Chain, ChainSet, NodeId};
use tracing::{debug, trace};

/// Build the next finalization round over the coordinator's replicas.
/// Scans shards in ascending id order; the result is independent of the
/// scan order (see [`propose_finalization_ordered`]).
pub fn propose_finalization(chains: &ChainSet, previous: &Finalization) -> Finalization {
    let order: Vec<usize> = (0..chains.shard_count()).collect();
    propose_finalization_ordered(chains, previous, &order)
}

/// [`propose_finalization`] with an explicit scan order over shard indices
/// (`0` = shard 1). The fixed point makes the finalized frontier and the
/// carried-over transaction set invariant under permutation; the order
/// parameter exists to make that property directly testable.
pub fn propose_finalization_ordered(
    chains: &ChainSet,
    previous: &Finalization,
    order: &[usize],
) -> Finalization {
    // round state per shard, always in shard order regardless of scan order
    let mut rounds: Vec<ShardRound> = chains
        .iter()
        .map(|chain| {
            ShardRound::new(
                chain.shard(),
                chain.longest_chains(1, false)[0],
                chain.last_finalized(),
            )
        })
        .collect();

    // last round's unmatched transactions re-enter at their producer
    for tx in &previous.inconsistent_transactions {
        if let Some(round) = rounds.iter_mut().find(|r| r.shard == tx.source_shard) {
            round.outgoing_overflow.push(tx.clone());
        }
    }

    // fixed point: one shard's advancement can unblock another's
    let mut advanced = true;
    while advanced {
        advanced = false;
        for &index in order {
            if index < rounds.len() && try_advance_shard(index, &mut rounds, chains) {
                advanced = true;
            }
        }
    }

    let mut blocks = Vec::with_capacity(rounds.len());
    let mut inconsistent = Vec::new();
    for round in rounds {
        let Some(chain) = chains.get(round.shard) else {
            continue;
        };
        trace!(
            shard = round.shard,
            height = chain.node(round.new_finalized).height(),
            matched = round.incoming_matched.len(),
            unmatched = round.outgoing_overflow.len(),
            "shard round settled"
        );
        blocks.push(chain.node(round.new_finalized).block().clone());
        inconsistent.extend(round.outgoing_overflow);
    }

    debug!(
        height = previous.height + 1,
        carried = inconsistent.len(),
        "assembled finalization round"
    );
    Finalization {
        height: previous.height + 1,
        blocks,
        inconsistent_transactions: inconsistent,
    }
}

/// Try to advance one shard's frontier a single block toward its canonical
/// snapshot. Succeeds only when every incoming transaction the candidate
/// claims is currently present in the producing shard's overflow; on
/// success those claims are consumed and the candidate's outgoing
/// transactions are published to this shard's overflow.
fn try_advance_shard(index: usize, rounds: &mut [ShardRound], chains: &ChainSet) -> bool {
    let (shard, canonical, current) = {
        let round = &rounds[index];
        (round.shard, round.canonical_tip, round.new_finalized)
    };
    let Some(chain) = chains.get(shard) else {
        return false;
    };
    let Some(candidate) = next_toward(chain, canonical, current) else {
        return false;
    };
    let block = chain.node(candidate).block();

    // all-or-nothing: check every claim before consuming any
    for tx in &block.incoming {
        let Some(producer) = rounds.iter().find(|r| r.shard == tx.source_shard) else {
            return false;
        };
        if !contains_tx(tx, &producer.outgoing_overflow) {
            return false;
        }
    }

    for tx in &block.incoming {
        if let Some(producer) = rounds.iter_mut().find(|r| r.shard == tx.source_shard) {
            remove_tx(tx, &mut producer.outgoing_overflow);
        }
        rounds[index].incoming_matched.push(tx.clone());
    }
    rounds[index]
        .outgoing_overflow
        .extend(block.outgoing.iter().cloned());
    rounds[index].new_finalized = candidate;
    true
}

/// Walk the canonical snapshot's ancestor chain backward until the block
/// one step beyond `current`. `None` when there is nothing to advance to,
/// or when the snapshot does not descend from `current`.
fn next_toward(chain: &Chain, canonical: NodeId, current: NodeId) -> Option<NodeId> {
    if canonical == current {
        return None;
    }
    let mut next = canonical;
    loop {
        match chain.node(next).parent() {
            Some(parent) if parent == current => return Some(next),
            Some(parent) => next = parent,
            None => return None,
        }
    }
}
