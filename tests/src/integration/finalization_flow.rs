//! # Consistency + Finalization Flow
//!
//! Drives a replicated [`ChainSet`] through multi-round scenarios the way
//! the actors do — insert blocks, refresh consistency against the other
//! shards' published outgoing lists, run a fixed-point round, apply it —
//! and checks the structural invariants of the resulting projections.

#[cfg(test)]
mod tests {
    use crate::support::{
        assert_snapshot_invariants, extend, frontier_digest, genesis_digest, refresh_consistency,
    };
    use shared_types::{Finalization, Transaction};
    use sim_chain::{ChainSet, NodeStatus};
    use sim_finality::propose_finalization;

    /// Mark each round's frontier on every chain and return the new record,
    /// the way every actor applies a received finalization.
    fn apply(chains: &mut ChainSet, finalization: &Finalization) {
        for block in &finalization.blocks {
            chains
                .get_mut(block.shard)
                .unwrap()
                .finalize(&block.digest);
        }
    }

    #[test]
    fn consistent_transfer_finalizes_end_to_end() {
        let mut chains = ChainSet::new(2);
        let tx = Transaction::new(1, 2, "payment");
        let g1 = genesis_digest(chains.get(1).unwrap());
        let g2 = genesis_digest(chains.get(2).unwrap());
        let b1 = extend(&mut chains, 1, g1, vec![], vec![tx.clone()]);
        let b2 = extend(&mut chains, 2, g2, vec![tx], vec![]);
        refresh_consistency(&mut chains, 1);
        refresh_consistency(&mut chains, 2);

        let round = propose_finalization(&chains, &Finalization::genesis());
        apply(&mut chains, &round);

        assert_eq!(round.height, 1);
        assert!(round.inconsistent_transactions.is_empty());
        assert_eq!(frontier_digest(&chains, 1), b1.digest);
        assert_eq!(frontier_digest(&chains, 2), b2.digest);
        for shard in 1..=2 {
            assert_snapshot_invariants(&chains.get(shard).unwrap().snapshot());
        }
    }

    #[test]
    fn fabricated_claim_is_quarantined_before_finalization() {
        let mut chains = ChainSet::new(2);
        let phantom = Transaction::new(1, 2, "never emitted");
        let g2 = genesis_digest(chains.get(2).unwrap());
        let honest = extend(&mut chains, 2, g2, vec![], vec![]);
        let bogus = extend(&mut chains, 2, g2, vec![phantom], vec![]);
        refresh_consistency(&mut chains, 2);

        // validation isolates the fabricated branch; the honest sibling
        // remains the longest valid chain
        let chain = chains.get(2).unwrap();
        let honest_id = chain.search(&honest.digest).unwrap();
        let bogus_id = chain.search(&bogus.digest).unwrap();
        assert!(chain.node(honest_id).valid());
        assert!(!chain.node(bogus_id).valid());
        assert_eq!(chain.node_status(bogus_id), NodeStatus::Invalid);
        assert_eq!(chain.longest_chains(1, true)[0], honest_id);
        assert_snapshot_invariants(&chain.snapshot());
    }

    #[test]
    fn fabricated_branch_never_enters_a_round() {
        // the fabricated branch is inserted first, so it wins the
        // first-seen tie-break and becomes the coordinator's canonical
        // snapshot; the unbacked claim must still pin the frontier
        let mut chains = ChainSet::new(2);
        let phantom = Transaction::new(1, 2, "never emitted");
        let g2 = genesis_digest(chains.get(2).unwrap());
        extend(&mut chains, 2, g2, vec![phantom], vec![]);
        extend(&mut chains, 2, g2, vec![], vec![]);

        let round = propose_finalization(&chains, &Finalization::genesis());
        let finalized_2 = round.blocks.iter().find(|b| b.shard == 2).unwrap();
        assert_eq!(finalized_2.digest, g2);
        assert!(round.inconsistent_transactions.is_empty());
    }

    #[test]
    fn carryover_settles_across_three_rounds() {
        let mut chains = ChainSet::new(3);
        let tx_a = Transaction::new(1, 2, "hop one");
        let tx_b = Transaction::new(2, 3, "hop two");
        let g1 = genesis_digest(chains.get(1).unwrap());
        let b1 = extend(&mut chains, 1, g1, vec![], vec![tx_a.clone()]);

        // round one: nobody has claimed tx_a yet
        let round_one = propose_finalization(&chains, &Finalization::genesis());
        apply(&mut chains, &round_one);
        assert_eq!(round_one.inconsistent_transactions, vec![tx_a.clone()]);
        assert_eq!(frontier_digest(&chains, 1), b1.digest);

        // round two: shard 2 claims the carryover and emits its own hop
        let g2 = genesis_digest(chains.get(2).unwrap());
        let b2 = extend(&mut chains, 2, g2, vec![tx_a], vec![tx_b.clone()]);
        let round_two = propose_finalization(&chains, &round_one);
        apply(&mut chains, &round_two);
        assert_eq!(round_two.height, 2);
        assert_eq!(round_two.inconsistent_transactions, vec![tx_b.clone()]);
        assert_eq!(frontier_digest(&chains, 2), b2.digest);

        // round three: shard 3 claims the second hop and the ledger settles
        let g3 = genesis_digest(chains.get(3).unwrap());
        let b3 = extend(&mut chains, 3, g3, vec![tx_b], vec![]);
        let round_three = propose_finalization(&chains, &round_two);
        apply(&mut chains, &round_three);
        assert_eq!(round_three.height, 3);
        assert!(round_three.inconsistent_transactions.is_empty());
        assert_eq!(frontier_digest(&chains, 3), b3.digest);

        for shard in 1..=3 {
            assert_snapshot_invariants(&chains.get(shard).unwrap().snapshot());
        }
    }

    #[test]
    fn forked_shard_finalizes_one_branch_and_discards_the_other() {
        let mut chains = ChainSet::new(2);
        let g1 = genesis_digest(chains.get(1).unwrap());
        let kept = extend(&mut chains, 1, g1, vec![], vec![]);
        let kept_child = extend(&mut chains, 1, kept.digest, vec![], vec![]);
        let stale = extend(&mut chains, 1, g1, vec![], vec![]);

        let round = propose_finalization(&chains, &Finalization::genesis());
        apply(&mut chains, &round);

        assert_eq!(frontier_digest(&chains, 1), kept_child.digest);
        let chain = chains.get(1).unwrap();
        let stale_id = chain.search(&stale.digest).unwrap();
        assert!(!chain.node(stale_id).finalized());
        assert_eq!(chain.node_status(stale_id), NodeStatus::Stale);
        assert_snapshot_invariants(&chain.snapshot());
    }
}
