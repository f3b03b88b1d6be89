//! # Consistency Validation
//!
//! Re-derives the `valid` flag of the unfinalized suffix from the caller's
//! current view of what other shards have produced and not yet consumed.
//! The pass is safe to re-run on any arrival order of blocks and
//! finalizations: given the same available-outgoing view it converges to
//! the same flags.

use crate::chain::{Chain, NodeId};
use shared_types::{remove_tx, Transaction};

impl Chain {
    /// Top-down re-validation from the finalized frontier.
    ///
    /// A node is valid iff every transaction in its incoming list can be
    /// matched and removed from `available_outgoing`; one missing match
    /// invalidates the node and, unconditionally, its whole subtree.
    /// Each child recurses with its own copy of the remaining list —
    /// siblings are competing futures and must not see each other's
    /// consumption.
    ///
    /// Finalized nodes are skipped: their incoming claims were justified by
    /// the round that finalized them, and the transactions that justified
    /// them have left the available set for good.
    pub fn update_consistency(&mut self, available_outgoing: &[Transaction]) {
        self.validate(self.last_finalized(), available_outgoing.to_vec());
    }

    fn validate(&mut self, id: NodeId, mut available: Vec<Transaction>) {
        if !self.node(id).finalized() {
            self.node_mut(id).valid = true;
            let incoming = self.node(id).block().incoming.clone();
            for tx in &incoming {
                if !remove_tx(tx, &mut available) {
                    self.invalidate_subtree(id);
                    return;
                }
            }
        }
        let children = self.node(id).children().to_vec();
        for child in children {
            self.validate(child, available.clone());
        }
    }

    /// Invalidity is monotone downward: poison the node and everything
    /// under it.
    fn invalidate_subtree(&mut self, id: NodeId) {
        self.node_mut(id).valid = false;
        let children = self.node(id).children().to_vec();
        for child in children {
            self.invalidate_subtree(child);
        }
    }
}
