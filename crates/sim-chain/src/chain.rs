//! # Fork-Choice Block Tree
//!
//! [`Chain`] stores one shard's block tree as an arena: nodes own their
//! child-id lists and hold a non-owning parent id, so pruning is a single
//! re-rooting step and no reference cycles exist. Detached prefixes stay in
//! the arena as unreachable garbage; every lookup is reachability-based, so
//! they are invisible.

use shared_types::{Block, Hash, ShardId, Transaction};
use tracing::debug;

/// Stable handle into a [`Chain`]'s node arena.
///
/// Handles are never invalidated: the arena only grows, and pruning merely
/// makes nodes unreachable from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// A tree node wrapping one immutable [`Block`].
#[derive(Debug, Clone)]
pub struct ChainNode {
    pub(crate) block: Block,
    pub(crate) height: u64,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) valid: bool,
    pub(crate) finalized: bool,
    /// Layout hint for visualization (sibling index at insertion time).
    /// Never consulted by any algorithm.
    pub(crate) lane: usize,
}

impl ChainNode {
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// Distance from the genesis node.
    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Provisional acceptance; cleared when an incoming claim cannot be
    /// matched (and then cleared on every descendant).
    pub fn valid(&self) -> bool {
        self.valid
    }

    /// Permanently committed by a finalization round. Prefix-closed along
    /// the canonical path.
    pub fn finalized(&self) -> bool {
        self.finalized
    }

    pub fn lane(&self) -> usize {
        self.lane
    }
}

/// One shard's block tree, per observer.
pub struct Chain {
    shard: ShardId,
    arena: Vec<ChainNode>,
    genesis: NodeId,
    last_finalized: NodeId,
}

impl Chain {
    /// A fresh chain holding only the shard's genesis node
    /// (`height = 0`, valid, finalized).
    pub fn new(shard: ShardId) -> Self {
        let genesis = ChainNode {
            block: Block::genesis(shard),
            height: 0,
            parent: None,
            children: Vec::new(),
            valid: true,
            finalized: true,
            lane: 0,
        };
        Self {
            shard,
            arena: vec![genesis],
            genesis: NodeId(0),
            last_finalized: NodeId(0),
        }
    }

    pub fn shard(&self) -> ShardId {
        self.shard
    }

    pub fn genesis(&self) -> NodeId {
        self.genesis
    }

    /// The most recently finalized node (genesis until the first round).
    pub fn last_finalized(&self) -> NodeId {
        self.last_finalized
    }

    pub fn node(&self, id: NodeId) -> &ChainNode {
        &self.arena[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut ChainNode {
        &mut self.arena[id.0]
    }

    /// Insert a block under the node matching its parent digest.
    ///
    /// Returns the new node's id, or `None` when the parent is unknown: the
    /// block is an orphan and is dropped without retry — a finalization
    /// prune may legitimately have removed the parent, and the simulated
    /// network guarantees neither delivery nor ordering across queues.
    pub fn insert(&mut self, block: Block) -> Option<NodeId> {
        let Some(parent) = self.search(&block.parent_digest) else {
            debug!(shard = self.shard, "dropping orphan block");
            return None;
        };
        let id = NodeId(self.arena.len());
        let node = ChainNode {
            height: self.node(parent).height + 1,
            lane: self.node(parent).children.len(),
            block,
            parent: Some(parent),
            children: Vec::new(),
            valid: true,
            finalized: false,
        };
        self.arena.push(node);
        self.node_mut(parent).children.push(id);
        Some(id)
    }

    /// Depth-first exact-match digest lookup over the reachable tree,
    /// non-canonical branches included.
    pub fn search(&self, digest: &Hash) -> Option<NodeId> {
        self.search_from(self.genesis, digest)
    }

    pub(crate) fn search_from(&self, root: NodeId, digest: &Hash) -> Option<NodeId> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if &node.block.digest == digest {
                return Some(id);
            }
            // preserve first-child-first order
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// The `k` distinct deepest tips reachable from the finalized frontier,
    /// in descending height; equal heights keep traversal order (first seen
    /// wins — deliberately arbitrary-but-deterministic, not a protocol
    /// rule). Padded with the finalized frontier itself when fewer than `k`
    /// tips exist, so callers can index the result unconditionally.
    ///
    /// With `valid_only`, invalid subtrees are skipped entirely and a valid
    /// node whose children are all invalid counts as a tip.
    pub fn longest_chains(&self, k: usize, valid_only: bool) -> Vec<NodeId> {
        let mut tips: Vec<(NodeId, u64)> = Vec::new();
        let mut stack = vec![self.last_finalized];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            let traversable: Vec<NodeId> = node
                .children
                .iter()
                .copied()
                .filter(|&child| !valid_only || self.node(child).valid)
                .collect();
            if traversable.is_empty() {
                tips.push((id, node.height));
            }
            stack.extend(traversable.into_iter().rev());
        }
        // stable sort keeps traversal order among equal heights
        tips.sort_by(|a, b| b.1.cmp(&a.1));
        let mut result: Vec<NodeId> = tips.into_iter().take(k).map(|(id, _)| id).collect();
        result.resize(k, self.last_finalized);
        result
    }

    /// Whether `id` lies on the path from the finalized frontier to the
    /// current single longest valid tip.
    pub fn block_in_longest_chain(&self, id: NodeId) -> bool {
        let mut cursor = self.longest_chains(1, true)[0];
        loop {
            if cursor == id {
                return true;
            }
            if cursor == self.last_finalized {
                return false;
            }
            match self.node(cursor).parent {
                Some(parent) => cursor = parent,
                None => return false,
            }
        }
    }

    /// Mark the node matching `digest` and every ancestor finalized, and
    /// move the finalized frontier there. Unknown digests are a no-op, and
    /// so is an already-finalized target — re-finalizing an ancestor must
    /// never move the frontier backward.
    pub fn finalize(&mut self, digest: &Hash) {
        let Some(id) = self.search(digest) else {
            return;
        };
        if self.node(id).finalized {
            return;
        }
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node_mut(current);
            if node.finalized && current != id {
                // ancestors of a finalized node are finalized already
                break;
            }
            node.finalized = true;
            cursor = node.parent;
        }
        self.last_finalized = id;
    }

    /// Detach the node matching `digest` from its parent and make it the
    /// new root; its former ancestors (and their other branches) become
    /// unreachable. Refuses to prune anything not yet finalized.
    pub fn prune(&mut self, digest: &Hash) {
        let Some(id) = self.search(digest) else {
            return;
        };
        if !self.node(id).finalized {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            let siblings = &mut self.node_mut(parent).children;
            if let Some(position) = siblings.iter().position(|&child| child == id) {
                siblings.remove(position);
            }
        }
        self.node_mut(id).parent = None;
        debug!(shard = self.shard, "pruned chain prefix");
        self.genesis = id;
    }

    /// Outgoing transactions on the path from the node matching `tip` up
    /// to, but not including, the nearest finalized ancestor. Everything at
    /// or before the finalized frontier was accounted for in an earlier
    /// round.
    pub fn outgoing_since(&self, tip: &Hash) -> Vec<Transaction> {
        self.transactions_since(tip, |block| &block.outgoing)
    }

    /// Incoming counterpart of [`Chain::outgoing_since`].
    pub fn incoming_since(&self, tip: &Hash) -> Vec<Transaction> {
        self.transactions_since(tip, |block| &block.incoming)
    }

    fn transactions_since<F>(&self, tip: &Hash, pick: F) -> Vec<Transaction>
    where
        F: Fn(&Block) -> &[Transaction],
    {
        let Some(start) = self.search_from(self.last_finalized, tip) else {
            return Vec::new();
        };
        let mut collected = Vec::new();
        let mut cursor = start;
        loop {
            let node = self.node(cursor);
            if node.finalized {
                break;
            }
            collected.extend_from_slice(pick(&node.block));
            match node.parent {
                Some(parent) => cursor = parent,
                None => break,
            }
        }
        collected
    }

    /// Outgoing transactions of the longest valid chain since finalization.
    pub fn longest_chain_outgoing(&self) -> Vec<Transaction> {
        let tip = self.longest_chains(1, true)[0];
        let digest = self.node(tip).block.digest;
        self.outgoing_since(&digest)
    }

    /// Every reachable block whose outgoing list contains the transaction
    /// digest (reverse lookup for inspection tooling).
    pub fn blocks_with_outgoing(&self, tx_digest: &Hash) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.genesis];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if node.block.outgoing.iter().any(|tx| &tx.digest == tx_digest) {
                found.push(id);
            }
            stack.extend(node.children.iter().rev());
        }
        found
    }
}
