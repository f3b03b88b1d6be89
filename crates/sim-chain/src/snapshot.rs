//! # Read-Only Projections
//!
//! Serializable snapshots and a box-drawing renderer over a [`Chain`], for
//! the visualizer and other inspection tooling. Nothing here mutates chain
//! state.

use crate::chain::{Chain, NodeId};
use serde::{Deserialize, Serialize};
use shared_types::Hash;
use std::fmt::Write;

/// Display classification of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    /// The chain's root (possibly a prune point).
    Genesis,
    /// Permanently committed.
    Finalized,
    /// Consistency validation failed somewhere at or above this node.
    Invalid,
    /// On the path from the finalized frontier to the longest valid tip.
    Canonical,
    /// Valid but off the canonical path.
    Stale,
}

/// One node of a [`ChainSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub digest: Hash,
    /// Absent on the root.
    pub parent_digest: Option<Hash>,
    pub height: u64,
    pub valid: bool,
    pub finalized: bool,
    /// Layout hint: sibling index at insertion time.
    pub lane: usize,
    pub status: NodeStatus,
}

/// A serializable point-in-time projection of one chain replica, nodes in
/// depth-first order starting at the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub shard: shared_types::ShardId,
    pub last_finalized: Hash,
    pub nodes: Vec<NodeSnapshot>,
}

impl Chain {
    /// Display classification of a node.
    pub fn node_status(&self, id: NodeId) -> NodeStatus {
        let node = self.node(id);
        if id == self.genesis() {
            NodeStatus::Genesis
        } else if node.finalized() {
            NodeStatus::Finalized
        } else if !node.valid() {
            NodeStatus::Invalid
        } else if self.block_in_longest_chain(id) {
            NodeStatus::Canonical
        } else {
            NodeStatus::Stale
        }
    }

    /// Point-in-time projection of the reachable tree.
    pub fn snapshot(&self) -> ChainSnapshot {
        let mut nodes = Vec::new();
        let mut stack = vec![self.genesis()];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            nodes.push(NodeSnapshot {
                digest: node.block().digest,
                parent_digest: node.parent().map(|p| self.node(p).block().digest),
                height: node.height(),
                valid: node.valid(),
                finalized: node.finalized(),
                lane: node.lane(),
                status: self.node_status(id),
            });
            stack.extend(node.children().iter().rev());
        }
        ChainSnapshot {
            shard: self.shard(),
            last_finalized: self.node(self.last_finalized()).block().digest,
            nodes,
        }
    }

    /// Render the reachable tree as box-drawing text, one node per line
    /// with a status marker and the transaction traffic it carries.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(&mut out, "", self.genesis(), true);
        out
    }

    fn render_node(&self, out: &mut String, prefix: &str, id: NodeId, last_child: bool) {
        let node = self.node(id);
        let connector = if last_child { "└──" } else { "├──" };
        let marker = match self.node_status(id) {
            NodeStatus::Genesis => "G",
            NodeStatus::Finalized => "F",
            NodeStatus::Invalid => "X",
            NodeStatus::Canonical => "*",
            NodeStatus::Stale => " ",
        };
        let _ = write!(out, "{prefix}{connector}[{marker}] {}", short_digest(&node.block().digest));
        for tx in &node.block().incoming {
            let _ = write!(out, " in:{}", tx.source_shard);
        }
        for tx in &node.block().outgoing {
            let _ = write!(out, " out:{}", tx.target_shard);
        }
        out.push('\n');

        let child_prefix = format!("{prefix}{}", if last_child { "    " } else { "│   " });
        let children = node.children();
        for (index, &child) in children.iter().enumerate() {
            self.render_node(out, &child_prefix, child, index == children.len() - 1);
        }
    }
}

fn short_digest(digest: &Hash) -> String {
    digest.iter().take(4).fold(String::new(), |mut acc, byte| {
        let _ = write!(acc, "{byte:02x}");
        acc
    })
}
