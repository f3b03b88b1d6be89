//! # sim-chain
//!
//! The per-shard block tree and its fork-choice rule.
//!
//! Every actor keeps one [`Chain`] replica per shard (a [`ChainSet`]); the
//! replicas are private and converge purely through message application.
//! A chain is an arena of [`ChainNode`]s: owning child lists, non-owning
//! parent handles, one genesis root per shard.
//!
//! ## Operations
//!
//! - [`Chain::insert`] — append under the parent digest; orphans are dropped
//!   (the simulated network has no redelivery).
//! - [`Chain::search`] — depth-first digest lookup over the reachable tree.
//! - [`Chain::longest_chains`] — the `k` distinct deepest tips, optionally
//!   restricted to valid subtrees; ties resolved by traversal order.
//! - [`Chain::finalize`] — prefix-closed, idempotent finalization marking.
//! - [`Chain::prune`] — re-root at an already-finalized node to bound memory.
//! - [`Chain::update_consistency`] — top-down re-validation of the
//!   unfinalized suffix against another replica's outgoing transactions,
//!   with per-branch consumption isolation.
//!
//! Read-only projections for inspection tooling live in [`snapshot`].

pub mod chain;
pub mod consistency;
pub mod set;
pub mod snapshot;

pub use chain::{Chain, ChainNode, NodeId};
pub use set::ChainSet;
pub use snapshot::{ChainSnapshot, NodeSnapshot, NodeStatus};
