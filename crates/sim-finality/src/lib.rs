//! # sim-finality
//!
//! The beacon-side finalization protocol: once per round, build a
//! per-shard proposal and run a fixed-point scan that advances each
//! shard's finalized frontier one block at a time, consuming cross-shard
//! transaction claims as it goes.
//!
//! The fixed point is the heart of the protocol — shard A's advancement
//! can publish the outgoing transactions that unblock shard B, and vice
//! versa, so a single order-dependent pass is insufficient. Transactions
//! that cannot be causally justified this round are neither dropped nor
//! double-counted: they roll into the next round's
//! `inconsistent_transactions` exactly once.

pub mod coordinator;
pub mod round;

pub use coordinator::{propose_finalization, propose_finalization_ordered};
pub use round::ShardRound;
