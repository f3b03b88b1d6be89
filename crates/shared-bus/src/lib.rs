//! # Shared Bus — Actor Mailboxes and Fan-Out Broadcast
//!
//! All inter-actor communication goes through the [`CommunicationHub`]:
//! broadcasting a block, finalization, or command writes it into **every**
//! actor's corresponding inbound queue, the sender's own included, so the
//! originator re-applies its own output through the same path as everyone
//! else and no local state is special-cased.
//!
//! ## Queue semantics
//!
//! - **Blocks / finalizations**: bounded FIFO, awaited sends. A full queue
//!   applies backpressure to the sender — losing either message kind would
//!   break replica convergence.
//! - **Control**: small bounded FIFO, best-effort `try_send`. Control must
//!   never be starved, so actors drain it with priority; a dropped command
//!   is visible in the logs and can simply be resent.
//!
//! Per-queue delivery is in send order; nothing is guaranteed *across*
//! queues — a block and a finalization racing toward the same actor may
//! arrive in either order. The consistency validator re-runs on every
//! arrival, so cross-queue ordering never matters.

pub mod error;
pub mod hub;

pub use error::BusError;
pub use hub::{ActorInbox, CommunicationHub};

/// Buffered capacity for block queues: sized for bursts, small enough that
/// a stalled actor exerts backpressure instead of hoarding memory.
pub const BLOCK_QUEUE_CAPACITY: usize = 100;

/// Buffered capacity for finalization queues.
pub const FINALIZATION_QUEUE_CAPACITY: usize = 100;

/// Capacity of the control queue; commands are rare and tiny.
pub const CONTROL_QUEUE_CAPACITY: usize = 10;
