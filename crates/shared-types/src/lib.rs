//! # Shared Types
//!
//! Core vocabulary of the simulator, shared by every crate:
//!
//! - **Entities**: [`Transaction`], [`Block`] and the [`Finalization`] round
//!   record — immutable, content-addressed values whose digest is their sole
//!   identity.
//! - **Control**: the [`Command`] enum broadcast to every actor
//!   (`Run` / `Pause` / `Exit`).
//! - **Tunables**: [`SimParams`] and the runtime-mutable [`ParamsHandle`]
//!   through which inspection tooling adjusts the workload while the
//!   simulation runs.
//! - **Errors**: shared `thiserror` enums. Steady-state anomalies (orphan
//!   blocks, skipped rounds, unmatched transactions) are deliberately *not*
//!   errors; the enums here cover genuine misuse of the APIs.

pub mod entities;
pub mod errors;
pub mod params;

pub use entities::{
    contains_tx, remove_tx, Block, Command, Finalization, Hash, ShardId, Transaction, BEACON_ID,
};
pub use errors::QueryError;
pub use params::{BoundedRange, ParamsHandle, SimParams};
