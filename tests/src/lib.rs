//! # ShardSim Test Suite
//!
//! Unified test crate containing cross-crate scenarios that no single
//! member crate can express on its own:
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Scenario builders and snapshot invariant checks
//! └── integration/      # Cross-crate choreography
//!     ├── finalization_flow.rs   # chain consistency + fixed-point rounds
//!     └── runtime_control.rs     # actor lifecycle under virtual time
//! ```
//!
//! Run with `cargo test -p sim-tests`.

#![allow(dead_code)]

pub mod support;

pub mod integration;
