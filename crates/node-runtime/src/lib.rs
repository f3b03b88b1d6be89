//! # ShardSim Node Runtime
//!
//! One lightweight worker per actor — the beacon plus one per shard — all
//! inside a single process. No chain state is shared between actors: each
//! owns a private replica of every shard's chain, kept eventually
//! consistent purely through the messages fanned out by the shared bus.
//!
//! ## Actor loop
//!
//! Every actor is a state machine over `{Paused, Running, Exited}`,
//! starting `Paused`:
//!
//! 1. A non-blocking check drains any pending control command first, so
//!    pause/exit is never starved by a busy workload.
//! 2. `Paused` idles on the control queue alone, consuming nothing else.
//! 3. `Running` performs one biased multiplexed wait over control, inbound
//!    blocks, inbound finalizations, and this actor's randomized timers;
//!    exactly one ready event is handled per iteration.
//! 4. `Exit` is terminal and immediate: the current wait is abandoned and
//!    timers are simply not rearmed.
//!
//! Every mutating algorithm (insert, fork-choice, consistency validation,
//! finalization application) runs to completion within one iteration on the
//! actor's private replica — there are no suspension points inside them.

pub mod actor;
pub mod beacon;
pub mod query;
pub mod shard;
pub mod wiring;

pub use actor::ActorState;
pub use beacon::{BeaconActor, BeaconState};
pub use query::QueryHandle;
pub use shard::{ShardActor, ShardState};
pub use wiring::{spawn, spawn_seeded, Simulation};
