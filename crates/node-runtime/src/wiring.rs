//! # Wiring
//!
//! Creates the hub, constructs one actor per mailbox, and spawns each
//! actor's loop on its own task. Actors start `Paused`; broadcast
//! [`Command::Run`] to set the simulation in motion.

use crate::beacon::BeaconActor;
use crate::query::QueryHandle;
use crate::shard::ShardActor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared_bus::CommunicationHub;
use shared_types::{Command, ParamsHandle};
use tokio::task::JoinHandle;
use tracing::info;

/// A running simulation: the control hub, the read-only query surface, and
/// the actor task handles.
pub struct Simulation {
    hub: CommunicationHub,
    query: QueryHandle,
    handles: Vec<JoinHandle<()>>,
}

/// Spawn the beacon and one actor per shard with a random seed.
pub fn spawn(params: ParamsHandle) -> Simulation {
    spawn_seeded(params, rand::random())
}

/// Spawn with a fixed seed; per-actor generators are derived from it, so a
/// fixed seed fixes every actor's local random choices (message interleaving
/// remains up to the scheduler).
pub fn spawn_seeded(params: ParamsHandle, seed: u64) -> Simulation {
    let shard_count = params.snapshot().shard_count;
    info!(shards = shard_count, seed, "spawning simulation actors");

    let (hub, inboxes) = CommunicationHub::new(shard_count + 1);
    let mut inboxes = inboxes.into_iter();
    let mut handles = Vec::with_capacity(shard_count + 1);

    let beacon = BeaconActor::new(
        hub.clone(),
        params.clone(),
        StdRng::seed_from_u64(seed),
    );
    let beacon_state = beacon.state_handle();
    if let Some(inbox) = inboxes.next() {
        handles.push(tokio::spawn(beacon.run(inbox)));
    }

    let mut shard_states = Vec::with_capacity(shard_count);
    for (index, inbox) in inboxes.enumerate() {
        let shard_id = index + 1;
        let actor = ShardActor::new(
            shard_id,
            hub.clone(),
            params.clone(),
            StdRng::seed_from_u64(seed.wrapping_add(shard_id as u64)),
        );
        shard_states.push(actor.state_handle());
        handles.push(tokio::spawn(actor.run(inbox)));
    }

    Simulation {
        hub,
        query: QueryHandle::new(beacon_state, shard_states),
        handles,
    }
}

impl Simulation {
    /// Broadcast a control command to every actor (best-effort).
    pub fn control(&self, command: Command) {
        self.hub.broadcast_command(command);
    }

    /// The read-only inspection surface.
    pub fn query(&self) -> &QueryHandle {
        &self.query
    }

    /// The underlying hub, for tooling that injects its own traffic.
    pub fn hub(&self) -> &CommunicationHub {
        &self.hub
    }

    /// Broadcast `Exit` and wait for every actor task to finish.
    pub async fn shutdown(self) {
        self.hub.broadcast_command(Command::Exit);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}
