//! # Beacon Actor
//!
//! Replicates every shard's chain from received blocks and, on its own
//! randomized timer, attempts a finalization round: each attempt succeeds
//! with probability `finalize_probability`, and a successful round is
//! applied locally before being broadcast — the beacon's own finalization
//! queue then delivers a copy that is ignored, since it was already
//! processed (applying before broadcasting avoids racing against the next
//! round).

use crate::actor::ActorState;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::Rng;
use shared_bus::{ActorInbox, CommunicationHub};
use shared_types::{Block, Command, Finalization, ParamsHandle, SimParams, BEACON_ID};
use sim_chain::ChainSet;
use sim_finality::propose_finalization;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// The beacon's private replica state. The actor task is the only writer;
/// read-only query handles may observe it.
pub struct BeaconState {
    /// The beacon's copy of every shard's chain.
    pub chains: ChainSet,
    /// Most recently produced finalization round.
    pub finalization: Finalization,
}

/// The coordinating actor running the cross-shard finalization protocol.
pub struct BeaconActor {
    hub: CommunicationHub,
    params: ParamsHandle,
    state: Arc<RwLock<BeaconState>>,
    rng: StdRng,
}

impl BeaconActor {
    pub fn new(hub: CommunicationHub, params: ParamsHandle, rng: StdRng) -> Self {
        let shard_count = params.snapshot().shard_count;
        Self {
            hub,
            params,
            state: Arc::new(RwLock::new(BeaconState {
                chains: ChainSet::new(shard_count),
                finalization: Finalization::genesis(),
            })),
            rng,
        }
    }

    /// Shared handle to the beacon's private state, for read-only queries.
    pub fn state_handle(&self) -> Arc<RwLock<BeaconState>> {
        Arc::clone(&self.state)
    }

    /// The actor loop. Runs until an `Exit` command arrives or the control
    /// queue closes.
    ///
    /// The finalization timer is pinned outside the loop and reset only when
    /// it fires (or after a pause), so a steady stream of inbound blocks
    /// cannot keep pushing the next round away.
    pub async fn run(mut self, mut inbox: ActorInbox) {
        info!("beacon actor started");
        let mut state = ActorState::Paused;
        let finalize_timer = sleep(Duration::ZERO);
        tokio::pin!(finalize_timer);
        let mut timer_armed = false;
        while state != ActorState::Exited {
            // control preempts all other work
            match inbox.control.try_recv() {
                Ok(command) => {
                    state = self.transition(state, command);
                    continue;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => break,
            }
            if state == ActorState::Paused {
                // idle: consume nothing but control
                timer_armed = false;
                match inbox.control.recv().await {
                    Some(command) => state = self.transition(state, command),
                    None => break,
                }
                continue;
            }
            let params = self.params.snapshot();
            if !timer_armed {
                finalize_timer
                    .as_mut()
                    .reset(Instant::now() + params.finalize_period.sample_period(&mut self.rng));
                timer_armed = true;
            }
            tokio::select! {
                biased;
                command = inbox.control.recv() => match command {
                    Some(command) => state = self.transition(state, command),
                    None => break,
                },
                block = inbox.blocks.recv() => match block {
                    Some(block) => self.receive_block(block),
                    None => break,
                },
                finalization = inbox.finalizations.recv() => match finalization {
                    Some(finalization) => {
                        // our own broadcast coming back: already applied
                        debug!(height = finalization.height, "finalization already processed locally");
                    }
                    None => break,
                },
                _ = finalize_timer.as_mut() => {
                    self.attempt_finalization(&params).await;
                    finalize_timer
                        .as_mut()
                        .reset(Instant::now() + params.finalize_period.sample_period(&mut self.rng));
                }
            }
        }
        info!("beacon actor exited");
    }

    fn transition(&self, state: ActorState, command: Command) -> ActorState {
        info!(actor = BEACON_ID, ?command, "received command");
        state.apply(command)
    }

    fn receive_block(&mut self, block: Block) {
        debug!(from = block.shard, "beacon received block");
        let mut state = self.state.write();
        if let Some(chain) = state.chains.get_mut(block.shard) {
            chain.insert(block);
        }
    }

    /// One finalization attempt: probabilistic abstention, then the
    /// fixed-point round over this actor's replicas, applied locally and
    /// broadcast to everyone.
    async fn attempt_finalization(&mut self, params: &SimParams) {
        if self.rng.gen::<f64>() > params.finalize_probability {
            info!("finalization round skipped");
            return;
        }
        let finalization = {
            let mut state = self.state.write();
            let finalization = propose_finalization(&state.chains, &state.finalization);
            Self::apply(&mut state, &finalization);
            finalization
        };
        info!(
            height = finalization.height,
            carried = finalization.inconsistent_transactions.len(),
            "finalization round complete"
        );
        if let Err(error) = self.hub.broadcast_finalization(&finalization).await {
            debug!(%error, "finalization broadcast incomplete");
        }
    }

    /// Mark every shard's newly finalized frontier and replace the local
    /// round record.
    fn apply(state: &mut BeaconState, finalization: &Finalization) {
        for block in &finalization.blocks {
            if let Some(chain) = state.chains.get_mut(block.shard) {
                chain.finalize(&block.digest);
            }
        }
        state.finalization = finalization.clone();
    }
}
