//! # Shard Actor
//!
//! Grows its own chain, replicates every other shard's chain from received
//! blocks, and continuously re-derives fork-choice validity from the most
//! recent finalized cross-shard information. Block and transaction
//! generation run on this actor's own randomized timers.

use crate::actor::ActorState;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use shared_bus::{ActorInbox, CommunicationHub};
use shared_types::{
    remove_tx, Block, Command, Finalization, ParamsHandle, ShardId, SimParams, Transaction,
};
use sim_chain::ChainSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// A shard actor's private replica state. The actor task is the only
/// writer; read-only query handles may observe it.
pub struct ShardState {
    /// This actor's copy of every shard's chain (its own included).
    pub chains: ChainSet,
    /// Most recently applied finalization round.
    pub finalization: Finalization,
    /// Outgoing transactions generated here and not yet finalized.
    pub tx_pool: Vec<Transaction>,
}

/// One shard's worker: a state machine over `{Paused, Running, Exited}`
/// driven by a prioritized multiplexed wait.
pub struct ShardActor {
    id: ShardId,
    hub: CommunicationHub,
    params: ParamsHandle,
    state: Arc<RwLock<ShardState>>,
    rng: StdRng,
    tx_seq: u64,
}

impl ShardActor {
    pub fn new(id: ShardId, hub: CommunicationHub, params: ParamsHandle, rng: StdRng) -> Self {
        let shard_count = params.snapshot().shard_count;
        Self {
            id,
            hub,
            params,
            state: Arc::new(RwLock::new(ShardState {
                chains: ChainSet::new(shard_count),
                finalization: Finalization::genesis(),
                tx_pool: Vec::new(),
            })),
            rng,
            tx_seq: 0,
        }
    }

    /// Shared handle to this actor's private state, for read-only queries.
    pub fn state_handle(&self) -> Arc<RwLock<ShardState>> {
        Arc::clone(&self.state)
    }

    /// The actor loop. Runs until an `Exit` command arrives or the control
    /// queue closes.
    ///
    /// The generation timers are pinned outside the loop and reset only when
    /// they fire (or after a pause); handling a queued message must not
    /// re-arm them, or a busy queue would starve generation entirely.
    pub async fn run(mut self, mut inbox: ActorInbox) {
        info!(shard = self.id, "shard actor started");
        let mut state = ActorState::Paused;
        let block_timer = sleep(Duration::ZERO);
        tokio::pin!(block_timer);
        let tx_timer = sleep(Duration::ZERO);
        tokio::pin!(tx_timer);
        let mut timers_armed = false;
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
                timers_armed = false;
                match inbox.control.recv().await {
                    Some(command) => state = self.transition(state, command),
                    None => break,
                }
                continue;
            }
            let params = self.params.snapshot();
            if !timers_armed {
                block_timer
                    .as_mut()
                    .reset(Instant::now() + params.block_period.sample_period(&mut self.rng));
                tx_timer
                    .as_mut()
                    .reset(Instant::now() + params.tx_period.sample_period(&mut self.rng));
                timers_armed = true;
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
                    Some(finalization) => self.receive_finalization(finalization),
                    None => break,
                },
                _ = block_timer.as_mut() => {
                    self.generate_block(&params).await;
                    block_timer
                        .as_mut()
                        .reset(Instant::now() + params.block_period.sample_period(&mut self.rng));
                }
                _ = tx_timer.as_mut() => {
                    self.generate_transactions(&params);
                    tx_timer
                        .as_mut()
                        .reset(Instant::now() + params.tx_period.sample_period(&mut self.rng));
                }
            }
        }
        info!(shard = self.id, "shard actor exited");
    }

    fn transition(&self, state: ActorState, command: Command) -> ActorState {
        info!(shard = self.id, ?command, "received command");
        state.apply(command)
    }

    /// Insert a received block into the producing shard's replica, then
    /// re-derive this shard's subtree validity.
    fn receive_block(&mut self, block: Block) {
        debug!(shard = self.id, from = block.shard, "received block");
        let mut state = self.state.write();
        if let Some(chain) = state.chains.get_mut(block.shard) {
            chain.insert(block);
        }
        Self::refresh_consistency(&mut state, self.id);
    }

    /// Apply a finalization round: drop our finalized outgoing transactions
    /// from the pool, mark every shard's newly finalized frontier, then
    /// re-derive validity against the round's carryover.
    fn receive_finalization(&mut self, finalization: Finalization) {
        debug!(
            shard = self.id,
            height = finalization.height,
            "received finalization"
        );
        let prune_remote = self.params.snapshot().prune_remote_on_finalize;
        let mut state = self.state.write();
        for block in &finalization.blocks {
            if block.shard == self.id {
                // collected before marking: the walk stops at the frontier
                let finalized_outgoing = state
                    .chains
                    .get(self.id)
                    .map(|chain| chain.outgoing_since(&block.digest))
                    .unwrap_or_default();
                for tx in &finalized_outgoing {
                    remove_tx(tx, &mut state.tx_pool);
                }
            }
            if let Some(chain) = state.chains.get_mut(block.shard) {
                chain.finalize(&block.digest);
                if prune_remote && block.shard != self.id {
                    chain.prune(&block.digest);
                }
            }
        }
        state.finalization = finalization;
        Self::refresh_consistency(&mut state, self.id);
    }

    /// Build and broadcast a block on a randomized parent choice:
    /// usually the longest valid tip, occasionally one of the two
    /// alternates to simulate forks.
    async fn generate_block(&mut self, params: &SimParams) {
        if self.rng.gen::<f64>() > params.block_probability {
            debug!(shard = self.id, "skipping block generation");
            return;
        }
        let block = {
            let state = self.state.read();
            let Some(chain) = state.chains.get(self.id) else {
                return;
            };
            let candidates = chain.longest_chains(3, true);
            let parent = if self.rng.gen::<f64>() <= params.build_on_longest_probability {
                candidates[0]
            } else if self.rng.gen::<bool>() {
                candidates[1]
            } else {
                candidates[2]
            };
            let parent_digest = chain.node(parent).block().digest;

            // claim cross-shard transactions not already claimed on this branch
            let mut available_in = Self::available_outgoing(&state, self.id);
            for tx in chain.incoming_since(&parent_digest) {
                remove_tx(&tx, &mut available_in);
            }
            available_in.shuffle(&mut self.rng);
            let take_in = available_in
                .len()
                .min(params.block_tx_in.sample_count(&mut self.rng));
            available_in.truncate(take_in);

            // emit pooled transactions not already emitted on this branch
            let mut available_out = state.tx_pool.clone();
            for tx in chain.outgoing_since(&parent_digest) {
                remove_tx(&tx, &mut available_out);
            }
            available_out.shuffle(&mut self.rng);
            let take_out = available_out
                .len()
                .min(params.block_tx_out.sample_count(&mut self.rng));
            available_out.truncate(take_out);

            Block::new(
                self.id,
                parent_digest,
                available_in,
                available_out,
                format!("validator-{}", self.id),
            )
        };
        debug!(shard = self.id, "broadcasting block");
        if let Err(error) = self.hub.broadcast_block(&block).await {
            debug!(shard = self.id, %error, "block broadcast incomplete");
        }
    }

    /// Fill the outgoing pool with transactions toward random other shards,
    /// up to the pool bound.
    fn generate_transactions(&mut self, params: &SimParams) {
        if params.shard_count < 2 {
            return; // nowhere to send
        }
        let batch = params.tx_batch.sample_count(&mut self.rng);
        let mut state = self.state.write();
        for _ in 0..batch {
            if state.tx_pool.len() >= params.tx_pool_size {
                break;
            }
            let mut target = self.rng.gen_range(1..=params.shard_count);
            while target == self.id {
                target = self.rng.gen_range(1..=params.shard_count);
            }
            self.tx_seq += 1;
            let tx = Transaction::new(
                self.id,
                target,
                format!("shard {} tx {}", self.id, self.tx_seq),
            );
            state.tx_pool.push(tx);
        }
        debug!(
            shard = self.id,
            pool = state.tx_pool.len(),
            "generated transactions"
        );
    }

    /// Everything other shards have produced toward this shard and not yet
    /// consumed: the last round's carryover plus each other shard's
    /// longest-chain outgoing since its finalized frontier.
    fn available_outgoing(state: &ShardState, own: ShardId) -> Vec<Transaction> {
        let mut list: Vec<Transaction> = state
            .finalization
            .inconsistent_transactions
            .iter()
            .filter(|tx| tx.target_shard == own)
            .cloned()
            .collect();
        for chain in state.chains.iter() {
            if chain.shard() == own {
                continue;
            }
            list.extend(
                chain
                    .longest_chain_outgoing()
                    .into_iter()
                    .filter(|tx| tx.target_shard == own),
            );
        }
        list
    }

    /// Re-derive this shard's subtree validity from the current view of
    /// other shards' outgoing transactions.
    fn refresh_consistency(state: &mut ShardState, own: ShardId) {
        let available = Self::available_outgoing(state, own);
        if let Some(chain) = state.chains.get_mut(own) {
            chain.update_consistency(&available);
        }
    }
}
