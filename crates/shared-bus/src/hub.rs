//! The communication hub and per-actor inboxes.

use crate::error::BusError;
use crate::{BLOCK_QUEUE_CAPACITY, CONTROL_QUEUE_CAPACITY, FINALIZATION_QUEUE_CAPACITY};
use shared_types::{Block, Command, Finalization};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// The receiving half of one actor's queues, handed over at wiring time.
/// Each field is an independent FIFO; the actor multiplexes over them with
/// control taking priority.
pub struct ActorInbox {
    pub blocks: mpsc::Receiver<Block>,
    pub finalizations: mpsc::Receiver<Finalization>,
    pub control: mpsc::Receiver<Command>,
}

struct Mailbox {
    blocks: mpsc::Sender<Block>,
    finalizations: mpsc::Sender<Finalization>,
    control: mpsc::Sender<Command>,
}

/// Pure fan-out hub over every actor's mailbox. Cheap to clone; all clones
/// address the same mailboxes.
#[derive(Clone)]
pub struct CommunicationHub {
    mailboxes: Arc<Vec<Mailbox>>,
}

impl CommunicationHub {
    /// Create the hub plus one inbox per actor. Actor `0` is the beacon by
    /// convention; shards take `1..actor_count`.
    pub fn new(actor_count: usize) -> (Self, Vec<ActorInbox>) {
        let mut mailboxes = Vec::with_capacity(actor_count);
        let mut inboxes = Vec::with_capacity(actor_count);
        for _ in 0..actor_count {
            let (block_tx, block_rx) = mpsc::channel(BLOCK_QUEUE_CAPACITY);
            let (finalization_tx, finalization_rx) = mpsc::channel(FINALIZATION_QUEUE_CAPACITY);
            let (control_tx, control_rx) = mpsc::channel(CONTROL_QUEUE_CAPACITY);
            mailboxes.push(Mailbox {
                blocks: block_tx,
                finalizations: finalization_tx,
                control: control_tx,
            });
            inboxes.push(ActorInbox {
                blocks: block_rx,
                finalizations: finalization_rx,
                control: control_rx,
            });
        }
        (
            Self {
                mailboxes: Arc::new(mailboxes),
            },
            inboxes,
        )
    }

    pub fn actor_count(&self) -> usize {
        self.mailboxes.len()
    }

    /// Deliver a block into every actor's block queue, the sender's own
    /// included. Awaits on full queues (backpressure); closed mailboxes are
    /// skipped and reported after the full fan-out.
    pub async fn broadcast_block(&self, block: &Block) -> Result<(), BusError> {
        let mut closed = 0;
        for mailbox in self.mailboxes.iter() {
            if mailbox.blocks.send(block.clone()).await.is_err() {
                closed += 1;
            }
        }
        closed_result(closed, self.mailboxes.len())
    }

    /// Deliver a finalization into every actor's finalization queue, the
    /// sender's own included.
    pub async fn broadcast_finalization(
        &self,
        finalization: &Finalization,
    ) -> Result<(), BusError> {
        let mut closed = 0;
        for mailbox in self.mailboxes.iter() {
            if mailbox.finalizations.send(finalization.clone()).await.is_err() {
                closed += 1;
            }
        }
        closed_result(closed, self.mailboxes.len())
    }

    /// Best-effort command broadcast: never blocks, drops on a full or
    /// closed queue.
    pub fn broadcast_command(&self, command: Command) {
        for (actor, mailbox) in self.mailboxes.iter().enumerate() {
            if mailbox.control.try_send(command).is_err() {
                warn!(actor, ?command, "control queue unavailable, command dropped");
            }
        }
    }
}

fn closed_result(closed: usize, total: usize) -> Result<(), BusError> {
    if closed == 0 {
        Ok(())
    } else {
        Err(BusError::MailboxesClosed { closed, total })
    }
}
