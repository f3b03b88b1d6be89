//! Bus wiring errors.

use thiserror::Error;

/// Failures while fanning a message out to the actor mailboxes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// One or more mailboxes were closed (their actor has exited). The
    /// fan-out still attempted every remaining mailbox before returning.
    #[error("{closed} of {total} actor mailboxes closed")]
    MailboxesClosed { closed: usize, total: usize },
}
