//! Actor lifecycle state machine.

use shared_types::Command;

/// Lifecycle of an actor. Initial state is `Paused`; `Exited` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    /// Idle: only control commands are consumed.
    Paused,
    /// Full multiplexed processing of queues and timers.
    Running,
    /// The actor's loop has ended (or is about to).
    Exited,
}

impl ActorState {
    /// The state after applying a control command. `Exited` absorbs
    /// everything — no command revives a stopped actor.
    pub fn apply(self, command: Command) -> ActorState {
        if self == ActorState::Exited {
            return ActorState::Exited;
        }
        match command {
            Command::Run => ActorState::Running,
            Command::Pause => ActorState::Paused,
            Command::Exit => ActorState::Exited,
        }
    }
}
