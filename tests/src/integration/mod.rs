//! Cross-crate choreography: consistency validation feeding finalization
//! rounds, and the actor runtime driven over virtual time.

pub mod finalization_flow;
pub mod runtime_control;
