//! # Shared Error Types
//!
//! The core has no fatal error path: orphan blocks are dropped, unknown
//! digests degrade to no-ops, skipped rounds change nothing. The enums here
//! cover the remaining genuine failures — misuse of the read-only query
//! surface and wiring faults in the message bus.

use crate::entities::ShardId;
use thiserror::Error;

/// Errors returned by the read-only query surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The requested observer actor does not exist.
    #[error("unknown observer {observer}: valid observers are 0 (beacon) through {actor_max}")]
    UnknownObserver { observer: ShardId, actor_max: ShardId },

    /// The requested shard chain does not exist.
    #[error("unknown shard {shard}: valid shards are 1 through {shard_count}")]
    UnknownShard { shard: ShardId, shard_count: usize },
}
