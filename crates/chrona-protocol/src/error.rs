//! Protocol-layer failures

use thiserror::Error;

use chrona_core::{ActorId, DecodeError};

/// Failures of a single message cycle.
///
/// Nothing here is fatal to the process: callers log the failure and drop
/// the current cycle, then the timer or the next inbound byte retries.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Malformed bytes from the peer.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The endpoint's own id is missing from its timestamp. This is a local
    /// invariant violation, not a peer problem; a well-formed endpoint never
    /// produces it.
    #[error("{0} has no entry in its own vector timestamp")]
    UnknownActor(ActorId),
}

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
