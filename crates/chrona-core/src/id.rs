//! Identity type for protocol actors
//!
//! Actor identifiers are 64-bit for wire efficiency. Each participant picks
//! one unique id at process start and keeps it for its whole lifetime.

use std::fmt;

/// Actor identity - an opaque 64-bit identifier for one participant.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ActorId(pub u64);

impl ActorId {
    pub const ZERO: ActorId = ActorId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        ActorId(id)
    }

    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }

    /// Wire representation (network byte order).
    #[inline]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        ActorId(u64::from_be_bytes(bytes))
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Actor({})", self.0)
    }
}

/// The display name used in clock renderings and log lines, e.g. `actor7`.
impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_roundtrip() {
        let id = ActorId::new(0xDEADBEEF_CAFEBABE);
        let bytes = id.to_bytes();
        let recovered = ActorId::from_bytes(bytes);
        assert_eq!(id, recovered);
    }

    #[test]
    fn test_actor_id_bytes_are_network_order() {
        let id = ActorId::new(1);
        assert_eq!(id.to_bytes(), [0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_actor_id_ordering_by_value() {
        assert!(ActorId::new(1) < ActorId::new(2));
        assert_eq!(ActorId::new(3), ActorId::new(3));
    }

    #[test]
    fn test_actor_id_display_name() {
        assert_eq!(ActorId::new(42).to_string(), "actor42");
    }
}
