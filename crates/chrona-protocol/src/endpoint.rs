//! The shared send/receive discipline
//!
//! An endpoint owns exactly one live [`VectorTimestamp`] for its whole
//! runtime. Every outgoing message ticks the own entry (send event) before
//! the clock is serialized; every incoming message ticks the own entry
//! (receive event) and then merges the peer's clock. The tick-then-merge
//! order on receipt is what makes a reply's timestamp happen-after both the
//! request's receive event and the requester's entire prior history.

use chrona_core::{ActorId, VectorTimestamp};
use chrona_wire::Packet;

use crate::{ProtocolError, ProtocolResult};

/// One side of the exchange - client and server both run one of these.
#[derive(Clone, Debug)]
pub struct Endpoint {
    actor: ActorId,
    stamp: VectorTimestamp,
}

impl Endpoint {
    /// A fresh endpoint whose clock is `{actor: 0}`.
    pub fn new(actor: ActorId) -> Self {
        Endpoint {
            actor,
            stamp: VectorTimestamp::new(actor),
        }
    }

    /// Resume from a previously captured timestamp.
    ///
    /// No validation happens here; if `stamp` is missing `actor`'s entry,
    /// the first send or receive reports [`ProtocolError::UnknownActor`].
    pub fn resume(actor: ActorId, stamp: VectorTimestamp) -> Self {
        Endpoint { actor, stamp }
    }

    #[inline]
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// The current causal history. Read-only: callers log it, they never
    /// mutate it past the endpoint.
    #[inline]
    pub fn stamp(&self) -> &VectorTimestamp {
        &self.stamp
    }

    /// Send path: tick the own entry (send event), then envelope `payload`
    /// together with the updated clock.
    pub fn stamp_outgoing(&mut self, payload: &[u8]) -> ProtocolResult<Packet> {
        self.stamp
            .tick(self.actor)
            .ok_or(ProtocolError::UnknownActor(self.actor))?;

        Ok(Packet::new(&self.stamp.serialize_to_binary(), payload))
    }

    /// Receive path: decode the peer's clock, tick the own entry (receive
    /// event), merge the peer's clock in, and hand back the payload.
    ///
    /// A decode failure aborts before anything is mutated, so a malformed
    /// packet never corrupts local state.
    pub fn absorb(&mut self, packet: &Packet) -> ProtocolResult<Vec<u8>> {
        let theirs = VectorTimestamp::deserialize_from_binary(packet.stamp_bytes())?;

        self.stamp
            .tick(self.actor)
            .ok_or(ProtocolError::UnknownActor(self.actor))?;
        self.stamp.merge(&theirs);

        Ok(packet.payload().to_vec())
    }
}
