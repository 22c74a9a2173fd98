//! Vector timestamps - per-actor logical counters capturing causal history
//!
//! A timestamp is a map from [`ActorId`] to a monotonically increasing
//! counter. Local events (send, receive) tick the owner's own entry;
//! receiving a peer's timestamp merges it in as a pointwise max. Counters
//! never decrease and entries are never removed.

use std::collections::HashMap;
use std::fmt;

use bytes::{Buf, BufMut, BytesMut};

use crate::{ActorId, DecodeError, DecodeErrorKind, DecodeResult};

/// Bytes per serialized (actor id, counter) pair.
const PAIR_SIZE: usize = 16;

/// A vector clock over 64-bit actor ids.
///
/// Exclusively owned by the actor that created it; a deserialized instance
/// is a fresh, independent value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorTimestamp {
    clocks: HashMap<ActorId, u64>,
}

impl VectorTimestamp {
    /// Create a timestamp for `own`, containing exactly `{own: 0}`.
    pub fn new(own: ActorId) -> Self {
        VectorTimestamp {
            clocks: HashMap::from([(own, 0)]),
        }
    }

    /// Increment the counter of `actor` and return its new value.
    ///
    /// Returns `None` when `actor` has no entry; nothing is mutated in that
    /// case. An actor only ever ticks its own id, so a miss here means the
    /// caller violated the endpoint invariant.
    pub fn tick(&mut self, actor: ActorId) -> Option<u64> {
        let clock = self.clocks.get_mut(&actor)?;
        *clock += 1;
        Some(*clock)
    }

    /// Merge `other` into this timestamp: pointwise max, importing keys only
    /// present in `other`. Idempotent; returns `&mut Self` for chaining.
    pub fn merge(&mut self, other: &VectorTimestamp) -> &mut Self {
        for (&actor, &theirs) in &other.clocks {
            let ours = self.clocks.entry(actor).or_insert(0);
            *ours = (*ours).max(theirs);
        }
        self
    }

    /// The counter for `actor`, if it has an entry.
    #[inline]
    pub fn get(&self, actor: ActorId) -> Option<u64> {
        self.clocks.get(&actor).copied()
    }

    #[inline]
    pub fn contains(&self, actor: ActorId) -> bool {
        self.clocks.contains_key(&actor)
    }

    /// Number of (actor, counter) entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }

    /// True when every entry of `other` is covered here with a counter that
    /// is at least as large. The event stamped `other` causally precedes or
    /// is concurrent with the event stamped `self`.
    pub fn dominates(&self, other: &VectorTimestamp) -> bool {
        other
            .clocks
            .iter()
            .all(|(&actor, &theirs)| self.get(actor).unwrap_or(0) >= theirs)
    }

    /// Strict causal precedence: pointwise ≤ everywhere and < somewhere.
    pub fn happens_before(&self, other: &VectorTimestamp) -> bool {
        if self == other {
            return false;
        }

        let mut strictly_less = false;

        for (&actor, &ours) in &self.clocks {
            let theirs = other.get(actor).unwrap_or(0);
            if ours > theirs {
                return false;
            }
            if ours < theirs {
                strictly_less = true;
            }
        }

        // Entries only the other side knows about count as 0 here.
        for (&actor, &theirs) in &other.clocks {
            if !self.clocks.contains_key(&actor) && theirs > 0 {
                strictly_less = true;
            }
        }

        strictly_less
    }

    /// Wire encoding: u64 pair count, then one (u64 actor id, u64 counter)
    /// per entry, all big-endian. Pair order is whatever map iteration
    /// yields and is not stable across values or runs.
    pub fn serialize_to_binary(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(8 + self.clocks.len() * PAIR_SIZE);

        buf.put_u64(self.clocks.len() as u64);
        for (&actor, &clock) in &self.clocks {
            buf.put_u64(actor.value());
            buf.put_u64(clock);
        }

        buf.to_vec()
    }

    /// Decode a timestamp from its wire encoding.
    ///
    /// Fails with [`DecodeErrorKind::TimestampTruncated`] when `bytes` cannot
    /// hold the pair count, and with [`DecodeErrorKind::InvalidPairCount`]
    /// when the declared count does not exactly account for the remaining
    /// length. A repeated key is last-write-wins (well-formed input never
    /// repeats one).
    pub fn deserialize_from_binary(bytes: &[u8]) -> DecodeResult<Self> {
        let mut buf = bytes;

        if buf.len() < 8 {
            return Err(DecodeError::new(DecodeErrorKind::TimestampTruncated));
        }

        let pair_count = buf.get_u64();

        // checked_mul: a hostile pair count must not wrap into a valid size.
        match pair_count.checked_mul(PAIR_SIZE as u64) {
            Some(expected) if expected == buf.remaining() as u64 => {}
            _ => return Err(DecodeError::new(DecodeErrorKind::InvalidPairCount)),
        }

        let mut clocks = HashMap::with_capacity(pair_count as usize);
        for _ in 0..pair_count {
            let actor = ActorId::new(buf.get_u64());
            let clock = buf.get_u64();
            clocks.insert(actor, clock);
        }

        Ok(VectorTimestamp { clocks })
    }
}

/// JSON-object rendering consumed by the causal log, e.g.
/// `{"actor1":2, "actor2":1}`. Entry order matches serialization order;
/// the separator is `", "` with no trailing separator.
impl fmt::Display for VectorTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;

        let mut first = true;
        for (actor, clock) in &self.clocks {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "\"{actor}\":{clock}")?;
            first = false;
        }

        f.write_str("}")
    }
}
