//! Packet envelope and its binary codec
//!
//! Wire layout:
//!
//! ```text
//! Packet := u64(stamp_len) bytes[stamp_len] u64(payload_len) bytes[payload_len]
//! ```

use bytes::{Buf, BufMut, BytesMut};

use chrona_core::{DecodeError, DecodeErrorKind, DecodeResult};

/// Two 8-byte length fields.
pub const MIN_PACKET_SIZE: usize = 16;

/// The two-field envelope: serialized vector timestamp plus opaque payload.
///
/// Immutable once constructed; lives for exactly one message. The envelope
/// does not interpret either field - the timestamp bytes are decoded by the
/// protocol layer, the payload by whoever dispatches on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    stamp: Vec<u8>,
    payload: Vec<u8>,
}

impl Packet {
    /// Copy both regions into an owned packet. No validation happens here;
    /// empty fields are only rejected on the wire.
    pub fn new(stamp: &[u8], payload: &[u8]) -> Self {
        Packet {
            stamp: stamp.to_vec(),
            payload: payload.to_vec(),
        }
    }

    /// The serialized vector timestamp field.
    #[inline]
    pub fn stamp_bytes(&self) -> &[u8] {
        &self.stamp
    }

    /// The opaque payload field.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Total serialized size in bytes.
    #[inline]
    pub fn wire_size(&self) -> usize {
        MIN_PACKET_SIZE + self.stamp.len() + self.payload.len()
    }

    /// Encode to the length-prefixed wire layout.
    pub fn serialize_to_binary(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(self.wire_size());

        buf.put_u64(self.stamp.len() as u64);
        buf.put_slice(&self.stamp);
        buf.put_u64(self.payload.len() as u64);
        buf.put_slice(&self.payload);

        buf.to_vec()
    }

    /// Decode a packet from `bytes`.
    ///
    /// Fails with [`DecodeErrorKind::PacketTruncated`] when the buffer is
    /// shorter than the two length fields or a declared region runs past the
    /// end, [`DecodeErrorKind::EmptyTimestamp`] when the declared timestamp
    /// length is 0, and [`DecodeErrorKind::EmptyPayload`] when the declared
    /// payload length is 0.
    ///
    /// Bytes after the declared payload are silently ignored. This
    /// permissiveness is part of the wire contract and is pinned by a test;
    /// do not tighten it without changing the contract.
    pub fn deserialize_from_binary(bytes: &[u8]) -> DecodeResult<Self> {
        if bytes.len() < MIN_PACKET_SIZE {
            return Err(DecodeError::new(DecodeErrorKind::PacketTruncated));
        }

        let mut buf = bytes;

        let stamp_len = buf.get_u64();
        if stamp_len == 0 {
            return Err(DecodeError::new(DecodeErrorKind::EmptyTimestamp));
        }
        if (buf.remaining() as u64) < stamp_len {
            return Err(DecodeError::new(DecodeErrorKind::PacketTruncated));
        }
        let stamp_len = stamp_len as usize;
        let stamp = buf[..stamp_len].to_vec();
        buf.advance(stamp_len);

        if buf.remaining() < 8 {
            return Err(DecodeError::new(DecodeErrorKind::PacketTruncated));
        }
        let payload_len = buf.get_u64();
        if payload_len == 0 {
            return Err(DecodeError::new(DecodeErrorKind::EmptyPayload));
        }
        if (buf.remaining() as u64) < payload_len {
            return Err(DecodeError::new(DecodeErrorKind::PacketTruncated));
        }
        let payload = buf[..payload_len as usize].to_vec();

        Ok(Packet { stamp, payload })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// A serialized two-pair vector timestamp: actor1 at 10, actor2 at 15.
    const STAMP: [u8; 40] = [
        /* pair count */
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02,
        /* actor1 */
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
        /* actor1 clock */
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0A,
        /* actor2 */
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02,
        /* actor2 clock */
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0F,
    ];

    const PAYLOAD: &[u8; 12] = b"Hello World!";

    /// The full 68-byte frame for STAMP + PAYLOAD.
    fn golden_frame() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(STAMP.len() as u64).to_be_bytes());
        buf.extend_from_slice(&STAMP);
        buf.extend_from_slice(&(PAYLOAD.len() as u64).to_be_bytes());
        buf.extend_from_slice(PAYLOAD);
        buf
    }

    #[test]
    fn test_construction_copies_both_regions() {
        let pkt = Packet::new(&STAMP, PAYLOAD);

        assert_eq!(pkt.stamp_bytes(), STAMP);
        assert_eq!(pkt.payload(), PAYLOAD);
    }

    #[test]
    fn test_serialize_matches_golden_bytes() {
        let pkt = Packet::new(&STAMP, PAYLOAD);

        assert_eq!(pkt.serialize_to_binary(), golden_frame());
    }

    #[test]
    fn test_deserialize_golden_bytes() {
        let pkt = Packet::deserialize_from_binary(&golden_frame()).unwrap();

        assert_eq!(pkt.stamp_bytes(), STAMP);
        assert_eq!(pkt.payload(), PAYLOAD);
    }

    #[test]
    fn test_roundtrip() {
        let pkt = Packet::new(&STAMP, PAYLOAD);

        let decoded = Packet::deserialize_from_binary(&pkt.serialize_to_binary()).unwrap();

        assert_eq!(pkt, decoded);
    }

    #[test]
    fn test_deserialize_too_few_bytes() {
        let err = Packet::deserialize_from_binary(&[0u8; 15]).unwrap_err();

        assert_eq!(err.kind(), DecodeErrorKind::PacketTruncated);
        assert!(err.to_string().starts_with("Too few bytes were provided."));
    }

    #[test]
    fn test_deserialize_rejects_empty_timestamp_field() {
        let mut frame = golden_frame();
        frame[..8].fill(0);

        let err = Packet::deserialize_from_binary(&frame).unwrap_err();

        assert_eq!(err.kind(), DecodeErrorKind::EmptyTimestamp);
        assert!(err
            .to_string()
            .starts_with("A vector timestamp may not be 0 bytes wide."));
    }

    #[test]
    fn test_deserialize_rejects_empty_payload_field() {
        let mut frame = golden_frame();
        frame[48..56].fill(0);

        let err = Packet::deserialize_from_binary(&frame).unwrap_err();

        assert_eq!(err.kind(), DecodeErrorKind::EmptyPayload);
        assert!(err.to_string().starts_with("A payload may not be 0 bytes wide."));
    }

    #[test]
    fn test_deserialize_rejects_truncated_stamp_region() {
        // Declares the 40-byte timestamp but the buffer ends after 10 bytes.
        let mut frame = golden_frame();
        frame.truncate(8 + 10);

        let err = Packet::deserialize_from_binary(&frame).unwrap_err();

        assert_eq!(err.kind(), DecodeErrorKind::PacketTruncated);
    }

    #[test]
    fn test_deserialize_rejects_truncated_payload_region() {
        let mut frame = golden_frame();
        frame.truncate(frame.len() - 4);

        let err = Packet::deserialize_from_binary(&frame).unwrap_err();

        assert_eq!(err.kind(), DecodeErrorKind::PacketTruncated);
    }

    #[test]
    fn test_deserialize_ignores_trailing_bytes() {
        let mut frame = golden_frame();
        frame.extend_from_slice(b"junk past the declared payload");

        let pkt = Packet::deserialize_from_binary(&frame).unwrap();

        assert_eq!(pkt.stamp_bytes(), STAMP);
        assert_eq!(pkt.payload(), PAYLOAD);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(stamp in proptest::collection::vec(any::<u8>(), 1..128),
                          payload in proptest::collection::vec(any::<u8>(), 1..128)) {
            let pkt = Packet::new(&stamp, &payload);
            let decoded = Packet::deserialize_from_binary(&pkt.serialize_to_binary()).unwrap();

            prop_assert_eq!(pkt, decoded);
        }
    }
}
