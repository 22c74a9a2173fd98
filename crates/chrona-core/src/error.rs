//! Malformed-input failures for the binary codecs

use std::panic::Location;

use thiserror::Error;

/// Categories of malformed binary input.
///
/// The message texts are load-bearing: log tooling and tests match on the
/// exact wording, so variants carry it verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    /// Fewer than the 8 bytes needed to read a timestamp's pair count.
    #[error("Too few bytes were supplied.")]
    TimestampTruncated,

    /// The declared pair count does not account for the remaining bytes.
    #[error("The pair count given was invalid.")]
    InvalidPairCount,

    /// Fewer bytes than the two 8-byte length fields of a packet, or a
    /// declared region extending past the supplied buffer.
    #[error("Too few bytes were provided.")]
    PacketTruncated,

    /// A packet declaring a zero-length vector timestamp field.
    #[error("A vector timestamp may not be 0 bytes wide.")]
    EmptyTimestamp,

    /// A packet declaring a zero-length payload field.
    #[error("A payload may not be 0 bytes wide.")]
    EmptyPayload,
}

/// A malformed-input failure, tagged with the source location that rejected
/// the buffer.
///
/// Always recoverable: the protocol layer logs it and drops the current
/// message cycle.
#[derive(Clone, Copy, Debug, Error)]
#[error("{kind} (rejected at {location})")]
pub struct DecodeError {
    kind: DecodeErrorKind,
    location: &'static Location<'static>,
}

impl DecodeError {
    #[track_caller]
    pub fn new(kind: DecodeErrorKind) -> Self {
        DecodeError {
            kind,
            location: Location::caller(),
        }
    }

    /// The failure category, for callers that branch without string matching.
    #[inline]
    pub fn kind(&self) -> DecodeErrorKind {
        self.kind
    }

    /// Where the buffer was rejected.
    #[inline]
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
