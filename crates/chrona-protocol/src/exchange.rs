//! Exchange rules for the time request/response
//!
//! The server recognizes exactly one request payload and answers it with a
//! human-readable time of day. The response text is display-only; clients
//! log it and never parse it.

use std::time::SystemTime;

/// The fixed literal token a client sends to request the time of day.
pub const REQUEST_PAYLOAD: &[u8] = b"GIEVTIMEPLX";

/// What an inbound payload asks of the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    /// The payload is exactly [`REQUEST_PAYLOAD`].
    TimeOfDay,
    /// Anything else. The exchange is abandoned: no response is sent, the
    /// connection stays open.
    Unexpected,
}

/// Dispatch on a request payload.
pub fn classify_request(payload: &[u8]) -> Request {
    if payload == REQUEST_PAYLOAD {
        Request::TimeOfDay
    } else {
        Request::Unexpected
    }
}

/// The response payload for a time request, rendered from `now`.
pub fn time_of_day_payload(now: SystemTime) -> Vec<u8> {
    humantime::format_rfc3339_seconds(now)
        .to_string()
        .into_bytes()
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_classify_recognizes_the_token() {
        assert_eq!(classify_request(b"GIEVTIMEPLX"), Request::TimeOfDay);
    }

    #[test]
    fn test_classify_rejects_everything_else() {
        assert_eq!(classify_request(b"GIEVTIMEPLX "), Request::Unexpected);
        assert_eq!(classify_request(b"gievtimeplx"), Request::Unexpected);
        assert_eq!(classify_request(b""), Request::Unexpected);
    }

    #[test]
    fn test_time_payload_is_display_text() {
        let payload = time_of_day_payload(UNIX_EPOCH + Duration::from_secs(1_000_000_000));

        assert_eq!(payload, b"2001-09-09T01:46:40Z");
    }

    proptest! {
        #[test]
        fn prop_only_the_exact_token_matches(payload in proptest::collection::vec(any::<u8>(), 0..32)) {
            let expected = if payload == REQUEST_PAYLOAD {
                Request::TimeOfDay
            } else {
                Request::Unexpected
            };
            prop_assert_eq!(classify_request(&payload), expected);
        }
    }
}
