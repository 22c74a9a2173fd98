//! Chrona Core - actor identity and causal time primitives
//!
//! This crate defines the leaf types of the protocol:
//! - Actor identity ([`ActorId`])
//! - The vector timestamp and its causality operations ([`VectorTimestamp`])
//! - The malformed-input failure taxonomy shared by both binary codecs
//!   ([`DecodeError`])

pub mod error;
pub mod id;
pub mod stamp;

pub use error::*;
pub use id::*;
pub use stamp::*;
