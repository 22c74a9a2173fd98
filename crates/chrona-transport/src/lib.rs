//! Chrona Transport - TCP connection lifecycle and framed packet I/O
//!
//! This crate provides:
//! - Connect / bind / accept wrappers over tokio TCP
//! - Framed packet reads and writes (field-by-field, per the self-describing
//!   wire layout)
//!
//! Plain TCP, no TLS, no authentication: per-connection byte-stream order is
//! the only ordering primitive the protocol relies on.

pub mod tcp;

pub use tcp::*;
