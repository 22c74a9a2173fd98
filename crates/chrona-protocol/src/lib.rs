//! Chrona Protocol - the request/response exchange over vector timestamps
//!
//! Both sides of the exchange follow one discipline: tick the own clock on
//! every send and receive event, and merge the peer's clock on receipt.
//! This crate is pure - it knows nothing about sockets or runtimes - so the
//! same endpoint logic can be driven by any I/O reactor.

pub mod endpoint;
pub mod error;
pub mod exchange;

pub use endpoint::*;
pub use error::*;
pub use exchange::*;
