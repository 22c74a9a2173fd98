//! Chrona Runtime - the two actors of the time exchange
//!
//! - [`Client`]: connects, then requests the time of day on a fixed timer
//! - [`Server`]: listens, answers the request token with the time of day
//! - [`EventLog`]: the causal log both actors write their SEND/RECV events to
//!
//! Each actor runs its protocol endpoint on a single logical thread of
//! control (one exchange task per client, one service task per server), so
//! the live vector timestamp needs no locking.

pub mod client;
pub mod config;
pub mod log;
pub mod server;

pub use client::*;
pub use config::*;
pub use log::*;
pub use server::*;
