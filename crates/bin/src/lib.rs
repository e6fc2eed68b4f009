//! Native front end for the Snake Royale client.
//!
//! The game core lives in the `client` crate; this crate adds what a native
//! process needs around it: configuration, a tokio WebSocket transport and a
//! text surface.

pub mod config;
pub mod terminal;
pub mod transport;

pub use config::Config;
