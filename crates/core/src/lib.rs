//! Jupiter Round-Trip Arbitrage Core Library
//!
//! Shared types, the Jupiter quote client, the Solana chain gateway and the
//! trade engine that ties them together.

pub mod chain;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod jupiter;
pub mod notify;
pub mod route_map;
pub mod state;
pub mod types;


pub use error::*;
pub use types::*;
