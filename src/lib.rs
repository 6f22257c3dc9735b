// relayq - In-memory named FIFO queues over the Redis protocol
//
// This library provides the queue engine, registry, and RESP server.
// Binary entry point is in src/main.rs

pub mod error;
pub mod queue;
pub mod resp;

pub use error::InvalidRequest;
pub use queue::{QueueEngine, QueueRegistry};
pub use resp::{RespConfig, RespServer};
