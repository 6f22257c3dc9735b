// Queue module exports

pub mod engine;
pub mod registry;

pub use engine::{QueueEngine, HANDOFF_CAPACITY};
pub use registry::QueueRegistry;
