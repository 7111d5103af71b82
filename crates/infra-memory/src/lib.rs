// Busload Infrastructure - In-Memory Queue Adapter
// Implements: Queue, QueueFactory for the `memory` scheme

mod memory_queue;
mod queue_factory;
mod store;

pub use memory_queue::MemoryQueue;
pub use queue_factory::{MemoryQueueFactory, MEMORY_SCHEME};
pub use store::MemoryQueueStore;
