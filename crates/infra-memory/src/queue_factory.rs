// MemoryQueueFactory - QueueFactory for the `memory` scheme
use std::sync::Arc;

use busload_core::domain::QueueAddress;
use busload_core::port::{Queue, QueueError, QueueFactory};

use crate::memory_queue::MemoryQueue;
use crate::store::MemoryQueueStore;

pub const MEMORY_SCHEME: &str = "memory";

/// Creates `MemoryQueue` handles over one store
#[derive(Debug, Clone, Default)]
pub struct MemoryQueueFactory {
    store: Arc<MemoryQueueStore>,
}

impl MemoryQueueFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose queues live in `store`
    pub fn with_store(store: Arc<MemoryQueueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<MemoryQueueStore> {
        Arc::clone(&self.store)
    }
}

impl QueueFactory for MemoryQueueFactory {
    fn scheme(&self) -> &str {
        MEMORY_SCHEME
    }

    fn create(&self, uri: &str) -> Result<Arc<dyn Queue>, QueueError> {
        let address = QueueAddress::parse(uri)?;
        if !self.can_create(&address) {
            return Err(QueueError::UnknownScheme(address.scheme().to_string()));
        }
        Ok(Arc::new(MemoryQueue::new(address, Arc::clone(&self.store))))
    }
}
