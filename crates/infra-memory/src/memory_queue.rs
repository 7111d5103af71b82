// MemoryQueue - Queue handle over the shared store
use std::sync::Arc;
use uuid::Uuid;

use busload_core::domain::{QueueAddress, ReceivedMessage};
use busload_core::port::{Queue, QueueError};

use crate::store::MemoryQueueStore;

/// Handle to one `memory://` queue
///
/// Handles are cheap; every handle for the same address sees the same
/// messages as long as they share a store.
#[derive(Debug, Clone)]
pub struct MemoryQueue {
    uri: QueueAddress,
    store: Arc<MemoryQueueStore>,
}

impl MemoryQueue {
    pub fn new(uri: QueueAddress, store: Arc<MemoryQueueStore>) -> Self {
        Self { uri, store }
    }

    /// Pending message count, `None` when the queue does not exist
    pub fn len(&self) -> Option<usize> {
        self.store.len(&self.uri)
    }
}

impl Queue for MemoryQueue {
    fn uri(&self) -> &QueueAddress {
        &self.uri
    }

    fn create(&self) -> Result<(), QueueError> {
        self.store.create(&self.uri);
        Ok(())
    }

    fn exists(&self) -> bool {
        self.store.has(&self.uri)
    }

    fn enqueue_stream(&self, message_id: Uuid, stream: Vec<u8>) -> Result<(), QueueError> {
        self.store.enqueue(&self.uri, message_id, stream)
    }

    fn dequeue(&self) -> Result<Option<ReceivedMessage>, QueueError> {
        self.store.dequeue(&self.uri)
    }

    fn purge(&self) -> Result<(), QueueError> {
        self.store.purge(&self.uri);
        Ok(())
    }

    fn drop_queue(&self) -> Result<(), QueueError> {
        self.store.drop_queue(&self.uri);
        Ok(())
    }
}
