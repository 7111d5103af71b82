// Shared message store behind every MemoryQueue handle
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

use busload_core::domain::{QueueAddress, ReceivedMessage};
use busload_core::port::QueueError;

type Messages = Arc<Mutex<VecDeque<ReceivedMessage>>>;

/// Registry of named in-memory queues
///
/// The registry lock is held only to look up or change registrations; each
/// queue's message list has its own mutex, so traffic on one queue never
/// blocks another. The observable order of concurrent enqueues is the order
/// in which they acquired the queue's mutex.
#[derive(Debug, Default)]
pub struct MemoryQueueStore {
    queues: Mutex<HashMap<QueueAddress, Messages>>,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<QueueAddress, Messages>> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn messages(&self, address: &QueueAddress) -> Result<Messages, QueueError> {
        self.registry()
            .get(address)
            .cloned()
            .ok_or_else(|| QueueError::NotFound(address.to_string()))
    }

    /// Register `address`; existing messages survive a repeated create
    pub fn create(&self, address: &QueueAddress) {
        let mut registry = self.registry();
        if !registry.contains_key(address) {
            registry.insert(address.clone(), Messages::default());
            debug!(queue = %address, "Memory queue created");
        }
    }

    pub fn has(&self, address: &QueueAddress) -> bool {
        self.registry().contains_key(address)
    }

    pub fn enqueue(
        &self,
        address: &QueueAddress,
        message_id: Uuid,
        stream: Vec<u8>,
    ) -> Result<(), QueueError> {
        let messages = self.messages(address)?;
        messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(ReceivedMessage { message_id, stream });
        Ok(())
    }

    pub fn dequeue(&self, address: &QueueAddress) -> Result<Option<ReceivedMessage>, QueueError> {
        let messages = self.messages(address)?;
        let head = messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        Ok(head)
    }

    /// Empty the queue; a no-op for unknown addresses
    pub fn purge(&self, address: &QueueAddress) {
        if let Ok(messages) = self.messages(address) {
            messages.lock().unwrap_or_else(PoisonError::into_inner).clear();
            debug!(queue = %address, "Memory queue purged");
        }
    }

    /// Remove the registration; a no-op for unknown addresses
    pub fn drop_queue(&self, address: &QueueAddress) {
        if self.registry().remove(address).is_some() {
            debug!(queue = %address, "Memory queue dropped");
        }
    }

    /// Message count, `None` for unknown addresses
    pub fn len(&self, address: &QueueAddress) -> Option<usize> {
        self.messages(address)
            .ok()
            .map(|messages| messages.lock().unwrap_or_else(PoisonError::into_inner).len())
    }
}
