// Queue port - storage-agnostic FIFO handle and URI-scheme factory

use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{DomainError, QueueAddress, ReceivedMessage, TransportMessage};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error(transparent)]
    Address(#[from] DomainError),

    #[error("Queue not found: {0}")]
    NotFound(String),

    #[error("No queue factory registered for scheme '{0}'")]
    UnknownScheme(String),
}

/// Handle to one named queue
///
/// Invariants every implementation upholds:
/// - `dequeue` hands out messages in `enqueue` order
/// - a dequeued message is gone; concurrent dequeuers never share one
/// - `create`, `purge` and `drop_queue` are idempotent
pub trait Queue: Send + Sync {
    fn uri(&self) -> &QueueAddress;

    /// Register the queue; a no-op if it already exists
    fn create(&self) -> Result<(), QueueError>;

    fn exists(&self) -> bool;

    /// Append a serialized stream under the given message id
    fn enqueue_stream(&self, message_id: Uuid, stream: Vec<u8>) -> Result<(), QueueError>;

    /// Append `stream`, the serialized form of `message`
    fn enqueue(&self, message: &TransportMessage, stream: Vec<u8>) -> Result<(), QueueError> {
        self.enqueue_stream(message.message_id, stream)
    }

    /// Remove and return the head, `None` when empty
    fn dequeue(&self) -> Result<Option<ReceivedMessage>, QueueError>;

    /// Remove all messages, keep the registration
    fn purge(&self) -> Result<(), QueueError>;

    /// Remove the registration; later use requires `create` again
    fn drop_queue(&self) -> Result<(), QueueError>;
}

/// Creates queues for one URI scheme
pub trait QueueFactory: Send + Sync {
    fn scheme(&self) -> &str;

    fn can_create(&self, uri: &QueueAddress) -> bool {
        uri.has_scheme(self.scheme())
    }

    /// # Errors
    /// `QueueError::Address` when `uri` is empty or unparseable.
    fn create(&self, uri: &str) -> Result<Arc<dyn Queue>, QueueError>;
}
