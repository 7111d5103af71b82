// Transport Message Domain Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::queue::QueueAddress;

/// Message envelope carried by the bus
///
/// `message` holds the serialized command. The envelope is immutable once it
/// has been enqueued; queues keep only the serialized stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportMessage {
    pub message_id: Uuid,
    pub message_type: String,
    pub recipient: Option<QueueAddress>,
    pub correlation_id: Option<String>,
    pub sent_at: DateTime<Utc>,
    pub message: Vec<u8>,
}

/// Message as handed out by a queue on dequeue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub message_id: Uuid,
    pub stream: Vec<u8>,
}

/// Options applied by the `configure` closure of `TransportMessageFactory::create`
#[derive(Debug, Default, Clone)]
pub struct TransportMessageConfigurator {
    recipient: Option<QueueAddress>,
    correlation_id: Option<String>,
}

impl TransportMessageConfigurator {
    pub fn with_recipient(&mut self, recipient: QueueAddress) -> &mut Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn with_correlation_id(&mut self, correlation_id: impl Into<String>) -> &mut Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
}

/// Builds transport messages from serializable commands
#[derive(Debug, Default, Clone)]
pub struct TransportMessageFactory;

impl TransportMessageFactory {
    pub fn new() -> Self {
        Self
    }

    /// Wrap `command` in a fresh envelope
    ///
    /// # Example
    /// ```text
    /// let message = factory.create(&command, |c| {
    ///     c.with_recipient(work_queue.uri().clone());
    /// })?;
    /// ```
    pub fn create<C, F>(&self, command: &C, configure: F) -> Result<TransportMessage, serde_json::Error>
    where
        C: Serialize,
        F: FnOnce(&mut TransportMessageConfigurator),
    {
        let mut configurator = TransportMessageConfigurator::default();
        configure(&mut configurator);

        Ok(TransportMessage {
            message_id: Uuid::new_v4(),
            message_type: std::any::type_name::<C>().to_string(),
            recipient: configurator.recipient,
            correlation_id: configurator.correlation_id,
            sent_at: Utc::now(),
            message: serde_json::to_vec(command)?,
        })
    }
}
