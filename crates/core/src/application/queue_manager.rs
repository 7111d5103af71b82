// Queue manager - resolves queue URIs through scheme-keyed factories
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::QueueAddress;
use crate::port::{BusConfiguration, Queue, QueueError, QueueFactory};

/// Registry of queue factories keyed by lowercase scheme
#[derive(Default)]
pub struct QueueManager {
    factories: HashMap<String, Arc<dyn QueueFactory>>,
}

impl QueueManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory`, replacing any factory for the same scheme
    pub fn register_factory(&mut self, factory: Arc<dyn QueueFactory>) {
        let scheme = factory.scheme().to_ascii_lowercase();
        if self.factories.insert(scheme.clone(), factory).is_some() {
            info!(scheme = %scheme, "Queue factory replaced");
        } else {
            debug!(scheme = %scheme, "Queue factory registered");
        }
    }

    pub fn with_factory(mut self, factory: Arc<dyn QueueFactory>) -> Self {
        self.register_factory(factory);
        self
    }

    pub fn get_queue_factory(&self, scheme: &str) -> Option<Arc<dyn QueueFactory>> {
        self.factories.get(&scheme.to_ascii_lowercase()).cloned()
    }

    /// Resolve `uri` to a queue handle
    ///
    /// # Errors
    /// - `QueueError::Address` if `uri` does not parse
    /// - `QueueError::UnknownScheme` if no registered factory accepts it
    pub fn get_queue(&self, uri: &str) -> Result<Arc<dyn Queue>, QueueError> {
        let address = QueueAddress::parse(uri)?;
        let factory = self
            .get_queue_factory(address.scheme())
            .filter(|factory| factory.can_create(&address))
            .ok_or_else(|| QueueError::UnknownScheme(address.scheme().to_string()))?;

        factory.create(uri)
    }

    /// Ensure every queue referenced by `configuration` exists
    pub fn create_physical_queues(&self, configuration: &BusConfiguration) -> Result<(), QueueError> {
        for queue in configuration.queues() {
            queue.create()?;
            debug!(queue = %queue.uri(), "Physical queue ensured");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, ReceivedMessage};
    use crate::port::InboxQueueConfiguration;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use uuid::Uuid;

    struct FakeQueue {
        uri: QueueAddress,
        messages: Mutex<Option<VecDeque<ReceivedMessage>>>,
    }

    impl Queue for FakeQueue {
        fn uri(&self) -> &QueueAddress {
            &self.uri
        }

        fn create(&self) -> Result<(), QueueError> {
            self.messages.lock().unwrap().get_or_insert_with(VecDeque::new);
            Ok(())
        }

        fn exists(&self) -> bool {
            self.messages.lock().unwrap().is_some()
        }

        fn enqueue_stream(&self, message_id: Uuid, stream: Vec<u8>) -> Result<(), QueueError> {
            self.messages
                .lock()
                .unwrap()
                .as_mut()
                .ok_or_else(|| QueueError::NotFound(self.uri.to_string()))?
                .push_back(ReceivedMessage { message_id, stream });
            Ok(())
        }

        fn dequeue(&self) -> Result<Option<ReceivedMessage>, QueueError> {
            Ok(self.messages.lock().unwrap().as_mut().and_then(VecDeque::pop_front))
        }

        fn purge(&self) -> Result<(), QueueError> {
            if let Some(messages) = self.messages.lock().unwrap().as_mut() {
                messages.clear();
            }
            Ok(())
        }

        fn drop_queue(&self) -> Result<(), QueueError> {
            *self.messages.lock().unwrap() = None;
            Ok(())
        }
    }

    struct FakeFactory;

    impl QueueFactory for FakeFactory {
        fn scheme(&self) -> &str {
            "fake"
        }

        fn create(&self, uri: &str) -> Result<Arc<dyn Queue>, QueueError> {
            Ok(Arc::new(FakeQueue {
                uri: QueueAddress::parse(uri)?,
                messages: Mutex::new(None),
            }))
        }
    }

    fn manager() -> QueueManager {
        QueueManager::new().with_factory(Arc::new(FakeFactory))
    }

    #[test]
    fn test_get_queue_matches_scheme_case_insensitively() {
        let manager = manager();

        let queue = manager.get_queue("FAKE://./inbox").unwrap();

        assert_eq!(queue.uri().scheme(), "fake");
        assert!(manager.get_queue_factory("Fake").is_some());
    }

    #[test]
    fn test_unknown_scheme() {
        let err = manager().get_queue("rabbitmq://host/inbox").err().unwrap();
        assert_eq!(err, QueueError::UnknownScheme("rabbitmq".to_string()));
    }

    #[test]
    fn test_invalid_uri() {
        let err = manager().get_queue("").err().unwrap();
        assert!(matches!(err, QueueError::Address(DomainError::InvalidAddress(_))));
    }

    #[test]
    fn test_create_physical_queues() {
        let manager = manager();
        let work_queue = manager.get_queue("fake://./work").unwrap();
        let error_queue = manager.get_queue("fake://./error").unwrap();
        let configuration = BusConfiguration {
            inbox: InboxQueueConfiguration {
                work_queue: Arc::clone(&work_queue),
                error_queue: Arc::clone(&error_queue),
                thread_count: 1,
                duration_to_sleep_when_idle: vec![Duration::from_millis(10)],
            },
            is_transactional: false,
        };

        manager.create_physical_queues(&configuration).unwrap();

        assert!(work_queue.exists());
        assert!(error_queue.exists());
    }
}
