// Serializer port - transport message <-> byte stream

use crate::domain::TransportMessage;
use crate::error::Result;

pub trait Serializer: Send + Sync {
    fn serialize(&self, message: &TransportMessage) -> Result<Vec<u8>>;

    fn deserialize(&self, stream: &[u8]) -> Result<TransportMessage>;
}

/// JSON serializer (production)
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, message: &TransportMessage) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(message)?)
    }

    fn deserialize(&self, stream: &[u8]) -> Result<TransportMessage> {
        Ok(serde_json::from_slice(stream)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QueueAddress, TransportMessageFactory};
    use crate::AppError;

    #[test]
    fn test_json_serializer_preserves_envelope() {
        let recipient = QueueAddress::parse("memory://./inbox").unwrap();
        let message = TransportMessageFactory::new()
            .create(&"payload", |c| {
                c.with_recipient(recipient);
            })
            .unwrap();

        let stream = JsonSerializer.serialize(&message).unwrap();
        let back = JsonSerializer.deserialize(&stream).unwrap();

        assert_eq!(back, message);
    }

    #[test]
    fn test_garbage_stream_is_serialization_error() {
        let err = JsonSerializer.deserialize(b"not json").unwrap_err();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
