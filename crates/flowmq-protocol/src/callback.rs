use crate::error::MqttError;

use bytes::Bytes;

/// The capability set an owning client supplies to receive protocol events.
///
/// The handler is owned by the embedder; the processor only holds a shared
/// handle for the lifetime of the connection. Stream-engine adapters and
/// other integrations wrap this trait externally.
pub trait MessageHandler: Send + Sync {
    /// Invoked once per accepted PUBLISH, with the raw message body,
    /// in arrival order.
    fn message_arrive(&self, payload: Bytes);

    /// Invoked at most once per connection lifetime, on connect denial or
    /// transport failure. No further packets are processed afterwards.
    fn connection_lost(&self, cause: MqttError);
}
