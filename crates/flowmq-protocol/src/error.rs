use crate::types::ConnectReturnCode;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MqttError>;

#[derive(Debug, Clone, Error)]
pub enum MqttError {
    #[error("connect denied by broker: {0:?}")]
    ConnectDenied(ConnectReturnCode),

    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid packet type: {0}")]
    InvalidPacketType(u8),

    #[error("invalid QoS: {0}")]
    InvalidQoS(u8),

    #[error("invalid connect return code: {0}")]
    InvalidReturnCode(u8),

    #[error("packet too large: size {size} exceeds maximum {max}")]
    PacketTooLarge { size: usize, max: usize },
}

impl MqttError {
    /// True for conditions that end the session; everything else is
    /// observed and ignored.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConnectDenied(_) | Self::Transport(_))
    }
}

impl From<std::io::Error> for MqttError {
    fn from(err: std::io::Error) -> Self {
        MqttError::Transport(err.to_string())
    }
}
