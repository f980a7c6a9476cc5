use crate::error::{MqttError, Result};

use std::fmt;

/// Delivery guarantee level for a published message.
///
/// The broker's at-least-once handshake (PUBLISH/PUBACK) applies at
/// `AtLeastOnce` and above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum QoS {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl TryFrom<u8> for QoS {
    type Error = MqttError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            _ => Err(MqttError::InvalidQoS(value)),
        }
    }
}

impl From<QoS> for u8 {
    fn from(qos: QoS) -> Self {
        qos as u8
    }
}

/// CONNACK return codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectReturnCode {
    Accepted = 0,
    UnacceptableProtocolVersion = 1,
    IdentifierRejected = 2,
    ServerUnavailable = 3,
    BadUsernameOrPassword = 4,
    NotAuthorized = 5,
}

impl ConnectReturnCode {
    #[must_use]
    pub fn is_accepted(self) -> bool {
        self == ConnectReturnCode::Accepted
    }
}

impl TryFrom<u8> for ConnectReturnCode {
    type Error = MqttError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ConnectReturnCode::Accepted),
            1 => Ok(ConnectReturnCode::UnacceptableProtocolVersion),
            2 => Ok(ConnectReturnCode::IdentifierRejected),
            3 => Ok(ConnectReturnCode::ServerUnavailable),
            4 => Ok(ConnectReturnCode::BadUsernameOrPassword),
            5 => Ok(ConnectReturnCode::NotAuthorized),
            _ => Err(MqttError::InvalidReturnCode(value)),
        }
    }
}

impl From<ConnectReturnCode> for u8 {
    fn from(code: ConnectReturnCode) -> Self {
        code as u8
    }
}

/// 16-bit correlation identifier pairing a request packet with its
/// acknowledgment. Zero is reserved by the protocol, so construction from a
/// raw integer validates the 1..=65535 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PacketId(u16);

impl PacketId {
    pub fn new(id: u16) -> Result<Self> {
        if id == 0 {
            return Err(MqttError::MalformedPacket(
                "packet id out of range: 0".to_string(),
            ));
        }
        Ok(PacketId(id))
    }

    #[must_use]
    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for PacketId {
    type Error = MqttError;

    fn try_from(id: u16) -> Result<Self> {
        PacketId::new(id)
    }
}

impl TryFrom<u32> for PacketId {
    type Error = MqttError;

    fn try_from(id: u32) -> Result<Self> {
        if id == 0 || id > u32::from(u16::MAX) {
            return Err(MqttError::MalformedPacket(format!(
                "packet id out of range: {id}"
            )));
        }
        #[allow(clippy::cast_possible_truncation)]
        let narrowed = id as u16;
        PacketId::new(narrowed)
    }
}

impl From<PacketId> for u16 {
    fn from(id: PacketId) -> Self {
        id.0
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qos_conversions() {
        assert_eq!(QoS::try_from(0).unwrap(), QoS::AtMostOnce);
        assert_eq!(QoS::try_from(1).unwrap(), QoS::AtLeastOnce);
        assert_eq!(QoS::try_from(2).unwrap(), QoS::ExactlyOnce);
        assert!(matches!(QoS::try_from(3), Err(MqttError::InvalidQoS(3))));

        assert_eq!(u8::from(QoS::AtLeastOnce), 1);
    }

    #[test]
    fn test_return_code_conversions() {
        for raw in 0..=5u8 {
            let code = ConnectReturnCode::try_from(raw).unwrap();
            assert_eq!(u8::from(code), raw);
        }
        assert!(ConnectReturnCode::try_from(6).is_err());

        assert!(ConnectReturnCode::Accepted.is_accepted());
        assert!(!ConnectReturnCode::NotAuthorized.is_accepted());
    }

    #[test]
    fn test_packet_id_range() {
        assert!(PacketId::new(0).is_err());
        assert_eq!(PacketId::new(1).unwrap().get(), 1);
        assert_eq!(PacketId::new(u16::MAX).unwrap().get(), 65535);

        assert!(PacketId::try_from(0u32).is_err());
        assert!(PacketId::try_from(65536u32).is_err());
        assert_eq!(PacketId::try_from(65535u32).unwrap().get(), 65535);
    }

    #[test]
    fn test_packet_id_display() {
        assert_eq!(PacketId::new(42).unwrap().to_string(), "42");
    }
}
