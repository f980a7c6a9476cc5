use crate::error::Result;
use crate::packet::{decode_u8, FixedHeader, PacketType};
use crate::types::ConnectReturnCode;

use bytes::{BufMut, BytesMut};

/// CONNACK packet: the broker's verdict on a CONNECT attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnAckPacket {
    pub session_present: bool,
    pub return_code: ConnectReturnCode,
}

impl ConnAckPacket {
    #[must_use]
    pub fn new(session_present: bool, return_code: ConnectReturnCode) -> Self {
        Self {
            session_present,
            return_code,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        FixedHeader::new(PacketType::ConnAck, 0, 2).encode(buf)?;
        buf.put_u8(u8::from(self.session_present));
        buf.put_u8(u8::from(self.return_code));
        Ok(())
    }

    pub fn decode_body(buf: &mut BytesMut, _header: &FixedHeader) -> Result<Self> {
        let ack_flags = decode_u8(buf)?;
        let return_code = ConnectReturnCode::try_from(decode_u8(buf)?)?;
        Ok(Self {
            session_present: ack_flags & 0x01 != 0,
            return_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Packet;

    #[test]
    fn test_connack_round_trip() {
        let packet = ConnAckPacket::new(true, ConnectReturnCode::Accepted);

        let mut buf = BytesMut::new();
        packet.encode(&mut buf).unwrap();

        let decoded = Packet::decode(&mut buf).unwrap();
        assert_eq!(decoded, Packet::ConnAck(packet));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_connack_denied_codes() {
        for code in [
            ConnectReturnCode::UnacceptableProtocolVersion,
            ConnectReturnCode::IdentifierRejected,
            ConnectReturnCode::ServerUnavailable,
            ConnectReturnCode::BadUsernameOrPassword,
            ConnectReturnCode::NotAuthorized,
        ] {
            let packet = ConnAckPacket::new(false, code);
            let mut buf = BytesMut::new();
            packet.encode(&mut buf).unwrap();

            match Packet::decode(&mut buf).unwrap() {
                Packet::ConnAck(decoded) => {
                    assert_eq!(decoded.return_code, code);
                    assert!(!decoded.return_code.is_accepted());
                }
                other => panic!("Expected ConnAck, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_connack_invalid_return_code() {
        let mut buf = BytesMut::from(&[0x20, 0x02, 0x00, 0x09][..]);
        assert!(Packet::decode(&mut buf).is_err());
    }
}
