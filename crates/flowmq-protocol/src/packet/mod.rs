//! Control packet model and wire codec.
//!
//! All packets share the standard fixed header (packet type nibble, flags
//! nibble, variable-byte remaining length). The keepalive pair deviates from
//! classic MQTT: PINGREQ and PINGRESP carry non-empty variable headers (see
//! [`ping`]), which is a deliberate compatibility break of this protocol
//! variant.

use crate::error::{MqttError, Result};
use crate::types::QoS;

use bytes::{Buf, BufMut, BytesMut};

pub mod connack;
pub mod connect;
pub mod ping;
pub mod puback;
pub mod publish;
pub mod suback;
pub mod subscribe;

pub use connack::ConnAckPacket;
pub use connect::ConnectPacket;
pub use ping::{PingReqPacket, PingRespPacket};
pub use puback::PubAckPacket;
pub use publish::PublishPacket;
pub use suback::SubAckPacket;
pub use subscribe::{SubscribePacket, TopicFilter};

/// Largest value the 4-byte variable-length remaining-length field can carry.
pub const MAX_REMAINING_LENGTH: u32 = 268_435_455;

/// Control packet types (fixed header high nibble).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
    Connect = 1,
    ConnAck = 2,
    Publish = 3,
    PubAck = 4,
    Subscribe = 8,
    SubAck = 9,
    PingReq = 12,
    PingResp = 13,
}

impl TryFrom<u8> for PacketType {
    type Error = MqttError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(PacketType::Connect),
            2 => Ok(PacketType::ConnAck),
            3 => Ok(PacketType::Publish),
            4 => Ok(PacketType::PubAck),
            8 => Ok(PacketType::Subscribe),
            9 => Ok(PacketType::SubAck),
            12 => Ok(PacketType::PingReq),
            13 => Ok(PacketType::PingResp),
            _ => Err(MqttError::InvalidPacketType(value)),
        }
    }
}

/// Fixed header common to every control packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeader {
    pub packet_type: PacketType,
    pub flags: u8,
    pub remaining_length: u32,
}

impl FixedHeader {
    #[must_use]
    pub fn new(packet_type: PacketType, flags: u8, remaining_length: u32) -> Self {
        Self {
            packet_type,
            flags: flags & 0x0F,
            remaining_length,
        }
    }

    /// DUP flag (bit 3 of the flags nibble).
    #[must_use]
    pub fn dup(&self) -> bool {
        self.flags & 0b1000 != 0
    }

    /// QoS carried in bits 2-1 of the flags nibble.
    pub fn qos(&self) -> Result<QoS> {
        QoS::try_from((self.flags >> 1) & 0b11)
    }

    /// RETAIN flag (bit 0 of the flags nibble).
    #[must_use]
    pub fn retain(&self) -> bool {
        self.flags & 0b0001 != 0
    }

    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u8(((self.packet_type as u8) << 4) | (self.flags & 0x0F));
        encode_remaining_length(self.remaining_length, buf)
    }

    pub fn decode(buf: &mut BytesMut) -> Result<Self> {
        if !buf.has_remaining() {
            return Err(MqttError::MalformedPacket(
                "empty buffer for fixed header".to_string(),
            ));
        }
        let byte1 = buf.get_u8();
        let packet_type = PacketType::try_from(byte1 >> 4)?;
        let flags = byte1 & 0x0F;
        let remaining_length = decode_remaining_length(buf)?;
        Ok(Self {
            packet_type,
            flags,
            remaining_length,
        })
    }
}

/// Decoded control packet. Closed set: the processor matches exhaustively,
/// so adding a variant is a compile error at every dispatch site.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Connect(ConnectPacket),
    ConnAck(ConnAckPacket),
    Publish(PublishPacket),
    PubAck(PubAckPacket),
    Subscribe(SubscribePacket),
    SubAck(SubAckPacket),
    PingReq(PingReqPacket),
    PingResp(PingRespPacket),
}

impl Packet {
    #[must_use]
    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Connect(_) => PacketType::Connect,
            Packet::ConnAck(_) => PacketType::ConnAck,
            Packet::Publish(_) => PacketType::Publish,
            Packet::PubAck(_) => PacketType::PubAck,
            Packet::Subscribe(_) => PacketType::Subscribe,
            Packet::SubAck(_) => PacketType::SubAck,
            Packet::PingReq(_) => PacketType::PingReq,
            Packet::PingResp(_) => PacketType::PingResp,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        match self {
            Packet::Connect(p) => p.encode(buf),
            Packet::ConnAck(p) => p.encode(buf),
            Packet::Publish(p) => p.encode(buf),
            Packet::PubAck(p) => p.encode(buf),
            Packet::Subscribe(p) => p.encode(buf),
            Packet::SubAck(p) => p.encode(buf),
            Packet::PingReq(p) => p.encode(buf),
            Packet::PingResp(p) => p.encode(buf),
        }
    }

    /// Decodes one complete packet from the front of `buf`.
    ///
    /// The framing layer is expected to hand over whole packets; a buffer
    /// shorter than the declared remaining length is malformed here, not a
    /// retry condition.
    pub fn decode(buf: &mut BytesMut) -> Result<Packet> {
        let header = FixedHeader::decode(buf)?;
        let body_len = header.remaining_length as usize;
        if buf.remaining() < body_len {
            return Err(MqttError::MalformedPacket(format!(
                "truncated packet: declared {} body bytes, have {}",
                body_len,
                buf.remaining()
            )));
        }
        let mut body = buf.split_to(body_len);

        let packet = match header.packet_type {
            PacketType::Connect => Packet::Connect(ConnectPacket::decode_body(&mut body, &header)?),
            PacketType::ConnAck => Packet::ConnAck(ConnAckPacket::decode_body(&mut body, &header)?),
            PacketType::Publish => Packet::Publish(PublishPacket::decode_body(&mut body, &header)?),
            PacketType::PubAck => Packet::PubAck(PubAckPacket::decode_body(&mut body, &header)?),
            PacketType::Subscribe => {
                Packet::Subscribe(SubscribePacket::decode_body(&mut body, &header)?)
            }
            PacketType::SubAck => Packet::SubAck(SubAckPacket::decode_body(&mut body, &header)?),
            PacketType::PingReq => Packet::PingReq(PingReqPacket::decode_body(&mut body, &header)?),
            PacketType::PingResp => {
                Packet::PingResp(PingRespPacket::decode_body(&mut body, &header)?)
            }
        };

        if body.has_remaining() {
            return Err(MqttError::MalformedPacket(format!(
                "{} trailing bytes after {:?} body",
                body.remaining(),
                header.packet_type
            )));
        }
        Ok(packet)
    }
}

/// Encodes the remaining-length field (variable byte integer, at most 4
/// bytes).
pub(crate) fn encode_remaining_length(len: u32, buf: &mut BytesMut) -> Result<()> {
    if len > MAX_REMAINING_LENGTH {
        return Err(MqttError::PacketTooLarge {
            size: len as usize,
            max: MAX_REMAINING_LENGTH as usize,
        });
    }
    let mut value = len;
    loop {
        let mut byte = (value % 128) as u8;
        value /= 128;
        if value > 0 {
            byte |= 0x80;
        }
        buf.put_u8(byte);
        if value == 0 {
            return Ok(());
        }
    }
}

/// Decodes the remaining-length field. Rejects over-long encodings (a
/// continuation bit on the fourth byte).
pub(crate) fn decode_remaining_length(buf: &mut BytesMut) -> Result<u32> {
    let mut multiplier = 1u32;
    let mut value = 0u32;

    loop {
        if !buf.has_remaining() {
            return Err(MqttError::MalformedPacket(
                "truncated remaining length".to_string(),
            ));
        }
        let byte = buf.get_u8();
        value += u32::from(byte & 0x7F) * multiplier;

        if byte & 0x80 == 0 {
            return Ok(value);
        }
        if multiplier >= 128 * 128 * 128 {
            return Err(MqttError::MalformedPacket(
                "remaining length exceeds 4 bytes".to_string(),
            ));
        }
        multiplier *= 128;
    }
}

/// UTF-8 string field: 2-byte big-endian length prefix followed by the bytes.
pub(crate) fn encode_string(value: &str, buf: &mut BytesMut) -> Result<()> {
    if value.len() > usize::from(u16::MAX) {
        return Err(MqttError::PacketTooLarge {
            size: value.len(),
            max: usize::from(u16::MAX),
        });
    }
    #[allow(clippy::cast_possible_truncation)]
    buf.put_u16(value.len() as u16);
    buf.put_slice(value.as_bytes());
    Ok(())
}

pub(crate) fn decode_string(buf: &mut BytesMut) -> Result<String> {
    let len = usize::from(decode_u16(buf)?);
    if buf.remaining() < len {
        return Err(MqttError::MalformedPacket(format!(
            "truncated string: declared {} bytes, have {}",
            len,
            buf.remaining()
        )));
    }
    let bytes = buf.split_to(len);
    String::from_utf8(bytes.to_vec())
        .map_err(|_| MqttError::MalformedPacket("invalid UTF-8 in string field".to_string()))
}

pub(crate) fn decode_u8(buf: &mut BytesMut) -> Result<u8> {
    if !buf.has_remaining() {
        return Err(MqttError::MalformedPacket("unexpected end of body".to_string()));
    }
    Ok(buf.get_u8())
}

pub(crate) fn decode_u16(buf: &mut BytesMut) -> Result<u16> {
    if buf.remaining() < 2 {
        return Err(MqttError::MalformedPacket("unexpected end of body".to_string()));
    }
    Ok(buf.get_u16())
}

pub(crate) fn decode_u32(buf: &mut BytesMut) -> Result<u32> {
    if buf.remaining() < 4 {
        return Err(MqttError::MalformedPacket("unexpected end of body".to_string()));
    }
    Ok(buf.get_u32())
}
