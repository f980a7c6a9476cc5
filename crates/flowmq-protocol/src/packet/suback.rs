use crate::error::Result;
use crate::packet::{decode_u16, decode_u8, FixedHeader, PacketType};
use crate::types::{PacketId, QoS};

use bytes::{BufMut, BytesMut};

/// SUBACK packet: the broker's granted `QoS` level per requested filter, in
/// request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubAckPacket {
    pub packet_id: PacketId,
    pub granted_qos: Vec<QoS>,
}

impl SubAckPacket {
    #[must_use]
    pub fn new(packet_id: PacketId, granted_qos: Vec<QoS>) -> Self {
        Self {
            packet_id,
            granted_qos,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        #[allow(clippy::cast_possible_truncation)]
        let remaining = 2 + self.granted_qos.len() as u32;
        FixedHeader::new(PacketType::SubAck, 0, remaining).encode(buf)?;
        buf.put_u16(self.packet_id.get());
        for qos in &self.granted_qos {
            buf.put_u8(u8::from(*qos));
        }
        Ok(())
    }

    pub fn decode_body(buf: &mut BytesMut, _header: &FixedHeader) -> Result<Self> {
        let packet_id = PacketId::try_from(decode_u16(buf)?)?;
        let mut granted_qos = Vec::with_capacity(buf.len());
        while !buf.is_empty() {
            granted_qos.push(QoS::try_from(decode_u8(buf)?)?);
        }
        Ok(Self {
            packet_id,
            granted_qos,
        })
    }
}
