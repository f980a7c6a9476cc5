use crate::error::Result;
use crate::packet::{decode_u16, FixedHeader, PacketType};
use crate::types::{PacketId, QoS};

use bytes::{BufMut, BytesMut};

/// PUBACK packet: acknowledges one at-least-once PUBLISH.
///
/// This protocol variant emits PUBACK with the `QoS` 1 bits set in the fixed
/// header flags (first byte 0x42 rather than the classic 0x40); the decoder
/// accepts either form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PubAckPacket {
    pub packet_id: PacketId,
}

impl PubAckPacket {
    #[must_use]
    pub fn new(packet_id: PacketId) -> Self {
        Self { packet_id }
    }

    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        let flags = u8::from(QoS::AtLeastOnce) << 1;
        FixedHeader::new(PacketType::PubAck, flags, 2).encode(buf)?;
        buf.put_u16(self.packet_id.get());
        Ok(())
    }

    pub fn decode_body(buf: &mut BytesMut, _header: &FixedHeader) -> Result<Self> {
        let packet_id = PacketId::try_from(decode_u16(buf)?)?;
        Ok(Self { packet_id })
    }
}
