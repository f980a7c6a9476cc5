use crate::error::{MqttError, Result};
use crate::packet::{decode_string, decode_u16, encode_string, FixedHeader, PacketType};
use crate::types::{PacketId, QoS};

use bytes::{BufMut, Bytes, BytesMut};

/// PUBLISH packet: one application message in either direction.
///
/// The packet id is present exactly when the `QoS` requires the
/// acknowledgment handshake; the payload travels verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishPacket {
    pub topic_name: String,
    pub packet_id: Option<PacketId>,
    pub qos: QoS,
    pub dup: bool,
    pub retain: bool,
    pub payload: Bytes,
}

impl PublishPacket {
    #[must_use]
    pub fn new(topic_name: impl Into<String>, payload: impl Into<Bytes>, qos: QoS) -> Self {
        Self {
            topic_name: topic_name.into(),
            packet_id: None,
            qos,
            dup: false,
            retain: false,
            payload: payload.into(),
        }
    }

    #[must_use]
    pub fn with_packet_id(mut self, packet_id: PacketId) -> Self {
        self.packet_id = Some(packet_id);
        self
    }

    #[must_use]
    pub fn with_retain(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }

    #[must_use]
    pub fn with_dup(mut self, dup: bool) -> Self {
        self.dup = dup;
        self
    }

    fn flags(&self) -> u8 {
        (u8::from(self.dup) << 3) | (u8::from(self.qos) << 1) | u8::from(self.retain)
    }

    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        if self.qos != QoS::AtMostOnce && self.packet_id.is_none() {
            return Err(MqttError::MalformedPacket(format!(
                "PUBLISH at {:?} requires a packet id",
                self.qos
            )));
        }

        let mut body = BytesMut::new();
        encode_string(&self.topic_name, &mut body)?;
        if let Some(packet_id) = self.packet_id {
            body.put_u16(packet_id.get());
        }
        body.put_slice(&self.payload);

        #[allow(clippy::cast_possible_truncation)]
        FixedHeader::new(PacketType::Publish, self.flags(), body.len() as u32).encode(buf)?;
        buf.extend_from_slice(&body);
        Ok(())
    }

    pub fn decode_body(buf: &mut BytesMut, header: &FixedHeader) -> Result<Self> {
        let qos = header.qos()?;
        let topic_name = decode_string(buf)?;
        let packet_id = if qos == QoS::AtMostOnce {
            None
        } else {
            Some(PacketId::try_from(decode_u16(buf)?)?)
        };
        let payload = buf.split().freeze();

        Ok(Self {
            topic_name,
            packet_id,
            qos,
            dup: header.dup(),
            retain: header.retain(),
            payload,
        })
    }
}
