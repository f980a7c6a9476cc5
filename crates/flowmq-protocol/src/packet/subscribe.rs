use crate::error::{MqttError, Result};
use crate::packet::{decode_string, decode_u16, decode_u8, encode_string, FixedHeader, PacketType};
use crate::types::{PacketId, QoS};

use bytes::{BufMut, BytesMut};

/// One requested subscription: topic filter plus maximum `QoS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicFilter {
    pub filter: String,
    pub qos: QoS,
}

impl TopicFilter {
    #[must_use]
    pub fn new(filter: impl Into<String>, qos: QoS) -> Self {
        Self {
            filter: filter.into(),
            qos,
        }
    }
}

/// SUBSCRIBE packet. The fixed header carries the reserved 0b0010 flag
/// nibble required by the protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribePacket {
    pub packet_id: PacketId,
    pub filters: Vec<TopicFilter>,
}

impl SubscribePacket {
    #[must_use]
    pub fn new(packet_id: PacketId) -> Self {
        Self {
            packet_id,
            filters: Vec::new(),
        }
    }

    #[must_use]
    pub fn add_filter(mut self, filter: impl Into<String>, qos: QoS) -> Self {
        self.filters.push(TopicFilter::new(filter, qos));
        self
    }

    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        if self.filters.is_empty() {
            return Err(MqttError::MalformedPacket(
                "SUBSCRIBE requires at least one topic filter".to_string(),
            ));
        }

        let mut body = BytesMut::new();
        body.put_u16(self.packet_id.get());
        for entry in &self.filters {
            encode_string(&entry.filter, &mut body)?;
            body.put_u8(u8::from(entry.qos));
        }

        #[allow(clippy::cast_possible_truncation)]
        FixedHeader::new(PacketType::Subscribe, 0b0010, body.len() as u32).encode(buf)?;
        buf.extend_from_slice(&body);
        Ok(())
    }

    pub fn decode_body(buf: &mut BytesMut, _header: &FixedHeader) -> Result<Self> {
        let packet_id = PacketId::try_from(decode_u16(buf)?)?;
        let mut filters = Vec::new();
        while !buf.is_empty() {
            let filter = decode_string(buf)?;
            let qos = QoS::try_from(decode_u8(buf)?)?;
            filters.push(TopicFilter { filter, qos });
        }
        if filters.is_empty() {
            return Err(MqttError::MalformedPacket(
                "SUBSCRIBE carried no topic filters".to_string(),
            ));
        }
        Ok(Self { packet_id, filters })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Packet;

    #[test]
    fn test_subscribe_round_trip() {
        let packet = SubscribePacket::new(PacketId::new(5).unwrap())
            .add_filter("sensors/#", QoS::AtLeastOnce)
            .add_filter("control/+/cmd", QoS::AtMostOnce);

        let mut buf = BytesMut::new();
        packet.encode(&mut buf).unwrap();
        assert_eq!(buf[0], 0x82);

        let decoded = Packet::decode(&mut buf).unwrap();
        assert_eq!(decoded, Packet::Subscribe(packet));
    }

    #[test]
    fn test_subscribe_requires_filters() {
        let packet = SubscribePacket::new(PacketId::new(5).unwrap());
        let mut buf = BytesMut::new();
        assert!(packet.encode(&mut buf).is_err());
    }
}
