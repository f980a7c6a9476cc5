//! Extended keepalive pair.
//!
//! The broker probes the client with PINGREQ; the client answers with a
//! PINGRESP that piggybacks its admission-control telemetry. Both packets
//! carry variable headers that classic MQTT leaves empty, so this exchange
//! breaks strict protocol compatibility by design and standard peers cannot
//! be expected to interoperate with it.
//!
//! PINGRESP variable header layout, in this exact order:
//! `[back_pressured: 1 byte][consumption_rate: 4-byte BE][queue_capacity:
//! 4-byte BE][packet_id: 2-byte BE]`.

use crate::error::Result;
use crate::packet::{decode_u16, decode_u32, decode_u8, FixedHeader, PacketType};
use crate::types::PacketId;

use bytes::{BufMut, BytesMut};

/// PINGREQ packet: broker-driven liveness probe, correlated by packet id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingReqPacket {
    pub packet_id: PacketId,
}

impl PingReqPacket {
    #[must_use]
    pub fn new(packet_id: PacketId) -> Self {
        Self { packet_id }
    }

    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        FixedHeader::new(PacketType::PingReq, 0, 2).encode(buf)?;
        buf.put_u16(self.packet_id.get());
        Ok(())
    }

    pub fn decode_body(buf: &mut BytesMut, _header: &FixedHeader) -> Result<Self> {
        let packet_id = PacketId::try_from(decode_u16(buf)?)?;
        Ok(Self { packet_id })
    }
}

/// PINGRESP packet: echoes the probe's packet id and reports the client's
/// current flow-control telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingRespPacket {
    pub back_pressured: bool,
    pub consumption_rate: u32,
    pub queue_capacity: u32,
    pub packet_id: PacketId,
}

impl PingRespPacket {
    #[must_use]
    pub fn new(
        back_pressured: bool,
        consumption_rate: u32,
        queue_capacity: u32,
        packet_id: PacketId,
    ) -> Self {
        Self {
            back_pressured,
            consumption_rate,
            queue_capacity,
            packet_id,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        FixedHeader::new(PacketType::PingResp, 0, 11).encode(buf)?;
        buf.put_u8(u8::from(self.back_pressured));
        buf.put_u32(self.consumption_rate);
        buf.put_u32(self.queue_capacity);
        buf.put_u16(self.packet_id.get());
        Ok(())
    }

    pub fn decode_body(buf: &mut BytesMut, _header: &FixedHeader) -> Result<Self> {
        let back_pressured = decode_u8(buf)? != 0;
        let consumption_rate = decode_u32(buf)?;
        let queue_capacity = decode_u32(buf)?;
        let packet_id = PacketId::try_from(decode_u16(buf)?)?;
        Ok(Self {
            back_pressured,
            consumption_rate,
            queue_capacity,
            packet_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Packet;
    use proptest::prelude::*;

    #[test]
    fn test_pingreq_round_trip() {
        let packet = PingReqPacket::new(PacketId::new(7).unwrap());

        let mut buf = BytesMut::new();
        packet.encode(&mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0xC0, 0x02, 0x00, 0x07]);

        let decoded = Packet::decode(&mut buf).unwrap();
        assert_eq!(decoded, Packet::PingReq(packet));
    }

    #[test]
    fn test_pingresp_wire_layout() {
        let packet = PingRespPacket::new(true, 250, 1000, PacketId::new(7).unwrap());

        let mut buf = BytesMut::new();
        packet.encode(&mut buf).unwrap();

        assert_eq!(
            buf.as_ref(),
            &[
                0xD0, 0x0B, // fixed header, 11-byte body
                0x01, // back_pressured
                0x00, 0x00, 0x00, 0xFA, // consumption_rate
                0x00, 0x00, 0x03, 0xE8, // queue_capacity
                0x00, 0x07, // packet_id
            ]
        );

        let decoded = Packet::decode(&mut buf).unwrap();
        assert_eq!(decoded, Packet::PingResp(packet));
    }

    #[test]
    fn test_pingresp_not_back_pressured() {
        let packet = PingRespPacket::new(false, 100, 100, PacketId::new(1).unwrap());

        let mut buf = BytesMut::new();
        packet.encode(&mut buf).unwrap();
        assert_eq!(buf[2], 0x00);

        match Packet::decode(&mut buf).unwrap() {
            Packet::PingResp(decoded) => assert!(!decoded.back_pressured),
            other => panic!("Expected PingResp, got {other:?}"),
        }
    }

    #[test]
    fn test_pingresp_truncated_body() {
        // Declares 11 bytes but the capacity field is cut short.
        let mut buf = BytesMut::from(&[0xD0, 0x0B, 0x00, 0x00, 0x00, 0x00, 0x64, 0x00][..]);
        assert!(Packet::decode(&mut buf).is_err());
    }

    proptest! {
        #[test]
        fn prop_ping_pair_round_trip(
            raw_id in 1u16..=u16::MAX,
            back_pressured in any::<bool>(),
            rate in any::<u32>(),
            capacity in any::<u32>()
        ) {
            let packet_id = PacketId::new(raw_id).unwrap();

            let req = PingReqPacket::new(packet_id);
            let mut buf = BytesMut::new();
            req.encode(&mut buf).unwrap();
            prop_assert_eq!(Packet::decode(&mut buf).unwrap(), Packet::PingReq(req));

            let resp = PingRespPacket::new(back_pressured, rate, capacity, packet_id);
            let mut buf = BytesMut::new();
            resp.encode(&mut buf).unwrap();
            prop_assert_eq!(Packet::decode(&mut buf).unwrap(), Packet::PingResp(resp));
        }
    }
}
