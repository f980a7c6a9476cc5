use crate::error::Result;
use crate::packet::Packet;

/// Outbound side of the transport boundary.
///
/// The framing layer behind this trait serializes writes; the processor
/// calls it from the connection's single inbound dispatch context.
pub trait PacketChannel: Send {
    /// Queues one packet for transmission, preserving call order.
    fn write_packet(&mut self, packet: Packet) -> Result<()>;

    /// Initiates channel teardown. Fire-and-forget: the close is not
    /// awaited, and repeated calls must be tolerated.
    fn close(&mut self);
}
