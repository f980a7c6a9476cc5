//! Inbound protocol processing.
//!
//! The processor consumes one decoded packet at a time from the connection's
//! single dispatch context, mutates the [`ClientSession`], and emits at most
//! one reply per inbound packet. All persistent state lives in the session;
//! the processor itself only tracks whether the connection has ended.

use crate::callback::MessageHandler;
use crate::channel::PacketChannel;
use crate::error::{MqttError, Result};
use crate::packet::{Packet, PingRespPacket, PubAckPacket};
use crate::session::ClientSession;

use std::sync::Arc;

use parking_lot::Mutex;

pub struct ProtocolProcessor<C: PacketChannel> {
    session: Arc<Mutex<ClientSession>>,
    channel: C,
    handler: Arc<dyn MessageHandler>,
    connection_lost_fired: bool,
    closed: bool,
}

impl<C: PacketChannel> ProtocolProcessor<C> {
    pub fn new(
        session: Arc<Mutex<ClientSession>>,
        channel: C,
        handler: Arc<dyn MessageHandler>,
    ) -> Self {
        Self {
            session,
            channel,
            handler,
            connection_lost_fired: false,
            closed: false,
        }
    }

    /// Shared handle to the connection's session.
    #[must_use]
    pub fn session(&self) -> Arc<Mutex<ClientSession>> {
        Arc::clone(&self.session)
    }

    /// True once the connection has been torn down; later packets are
    /// dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Dispatches one inbound packet.
    ///
    /// The reply for this packet (when the table calls for one) is written
    /// before the call returns, which preserves the per-connection FIFO
    /// ordering the at-least-once handshake expects.
    pub fn process(&mut self, packet: Packet) -> Result<()> {
        if self.closed {
            tracing::trace!(packet_type = ?packet.packet_type(), "connection closed, dropping packet");
            return Ok(());
        }

        match packet {
            Packet::ConnAck(connack) => {
                if connack.return_code.is_accepted() {
                    // Connected-state bookkeeping belongs to the owning
                    // client, not this processor.
                    tracing::debug!(session_present = connack.session_present, "connect accepted");
                    return Ok(());
                }
                tracing::error!(code = ?connack.return_code, "connect denied, closing channel");
                self.channel.close();
                self.closed = true;
                self.emit_connection_lost(MqttError::ConnectDenied(connack.return_code));
                Ok(())
            }
            Packet::Publish(publish) => {
                self.handler.message_arrive(publish.payload);
                if let Some(packet_id) = publish.packet_id {
                    self.channel
                        .write_packet(Packet::PubAck(PubAckPacket::new(packet_id)))?;
                }
                Ok(())
            }
            Packet::PubAck(puback) => {
                let removed = self.session.lock().clear_unacked(puback.packet_id);
                if !removed {
                    tracing::debug!(packet_id = %puback.packet_id, "PUBACK for untracked packet id, ignoring");
                }
                Ok(())
            }
            Packet::SubAck(suback) => {
                // Granted levels are observed, not enforced.
                tracing::debug!(
                    packet_id = %suback.packet_id,
                    granted = ?suback.granted_qos,
                    "subscription acknowledged"
                );
                Ok(())
            }
            Packet::PingReq(pingreq) => {
                let (back_pressured, consumption_rate, queue_capacity) = {
                    let session = self.session.lock();
                    (
                        session.is_back_pressured(),
                        session.consumption_rate(),
                        session.queue_capacity(),
                    )
                };
                self.channel.write_packet(Packet::PingResp(PingRespPacket::new(
                    back_pressured,
                    consumption_rate,
                    queue_capacity,
                    pingreq.packet_id,
                )))
            }
            Packet::PingResp(_) | Packet::Connect(_) | Packet::Subscribe(_) => {
                // Not expected on the client's inbound stream; never fatal.
                tracing::warn!(packet_type = ?packet.packet_type(), "unexpected inbound packet, ignoring");
                Ok(())
            }
        }
    }

    /// Reports a channel-level failure from the transport. Closes the
    /// channel and surfaces `connection_lost` (once).
    pub fn transport_failed(&mut self, cause: MqttError) {
        if !self.closed {
            self.closed = true;
            self.channel.close();
        }
        self.emit_connection_lost(cause);
    }

    /// Locally initiated teardown. Idempotent: calling it on an already
    /// closed connection is a no-op. Does not fire `connection_lost`.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.channel.close();
    }

    fn emit_connection_lost(&mut self, cause: MqttError) {
        if self.connection_lost_fired {
            return;
        }
        self.connection_lost_fired = true;
        self.handler.connection_lost(cause);
    }
}
