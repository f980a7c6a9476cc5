//! Client-side protocol engine for the flowmq pub/sub broker.
//!
//! The wire protocol is derived from MQTT 3.1.1 and extended with explicit
//! flow-control signaling: the broker probes liveness with PINGREQ and the
//! client answers with a PINGRESP carrying its backpressure flag,
//! consumption rate and queue capacity. Both keepalive packets carry
//! variable headers that classic MQTT leaves empty, so the extension breaks
//! strict protocol compatibility by design.
//!
//! The crate is sans-io: the [`ProtocolProcessor`] consumes decoded
//! [`Packet`] values from a single dispatch context, mutates the
//! [`ClientSession`], writes replies through a [`PacketChannel`] and
//! delivers events through a [`MessageHandler`]. Transports, framing loops
//! and client APIs live in the embedding application.

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

pub mod callback;
pub mod channel;
pub mod error;
pub mod flow;
pub mod packet;
pub mod processor;
pub mod session;
pub mod types;

pub use callback::MessageHandler;
pub use channel::PacketChannel;
pub use error::{MqttError, Result};
pub use flow::{ConsumptionMonitor, FlowMonitorConfig};
pub use packet::{
    ConnAckPacket, ConnectPacket, FixedHeader, Packet, PacketType, PingReqPacket, PingRespPacket,
    PubAckPacket, PublishPacket, SubAckPacket, SubscribePacket, TopicFilter,
};
pub use processor::ProtocolProcessor;
pub use session::ClientSession;
pub use types::{ConnectReturnCode, PacketId, QoS};
