use crate::types::PacketId;

/// Placeholder gauge values reported until the owning consumer installs a
/// real estimator (see [`crate::flow`]).
const DEFAULT_CONSUMPTION_RATE: u32 = 100;
const DEFAULT_QUEUE_CAPACITY: u32 = 100;

/// Per-connection protocol state.
///
/// A session is owned by exactly one connection: created fresh on each
/// connect attempt and discarded on teardown, never persisted or reused
/// across reconnects. The admission-control fields are set by the owning
/// consumer; the processor only reads them when answering a keepalive probe.
#[derive(Debug)]
pub struct ClientSession {
    back_pressured: bool,
    consumption_rate: u32,
    queue_capacity: u32,
    /// Packet ids of outbound QoS >= 1 publishes still awaiting PUBACK, in
    /// send order.
    unacked: Vec<PacketId>,
}

impl ClientSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            back_pressured: false,
            consumption_rate: DEFAULT_CONSUMPTION_RATE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            unacked: Vec::new(),
        }
    }

    /// Non-blocking read of the current admission-control state.
    #[must_use]
    pub fn is_back_pressured(&self) -> bool {
        self.back_pressured
    }

    /// Set by the owning consumer (for example when its inbound queue depth
    /// crosses a watermark). The session never decides this value itself.
    pub fn set_back_pressured(&mut self, back_pressured: bool) {
        self.back_pressured = back_pressured;
    }

    #[must_use]
    pub fn consumption_rate(&self) -> u32 {
        self.consumption_rate
    }

    pub fn set_consumption_rate(&mut self, rate: u32) {
        self.consumption_rate = rate;
    }

    #[must_use]
    pub fn queue_capacity(&self) -> u32 {
        self.queue_capacity
    }

    pub fn set_queue_capacity(&mut self, capacity: u32) {
        self.queue_capacity = capacity;
    }

    /// Records an outbound publish awaiting acknowledgment. Marking an id
    /// that is already tracked is a no-op.
    pub fn mark_unacked(&mut self, packet_id: PacketId) {
        if !self.unacked.contains(&packet_id) {
            self.unacked.push(packet_id);
        }
    }

    /// Clears a tracked id once its PUBACK arrives. Returns `false` without
    /// error when the id was never tracked: the broker may legitimately
    /// double-ack, or ack after a local timeout-driven retry.
    pub fn clear_unacked(&mut self, packet_id: PacketId) -> bool {
        match self.unacked.iter().position(|id| *id == packet_id) {
            Some(index) => {
                self.unacked.remove(index);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn has_unacked(&self, packet_id: PacketId) -> bool {
        self.unacked.contains(&packet_id)
    }

    /// Tracked ids in send order.
    #[must_use]
    pub fn unacked(&self) -> &[PacketId] {
        &self.unacked
    }
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u16) -> PacketId {
        PacketId::new(raw).unwrap()
    }

    #[test]
    fn test_session_defaults() {
        let session = ClientSession::new();
        assert!(!session.is_back_pressured());
        assert_eq!(session.consumption_rate(), 100);
        assert_eq!(session.queue_capacity(), 100);
        assert!(session.unacked().is_empty());
    }

    #[test]
    fn test_back_pressure_flag() {
        let mut session = ClientSession::new();
        session.set_back_pressured(true);
        assert!(session.is_back_pressured());
        session.set_back_pressured(false);
        assert!(!session.is_back_pressured());
    }

    #[test]
    fn test_mark_then_clear_unacked() {
        let mut session = ClientSession::new();
        session.mark_unacked(id(1));
        assert!(session.has_unacked(id(1)));

        assert!(session.clear_unacked(id(1)));
        assert!(!session.has_unacked(id(1)));
    }

    #[test]
    fn test_clear_unacked_is_noop_when_absent() {
        let mut session = ClientSession::new();
        assert!(!session.clear_unacked(id(9)));

        session.mark_unacked(id(9));
        assert!(session.clear_unacked(id(9)));
        // Double-ack from the broker.
        assert!(!session.clear_unacked(id(9)));
    }

    #[test]
    fn test_unacked_preserves_send_order() {
        let mut session = ClientSession::new();
        for raw in [5u16, 2, 9, 7] {
            session.mark_unacked(id(raw));
        }
        session.clear_unacked(id(9));

        let order: Vec<u16> = session.unacked().iter().map(|i| i.get()).collect();
        assert_eq!(order, vec![5, 2, 7]);
    }

    #[test]
    fn test_mark_unacked_deduplicates() {
        let mut session = ClientSession::new();
        session.mark_unacked(id(4));
        session.mark_unacked(id(4));
        assert_eq!(session.unacked().len(), 1);
    }
}
