//! Consumption telemetry for the keepalive exchange.
//!
//! The owning consumer feeds enqueue/dequeue events into a
//! [`ConsumptionMonitor`] and periodically applies its snapshot to the
//! [`ClientSession`]. The monitor smooths the dequeue rate with an
//! exponential moving average and derives the backpressure recommendation
//! from queue-depth watermarks with hysteresis: pressure engages above the
//! high watermark and releases only below the low one. The processor never
//! consults the monitor; it reports whatever the session holds.

use crate::session::ClientSession;

use std::time::Instant;

#[derive(Debug, Clone)]
pub struct FlowMonitorConfig {
    /// Capacity of the consumer's inbound queue, reported verbatim as the
    /// queue-capacity gauge.
    pub queue_capacity: u32,
    /// Depth (percent of capacity) above which backpressure engages.
    pub high_watermark_percent: u8,
    /// Depth (percent of capacity) below which backpressure releases.
    pub low_watermark_percent: u8,
    /// EMA weight given to the most recent dequeue interval, in (0, 1].
    pub rate_smoothing: f64,
}

impl Default for FlowMonitorConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 100,
            high_watermark_percent: 80,
            low_watermark_percent: 50,
            rate_smoothing: 0.2,
        }
    }
}

/// Dequeue-rate and queue-depth tracker driven by the owning consumer.
#[derive(Debug)]
pub struct ConsumptionMonitor {
    config: FlowMonitorConfig,
    rate_per_sec: f64,
    last_dequeue: Option<Instant>,
    depth: u32,
    back_pressured: bool,
}

impl ConsumptionMonitor {
    #[must_use]
    pub fn new(config: FlowMonitorConfig) -> Self {
        Self {
            config,
            rate_per_sec: 0.0,
            last_dequeue: None,
            depth: 0,
            back_pressured: false,
        }
    }

    /// One message entered the consumer's queue.
    pub fn record_enqueue(&mut self) {
        self.depth = self.depth.saturating_add(1);
        self.update_back_pressure();
    }

    /// One message left the consumer's queue at `now`.
    pub fn record_dequeue(&mut self, now: Instant) {
        if let Some(previous) = self.last_dequeue {
            let elapsed = now.duration_since(previous).as_secs_f64();
            if elapsed > 0.0 {
                let instantaneous = 1.0 / elapsed;
                let alpha = self.config.rate_smoothing;
                self.rate_per_sec = if self.rate_per_sec == 0.0 {
                    instantaneous
                } else {
                    alpha * instantaneous + (1.0 - alpha) * self.rate_per_sec
                };
            }
        }
        self.last_dequeue = Some(now);
        self.depth = self.depth.saturating_sub(1);
        self.update_back_pressure();
    }

    /// Overrides the tracked depth, for consumers that poll their queue
    /// instead of reporting per-message events.
    pub fn record_depth(&mut self, depth: u32) {
        self.depth = depth;
        self.update_back_pressure();
    }

    fn update_back_pressure(&mut self) {
        let capacity = u64::from(self.config.queue_capacity);
        if capacity == 0 {
            return;
        }
        let depth = u64::from(self.depth);
        if !self.back_pressured {
            if depth * 100 >= capacity * u64::from(self.config.high_watermark_percent) {
                self.back_pressured = true;
            }
        } else if depth * 100 <= capacity * u64::from(self.config.low_watermark_percent) {
            self.back_pressured = false;
        }
    }

    #[must_use]
    pub fn is_back_pressured(&self) -> bool {
        self.back_pressured
    }

    /// Smoothed dequeue rate, rounded to whole messages per second.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn consumption_rate(&self) -> u32 {
        self.rate_per_sec.round().max(0.0) as u32
    }

    #[must_use]
    pub fn queue_capacity(&self) -> u32 {
        self.config.queue_capacity
    }

    #[must_use]
    pub fn queue_depth(&self) -> u32 {
        self.depth
    }

    /// Copies the current snapshot into the session so the next PINGRESP
    /// reports it.
    pub fn apply_to(&self, session: &mut ClientSession) {
        session.set_back_pressured(self.back_pressured);
        session.set_consumption_rate(self.consumption_rate());
        session.set_queue_capacity(self.config.queue_capacity);
    }
}

impl Default for ConsumptionMonitor {
    fn default() -> Self {
        Self::new(FlowMonitorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_config_default() {
        let config = FlowMonitorConfig::default();
        assert_eq!(config.queue_capacity, 100);
        assert_eq!(config.high_watermark_percent, 80);
        assert_eq!(config.low_watermark_percent, 50);
        assert!(config.rate_smoothing > 0.0 && config.rate_smoothing <= 1.0);
    }

    #[test]
    fn test_steady_dequeue_rate_converges() {
        let mut monitor = ConsumptionMonitor::default();
        let start = Instant::now();

        // One dequeue every 10ms => 100 msg/s.
        for tick in 0..200u64 {
            monitor.record_dequeue(start + Duration::from_millis(tick * 10));
        }

        let rate = monitor.consumption_rate();
        assert!((95..=105).contains(&rate), "rate {rate} not near 100");
    }

    #[test]
    fn test_rate_seeds_from_first_interval() {
        let mut monitor = ConsumptionMonitor::default();
        let start = Instant::now();

        monitor.record_dequeue(start);
        assert_eq!(monitor.consumption_rate(), 0);

        monitor.record_dequeue(start + Duration::from_millis(20));
        assert_eq!(monitor.consumption_rate(), 50);
    }

    #[test]
    fn test_watermark_hysteresis() {
        let mut monitor = ConsumptionMonitor::default();

        monitor.record_depth(79);
        assert!(!monitor.is_back_pressured());

        monitor.record_depth(80);
        assert!(monitor.is_back_pressured());

        // Still above the low watermark: pressure holds.
        monitor.record_depth(60);
        assert!(monitor.is_back_pressured());

        monitor.record_depth(50);
        assert!(!monitor.is_back_pressured());
    }

    #[test]
    fn test_enqueue_dequeue_tracks_depth() {
        let mut monitor = ConsumptionMonitor::default();
        let start = Instant::now();

        for _ in 0..3 {
            monitor.record_enqueue();
        }
        assert_eq!(monitor.queue_depth(), 3);

        monitor.record_dequeue(start);
        assert_eq!(monitor.queue_depth(), 2);
    }

    #[test]
    fn test_apply_to_session() {
        let mut monitor = ConsumptionMonitor::new(FlowMonitorConfig {
            queue_capacity: 500,
            ..FlowMonitorConfig::default()
        });
        monitor.record_depth(450);

        let mut session = ClientSession::new();
        monitor.apply_to(&mut session);

        assert!(session.is_back_pressured());
        assert_eq!(session.queue_capacity(), 500);
    }
}
