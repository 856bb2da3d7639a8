//! Current telemetry state shared by the render engine, status row and echo.

use crate::metrics::Metrics;

/// The most recent valid record and when it arrived.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CurrentState {
    metrics: Metrics,
    received_at_ms: u64,
    received_once: bool,
}

impl CurrentState {
    pub const fn new() -> Self {
        Self {
            metrics: Metrics::new(0.0, -1.0, 0.0, -1.0, -1.0),
            received_at_ms: 0,
            received_once: false,
        }
    }

    /// Replace the state with a freshly parsed record.
    pub fn record(&mut self, metrics: Metrics, now_ms: u64) {
        self.metrics = metrics;
        self.received_at_ms = now_ms;
        self.received_once = true;
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn received_once(&self) -> bool {
        self.received_once
    }

    /// Arrival time of the last record, `None` before the first one.
    pub fn received_at_ms(&self) -> Option<u64> {
        self.received_once.then_some(self.received_at_ms)
    }

    /// Milliseconds since the last record, `None` before the first one.
    pub fn age_ms(&self, now_ms: u64) -> Option<u64> {
        self.received_at_ms()
            .map(|at| now_ms.saturating_sub(at))
    }

    /// Whether the last record is younger than `threshold_ms`.
    pub fn is_fresh(&self, now_ms: u64, threshold_ms: u64) -> bool {
        self.age_ms(now_ms).is_some_and(|age| age < threshold_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_never_received() {
        let state = CurrentState::new();
        assert!(!state.received_once());
        assert_eq!(state.age_ms(5_000), None);
        assert!(!state.is_fresh(5_000, 2_500));
    }

    #[test]
    fn record_stamps_arrival() {
        let mut state = CurrentState::new();
        state.record(Metrics::new(1.0, 2.0, 3.0, 4.0, 5.0), 1_000);
        assert!(state.received_once());
        assert_eq!(state.metrics().cpu, 1.0);
        assert_eq!(state.age_ms(3_000), Some(2_000));
        assert!(state.is_fresh(3_000, 2_500));
        assert!(!state.is_fresh(3_500, 2_500));
    }
}
