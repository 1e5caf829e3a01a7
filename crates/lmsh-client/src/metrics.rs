//! Connection counters, logged when the session ends.

use tracing::info;

/// Counters kept by the connection manager.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionMetrics {
    /// Channel open attempts, including the first connect.
    pub connect_attempts: u64,
    /// Retries scheduled after losing an established channel.
    pub reconnects: u64,
    /// Times the local simulated session was activated.
    pub fallback_activations: u64,
    /// Messages accepted from the host.
    pub messages_in: u64,
    /// Messages transmitted to the host.
    pub messages_out: u64,
    /// Inbound messages dropped as protocol violations.
    pub dropped_violations: u64,
}

impl ConnectionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a one-line summary to the log.
    pub fn log_summary(&self) {
        info!(
            connect_attempts = self.connect_attempts,
            reconnects = self.reconnects,
            fallback_activations = self.fallback_activations,
            messages_in = self.messages_in,
            messages_out = self.messages_out,
            dropped_violations = self.dropped_violations,
            "session metrics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let metrics = ConnectionMetrics::new();
        assert_eq!(metrics, ConnectionMetrics::default());
        assert_eq!(metrics.connect_attempts, 0);
        assert_eq!(metrics.fallback_activations, 0);
    }
}
