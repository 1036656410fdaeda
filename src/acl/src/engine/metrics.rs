//! Decision and row-filter metrics

use crate::secure::FilterOutcome;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Engine counters
#[derive(Debug, Clone, Default)]
pub struct AclMetrics {
    /// Total permission checks
    pub total_decisions: u64,

    /// Checks that allowed
    pub allowed_decisions: u64,

    /// Checks that denied
    pub denied_decisions: u64,

    /// Reads that received the row predicate
    pub filters_applied: u64,

    /// Reads of secured models that bypassed the row predicate
    pub filters_bypassed: u64,

    /// Average permission check latency
    pub avg_latency_ms: f64,

    /// Failed operations
    pub error_count: u64,
}

impl AclMetrics {
    /// Share of checks that allowed
    pub fn allow_rate(&self) -> f64 {
        let total = self.allowed_decisions + self.denied_decisions;
        if total == 0 {
            0.0
        } else {
            self.allowed_decisions as f64 / total as f64
        }
    }
}

/// Metrics collector
#[derive(Clone)]
pub struct MetricsCollector {
    metrics: Arc<RwLock<AclMetrics>>,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(RwLock::new(AclMetrics::default())),
        }
    }

    /// Record a permission check and its latency
    pub async fn record_decision(&self, allowed: bool, latency: Duration) {
        let mut metrics = self.metrics.write().await;
        metrics.total_decisions += 1;

        if allowed {
            metrics.allowed_decisions += 1;
        } else {
            metrics.denied_decisions += 1;
        }

        // Running mean
        let latency_ms = latency.as_secs_f64() * 1000.0;
        let n = metrics.total_decisions as f64;
        metrics.avg_latency_ms += (latency_ms - metrics.avg_latency_ms) / n;
    }

    /// Record what the row filter did
    pub async fn record_filter(&self, outcome: FilterOutcome) {
        match outcome {
            FilterOutcome::Applied => self.metrics.write().await.filters_applied += 1,
            FilterOutcome::NotSecured | FilterOutcome::UnfilteredOperation => {}
            _ => self.metrics.write().await.filters_bypassed += 1,
        }
    }

    /// Record an error
    pub async fn record_error(&self) {
        let mut metrics = self.metrics.write().await;
        metrics.error_count += 1;
    }

    /// Current snapshot
    pub async fn snapshot(&self) -> AclMetrics {
        self.metrics.read().await.clone()
    }

    /// Reset all counters
    pub async fn reset(&self) {
        let mut metrics = self.metrics.write().await;
        *metrics = AclMetrics::default();
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_decision_counts() {
        let collector = MetricsCollector::new();

        collector.record_decision(true, Duration::from_millis(2)).await;
        collector.record_decision(true, Duration::from_millis(4)).await;
        collector.record_decision(false, Duration::from_millis(6)).await;

        let metrics = collector.snapshot().await;
        assert_eq!(metrics.total_decisions, 3);
        assert_eq!(metrics.allowed_decisions, 2);
        assert_eq!(metrics.denied_decisions, 1);
        assert!((metrics.allow_rate() - 0.6666).abs() < 0.01);
        assert!((metrics.avg_latency_ms - 4.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_filter_counts() {
        let collector = MetricsCollector::new();

        collector.record_filter(FilterOutcome::Applied).await;
        collector.record_filter(FilterOutcome::Admin).await;
        collector.record_filter(FilterOutcome::SingleRecordLookup).await;
        collector.record_filter(FilterOutcome::NotSecured).await;

        let metrics = collector.snapshot().await;
        assert_eq!(metrics.filters_applied, 1);
        assert_eq!(metrics.filters_bypassed, 2);
    }

    #[tokio::test]
    async fn test_reset() {
        let collector = MetricsCollector::new();
        collector.record_error().await;
        collector.reset().await;
        assert_eq!(collector.snapshot().await.error_count, 0);
    }
}
