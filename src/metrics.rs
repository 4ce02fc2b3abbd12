//! Refresh health metrics
//!
//! Tracks latency and success rate over a rolling window of category refresh
//! attempts.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Maximum number of samples kept in the rolling window
const MAX_SAMPLES: usize = 100;

/// Aggregated refresh metrics
#[derive(Debug, Clone)]
pub struct RefreshMetrics {
    /// Market-data provider these refreshes ran against
    pub provider_name: String,
    /// 50th percentile refresh latency in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile refresh latency in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate (0.0 to 1.0)
    pub success_rate: f64,
    /// Lifetime refresh attempts
    pub total_refreshes: u64,
    /// Lifetime failed attempts
    pub failed_refreshes: u64,
}

impl RefreshMetrics {
    /// Metrics before any refresh has run
    pub fn empty(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            latency_p50_ms: 0.0,
            latency_p99_ms: 0.0,
            success_rate: 1.0,
            total_refreshes: 0,
            failed_refreshes: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct RefreshSample {
    duration_ms: f64,
    success: bool,
}

/// Collects refresh samples and computes aggregates on demand
pub struct MetricsCollector {
    provider_name: String,
    samples: Arc<RwLock<VecDeque<RefreshSample>>>,
    total_refreshes: Arc<RwLock<u64>>,
    failed_refreshes: Arc<RwLock<u64>>,
}

impl MetricsCollector {
    pub fn new(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            samples: Arc::new(RwLock::new(VecDeque::with_capacity(MAX_SAMPLES))),
            total_refreshes: Arc::new(RwLock::new(0)),
            failed_refreshes: Arc::new(RwLock::new(0)),
        }
    }

    /// Records one refresh attempt
    pub async fn record_refresh(&self, duration: Duration, success: bool) {
        let duration_ms = duration.as_secs_f64() * 1000.0;

        {
            let mut total = self.total_refreshes.write().await;
            *total += 1;
        }

        if !success {
            let mut failed = self.failed_refreshes.write().await;
            *failed += 1;
        }

        let mut samples = self.samples.write().await;
        if samples.len() >= MAX_SAMPLES {
            samples.pop_front();
        }
        samples.push_back(RefreshSample {
            duration_ms,
            success,
        });
    }

    /// Computes current metrics from the rolling window
    pub async fn get_metrics(&self) -> RefreshMetrics {
        let samples = self.samples.read().await;
        let total = *self.total_refreshes.read().await;
        let failed = *self.failed_refreshes.read().await;

        if samples.is_empty() {
            return RefreshMetrics::empty(&self.provider_name);
        }

        let mut latencies: Vec<f64> = samples
            .iter()
            .filter(|s| s.success)
            .map(|s| s.duration_ms)
            .collect();
        latencies.sort_by(|a, b| a.total_cmp(b));

        let success_rate = if total > 0 {
            (total - failed) as f64 / total as f64
        } else {
            1.0
        };

        RefreshMetrics {
            provider_name: self.provider_name.clone(),
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate,
            total_refreshes: total,
            failed_refreshes: failed,
        }
    }
}

/// Nearest-rank percentile over sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_refreshes_lower_the_success_rate() {
        let collector = MetricsCollector::new("coingecko");

        collector
            .record_refresh(Duration::from_millis(100), true)
            .await;
        collector
            .record_refresh(Duration::from_millis(200), true)
            .await;
        collector
            .record_refresh(Duration::from_millis(150), false)
            .await;

        let metrics = collector.get_metrics().await;
        assert_eq!(metrics.provider_name, "coingecko");
        assert_eq!(metrics.total_refreshes, 3);
        assert_eq!(metrics.failed_refreshes, 1);
        assert!(metrics.success_rate > 0.6 && metrics.success_rate < 0.7);
    }

    #[tokio::test]
    async fn no_samples_reports_empty_metrics() {
        let collector = MetricsCollector::new("coingecko");
        let metrics = collector.get_metrics().await;
        assert_eq!(metrics.total_refreshes, 0);
        assert_eq!(metrics.success_rate, 1.0);
    }

    #[test]
    fn percentile_nearest_rank() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert_eq!(percentile(&values, 50.0), 5.0);
        assert_eq!(percentile(&values, 99.0), 10.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }
}
