//! Aggregated request statistics for one client.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Aggregates over a client's access logs within a time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ClientStatistics {
    pub total_requests: i64,
    /// Mean response time in milliseconds.
    pub avg_response_time: f64,
    /// Requests answered with a 4xx or 5xx status.
    pub error_count: i64,
}

impl ClientStatistics {
    /// Percentage of requests that did not error, `0.0` with no traffic.
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        let ok = (self.total_requests - self.error_count) as f64;
        ok / self.total_requests as f64 * 100.0
    }
}
