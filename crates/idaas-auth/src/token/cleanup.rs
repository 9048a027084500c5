//! Periodic sweep of expired tokens.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time;

use idaas_core::result::AppResult;

use super::manager::TokenManager;

/// Rows removed by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub service_tokens: u64,
    pub refresh_tokens: u64,
}

/// Background sweeper that deletes expired service and refresh tokens.
#[derive(Debug)]
pub struct TokenCleanup {
    tokens: Arc<TokenManager>,
    interval: Duration,
}

impl TokenCleanup {
    /// Create a sweeper running every `interval`.
    pub fn new(tokens: Arc<TokenManager>, interval: Duration) -> Self {
        Self { tokens, interval }
    }

    /// Run a single sweep.
    pub async fn run_once(&self) -> AppResult<CleanupReport> {
        let service_tokens = self.tokens.cleanup_expired_tokens().await?;
        let refresh_tokens = self.tokens.cleanup_expired_refresh_tokens().await?;
        Ok(CleanupReport {
            service_tokens,
            refresh_tokens,
        })
    }

    /// Sweep on every tick until the cancel signal is received. A failed
    /// sweep is logged and retried on the next tick.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            "Token cleanup started, interval={}s",
            self.interval.as_secs()
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        tracing::info!("Token cleanup received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    match self.run_once().await {
                        Ok(report) if report != CleanupReport::default() => {
                            tracing::info!(
                                service_tokens = report.service_tokens,
                                refresh_tokens = report.refresh_tokens,
                                "Expired tokens removed"
                            );
                        }
                        Ok(_) => tracing::trace!("No expired tokens"),
                        Err(e) => tracing::error!("Token cleanup failed: {}", e),
                    }
                }
            }
        }

        tracing::info!("Token cleanup shut down complete");
    }
}
