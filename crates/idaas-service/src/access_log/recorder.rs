//! Bounded access-log queue and the worker that drains it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use idaas_core::config::{AccessLogConfig, OverflowPolicy};
use idaas_database::store::AccessLogStore;
use idaas_entity::access_log::CreateAccessLog;

/// Request-side handle of the access-log queue.
///
/// Recording never fails the caller. With [`OverflowPolicy::Drop`] a full
/// queue discards the entry and counts it; with [`OverflowPolicy::Block`]
/// the caller waits for capacity.
#[derive(Debug, Clone)]
pub struct AccessLogRecorder {
    sender: mpsc::Sender<CreateAccessLog>,
    overflow: OverflowPolicy,
    dropped: Arc<AtomicU64>,
}

/// Single consumer that writes queued entries to the store.
pub struct AccessLogWorker {
    receiver: mpsc::Receiver<CreateAccessLog>,
    store: Arc<dyn AccessLogStore>,
}

impl AccessLogRecorder {
    /// Creates the queue. The worker must be spawned by the caller.
    pub fn new(store: Arc<dyn AccessLogStore>, config: &AccessLogConfig) -> (Self, AccessLogWorker) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let recorder = Self {
            sender,
            overflow: config.overflow,
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (recorder, AccessLogWorker { receiver, store })
    }

    /// Queue an entry.
    pub async fn record(&self, entry: CreateAccessLog) {
        match self.overflow {
            OverflowPolicy::Drop => match self.sender.try_send(entry) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(entry)) => {
                    let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                    tracing::warn!(
                        client_id = %entry.client_id,
                        dropped_total = total,
                        "Access log queue full, dropping entry"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!("Access log queue closed, entry discarded");
                }
            },
            OverflowPolicy::Block => {
                if self.sender.send(entry).await.is_err() {
                    tracing::debug!("Access log queue closed, entry discarded");
                }
            }
        }
    }

    /// Entries discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl AccessLogWorker {
    /// Drain the queue until every recorder handle is dropped. Store
    /// failures are logged and the entry is discarded.
    pub async fn run(mut self) {
        tracing::info!("Access log worker started");
        let mut written: u64 = 0;

        while let Some(entry) = self.receiver.recv().await {
            match self.store.insert_access_log(&entry).await {
                Ok(()) => written += 1,
                Err(e) => tracing::warn!(
                    client_id = %entry.client_id,
                    endpoint = %entry.endpoint,
                    "Failed to write access log: {}",
                    e
                ),
            }
        }

        tracing::info!(written, "Access log worker drained and stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use idaas_core::error::AppError;
    use idaas_core::result::AppResult;
    use idaas_database::MemoryStore;
    use idaas_entity::access_log::{ClientStatistics, ServiceAccessLog};

    fn entry(client_id: &str) -> CreateAccessLog {
        CreateAccessLog {
            client_id: client_id.to_string(),
            endpoint: "/api/internal/users".to_string(),
            method: "GET".to_string(),
            status_code: 200,
            response_time_ms: 3,
            ip_address: Some("10.0.0.1".to_string()),
            user_agent: None,
        }
    }

    fn config(capacity: usize, overflow: OverflowPolicy) -> AccessLogConfig {
        AccessLogConfig {
            queue_capacity: capacity,
            overflow,
        }
    }

    #[tokio::test]
    async fn test_entries_are_written() {
        let store = Arc::new(MemoryStore::new());
        let (recorder, worker) = AccessLogRecorder::new(store.clone(), &config(8, OverflowPolicy::Drop));

        recorder.record(entry("svc-a")).await;
        recorder.record(entry("svc-a")).await;
        drop(recorder);
        worker.run().await;

        assert_eq!(store.access_log_count().await, 2);
    }

    #[tokio::test]
    async fn test_full_queue_drops_and_counts() {
        let store = Arc::new(MemoryStore::new());
        let (recorder, worker) = AccessLogRecorder::new(store.clone(), &config(1, OverflowPolicy::Drop));

        recorder.record(entry("svc-a")).await;
        recorder.record(entry("svc-a")).await;
        recorder.record(entry("svc-a")).await;
        assert_eq!(recorder.dropped(), 2);

        drop(recorder);
        worker.run().await;
        assert_eq!(store.access_log_count().await, 1);
    }

    #[tokio::test]
    async fn test_block_policy_waits_for_capacity() {
        let store = Arc::new(MemoryStore::new());
        let (recorder, worker) = AccessLogRecorder::new(store.clone(), &config(1, OverflowPolicy::Block));
        let handle = tokio::spawn(worker.run());

        for _ in 0..5 {
            recorder.record(entry("svc-a")).await;
        }
        assert_eq!(recorder.dropped(), 0);

        drop(recorder);
        handle.await.unwrap();
        assert_eq!(store.access_log_count().await, 5);
    }

    struct BrokenStore;

    #[async_trait]
    impl AccessLogStore for BrokenStore {
        async fn insert_access_log(&self, _data: &CreateAccessLog) -> AppResult<()> {
            Err(AppError::database("disk full"))
        }
        async fn list_access_logs(&self, _: &str, _: i64, _: i64) -> AppResult<Vec<ServiceAccessLog>> {
            Ok(Vec::new())
        }
        async fn access_statistics(&self, _: &str, _: DateTime<Utc>) -> AppResult<ClientStatistics> {
            Ok(ClientStatistics::default())
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_swallowed() {
        let (recorder, worker) =
            AccessLogRecorder::new(Arc::new(BrokenStore), &config(4, OverflowPolicy::Drop));
        recorder.record(entry("svc-a")).await;
        drop(recorder);
        worker.run().await;
    }
}
