//! Fire-and-forget operation-log persistence.
//!
//! Entries go through a bounded channel to a worker task that writes them
//! in batches. Callers never wait for storage: when the channel is full the
//! entry is written on its own detached task instead.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use gatehouse_core::config::OperationLogConfig;
use gatehouse_database::OperationLogStore;
use gatehouse_entity::operation_log::NewOperationLog;

/// Cloneable handle used by the pipeline to submit entries.
#[derive(Debug, Clone)]
pub struct OperationLogSink {
    sender: Option<mpsc::Sender<NewOperationLog>>,
    store: Arc<dyn OperationLogStore>,
}

impl OperationLogSink {
    /// Start the batching worker.
    ///
    /// The worker flushes when a batch fills up or the flush interval
    /// elapses. Once `shutdown` is cancelled it drains what is buffered,
    /// flushes, and the returned handle completes. With logging disabled
    /// no worker runs and [`record`](Self::record) discards entries.
    pub fn spawn(
        store: Arc<dyn OperationLogStore>,
        config: &OperationLogConfig,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        if !config.enabled {
            info!("Operation logging disabled");
            let handle = tokio::spawn(async {});
            return (
                Self {
                    sender: None,
                    store,
                },
                handle,
            );
        }

        let (tx, rx) = mpsc::channel(config.buffer_size.max(1));
        let worker = Worker {
            store: store.clone(),
            batch_size: config.batch_size.max(1),
            flush_interval: Duration::from_millis(config.flush_interval_ms.max(1)),
        };
        let handle = tokio::spawn(worker.run(rx, shutdown));

        (
            Self {
                sender: Some(tx),
                store,
            },
            handle,
        )
    }

    /// Submit an entry without waiting for it to be stored.
    pub fn record(&self, entry: NewOperationLog) {
        let Some(sender) = &self.sender else {
            return;
        };

        match sender.try_send(entry) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(entry)) => {
                debug!("Operation log buffer full, writing entry directly");
                let store = self.store.clone();
                tokio::spawn(async move {
                    if let Err(e) = store.insert(&entry).await {
                        error!(error = %e, operation = %entry.operation, "Failed to write operation log");
                    }
                });
            }
            Err(mpsc::error::TrySendError::Closed(entry)) => {
                warn!(operation = %entry.operation, "Operation log sink closed, entry dropped");
            }
        }
    }
}

struct Worker {
    store: Arc<dyn OperationLogStore>,
    batch_size: usize,
    flush_interval: Duration,
}

impl Worker {
    async fn run(self, mut rx: mpsc::Receiver<NewOperationLog>, shutdown: CancellationToken) {
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut ticker = time::interval(self.flush_interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = rx.recv() => match received {
                    Some(entry) => {
                        batch.push(entry);
                        if batch.len() >= self.batch_size {
                            self.flush(&mut batch).await;
                        }
                    }
                    None => break,
                },
                _ = ticker.tick() => self.flush(&mut batch).await,
            }
        }

        rx.close();
        while let Some(entry) = rx.recv().await {
            batch.push(entry);
            if batch.len() >= self.batch_size {
                self.flush(&mut batch).await;
            }
        }
        self.flush(&mut batch).await;
        info!("Operation log sink drained");
    }

    /// Write the batch; on failure retry entry by entry.
    async fn flush(&self, batch: &mut Vec<NewOperationLog>) {
        if batch.is_empty() {
            return;
        }

        match self.store.insert_batch(batch).await {
            Ok(written) => debug!(written, "Operation log batch flushed"),
            Err(e) => {
                warn!(error = %e, size = batch.len(), "Batch insert failed, retrying per entry");
                for entry in batch.iter() {
                    if let Err(e) = self.store.insert(entry).await {
                        error!(error = %e, operation = %entry.operation, "Failed to write operation log");
                    }
                }
            }
        }
        batch.clear();
    }
}
