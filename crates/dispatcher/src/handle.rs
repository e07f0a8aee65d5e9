//! SinkHandle - one sink behind its own queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{OutputSink, PipelineOutput};

use crate::metrics::SinkMetrics;

/// Handle to a running sink worker
pub struct SinkHandle {
    name: String,
    tx: mpsc::Sender<PipelineOutput>,
    metrics: Arc<SinkMetrics>,
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Spawn the worker task for `sink`
    pub fn spawn<S: OutputSink + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Queue a snapshot without waiting
    ///
    /// Returns false when the queue is full (snapshot dropped) or the worker is gone.
    pub fn try_send(&self, output: PipelineOutput) -> bool {
        match self.tx.try_send(output) {
            Ok(()) => {
                self.metrics
                    .set_queue_len(self.tx.max_capacity() - self.tx.capacity());
                true
            }
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                self.metrics.inc_dropped_count();
                warn!(
                    sink = %self.name,
                    sequence = dropped.sequence,
                    "queue full, output dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, "sink worker closed unexpectedly");
                false
            }
        }
    }

    /// Close the queue and wait for the worker to drain it
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "sink worker panicked");
        }
        debug!(sink = %self.name, "sink handle shut down");
    }
}

#[instrument(name = "sink_worker_loop", skip(sink, rx, metrics), fields(sink = %name))]
async fn sink_worker<S: OutputSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<PipelineOutput>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "sink worker started");

    while let Some(output) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match sink.write(&output).await {
            Ok(()) => metrics.inc_write_count(),
            Err(e) => {
                metrics.inc_failure_count();
                error!(
                    sink = %name,
                    sequence = output.sequence,
                    error = %e,
                    "write failed"
                );
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "close failed on shutdown");
    }

    debug!(sink = %name, "sink worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::output;
    use contracts::ContractError;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::{sleep, Duration};

    struct MockSink {
        name: String,
        write_count: Arc<AtomicU64>,
        closed: Arc<AtomicU64>,
        should_fail: bool,
        delay_ms: u64,
    }

    impl MockSink {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                write_count: Arc::new(AtomicU64::new(0)),
                closed: Arc::new(AtomicU64::new(0)),
                should_fail: false,
                delay_ms: 0,
            }
        }
    }

    impl OutputSink for MockSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn write(&mut self, _output: &PipelineOutput) -> Result<(), ContractError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.should_fail {
                return Err(ContractError::sink_write(&self.name, "mock failure"));
            }
            self.write_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            self.closed.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sink_handle_drains_on_shutdown() {
        let sink = MockSink::new("mock");
        let writes = Arc::clone(&sink.write_count);
        let closed = Arc::clone(&sink.closed);

        let handle = SinkHandle::spawn(sink, 10);
        for i in 1..=5 {
            assert!(handle.try_send(output(i)));
        }
        let metrics = Arc::clone(handle.metrics());

        handle.shutdown().await;
        assert_eq!(writes.load(Ordering::Relaxed), 5);
        assert_eq!(closed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.write_count(), 5);
    }

    #[tokio::test]
    async fn test_sink_handle_queue_full() {
        let mut sink = MockSink::new("slow");
        sink.delay_ms = 100;

        let handle = SinkHandle::spawn(sink, 2);
        let accepted = (1..=10).filter(|&i| handle.try_send(output(i))).count() as u64;

        let snapshot = handle.metrics().snapshot();
        assert!(snapshot.dropped_count > 0);
        assert_eq!(accepted + snapshot.dropped_count, 10);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_sink_handle_failure_isolation() {
        let mut sink = MockSink::new("failing");
        sink.should_fail = true;

        let handle = SinkHandle::spawn(sink, 10);
        for i in 1..=3 {
            handle.try_send(output(i));
        }
        let metrics = Arc::clone(handle.metrics());

        handle.shutdown().await;
        assert_eq!(metrics.failure_count(), 3);
        assert_eq!(metrics.write_count(), 0);
    }
}
