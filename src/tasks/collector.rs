use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use crate::config::CollectorConfig;
use crate::stats::{ClosedStateProbe, CollectionReport, StatsAggregator, StatsParser};

/// Background task that runs collection cycles on a fixed interval.
///
/// The aggregator never schedules itself; this is one way for a caller to
/// drive it. Each report is forwarded to `reports`. The task stops on the
/// shutdown signal or once the report receiver is dropped.
pub struct CollectionTask<C, P, Q>
where
    C: Send + Sync + 'static,
    P: StatsParser<C>,
{
    interval: Duration,
    aggregator: Arc<StatsAggregator<C, P, Q>>,
    reports: mpsc::Sender<CollectionReport<P::Item>>,
    shutdown: broadcast::Receiver<()>,
}

impl<C, P, Q> CollectionTask<C, P, Q>
where
    C: Send + Sync + 'static,
    P: StatsParser<C>,
    Q: ClosedStateProbe<C>,
{
    pub fn new(
        config: &CollectorConfig,
        aggregator: Arc<StatsAggregator<C, P, Q>>,
        reports: mpsc::Sender<CollectionReport<P::Item>>,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            interval: config.interval(),
            aggregator,
            reports,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        let mut timer = tokio::time::interval(self.interval);

        // Skip immediate first tick
        timer.tick().await;

        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            "Collection task started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("Collection task received shutdown signal");
                    break;
                }
                _ = timer.tick() => {
                    if !self.run_cycle().await {
                        tracing::info!("Report receiver dropped, stopping collection task");
                        break;
                    }
                }
            }
        }

        tracing::info!("Collection task stopped");
    }

    /// Returns false once nobody is listening for reports
    async fn run_cycle(&self) -> bool {
        let report = self.aggregator.collect_report().await;

        // Warn if a cycle is eating into the next one
        let interval_ms = self.interval.as_millis() as u64;
        if report.elapsed_ms > interval_ms / 2 {
            tracing::warn!(
                elapsed_ms = report.elapsed_ms,
                interval_ms = interval_ms,
                connections = report.examined(),
                "Collection cycle took more than 50% of interval"
            );
        }

        self.reports.send(report).await.is_ok()
    }
}
