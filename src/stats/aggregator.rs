use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use uuid::Uuid;

use super::parser::StatsParser;
use super::probe::{ClosedStateProbe, ConnectionStateProbe};
use super::report::{BranchOutcome, CollectionReport};
use crate::connection_manager::{ConnectionInfo, ConnectionRegistry, PeerConnection};
use crate::metrics::CollectorMetrics;

/// Tracks peer connections and collects stats from all of them at once.
///
/// Each call to [`collect`](Self::collect) is one collection cycle:
///
/// 1. Snapshot the registry
/// 2. For every connection concurrently, ask the probe whether it is closed;
///    closed connections are marked for removal, live ones are parsed
/// 3. After every branch has settled, remove the closed connections
/// 4. Return the non-empty items in snapshot order
///
/// A failing or panicking parse only drops that connection's item. The
/// aggregator applies no timeout; wrap the parser in
/// [`TimeoutParser`](super::TimeoutParser) when the platform call can hang.
///
/// # Example
///
/// ```rust,ignore
/// let aggregator = StatsAggregator::new(parser);
/// aggregator.add_connection(None, peer_connection);
///
/// let items = aggregator.collect().await;
/// ```
pub struct StatsAggregator<C, P, Q = ConnectionStateProbe> {
    registry: ConnectionRegistry<C>,
    parser: P,
    probe: Q,
}

impl<C, P> StatsAggregator<C, P, ConnectionStateProbe>
where
    C: PeerConnection,
    P: StatsParser<C>,
{
    /// Create an aggregator that reads closed state from the connection itself
    pub fn new(parser: P) -> Self {
        Self::with_probe(parser, ConnectionStateProbe)
    }
}

impl<C, P, Q> StatsAggregator<C, P, Q>
where
    C: Send + Sync + 'static,
    P: StatsParser<C>,
    Q: ClosedStateProbe<C>,
{
    pub fn with_probe(parser: P, probe: Q) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            parser,
            probe,
        }
    }

    /// Track a connection. Returns the id it was stored under.
    pub fn add_connection(&self, id: Option<String>, connection: Arc<C>) -> String {
        self.registry.add(id, connection)
    }

    pub fn remove_connection(&self, id: &str) {
        self.registry.remove(id);
    }

    pub fn remove_all_connections(&self) {
        self.registry.remove_all();
    }

    pub fn list_connections(&self) -> Vec<ConnectionInfo<C>> {
        self.registry.list()
    }

    pub fn registry(&self) -> &ConnectionRegistry<C> {
        &self.registry
    }

    /// Run one collection cycle and return its report items
    pub async fn collect(&self) -> Vec<P::Item> {
        self.collect_report().await.items
    }

    /// Run one collection cycle and return the items with cycle bookkeeping
    pub async fn collect_report(&self) -> CollectionReport<P::Item> {
        let start = Instant::now();
        let mut report = CollectionReport::empty(Uuid::new_v4(), Utc::now());

        let snapshot = self.registry.list();
        if snapshot.is_empty() {
            CollectorMetrics::record_cycle(&report);
            return report;
        }

        let outcomes = join_all(snapshot.iter().map(|info| self.collect_one(info))).await;

        // Removals wait until every branch has settled
        for (info, outcome) in snapshot.iter().zip(outcomes) {
            match outcome {
                BranchOutcome::Item(item) => report.items.push(item),
                BranchOutcome::Empty => report.empty += 1,
                BranchOutcome::Failed => report.failed += 1,
                BranchOutcome::Closed => {
                    // A re-added or already removed id is not ours to prune
                    if self.registry.remove_if_same(info) {
                        tracing::info!(connection_id = %info.id, "Pruned closed connection");
                        report.pruned.push(info.id.clone());
                    } else {
                        report.closed_elsewhere += 1;
                    }
                }
            }
        }

        report.elapsed_ms = start.elapsed().as_millis() as u64;
        CollectorMetrics::record_cycle(&report);

        tracing::debug!(
            cycle_id = %report.cycle_id,
            connections = snapshot.len(),
            items = report.items.len(),
            pruned = report.pruned.len(),
            closed_elsewhere = report.closed_elsewhere,
            failed = report.failed,
            empty = report.empty,
            elapsed_ms = report.elapsed_ms,
            "Collection cycle completed"
        );

        report
    }

    async fn collect_one(&self, info: &ConnectionInfo<C>) -> BranchOutcome<P::Item> {
        if self.probe_closed(info).await {
            return BranchOutcome::Closed;
        }

        match AssertUnwindSafe(self.parser.parse(info)).catch_unwind().await {
            Ok(Ok(Some(item))) => BranchOutcome::Item(item),
            Ok(Ok(None)) => BranchOutcome::Empty,
            Ok(Err(e)) => {
                tracing::warn!(connection_id = %info.id, error = %e, "Stats parse failed");
                BranchOutcome::Failed
            }
            Err(_) => {
                tracing::error!(connection_id = %info.id, "Stats parser panicked");
                BranchOutcome::Failed
            }
        }
    }

    /// Probe failures count as "not closed" so the parse is still attempted
    async fn probe_closed(&self, info: &ConnectionInfo<C>) -> bool {
        match AssertUnwindSafe(self.probe.is_closed(info.connection.as_ref()))
            .catch_unwind()
            .await
        {
            Ok(Ok(closed)) => closed,
            Ok(Err(e)) => {
                CollectorMetrics::record_probe_failure();
                tracing::warn!(
                    connection_id = %info.id,
                    error = %e,
                    "Closed-state check failed, treating connection as live"
                );
                false
            }
            Err(_) => {
                CollectorMetrics::record_probe_failure();
                tracing::error!(
                    connection_id = %info.id,
                    "Closed-state check panicked, treating connection as live"
                );
                false
            }
        }
    }
}
