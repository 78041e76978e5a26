//! Integration tests for the stats aggregator
//!
//! These tests drive the public API with an in-memory peer connection
//! binding and a JSON stats parser.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use rtc_stats_aggregator::config::CollectorConfig;
use rtc_stats_aggregator::{
    ConnectionInfo, ParseError, PeerConnection, PeerConnectionState, StatsAggregator, StatsParser,
    TimeoutParser,
};

/// In-memory stand-in for a platform peer connection
struct FakePeerConnection {
    state: Mutex<PeerConnectionState>,
    bytes_sent: u64,
    behavior: Behavior,
}

#[derive(Clone, Copy, PartialEq)]
enum Behavior {
    Report,
    NoStats,
    Fail,
    Hang,
}

impl FakePeerConnection {
    fn new(bytes_sent: u64) -> Arc<Self> {
        Self::with_behavior(bytes_sent, Behavior::Report)
    }

    fn with_behavior(bytes_sent: u64, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(PeerConnectionState::Connected),
            bytes_sent,
            behavior,
        })
    }

    fn closed(bytes_sent: u64) -> Arc<Self> {
        let pc = Self::new(bytes_sent);
        pc.set_state(PeerConnectionState::Closed);
        pc
    }

    fn set_state(&self, state: PeerConnectionState) {
        *self.state.lock().unwrap() = state;
    }
}

impl PeerConnection for FakePeerConnection {
    fn connection_state(&self) -> PeerConnectionState {
        *self.state.lock().unwrap()
    }
}

struct JsonStatsParser;

#[async_trait]
impl StatsParser<FakePeerConnection> for JsonStatsParser {
    type Item = Value;

    async fn parse(
        &self,
        info: &ConnectionInfo<FakePeerConnection>,
    ) -> Result<Option<Value>, ParseError> {
        let pc = &info.connection;
        match pc.behavior {
            Behavior::Report => {
                tokio::time::sleep(Duration::from_millis(pc.bytes_sent % 7)).await;
                Ok(Some(json!({
                    "connectionId": info.id,
                    "bytesSent": pc.bytes_sent,
                })))
            }
            Behavior::NoStats => Ok(None),
            Behavior::Fail => Err(ParseError::Request("getStats rejected".to_string())),
            Behavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

fn connection_ids(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| item["connectionId"].as_str().unwrap().to_string())
        .collect()
}

fn listed_ids<P>(aggregator: &StatsAggregator<FakePeerConnection, P>) -> HashSet<String>
where
    P: StatsParser<FakePeerConnection>,
{
    aggregator.list_connections().into_iter().map(|i| i.id).collect()
}

fn set(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Registry Behavior
// =============================================================================

#[test]
fn test_list_reflects_net_surviving_set() {
    let aggregator = StatsAggregator::new(JsonStatsParser);
    aggregator.add_connection(Some("a".into()), FakePeerConnection::new(1));
    aggregator.add_connection(Some("b".into()), FakePeerConnection::new(2));
    aggregator.remove_connection("a");
    aggregator.add_connection(Some("c".into()), FakePeerConnection::new(3));
    aggregator.add_connection(Some("b".into()), FakePeerConnection::new(20));
    aggregator.remove_connection("missing");

    assert_eq!(listed_ids(&aggregator), set(&["b", "c"]));

    let b = aggregator.registry().get("b").unwrap();
    assert_eq!(b.connection.bytes_sent, 20);
}

#[test]
fn test_generated_ids_are_unique() {
    let aggregator = StatsAggregator::new(JsonStatsParser);
    let ids: HashSet<String> = (0..100)
        .map(|i| aggregator.add_connection(None, FakePeerConnection::new(i)))
        .collect();

    assert_eq!(ids.len(), 100);
    assert_eq!(aggregator.list_connections().len(), 100);
}

#[test]
fn test_empty_registry_collects_empty_report() {
    let aggregator: StatsAggregator<FakePeerConnection, _> =
        StatsAggregator::new(JsonStatsParser);
    let items = tokio_test::block_on(aggregator.collect());
    assert!(items.is_empty());
}

// =============================================================================
// Collection Cycle
// =============================================================================

#[tokio::test]
async fn test_closed_connection_pruned_and_order_preserved() {
    let aggregator = StatsAggregator::new(JsonStatsParser);
    aggregator.add_connection(Some("a".into()), FakePeerConnection::new(100));
    aggregator.add_connection(Some("b".into()), FakePeerConnection::closed(200));
    aggregator.add_connection(Some("c".into()), FakePeerConnection::new(300));

    let expected: Vec<String> = aggregator
        .list_connections()
        .into_iter()
        .map(|i| i.id)
        .filter(|id| id != "b")
        .collect();

    let items = aggregator.collect().await;

    assert_eq!(connection_ids(&items), expected);
    assert_eq!(listed_ids(&aggregator), set(&["a", "c"]));
}

#[tokio::test]
async fn test_all_live_connections_report_once() {
    let aggregator = StatsAggregator::new(JsonStatsParser);
    for i in 0..25u64 {
        aggregator.add_connection(Some(format!("pc-{i}")), FakePeerConnection::new(i));
    }

    let items = aggregator.collect().await;

    assert_eq!(items.len(), 25);
    let reported: HashSet<String> = connection_ids(&items).into_iter().collect();
    assert_eq!(reported, listed_ids(&aggregator));
}

#[tokio::test]
async fn test_closed_subset_pruned() {
    let aggregator = StatsAggregator::new(JsonStatsParser);
    let peers: Vec<_> = (0..10u64).map(FakePeerConnection::new).collect();
    for (i, pc) in peers.iter().enumerate() {
        aggregator.add_connection(Some(format!("pc-{i}")), pc.clone());
    }
    for pc in peers.iter().step_by(3) {
        pc.set_state(PeerConnectionState::Closed);
    }
    let closed = set(&["pc-0", "pc-3", "pc-6", "pc-9"]);

    let report = aggregator.collect_report().await;

    let pruned: HashSet<String> = report.pruned.iter().cloned().collect();
    assert_eq!(pruned, closed);
    assert!(connection_ids(&report.items)
        .iter()
        .all(|id| !closed.contains(id)));
    assert!(listed_ids(&aggregator).is_disjoint(&closed));
    assert_eq!(aggregator.list_connections().len(), 6);
}

#[tokio::test]
async fn test_disconnected_and_failed_states_are_still_collected() {
    let aggregator = StatsAggregator::new(JsonStatsParser);
    let disconnected = FakePeerConnection::new(1);
    disconnected.set_state(PeerConnectionState::Disconnected);
    let failed = FakePeerConnection::new(2);
    failed.set_state(PeerConnectionState::Failed);
    aggregator.add_connection(Some("d".into()), disconnected);
    aggregator.add_connection(Some("f".into()), failed);

    assert_eq!(aggregator.collect().await.len(), 2);
    assert_eq!(listed_ids(&aggregator), set(&["d", "f"]));
}

#[tokio::test]
async fn test_parser_failure_does_not_hide_other_items() {
    let aggregator = StatsAggregator::new(JsonStatsParser);
    aggregator.add_connection(Some("ok-1".into()), FakePeerConnection::new(5));
    aggregator.add_connection(
        Some("broken".into()),
        FakePeerConnection::with_behavior(6, Behavior::Fail),
    );
    aggregator.add_connection(
        Some("silent".into()),
        FakePeerConnection::with_behavior(7, Behavior::NoStats),
    );
    aggregator.add_connection(Some("ok-2".into()), FakePeerConnection::new(8));

    let report = aggregator.collect_report().await;

    let reported: HashSet<String> = connection_ids(&report.items).into_iter().collect();
    assert_eq!(reported, set(&["ok-1", "ok-2"]));
    assert_eq!(report.failed, 1);
    assert_eq!(report.empty, 1);
    assert_eq!(aggregator.list_connections().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_parser_omits_hanging_connection() {
    let config = CollectorConfig {
        parse_timeout_ms: 250,
        ..Default::default()
    };
    let parser = TimeoutParser::new(JsonStatsParser, config.parse_timeout());
    let aggregator = StatsAggregator::new(parser);
    aggregator.add_connection(Some("live".into()), FakePeerConnection::new(3));
    aggregator.add_connection(
        Some("stuck".into()),
        FakePeerConnection::with_behavior(4, Behavior::Hang),
    );

    let report = aggregator.collect_report().await;

    assert_eq!(connection_ids(&report.items), vec!["live".to_string()]);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn test_remove_all_then_collect() {
    let aggregator = StatsAggregator::new(JsonStatsParser);
    for i in 0..5u64 {
        aggregator.add_connection(None, FakePeerConnection::new(i));
    }

    aggregator.remove_all_connections();

    assert!(aggregator.list_connections().is_empty());
    assert!(aggregator.collect().await.is_empty());
}

#[tokio::test]
async fn test_readd_after_pruning() {
    let aggregator = StatsAggregator::new(JsonStatsParser);
    aggregator.add_connection(Some("a".into()), FakePeerConnection::closed(1));

    assert!(aggregator.collect().await.is_empty());
    assert!(aggregator.list_connections().is_empty());

    aggregator.add_connection(Some("a".into()), FakePeerConnection::new(2));
    let items = aggregator.collect().await;
    assert_eq!(items[0]["bytesSent"], 2);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_cycles_and_mutations() {
    let aggregator = Arc::new(StatsAggregator::new(JsonStatsParser));
    for i in 0..50u64 {
        let pc = if i % 5 == 0 {
            FakePeerConnection::closed(i)
        } else {
            FakePeerConnection::new(i)
        };
        aggregator.add_connection(Some(format!("pc-{i}")), pc);
    }

    let mut handles = Vec::new();
    for _ in 0..4 {
        let aggregator = aggregator.clone();
        handles.push(tokio::spawn(async move { aggregator.collect().await }));
    }
    let writer = {
        let aggregator = aggregator.clone();
        tokio::spawn(async move {
            for i in 50..80u64 {
                aggregator.add_connection(Some(format!("pc-{i}")), FakePeerConnection::new(i));
                tokio::task::yield_now().await;
            }
        })
    };

    for handle in handles {
        let items = handle.await.unwrap();
        assert!(items.len() <= 80);
    }
    writer.await.unwrap();

    let ids = listed_ids(&aggregator);
    assert_eq!(ids.len(), 70);
    for i in (0..50u64).step_by(5) {
        assert!(!ids.contains(&format!("pc-{i}")));
    }
}
