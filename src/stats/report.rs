use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Result of one collection cycle
#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport<T> {
    /// Unique id of the cycle
    pub cycle_id: Uuid,
    /// When the cycle started
    pub collected_at: DateTime<Utc>,
    /// Report items in registry snapshot order
    pub items: Vec<T>,
    /// Ids found closed this cycle and pruned from the registry
    pub pruned: Vec<String>,
    /// Connections found closed whose entry was replaced or removed before pruning
    pub closed_elsewhere: usize,
    /// Connections whose parse failed
    pub failed: usize,
    /// Connections whose parse returned nothing
    pub empty: usize,
    pub elapsed_ms: u64,
}

impl<T> CollectionReport<T> {
    pub fn empty(cycle_id: Uuid, collected_at: DateTime<Utc>) -> Self {
        Self {
            cycle_id,
            collected_at,
            items: Vec::new(),
            pruned: Vec::new(),
            closed_elsewhere: 0,
            failed: 0,
            empty: 0,
            elapsed_ms: 0,
        }
    }

    /// Number of connections examined this cycle
    pub fn examined(&self) -> usize {
        self.items.len() + self.pruned.len() + self.closed_elsewhere + self.failed + self.empty
    }
}

/// Outcome of one connection's branch within a cycle
#[derive(Debug)]
pub(crate) enum BranchOutcome<T> {
    Item(T),
    Empty,
    Failed,
    Closed,
}
