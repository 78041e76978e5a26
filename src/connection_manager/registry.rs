use dashmap::DashMap;
use prometheus::IntGauge;
use std::sync::Arc;
use uuid::Uuid;

use super::types::ConnectionInfo;
use crate::metrics::CONNECTIONS_TRACKED;

/// Tracks all open peer connections keyed by id
pub struct ConnectionRegistry<C> {
    /// connection_id -> ConnectionInfo
    connections: DashMap<String, ConnectionInfo<C>>,
    /// Shared across registries; only moved by the delta of each mutation
    tracked: IntGauge,
}

impl<C> ConnectionRegistry<C> {
    pub fn new() -> Self {
        Self::with_gauge(CONNECTIONS_TRACKED.clone())
    }

    /// Create a registry reporting its size into `tracked`
    pub fn with_gauge(tracked: IntGauge) -> Self {
        Self {
            connections: DashMap::new(),
            tracked,
        }
    }

    /// Track a connection, overwriting any entry with the same id.
    ///
    /// An empty or missing id is replaced by a freshly generated UUID.
    /// Returns the id the connection is stored under.
    pub fn add(&self, id: Option<String>, connection: Arc<C>) -> String {
        let id = match id {
            Some(id) if !id.is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };

        let replaced = self
            .connections
            .insert(id.clone(), ConnectionInfo::new(id.clone(), connection))
            .is_some();

        if replaced {
            tracing::debug!(connection_id = %id, "Connection replaced");
        } else {
            self.tracked.inc();
            tracing::info!(connection_id = %id, "Connection registered");
        }

        id
    }

    /// Stop tracking a connection. Unknown ids are ignored.
    pub fn remove(&self, id: &str) {
        if self.connections.remove(id).is_some() {
            self.tracked.dec();
            tracing::info!(connection_id = %id, "Connection unregistered");
        }
    }

    /// Remove `id` only if it still refers to the same connection as `info`
    pub fn remove_if_same(&self, info: &ConnectionInfo<C>) -> bool {
        let removed = self
            .connections
            .remove_if(&info.id, |_, current| current.same_connection(info))
            .is_some();

        if removed {
            self.tracked.dec();
        }
        removed
    }

    /// Drop every tracked connection
    pub fn remove_all(&self) {
        let mut removed = 0i64;
        self.connections.retain(|_, _| {
            removed += 1;
            false
        });
        self.tracked.sub(removed);
        tracing::info!(removed = removed, "All connections unregistered");
    }

    /// Snapshot of all tracked connections
    pub fn list(&self) -> Vec<ConnectionInfo<C>> {
        self.connections.iter().map(|r| r.value().clone()).collect()
    }

    /// Get connection by ID
    pub fn get(&self, id: &str) -> Option<ConnectionInfo<C>> {
        self.connections.get(id).map(|r| r.value().clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl<C> Default for ConnectionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Drop for ConnectionRegistry<C> {
    fn drop(&mut self) {
        self.tracked.sub(self.connections.len() as i64);
    }
}
