//! Connection info and peer connection state types

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Lifecycle state reported by a platform peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl PeerConnectionState {
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for PeerConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Failed => "failed",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// What a platform peer connection binding exposes to the registry.
///
/// Implementations must answer in any state, including after the
/// connection has been closed.
pub trait PeerConnection: Send + Sync + 'static {
    fn connection_state(&self) -> PeerConnectionState;
}

/// A tracked peer connection.
///
/// The connection itself is owned by the caller; the registry only keeps a
/// shared reference and forwards it to the stats parser.
pub struct ConnectionInfo<C> {
    pub id: String,
    pub connection: Arc<C>,
}

impl<C> ConnectionInfo<C> {
    pub fn new(id: impl Into<String>, connection: Arc<C>) -> Self {
        Self {
            id: id.into(),
            connection,
        }
    }

    /// True when both infos point at the same connection object.
    pub fn same_connection(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.connection, &other.connection)
    }
}

// Manual impls: `C` itself need not be Clone or Debug.
impl<C> Clone for ConnectionInfo<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            connection: Arc::clone(&self.connection),
        }
    }
}

impl<C> fmt::Debug for ConnectionInfo<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
