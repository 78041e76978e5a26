//! Closed-state probes.
//!
//! The aggregator asks a probe whether a connection is closed before it
//! dispatches a parse. Probes must be safe to call in any connection state.

use async_trait::async_trait;
use thiserror::Error;

use crate::connection_manager::PeerConnection;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Connection state unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Reports whether a connection has reached its closed state.
#[async_trait]
pub trait ClosedStateProbe<C>: Send + Sync
where
    C: Send + Sync + 'static,
{
    async fn is_closed(&self, connection: &C) -> Result<bool, ProbeError>;
}

/// Default probe for platform bindings implementing [`PeerConnection`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionStateProbe;

#[async_trait]
impl<C: PeerConnection> ClosedStateProbe<C> for ConnectionStateProbe {
    async fn is_closed(&self, connection: &C) -> Result<bool, ProbeError> {
        Ok(connection.connection_state().is_closed())
    }
}

/// Adapts a synchronous predicate into a probe
pub struct FnProbe<F>(pub F);

#[async_trait]
impl<C, F> ClosedStateProbe<C> for FnProbe<F>
where
    C: Send + Sync + 'static,
    F: Fn(&C) -> bool + Send + Sync,
{
    async fn is_closed(&self, connection: &C) -> Result<bool, ProbeError> {
        Ok((self.0)(connection))
    }
}
