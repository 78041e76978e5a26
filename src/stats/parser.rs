//! Stats parser abstraction.
//!
//! A parser extracts one report item from a single live peer connection.
//! The aggregator never calls a parser for a connection it found closed in
//! the same cycle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::connection_manager::ConnectionInfo;

/// Errors a stats parser may report for one connection.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The platform refused or failed the statistics request
    #[error("Stats request failed: {0}")]
    Request(String),

    /// The platform did not answer in time
    #[error("Stats request timed out after {0:?}")]
    Timeout(Duration),

    /// The raw report could not be decoded
    #[error("Malformed stats report: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Extracts a statistics report from one peer connection.
///
/// `Ok(None)` means the connection had nothing to report this cycle.
#[async_trait]
pub trait StatsParser<C>: Send + Sync
where
    C: Send + Sync + 'static,
{
    type Item: Send + 'static;

    async fn parse(&self, info: &ConnectionInfo<C>) -> Result<Option<Self::Item>, ParseError>;
}

#[async_trait]
impl<C, P> StatsParser<C> for Arc<P>
where
    C: Send + Sync + 'static,
    P: StatsParser<C> + ?Sized,
{
    type Item = P::Item;

    async fn parse(&self, info: &ConnectionInfo<C>) -> Result<Option<Self::Item>, ParseError> {
        (**self).parse(info).await
    }
}

/// Wraps a parser with a per-call deadline.
///
/// A parse that does not settle within `limit` resolves to
/// [`ParseError::Timeout`].
pub struct TimeoutParser<P> {
    inner: P,
    limit: Duration,
}

impl<P> TimeoutParser<P> {
    pub fn new(inner: P, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl<C, P> StatsParser<C> for TimeoutParser<P>
where
    C: Send + Sync + 'static,
    P: StatsParser<C>,
{
    type Item = P::Item;

    async fn parse(&self, info: &ConnectionInfo<C>) -> Result<Option<Self::Item>, ParseError> {
        match tokio::time::timeout(self.limit, self.inner.parse(info)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(
                    connection_id = %info.id,
                    timeout_ms = self.limit.as_millis() as u64,
                    "Stats parse timed out"
                );
                Err(ParseError::Timeout(self.limit))
            }
        }
    }
}
