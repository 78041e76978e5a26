//! Live registry of peer connections with concurrent stats collection.
//!
//! [`StatsAggregator`] tracks connections by id and, on each
//! [`collect`](StatsAggregator::collect), fans out one stats parse per live
//! connection, prunes connections found closed, and returns the report items
//! in registry snapshot order.

// Domain layer
pub mod connection_manager;
pub mod stats;

// Supporting modules
pub mod config;
pub mod error;
pub mod metrics;
pub mod tasks;
pub mod telemetry;

pub use connection_manager::{
    ConnectionInfo, ConnectionRegistry, PeerConnection, PeerConnectionState,
};
pub use error::{AppError, Result};
pub use stats::{
    ClosedStateProbe, CollectionReport, ConnectionStateProbe, FnProbe, ParseError, ProbeError,
    StatsAggregator, StatsParser, TimeoutParser,
};
