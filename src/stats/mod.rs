//! Stats collection across all tracked peer connections.
//!
//! The aggregator depends on two collaborators supplied by the platform
//! binding:
//!
//! - [`ClosedStateProbe`]: tells whether a connection is closed
//! - [`StatsParser`]: extracts one report item from a live connection
//!
//! [`ConnectionStateProbe`] covers any binding that implements
//! [`PeerConnection`](crate::connection_manager::PeerConnection).

mod aggregator;
mod parser;
mod probe;
mod report;

pub use aggregator::StatsAggregator;
pub use parser::{ParseError, StatsParser, TimeoutParser};
pub use probe::{ClosedStateProbe, ConnectionStateProbe, FnProbe, ProbeError};
pub use report::CollectionReport;
