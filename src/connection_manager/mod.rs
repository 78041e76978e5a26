//! Registry of tracked peer connections
//!
//! This module provides:
//! - Connection info and peer connection state types
//! - The id-keyed connection registry

mod registry;
mod types;

pub use registry::ConnectionRegistry;
pub use types::{ConnectionInfo, PeerConnection, PeerConnectionState};
