//! basin-core library.
//!
//! Builds a reverse adjacency index over a linked stream network (each
//! segment names the segment it drains into, `0` meaning "leaves the map")
//! and computes the upstream closure of a segment: the drainage basin.
//!
//! ```text
//! attribute rows (cat, tostream)
//!        ↓  table::parse_delimited / table::parse_json
//! Vec<SegmentLink>
//!        ↓  network::Network::build
//! Network (reverse adjacency, dense indices)
//!        ↓  closure::upstream_closure
//! Basin (root + every upstream segment)
//!        ↓  extract::plan_extraction
//! Vec<ExtractRequest> → Extractor
//! ```
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums for the network and table layers,
//!   `anyhow::Result` at I/O seams.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod closure;
pub mod config;
pub mod error;
pub mod extract;
pub mod network;
pub mod stats;
pub mod table;

pub use closure::{Basin, upstream_closure, upstream_closures};
pub use error::{ErrorCode, NetworkError};
pub use network::{DanglingPolicy, Network, NetworkOptions, SegmentId, SegmentLink};
pub use stats::NetworkStats;
