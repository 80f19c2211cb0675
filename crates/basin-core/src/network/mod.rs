//! Stream network index.
//!
//! # Overview
//!
//! A stream network arrives as a flat table of `(cat, tostream)` rows: each
//! segment names the one segment it drains into, or the outlet marker
//! (`0` by default) when it leaves the mapped area. This module turns that
//! relation into a reverse adjacency index, so the segments draining into a
//! given segment can be listed without scanning the table.
//!
//! ## Edge Direction
//!
//! Flow runs `segment → downstream`. The index stores the opposite
//! direction: `upstream_of(x)` lists every `y` whose downstream is `x`.
//!
//! ## Representation
//!
//! Segment ids are compacted to dense indices `0..n` in input order. The
//! upstream lists and downstream links are plain vectors over those
//! indices, which lets traversals track visited segments in a bitset.
//!
//! ## Submodules
//!
//! - [`build`]: [`Network`] construction and lookups.
//! - [`cycles`]: cycle detection over the downstream links.

pub mod build;
pub mod cycles;

pub use build::{DanglingPolicy, Network, NetworkOptions, SegmentLink};

/// Integer id of one stream segment (the `cat` of the stream feature).
pub type SegmentId = u64;

/// Conventional downstream id for "drains out of the mapped area".
pub const DEFAULT_OUTLET: SegmentId = 0;
