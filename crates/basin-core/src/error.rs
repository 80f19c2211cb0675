use std::fmt;

use crate::network::SegmentId;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    TableParseError,
    UnknownSegment,
    DuplicateSegment,
    InvalidReference,
    SentinelId,
    CycleDetected,
    ZeroSegmentId,
    ExtractFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::TableParseError => "E1002",
            Self::UnknownSegment => "E2001",
            Self::DuplicateSegment => "E2002",
            Self::InvalidReference => "E2003",
            Self::SentinelId => "E2004",
            Self::CycleDetected => "E2005",
            Self::ZeroSegmentId => "E2006",
            Self::ExtractFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::TableParseError => "Attribute table parse error",
            Self::UnknownSegment => "Segment not found in network",
            Self::DuplicateSegment => "Duplicate segment id",
            Self::InvalidReference => "Downstream reference to unknown segment",
            Self::SentinelId => "Segment id collides with outlet marker",
            Self::CycleDetected => "Stream network contains a cycle",
            Self::ZeroSegmentId => "Segment id must be positive",
            Self::ExtractFailed => "Feature extraction failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in basin.toml and retry."),
            Self::TableParseError => {
                Some("Check that the table has integer `cat` and `tostream` columns.")
            }
            Self::UnknownSegment => Some("Pick a `cat` that exists in the stream attribute table."),
            Self::DuplicateSegment => Some("Each stream segment must appear exactly once."),
            Self::InvalidReference => Some(
                "Use the full network, or pass `--dangling outlet` to treat clipped references as outlets.",
            ),
            Self::SentinelId => Some("Renumber the segment or choose a different outlet value."),
            Self::CycleDetected => {
                Some("Rebuild the `tostream` links; a stream network must drain to an outlet.")
            }
            Self::ZeroSegmentId => Some("Renumber the segment; ids start at 1."),
            Self::ExtractFailed => Some("Check that GRASS is on PATH and the input maps exist."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures while indexing or traversing a stream network.
///
/// All variants are terminal for the call that raised them. A [`Network`]
/// that was built successfully stays usable after a failed query.
///
/// [`Network`]: crate::network::Network
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// Two attribute rows share one segment id.
    #[error("duplicate segment id {id}")]
    DuplicateSegment { id: SegmentId },

    /// A downstream id names no segment in the network and is not the outlet.
    #[error("segment {segment} drains into unknown segment {downstream}")]
    InvalidReference {
        segment: SegmentId,
        downstream: SegmentId,
    },

    /// The requested segment is not part of the network.
    #[error("segment {id} not found in network")]
    UnknownSegment { id: SegmentId },

    /// A segment uses the outlet marker as its own id.
    #[error("segment id {id} is reserved as the outlet marker")]
    SentinelId { id: SegmentId },

    /// A segment uses id `0`. Ids are positive even when the outlet marker
    /// is something else.
    #[error("segment id 0 is not allowed; ids must be positive")]
    ZeroId,

    /// Following downstream links loops back on itself.
    #[error("stream network contains a cycle through segments {}", join_ids(.segments))]
    Cycle { segments: Vec<SegmentId> },
}

impl NetworkError {
    /// The stable [`ErrorCode`] for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateSegment { .. } => ErrorCode::DuplicateSegment,
            Self::InvalidReference { .. } => ErrorCode::InvalidReference,
            Self::UnknownSegment { .. } => ErrorCode::UnknownSegment,
            Self::SentinelId { .. } => ErrorCode::SentinelId,
            Self::ZeroId => ErrorCode::ZeroSegmentId,
            Self::Cycle { .. } => ErrorCode::CycleDetected,
        }
    }
}

fn join_ids(ids: &[SegmentId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
