//! Error types for state reconstruction and move planning.

use thiserror::Error;

/// A run-length diff that cannot be applied to the previous buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PatchError {
    /// A match or mismatch length marker is negative.
    #[error("negative run length {value} at diff position {position}")]
    NegativeLength {
        /// Position of the marker inside the diff.
        position: usize,
        /// The offending marker value.
        value: i32,
    },
    /// A mismatch run declares more literals than the diff holds.
    #[error("mismatch run at diff position {position} wants {wanted} literals, only {available} remain")]
    LiteralsPastEnd {
        /// Position of the mismatch marker.
        position: usize,
        /// Number of literals the marker declares.
        wanted: usize,
        /// Number of elements left after the marker.
        available: usize,
    },
    /// A match run copies past the end of the previous buffer.
    #[error("match run at diff position {position} copies {wanted} elements from offset {offset}, previous buffer has {previous_len}")]
    CopyPastPrevious {
        /// Position of the match marker.
        position: usize,
        /// Output length at the time of the copy.
        offset: usize,
        /// Number of elements the marker declares.
        wanted: usize,
        /// Length of the previous buffer.
        previous_len: usize,
    },
}

/// Which of the two diffed buffers failed to patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffer {
    /// The known-city index list.
    Cities,
    /// The flat map buffer.
    Map,
}

impl std::fmt::Display for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Buffer::Cities => write!(f, "cities"),
            Buffer::Map => write!(f, "map"),
        }
    }
}

/// Data-integrity failure while rebuilding the world from a turn payload.
///
/// Any of these means the turn must be skipped: the previous state is kept
/// untouched and no move should be issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The diff for one of the buffers is malformed.
    #[error("failed to patch {buffer} buffer: {source}")]
    Patch {
        /// Buffer being patched.
        buffer: Buffer,
        /// Underlying patch failure.
        #[source]
        source: PatchError,
    },
    /// The patched map buffer is too short to even hold its dimensions.
    #[error("map buffer of length {len} has no dimension header")]
    MissingHeader {
        /// Length of the patched buffer.
        len: usize,
    },
    /// Width or height is zero or negative.
    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimensions {
        /// Declared width.
        width: i32,
        /// Declared height.
        height: i32,
    },
    /// Buffer length disagrees with `2 + 2 * width * height`.
    #[error("map buffer length {len} does not match {width}x{height} (expected {expected})")]
    DimensionMismatch {
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
        /// Actual buffer length.
        len: usize,
        /// Length implied by the dimensions.
        expected: usize,
    },
    /// A terrain slot holds a code outside the known sentinel range.
    #[error("unknown terrain code {code} at tile {tile}")]
    UnknownTerrain {
        /// Tile index.
        tile: usize,
        /// The raw code.
        code: i32,
    },
}

/// A planned move that is no longer legal at emission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The source tile is no longer ours or has nothing to move.
    #[error("source tile {from} is not ours with army above one")]
    SourceLost {
        /// Source tile.
        from: usize,
    },
    /// The destination is not a passable 4-neighbour of the source.
    #[error("tile {to} is not a passable neighbour of {from}")]
    NotAdjacent {
        /// Source tile.
        from: usize,
        /// Destination tile.
        to: usize,
    },
    /// The active path has no step left to take.
    #[error("no path step available")]
    Exhausted,
}
