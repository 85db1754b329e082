//! Game-facing data for the agent.
//!
//! Everything the agent knows about the world, rebuilt each turn:
//! - Run-length diff patching of the server's buffers
//! - Grid geometry and terrain codes
//! - Score table, crowns, cities and mountains
//! - Derived aggregates used by the planner
//! - Invariant checks for reconstructed state

mod builder;
mod invariants;
mod map;
mod patch;
mod payload;
mod state;
mod team;

pub use builder::MapBuilder;
pub use invariants::{InvariantViolation, check_invariants};
pub use map::{Coord, Grid, TILE_EMPTY, TILE_FOG, TILE_FOG_OBSTACLE, TILE_MOUNTAIN, Terrain};
pub use patch::{full_replacement, patch};
pub use payload::{Move, ScoreEntry, TurnPayload};
pub use state::{Centroid, FoundCrown, TurnSnapshot, WorldState};
pub use team::{PlayerIndex, Team};
