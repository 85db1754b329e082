// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Generalist: the decision core of a fog-of-war territory capture bot.
//!
//! Each turn the server sends run-length diffs of two flat buffers, a city
//! list and a map. This crate:
//! - Patches the diffs back into full buffers
//! - Rebuilds a world view, remembering what fog hides again
//! - Chooses an objective and a path to it, gathering army when needed
//! - Emits one legal move per turn
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Session / Replay (turn stream)    │
//! ├─────────────────────────────────────┤
//! │   Agent (head tracking, explorer)   │
//! ├─────────────────────────────────────┤
//! │   Planner  ──────►  Path Search     │
//! ├─────────────────────────────────────┤
//! │   World State  ◄──  Delta Patcher   │
//! └─────────────────────────────────────┘
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod game;
pub mod path;
pub mod planner;
pub mod replay;

pub use error::{PatchError, PlanError, WorldError};

// Re-export key types at crate root for convenience
pub use agent::{Action, Agent, Explorer, Frontier, MoveSink, Session, SessionSummary, TurnMove};
pub use config::{SessionConfig, Tuning};
pub use game::{Move, Team, TurnPayload, WorldState};
pub use path::{PathSearch, SearchMode};
pub use planner::{Planner, TargetKind};
pub use replay::{Recording, ReplayEngine, ReplayReport};
