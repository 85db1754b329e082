//! Recorded games and deterministic replay.
//!
//! A recording is the game-start facts (our player index and the team table)
//! plus every turn payload the server sent, in order. The agent is a pure
//! function of those, so replaying a recording reproduces every move.
//!
//! # Time Travel
//!
//! - **Forward**: feed the next payload to the agent
//! - **Backward / jump to turn N**: rebuild the agent and feed payloads 0..N

mod render;

pub use render::render_path;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::{Session, SessionSummary, TurnMove};
use crate::config::{SessionConfig, Tuning};
use crate::game::{PlayerIndex, Team, TurnPayload};

/// Everything needed to replay one game from our side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    /// Our player index.
    pub player_index: PlayerIndex,
    /// Team id per player, as sent at game start. Empty for free-for-all.
    #[serde(default)]
    pub teams: Vec<u32>,
    /// Turn payloads in arrival order.
    pub updates: Vec<TurnPayload>,
}

impl Recording {
    /// Create a new recording with no turns yet.
    #[must_use]
    pub fn new(player_index: PlayerIndex, teams: Vec<u32>) -> Self {
        Self {
            player_index,
            teams,
            updates: Vec::new(),
        }
    }

    /// Our team as described by the recording.
    #[must_use]
    pub fn team(&self) -> Team {
        if self.teams.is_empty() {
            Team::solo(self.player_index)
        } else {
            Team::from_team_ids(self.player_index, &self.teams)
        }
    }

    /// Session configuration for replaying with `tuning`.
    #[must_use]
    pub fn session_config(&self, tuning: Tuning) -> SessionConfig {
        SessionConfig {
            team: self.team(),
            tuning,
        }
    }

    /// Save recording to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), ReplayError> {
        let json = serde_json::to_string(self).map_err(|source| ReplayError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load recording from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a recording.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let contents = fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ReplayError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Error type for replay operations.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Reading or writing a recording failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Recording path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A recording is not valid JSON of the expected shape.
    #[error("invalid recording {path}: {source}")]
    Json {
        /// Recording path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Turn index out of bounds.
    #[error("turn index {requested} out of bounds (recording has {available})")]
    TurnOutOfBounds {
        /// Requested index.
        requested: usize,
        /// Number of recorded turns.
        available: usize,
    },
    /// Every recorded turn has been played.
    #[error("recording is finished")]
    Finished,
}

/// Moves and counters from replaying a whole recording.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    /// Counters for the run.
    pub summary: SessionSummary,
    /// Every move sent, in order.
    pub moves: Vec<TurnMove>,
}

/// Replay engine - steps an agent through a recording.
///
/// Since the agent is deterministic, this engine can:
/// - Step forward by playing one payload
/// - Step backward by replaying from the first payload
/// - Jump to any position by replaying from the first payload
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    recording: Recording,
    tuning: Tuning,
    session: Session,
    moves: Vec<TurnMove>,
    position: usize,
}

impl ReplayEngine {
    /// Create a new replay engine positioned before the first payload.
    #[must_use]
    pub fn new(recording: Recording, tuning: Tuning) -> Self {
        let session = Session::new(recording.session_config(tuning));
        Self {
            recording,
            tuning,
            session,
            moves: Vec::new(),
            position: 0,
        }
    }

    /// Create a new replay engine with the first `position` payloads played.
    ///
    /// # Errors
    ///
    /// Returns an error if `position` is past the end of the recording.
    pub fn new_at(
        recording: Recording,
        tuning: Tuning,
        position: usize,
    ) -> Result<Self, ReplayError> {
        let available = recording.updates.len();
        if position > available {
            return Err(ReplayError::TurnOutOfBounds {
                requested: position,
                available,
            });
        }
        let mut engine = Self::new(recording, tuning);
        while engine.position < position {
            engine.step_forward()?;
        }
        Ok(engine)
    }

    /// Get the recording.
    #[must_use]
    pub const fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Number of payloads played so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// The session being replayed into.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Moves sent so far.
    #[must_use]
    pub fn moves(&self) -> &[TurnMove] {
        &self.moves
    }

    /// Whether every payload has been played.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.position >= self.recording.updates.len()
    }

    /// Play the next payload, returning the move it produced.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Finished`] if there are no payloads left.
    pub fn step_forward(&mut self) -> Result<Option<TurnMove>, ReplayError> {
        let payload = self
            .recording
            .updates
            .get(self.position)
            .ok_or(ReplayError::Finished)?;
        let record = self.session.turn(payload, &mut self.moves);
        self.position += 1;
        Ok(record)
    }

    /// Step back one payload by replaying from the start.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing has been played yet.
    pub fn step_backward(&mut self) -> Result<(), ReplayError> {
        let Some(target) = self.position.checked_sub(1) else {
            return Err(ReplayError::TurnOutOfBounds {
                requested: 0,
                available: self.recording.updates.len(),
            });
        };
        self.goto(target)
    }

    /// Jump to having played exactly `position` payloads.
    ///
    /// # Errors
    ///
    /// Returns an error if `position` is past the end of the recording.
    pub fn goto(&mut self, position: usize) -> Result<(), ReplayError> {
        let recording = self.recording.clone();
        *self = Self::new_at(recording, self.tuning, position)?;
        Ok(())
    }

    /// Play every remaining payload.
    #[must_use]
    pub fn run_to_end(mut self) -> ReplayReport {
        while self.step_forward().is_ok() {}
        ReplayReport {
            summary: self.session.summary(),
            moves: self.moves,
        }
    }

    /// Draw the agent's current paths over its current world view.
    #[must_use]
    pub fn render(&self) -> String {
        let agent = self.session.agent();
        render_path(
            agent.world(),
            agent.planner().target_path(),
            agent.planner().gather_path(),
        )
    }
}

/// Replay a whole recording with the given tuning.
#[must_use]
pub fn replay(recording: Recording, tuning: Tuning) -> ReplayReport {
    ReplayEngine::new(recording, tuning).run_to_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{MapBuilder, ScoreEntry};

    fn recording() -> Recording {
        let mut recording = Recording::new(0, Vec::new());
        for turn in 1..=4 {
            let army = i32::try_from(turn).unwrap() + 2;
            let map = MapBuilder::new(4, 4).owned(5, 0, army).owned(15, 1, 1).build();
            recording.updates.push(TurnPayload::full(
                turn,
                vec![ScoreEntry::empty(0), ScoreEntry::empty(1)],
                vec![5, -1],
                &[],
                &map,
            ));
        }
        recording
    }

    #[test]
    fn test_replay_is_deterministic() {
        let first = replay(recording(), Tuning::default());
        let second = replay(recording(), Tuning::default());
        assert_eq!(first, second);
        assert_eq!(first.summary.turns, 4);
    }

    #[test]
    fn test_step_and_goto() {
        let mut engine = ReplayEngine::new(recording(), Tuning::default());
        engine.step_forward().unwrap();
        engine.step_forward().unwrap();
        assert_eq!(engine.position(), 2);
        let moves_at_two = engine.moves().to_vec();

        engine.step_backward().unwrap();
        assert_eq!(engine.position(), 1);
        engine.goto(2).unwrap();
        assert_eq!(engine.moves(), moves_at_two.as_slice());

        engine.goto(4).unwrap();
        assert!(engine.is_finished());
        assert!(matches!(engine.step_forward(), Err(ReplayError::Finished)));
        assert!(matches!(
            engine.goto(5),
            Err(ReplayError::TurnOutOfBounds { requested: 5, available: 4 })
        ));
    }

    #[test]
    fn test_step_backward_at_start() {
        let mut engine = ReplayEngine::new(recording(), Tuning::default());
        assert!(engine.step_backward().is_err());
    }

    #[test]
    fn test_teams() {
        let recording = Recording::new(1, vec![0, 0, 1]);
        let team = recording.team();
        assert!(team.contains(0));
        assert!(team.contains(1));
        assert!(!team.contains(2));
        assert!(Recording::new(1, Vec::new()).team().contains(1));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Recording::load(Path::new("/nonexistent/game.json")).unwrap_err();
        assert!(matches!(err, ReplayError::Io { .. }));
    }
}
