//! Driving an agent over a stream of turns.

use std::borrow::Borrow;

use serde::Serialize;
use tracing::{info, warn};

use super::{Agent, Explorer, Frontier};
use crate::config::SessionConfig;
use crate::game::{Move, TurnPayload};
use crate::planner::TargetKind;

/// A move the agent sent, with the turn it was sent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TurnMove {
    /// Turn the move answers.
    pub turn: u32,
    /// The move.
    #[serde(flatten)]
    pub mv: Move,
    /// Planner target behind the move; `None` for exploring moves.
    pub kind: Option<TargetKind>,
}

/// Where moves go: a socket, a log, a test buffer.
pub trait MoveSink {
    /// Deliver one move.
    fn send(&mut self, record: TurnMove);
}

impl MoveSink for Vec<TurnMove> {
    fn send(&mut self, record: TurnMove) {
        self.push(record);
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Payloads received.
    pub turns: u32,
    /// Moves sent.
    pub moves: u32,
    /// Moves driven by a planner target.
    pub planned: u32,
    /// Turns with no move.
    pub idle: u32,
    /// Payloads rejected as corrupt.
    pub skipped: u32,
    /// Last turn number seen.
    pub last_turn: u32,
}

impl SessionSummary {
    /// Fold another run into this one.
    pub fn merge(&mut self, other: &Self) {
        self.turns += other.turns;
        self.moves += other.moves;
        self.planned += other.planned;
        self.idle += other.idle;
        self.skipped += other.skipped;
        self.last_turn = self.last_turn.max(other.last_turn);
    }
}

/// One game's agent plus its running counters.
#[derive(Debug, Clone)]
pub struct Session<E = Frontier> {
    agent: Agent<E>,
    summary: SessionSummary,
}

impl Session<Frontier> {
    /// Session with a default agent.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_agent(Agent::new(config))
    }
}

impl<E: Explorer> Session<E> {
    /// Session around an existing agent.
    #[must_use]
    pub fn with_agent(agent: Agent<E>) -> Self {
        Self {
            agent,
            summary: SessionSummary::default(),
        }
    }

    /// The agent being driven.
    #[must_use]
    pub const fn agent(&self) -> &Agent<E> {
        &self.agent
    }

    /// Counters so far.
    #[must_use]
    pub const fn summary(&self) -> SessionSummary {
        self.summary
    }

    /// Play one turn, sending the move if there is one.
    ///
    /// A payload the world cannot apply is logged and skipped.
    pub fn turn<S: MoveSink + ?Sized>(
        &mut self,
        payload: &TurnPayload,
        sink: &mut S,
    ) -> Option<TurnMove> {
        self.summary.turns += 1;
        self.summary.last_turn = payload.turn;

        let action = match self.agent.play(payload) {
            Ok(action) => action,
            Err(err) => {
                warn!(turn = payload.turn, %err, "skipping turn");
                self.summary.skipped += 1;
                return None;
            }
        };

        let Some(action) = action else {
            self.summary.idle += 1;
            return None;
        };
        if action.kind.is_some() {
            self.summary.planned += 1;
        }
        self.summary.moves += 1;

        let record = TurnMove {
            turn: payload.turn,
            mv: action.mv,
            kind: action.kind,
        };
        sink.send(record);
        Some(record)
    }

    /// Play every payload in order.
    pub fn run<I, S>(&mut self, payloads: I, sink: &mut S) -> SessionSummary
    where
        I: IntoIterator,
        I::Item: Borrow<TurnPayload>,
        S: MoveSink + ?Sized,
    {
        for payload in payloads {
            self.turn(payload.borrow(), sink);
        }
        info!(
            turns = self.summary.turns,
            moves = self.summary.moves,
            skipped = self.summary.skipped,
            "session finished"
        );
        self.summary
    }
}
