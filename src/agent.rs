//! The playing agent: world state, planner and explorer behind one call.
//!
//! [`Agent::play`] takes one turn payload and returns the move to send, if
//! any. The agent tracks a "head", the tile its main army sits on, between
//! turns. Planned moves step the head along the planner's paths; when the
//! planner has nothing to do, the [`Explorer`] takes over from the head.

mod explorer;
mod session;

pub use explorer::{Explorer, Frontier};
pub use session::{MoveSink, Session, SessionSummary, TurnMove};

use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::error::WorldError;
use crate::game::{Move, TurnPayload, WorldState};
use crate::planner::{Planner, TargetKind};

/// A move chosen by [`Agent::play`] and what chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    /// The move to send.
    pub mv: Move,
    /// Planner target behind the move; `None` when the explorer chose it.
    pub kind: Option<TargetKind>,
}

/// World state, planner and explorer for one game.
#[derive(Debug, Clone)]
pub struct Agent<E = Frontier> {
    world: WorldState,
    planner: Planner,
    explorer: E,
    head: Option<usize>,
}

impl Agent<Frontier> {
    /// Agent using the [`Frontier`] explorer.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_explorer(config, Frontier::new())
    }
}

impl<E: Explorer> Agent<E> {
    /// Agent using a custom explorer.
    #[must_use]
    pub fn with_explorer(config: SessionConfig, explorer: E) -> Self {
        Self {
            world: WorldState::new(config.team),
            planner: Planner::new(config.tuning),
            explorer,
            head: None,
        }
    }

    /// Current world view.
    #[must_use]
    pub const fn world(&self) -> &WorldState {
        &self.world
    }

    /// Planner state.
    #[must_use]
    pub const fn planner(&self) -> &Planner {
        &self.planner
    }

    /// Tile the main army is believed to be on.
    #[must_use]
    pub const fn head(&self) -> Option<usize> {
        self.head
    }

    /// Apply one turn and choose a move.
    ///
    /// Returns `Ok(None)` when there is no legal move worth making. A move
    /// the explorer falls back to carries no target kind, even while the
    /// planner still holds a target.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError`] if the payload cannot be applied. The agent is
    /// left exactly as it was, so the next payload can still be tried.
    pub fn play(&mut self, payload: &TurnPayload) -> Result<Option<Action>, WorldError> {
        self.world.update(payload)?;

        let Some(mut head) = self.locate_head() else {
            debug!(turn = payload.turn, "no tiles to move from");
            return Ok(None);
        };

        if let Some(engagement) = self.planner.evaluate(&self.world, head) {
            if let Some(origin) = engagement.origin {
                self.move_head(origin);
                head = origin;
            }
            match self.planner.attack(&self.world) {
                Ok(mv) => {
                    self.head = Some(mv.to);
                    return Ok(Some(Action {
                        mv,
                        kind: Some(engagement.kind),
                    }));
                }
                Err(err) => warn!(%err, kind = %engagement.kind, "planned move failed, exploring"),
            }
        }

        Ok(self.explore(head).map(|mv| Action { mv, kind: None }))
    }

    fn explore(&mut self, mut head: usize) -> Option<Move> {
        #[allow(clippy::cast_precision_loss)]
        let weak = (self.world.army(head) as f64) < self.world.avg_tile_strength();
        if weak || !self.world.is_mine(head) {
            if let Some(largest) = self.largest_tile(Some(head)) {
                self.move_head(largest);
                head = largest;
            }
        }

        let mv = self.explorer.next_move(&self.world, head)?;
        if let Err(err) = self.world.check_move(mv) {
            warn!(%err, %mv, "explorer proposed an illegal move");
            return None;
        }
        self.head = Some(mv.to);
        Some(mv)
    }

    /// A head that is still ours, resetting it when it is not.
    fn locate_head(&mut self) -> Option<usize> {
        match self.head {
            Some(head) if self.world.is_mine(head) => Some(head),
            Some(head) => {
                let largest = self.largest_tile(Some(head))?;
                self.move_head(largest);
                Some(largest)
            }
            None => {
                let start = self
                    .world
                    .crown()
                    .filter(|&crown| self.world.is_mine(crown))
                    .or_else(|| self.largest_tile(None))?;
                self.move_head(start);
                Some(start)
            }
        }
    }

    fn move_head(&mut self, head: usize) {
        debug!(from = ?self.head, to = head, army = self.world.army(head), "moving head");
        self.head = Some(head);
        self.explorer.reset(head);
    }

    /// Our strongest tile other than `exclude`; ties keep scan order.
    fn largest_tile(&self, exclude: Option<usize>) -> Option<usize> {
        let mut best: Option<(usize, i64)> = None;
        for tile in 0..self.world.grid().size() {
            if Some(tile) == exclude || !self.world.is_mine(tile) {
                continue;
            }
            let army = self.world.army(tile);
            if best.is_none_or(|(_, top)| army > top) {
                best = Some((tile, army));
            }
        }
        best.map(|(tile, _)| tile)
    }
}
