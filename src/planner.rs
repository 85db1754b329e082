//! Target selection and move emission.
//!
//! Each turn the planner walks a fixed decision list against the current
//! [`WorldState`]:
//!
//! 1. Drop a gather path that is finished.
//! 2. Drop the target once its terminus is ours.
//! 3. Kill an adjacent enemy crown we can beat.
//! 4. Drop a fog-lost target of the roaming kinds.
//! 5. Answer an enemy close to our crown.
//! 6. Keep walking an active gather path.
//! 7. Continue the target path from its first usable waypoint.
//! 8. Pick a fresh objective: known crown, city, or enemy territory.
//!
//! [`Planner::attack`] then turns the active path into one legal move,
//! gathering first when the target path alone looks too weak.

mod gather;
mod objectives;
mod strength;

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Tuning;
use crate::error::PlanError;
use crate::game::{Move, WorldState};
use crate::path::{PathSearch, SearchMode};

pub use gather::{GatherRoute, best_gather_route, plan_gather};
pub use objectives::{
    best_enemy_territory, biggest_enemy_is_threat, closest_city, closest_enemy, should_get_cities,
};
pub use strength::{projected_strength, team_contribution, tile_contribution};

/// Why the planner is heading where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TargetKind {
    /// Finish an adjacent enemy crown this move.
    KillCrown,
    /// Strike the most dangerous enemy tile near our crown.
    CloseEnemy,
    /// Walk to a known enemy crown.
    Crown,
    /// Take a city.
    City,
    /// Push into the biggest enemy's land.
    EnemyTerritory,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::KillCrown => "kill-crown",
            Self::CloseEnemy => "close-enemy",
            Self::Crown => "crown",
            Self::City => "city",
            Self::EnemyTerritory => "enemy-territory",
        };
        f.write_str(name)
    }
}

/// Outcome of [`Planner::evaluate`] when there is something to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engagement {
    /// Current target kind.
    pub kind: TargetKind,
    /// New head position, when the committed path starts elsewhere.
    pub origin: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Decision {
    Commit { kind: TargetKind, path: Vec<usize> },
    KeepGathering,
    Continue { stale: usize },
    NoTarget,
}

/// Persistent target state carried between turns.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    tuning: Tuning,
    kind: Option<TargetKind>,
    target_path: Vec<usize>,
    gather_path: Vec<usize>,
}

impl Planner {
    /// Planner with no target.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            ..Self::default()
        }
    }

    /// Tuning in effect.
    #[must_use]
    pub const fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Current target kind, if any.
    #[must_use]
    pub const fn kind(&self) -> Option<TargetKind> {
        self.kind
    }

    /// Path toward the current target, starting at the tile we move from.
    #[must_use]
    pub fn target_path(&self) -> &[usize] {
        &self.target_path
    }

    /// Active gather path, empty when not gathering.
    #[must_use]
    pub fn gather_path(&self) -> &[usize] {
        &self.gather_path
    }

    /// Whether a target is held.
    #[must_use]
    pub fn has_target(&self) -> bool {
        self.kind.is_some() && !self.target_path.is_empty()
    }

    /// Forget the target and any gather in progress.
    pub fn clear(&mut self) {
        self.kind = None;
        self.target_path.clear();
        self.gather_path.clear();
    }

    /// Run the decision list for this turn.
    ///
    /// Returns `None` when there is nothing worth attacking, in which case
    /// the caller should fall back to exploring. When the returned
    /// engagement carries an `origin`, the committed path starts there and
    /// the caller's head should move to it.
    pub fn evaluate(&mut self, world: &WorldState, head: usize) -> Option<Engagement> {
        self.revalidate(world, head);
        let decision = self.decide(world, head);
        self.apply(decision, head)
    }

    fn revalidate(&mut self, world: &WorldState, head: usize) {
        let arrived = self.gather_path.len() == 1 || self.gather_path.last() == Some(&head);
        if !self.gather_path.is_empty() && arrived {
            debug!(head, "gather finished");
            self.gather_path.clear();
        }

        if let Some(&terminus) = self.target_path.last() {
            if world.is_team(terminus) {
                info!(kind = ?self.kind, terminus, "target taken");
                self.clear();
            }
        }

        let roaming = matches!(
            self.kind,
            Some(TargetKind::CloseEnemy | TargetKind::EnemyTerritory)
        );
        if roaming {
            if let Some(&terminus) = self.target_path.last() {
                if world.terrain_at(terminus).owner().is_none() {
                    debug!(kind = ?self.kind, terminus, "lost sight of target");
                    self.clear();
                }
            }
        }
    }

    fn decide(&self, world: &WorldState, head: usize) -> Decision {
        let grid = world.grid();

        if let Some(crown) = world.found_crowns().first() {
            if grid.distance(head, crown.tile) == 1
                && world.army(head) > world.army(crown.tile) + 1
            {
                return Decision::Commit {
                    kind: TargetKind::KillCrown,
                    path: vec![head, crown.tile],
                };
            }
        }

        if let Some(enemy) = closest_enemy(world, &self.tuning) {
            let tracking = self.kind == Some(TargetKind::CloseEnemy)
                && self.target_path.last() == Some(&enemy);
            if !tracking {
                if let Some(path) = self.route(world, head, enemy, true) {
                    return Decision::Commit {
                        kind: TargetKind::CloseEnemy,
                        path,
                    };
                }
            }
        }

        if !self.gather_path.is_empty() {
            return Decision::KeepGathering;
        }

        let stale = self
            .target_path
            .iter()
            .take_while(|&&tile| !(world.is_mine(tile) && world.army(tile) >= 2))
            .count();
        if stale < self.target_path.len() {
            return Decision::Continue { stale };
        }

        let near = (grid.width() + grid.height()) / 2;
        for (kind, target) in self.objectives(world, head) {
            let relocate = grid.distance(head, target) < near;
            if let Some(path) = self.route(world, head, target, relocate) {
                return Decision::Commit { kind, path };
            }
            debug!(%kind, target, "objective unreachable");
        }

        Decision::NoTarget
    }

    /// Fresh objectives in priority order.
    fn objectives(&self, world: &WorldState, head: usize) -> Vec<(TargetKind, usize)> {
        let mut out = Vec::with_capacity(3);
        if let Some(crown) = world.found_crowns().first() {
            out.push((TargetKind::Crown, crown.tile));
        }
        if should_get_cities(world, &self.tuning) {
            if let Some(city) = closest_city(world) {
                out.push((TargetKind::City, city));
            }
        }
        if let Some(tile) = best_enemy_territory(world, head) {
            out.push((TargetKind::EnemyTerritory, tile));
        }
        out
    }

    /// Path from the head to `target`, or from our crown when the head is
    /// too weak and `relocate` allows it.
    fn route(
        &self,
        world: &WorldState,
        head: usize,
        target: usize,
        relocate: bool,
    ) -> Option<Vec<usize>> {
        let search = PathSearch::new(world, &self.tuning);
        let path = search.search(head, target, SearchMode::Direct);
        let weak = path.len() < 2
            || projected_strength(world, &path, &self.tuning) <= world.army(target);

        if weak && relocate {
            if let Some(crown) = world.crown().filter(|&crown| crown != head) {
                let from_crown = search.search(crown, target, SearchMode::Direct);
                if from_crown.len() >= 2 {
                    debug!(head, crown, target, "routing from crown instead");
                    return Some(from_crown);
                }
            }
        }

        (path.len() >= 2).then_some(path)
    }

    fn apply(&mut self, decision: Decision, head: usize) -> Option<Engagement> {
        match decision {
            Decision::Commit { kind, path } => {
                let origin = path.first().copied().filter(|&start| start != head);
                info!(
                    %kind,
                    target = path.last().copied(),
                    length = path.len(),
                    ?origin,
                    "new target"
                );
                self.kind = Some(kind);
                self.target_path = path;
                self.gather_path.clear();
                Some(Engagement { kind, origin })
            }
            Decision::KeepGathering => self.kind.map(|kind| Engagement { kind, origin: None }),
            Decision::Continue { stale } => {
                if stale > 0 {
                    debug!(stale, "skipping stale waypoints");
                }
                self.target_path.drain(..stale);
                self.kind.map(|kind| Engagement { kind, origin: None })
            }
            Decision::NoTarget => {
                self.clear();
                None
            }
        }
    }

    /// Take one step along the gather path, or else the target path.
    ///
    /// A path whose next tile has turned out to be a mountain is searched
    /// again from its current start. When a target is held and no gather is
    /// active, a gather is planned first.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] when the stepped path has run out or its next
    /// move is illegal. The offending path is dropped, along with the target
    /// when it was the target path.
    pub fn attack(&mut self, world: &WorldState) -> Result<Move, PlanError> {
        let search = PathSearch::new(world, &self.tuning);
        if blocked(world, &self.gather_path) {
            debug!("gather path blocked by a mountain");
            self.gather_path = research(&search, &self.gather_path, SearchMode::Gather);
        }
        if blocked(world, &self.target_path) {
            debug!("target path blocked by a mountain");
            self.target_path = research(&search, &self.target_path, SearchMode::Direct);
        }

        if self.gather_path.is_empty() {
            if let Some(kind) = self.kind {
                if let Some(path) = plan_gather(world, kind, &self.target_path, &self.tuning) {
                    self.gather_path = path;
                }
            }
        }

        let gathering = !self.gather_path.is_empty();
        let path = if gathering {
            &mut self.gather_path
        } else {
            &mut self.target_path
        };
        let result = step(world, path);

        if let Err(err) = result {
            warn!(%err, gathering, "dropping path");
            if gathering {
                self.gather_path.clear();
            } else {
                self.clear();
            }
        }
        result
    }
}

fn blocked(world: &WorldState, path: &[usize]) -> bool {
    path.get(1).is_some_and(|&next| world.is_mountain(next))
}

fn research(search: &PathSearch<'_>, path: &[usize], mode: SearchMode) -> Vec<usize> {
    match (path.first(), path.last()) {
        (Some(&start), Some(&end)) => search.search(start, end, mode),
        _ => Vec::new(),
    }
}

fn step(world: &WorldState, path: &mut Vec<usize>) -> Result<Move, PlanError> {
    if path.len() < 2 {
        return Err(PlanError::Exhausted);
    }
    let mv = Move {
        from: path[0],
        to: path[1],
    };
    world.check_move(mv)?;
    path.remove(0);
    Ok(mv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{MapBuilder, ScoreEntry, Team, TurnPayload};

    fn scores() -> Vec<ScoreEntry> {
        vec![ScoreEntry::empty(0), ScoreEntry::empty(1)]
    }

    fn world_at(turn: u32, map: &[i32], generals: Vec<i32>) -> WorldState {
        let mut world = WorldState::new(Team::solo(0));
        world
            .update(&TurnPayload::full(turn, scores(), generals, &[], map))
            .unwrap();
        world
    }

    #[test]
    fn test_no_target_on_empty_map() {
        let world = world_at(1, &MapBuilder::new(4, 4).owned(0, 0, 5).build(), vec![0, -1]);
        let mut planner = Planner::new(Tuning::default());
        assert_eq!(planner.evaluate(&world, 0), None);
        assert!(!planner.has_target());
    }

    #[test]
    fn test_kill_crown() {
        // Enemy crown at 2 holding 3; our head at 1 holding 6.
        let map = MapBuilder::new(4, 1)
            .owned(0, 0, 2)
            .owned(1, 0, 6)
            .owned(2, 1, 3)
            .build();
        let world = world_at(5, &map, vec![0, 2]);
        let mut planner = Planner::new(Tuning::default());
        let engagement = planner.evaluate(&world, 1).unwrap();
        assert_eq!(engagement.kind, TargetKind::KillCrown);
        assert_eq!(engagement.origin, None);
        assert_eq!(planner.attack(&world), Ok(Move { from: 1, to: 2 }));
    }

    #[test]
    fn test_kill_crown_needs_margin() {
        let map = MapBuilder::new(4, 1)
            .owned(0, 0, 2)
            .owned(1, 0, 4)
            .owned(2, 1, 3)
            .build();
        let world = world_at(5, &map, vec![0, 2]);
        let mut planner = Planner::new(Tuning::default());
        let engagement = planner.evaluate(&world, 1).unwrap();
        assert_ne!(engagement.kind, TargetKind::KillCrown);
    }

    #[test]
    fn test_close_enemy_is_tracked() {
        // C H . E . . . .
        let map = MapBuilder::new(8, 1)
            .owned(0, 0, 2)
            .owned(1, 0, 12)
            .owned(3, 1, 2)
            .build();
        let world = world_at(5, &map, vec![0, -1]);
        let mut planner = Planner::new(Tuning::default());
        let engagement = planner.evaluate(&world, 1).unwrap();
        assert_eq!(engagement.kind, TargetKind::CloseEnemy);
        assert_eq!(planner.target_path(), &[1, 2, 3]);

        assert_eq!(planner.attack(&world), Ok(Move { from: 1, to: 2 }));
        assert_eq!(planner.target_path(), &[2, 3]);
    }

    #[test]
    fn test_stronger_close_enemy_retargets() {
        let map = MapBuilder::new(8, 1).owned(0, 0, 12).owned(3, 1, 2).build();
        let world = world_at(5, &map, vec![0, -1]);
        let mut planner = Planner::new(Tuning::default());
        assert_eq!(
            planner.evaluate(&world, 0).map(|e| e.kind),
            Some(TargetKind::CloseEnemy)
        );
        assert_eq!(planner.target_path(), &[0, 1, 2, 3]);

        // A heavier stack shows up further out and becomes the bigger danger.
        let map = MapBuilder::new(8, 1)
            .owned(0, 0, 12)
            .owned(3, 1, 2)
            .owned(5, 1, 15)
            .build();
        let world = world_at(6, &map, vec![0, -1]);
        let engagement = planner.evaluate(&world, 0).unwrap();
        assert_eq!(engagement.kind, TargetKind::CloseEnemy);
        assert_eq!(engagement.origin, None);
        assert_eq!(planner.target_path(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_weak_head_relocates_to_crown() {
        // C . . . . H
        // . . . E . .
        let map = MapBuilder::new(6, 2)
            .owned(0, 0, 30)
            .owned(5, 0, 2)
            .owned(9, 1, 20)
            .build();
        let world = world_at(5, &map, vec![0, -1]);
        let mut planner = Planner::new(Tuning::default());
        let engagement = planner.evaluate(&world, 5).unwrap();
        assert_eq!(engagement.kind, TargetKind::CloseEnemy);
        assert_eq!(engagement.origin, Some(0));
        assert_eq!(planner.target_path().first(), Some(&0));
        assert_eq!(planner.target_path().last(), Some(&9));
    }

    #[test]
    fn test_taken_target_is_dropped() {
        let before = MapBuilder::new(10, 1)
            .owned(0, 0, 2)
            .owned(1, 0, 12)
            .owned(9, 1, 1)
            .build();
        let world = world_at(5, &before, vec![0, -1]);
        let mut planner = Planner::new(Tuning::default());
        assert_eq!(
            planner.evaluate(&world, 1).map(|e| e.kind),
            Some(TargetKind::EnemyTerritory)
        );

        let after = MapBuilder::new(10, 1).owned(0, 0, 2).owned(9, 0, 3).build();
        let world = world_at(6, &after, vec![0, -1]);
        assert_eq!(planner.evaluate(&world, 9), None);
        assert!(!planner.has_target());
    }

    #[test]
    fn test_fogged_territory_is_dropped() {
        let before = MapBuilder::new(10, 1)
            .owned(0, 0, 2)
            .owned(1, 0, 12)
            .owned(9, 1, 1)
            .build();
        let world = world_at(5, &before, vec![0, -1]);
        let mut planner = Planner::new(Tuning::default());
        planner.evaluate(&world, 1).unwrap();

        let after = MapBuilder::new(10, 1).owned(0, 0, 2).owned(1, 0, 12).fog(9).build();
        let world = world_at(6, &after, vec![0, -1]);
        assert_eq!(planner.evaluate(&world, 1), None);
    }

    #[test]
    fn test_stale_waypoints_are_skipped() {
        let map = MapBuilder::new(10, 1)
            .owned(0, 0, 2)
            .owned(1, 0, 20)
            .owned(9, 1, 1)
            .build();
        let world = world_at(5, &map, vec![0, -1]);
        let mut planner = Planner::new(Tuning::default());
        planner.evaluate(&world, 1).unwrap();
        assert_eq!(planner.target_path().first(), Some(&1));

        // The army moved on to tile 3 without the planner stepping.
        let moved = MapBuilder::new(10, 1)
            .owned(0, 0, 2)
            .owned(1, 0, 1)
            .owned(2, 0, 1)
            .owned(3, 0, 17)
            .owned(9, 1, 1)
            .build();
        let world = world_at(6, &moved, vec![0, -1]);
        let engagement = planner.evaluate(&world, 3).unwrap();
        assert_eq!(engagement.kind, TargetKind::EnemyTerritory);
        assert_eq!(planner.target_path().first(), Some(&3));
        assert_eq!(planner.attack(&world), Ok(Move { from: 3, to: 4 }));
    }

    #[test]
    fn test_lost_source_drops_target() {
        // The crown holds a single army so nothing can gather.
        let map = MapBuilder::new(10, 1)
            .owned(0, 0, 1)
            .owned(1, 0, 20)
            .owned(9, 1, 1)
            .build();
        let world = world_at(5, &map, vec![0, -1]);
        let mut planner = Planner::new(Tuning::default());
        planner.evaluate(&world, 1).unwrap();

        let lost = MapBuilder::new(10, 1)
            .owned(0, 0, 1)
            .owned(1, 1, 3)
            .owned(9, 1, 1)
            .build();
        let world = world_at(6, &lost, vec![0, -1]);
        assert_eq!(planner.attack(&world), Err(PlanError::SourceLost { from: 1 }));
        assert!(!planner.has_target());
    }

    #[test]
    fn test_mountain_on_next_step_researches() {
        // . H . . .
        // . . . . E
        let map = MapBuilder::new(5, 2)
            .owned(0, 0, 2)
            .owned(1, 0, 20)
            .owned(9, 1, 1)
            .build();
        let world = world_at(5, &map, vec![0, -1]);
        let mut planner = Planner::new(Tuning::default());
        planner.evaluate(&world, 1).unwrap();
        let next = planner.target_path()[1];

        let walled = MapBuilder::new(5, 2)
            .owned(0, 0, 2)
            .owned(1, 0, 20)
            .mountain(next)
            .owned(9, 1, 1)
            .build();
        let world = world_at(6, &walled, vec![0, -1]);
        let mv = planner.attack(&world).unwrap();
        assert_eq!(mv.from, 1);
        assert_ne!(mv.to, next);
        assert_eq!(planner.target_path().last(), Some(&9));
    }

    #[test]
    fn test_gather_runs_before_target() {
        // H . . . . . . . E
        // G . . . . . . . .
        let map = MapBuilder::new(9, 2)
            .owned(0, 0, 2)
            .owned(8, 1, 6)
            .owned(9, 0, 15)
            .build();
        let world = world_at(5, &map, vec![-1, -1]);
        let mut planner = Planner::new(Tuning::default());
        assert_eq!(
            planner.evaluate(&world, 0).map(|e| e.kind),
            Some(TargetKind::EnemyTerritory)
        );
        assert_eq!(planner.attack(&world), Ok(Move { from: 9, to: 0 }));
        assert_eq!(planner.gather_path(), &[0]);
        assert_eq!(planner.target_path().first(), Some(&0));
    }

    #[test]
    fn test_mountain_on_gather_path_researches() {
        // C . . . . . . . E
        // . . . . . . . . .
        // . . . . . . . . .
        // G . . . . . . . .
        let map = MapBuilder::new(9, 4)
            .owned(0, 0, 2)
            .owned(8, 1, 6)
            .owned(27, 0, 15)
            .build();
        let world = world_at(5, &map, vec![0, -1]);
        let mut planner = Planner::new(Tuning::default());
        planner.evaluate(&world, 0).unwrap();
        assert_eq!(planner.attack(&world), Ok(Move { from: 27, to: 18 }));
        assert_eq!(planner.gather_path(), &[18, 9, 0]);

        let walled = MapBuilder::new(9, 4)
            .owned(0, 0, 2)
            .owned(8, 1, 6)
            .mountain(9)
            .owned(18, 0, 14)
            .owned(27, 0, 1)
            .build();
        let world = world_at(6, &walled, vec![0, -1]);
        assert_eq!(
            planner.evaluate(&world, 18).map(|e| e.kind),
            Some(TargetKind::EnemyTerritory)
        );
        assert_eq!(planner.attack(&world), Ok(Move { from: 18, to: 19 }));
        assert_eq!(planner.gather_path(), &[19, 10, 1, 0]);
        assert_eq!(planner.target_path().first(), Some(&0));
    }

    #[test]
    fn test_exhausted_path() {
        let world = world_at(1, &MapBuilder::new(2, 1).owned(0, 0, 5).build(), vec![0, -1]);
        let mut planner = Planner::new(Tuning::default());
        assert_eq!(planner.attack(&world), Err(PlanError::Exhausted));
    }
}
