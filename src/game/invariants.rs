//! World invariants - sanity checks on reconstructed state.
//!
//! A correct server stream never violates these. If one triggers, either the
//! stream is corrupt or reconstruction has a bug.

use crate::game::{Terrain, WorldState};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all world invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(world: &WorldState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let grid = world.grid();
    let size = grid.size();

    if world.armies().len() != size || world.terrain().len() != size {
        violations.push(InvariantViolation {
            message: format!(
                "buffers hold {} armies and {} terrain codes for a {}x{} map",
                world.armies().len(),
                world.terrain().len(),
                grid.width(),
                grid.height()
            ),
        });
    }

    for &mountain in world.mountains() {
        match world.terrain().get(mountain) {
            None => violations.push(InvariantViolation {
                message: format!("mountain {mountain} is off the map"),
            }),
            Some(Terrain::Owned(_) | Terrain::Empty) => violations.push(InvariantViolation {
                message: format!("known mountain {mountain} is visible as open ground"),
            }),
            Some(_) => {}
        }
    }

    for &city in world.cities() {
        if !grid.contains(city) {
            violations.push(InvariantViolation {
                message: format!("city {city} is off the map"),
            });
        } else if world.is_mountain(city) {
            violations.push(InvariantViolation {
                message: format!("city {city} is also a known mountain"),
            });
        }
    }

    for crown in world.found_crowns() {
        if !grid.contains(crown.tile) {
            violations.push(InvariantViolation {
                message: format!("found crown {} is off the map", crown.tile),
            });
        }
        if world.team().contains(crown.owner) {
            violations.push(InvariantViolation {
                message: format!("found crown {} belongs to teammate {}", crown.tile, crown.owner),
            });
        }
        if Some(crown.tile) == world.crown() {
            violations.push(InvariantViolation {
                message: format!("found crown {} is our own crown", crown.tile),
            });
        }
    }

    if let Some(crown) = world.crown() {
        if !world.is_mine(crown) {
            violations.push(InvariantViolation {
                message: format!(
                    "our crown {crown} shows terrain {:?}",
                    world.terrain_at(crown)
                ),
            });
        }
    }

    for (tile, &army) in world.armies().iter().enumerate() {
        if army < 0 {
            violations.push(InvariantViolation {
                message: format!("tile {tile} has negative army {army}"),
            });
        }
    }

    violations
}
