//! Construction of flat map buffers.

use crate::game::PlayerIndex;
use crate::game::map::{TILE_EMPTY, TILE_FOG, TILE_FOG_OBSTACLE, TILE_MOUNTAIN};

/// Builds a `[width, height, armies.., terrain..]` buffer tile by tile.
///
/// Every tile starts empty with no army.
#[derive(Debug, Clone)]
pub struct MapBuilder {
    width: usize,
    height: usize,
    armies: Vec<i32>,
    terrain: Vec<i32>,
}

impl MapBuilder {
    /// Start an all-empty map.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            armies: vec![0; size],
            terrain: vec![TILE_EMPTY; size],
        }
    }

    /// Set a tile's raw terrain code and army.
    #[must_use]
    pub fn tile(mut self, index: usize, code: i32, army: i32) -> Self {
        self.terrain[index] = code;
        self.armies[index] = army;
        self
    }

    /// A tile owned by `player` holding `army`.
    #[must_use]
    pub fn owned(self, index: usize, player: PlayerIndex, army: i32) -> Self {
        let code = i32::try_from(player).unwrap_or(i32::MAX);
        self.tile(index, code, army)
    }

    /// An empty tile holding a neutral garrison, such as an unowned city.
    #[must_use]
    pub fn neutral(self, index: usize, army: i32) -> Self {
        self.tile(index, TILE_EMPTY, army)
    }

    /// A visible mountain.
    #[must_use]
    pub fn mountain(self, index: usize) -> Self {
        self.tile(index, TILE_MOUNTAIN, 0)
    }

    /// A fogged tile.
    #[must_use]
    pub fn fog(self, index: usize) -> Self {
        self.tile(index, TILE_FOG, 0)
    }

    /// A fogged city-or-mountain.
    #[must_use]
    pub fn fog_obstacle(self, index: usize) -> Self {
        self.tile(index, TILE_FOG_OBSTACLE, 0)
    }

    /// Fog over every tile not yet assigned a non-empty code.
    #[must_use]
    pub fn fog_rest(mut self) -> Self {
        for (code, army) in self.terrain.iter_mut().zip(&self.armies) {
            if *code == TILE_EMPTY && *army == 0 {
                *code = TILE_FOG;
            }
        }
        self
    }

    /// Produce the flat buffer.
    #[must_use]
    pub fn build(&self) -> Vec<i32> {
        let mut buf = Vec::with_capacity(2 + self.armies.len() * 2);
        buf.push(i32::try_from(self.width).unwrap_or(i32::MAX));
        buf.push(i32::try_from(self.height).unwrap_or(i32::MAX));
        buf.extend_from_slice(&self.armies);
        buf.extend_from_slice(&self.terrain);
        buf
    }
}
