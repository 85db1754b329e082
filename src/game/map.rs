//! Grid geometry and terrain codes.

use crate::game::PlayerIndex;

/// Terrain code for an empty, visible tile.
pub const TILE_EMPTY: i32 = -1;
/// Terrain code for a visible mountain.
pub const TILE_MOUNTAIN: i32 = -2;
/// Terrain code for a fogged tile.
pub const TILE_FOG: i32 = -3;
/// Terrain code for a fogged city or mountain.
pub const TILE_FOG_OBSTACLE: i32 = -4;

/// A position on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    /// Row (`index / width`).
    pub row: usize,
    /// Column (`index % width`).
    pub col: usize,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Get adjacent coordinates in fixed order (up, right, down, left).
    ///
    /// Returns a fixed-size array and count to avoid heap allocation.
    /// The array contains valid coordinates in indices 0..count.
    #[must_use]
    #[inline]
    pub fn adjacent(&self, width: usize, height: usize) -> ([Coord; 4], u8) {
        let mut result = [Coord::new(0, 0); 4];
        let mut count = 0u8;

        if self.row > 0 {
            result[count as usize] = Coord::new(self.row - 1, self.col);
            count += 1;
        }
        if self.col + 1 < width {
            result[count as usize] = Coord::new(self.row, self.col + 1);
            count += 1;
        }
        if self.row + 1 < height {
            result[count as usize] = Coord::new(self.row + 1, self.col);
            count += 1;
        }
        if self.col > 0 {
            result[count as usize] = Coord::new(self.row, self.col - 1);
            count += 1;
        }

        (result, count)
    }

    /// Taxicab distance to another coordinate.
    #[must_use]
    pub const fn distance(&self, other: Coord) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// Decoded terrain of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    /// Visible tile owned by a player.
    Owned(PlayerIndex),
    /// Visible, unowned, passable tile.
    Empty,
    /// Visible mountain.
    Mountain,
    /// Fogged tile with unknown contents.
    Fog,
    /// Fogged tile hiding either a city or a mountain.
    FogObstacle,
}

impl Terrain {
    /// Decode a raw terrain code. Returns `None` for codes below the sentinel range.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            TILE_EMPTY => Some(Terrain::Empty),
            TILE_MOUNTAIN => Some(Terrain::Mountain),
            TILE_FOG => Some(Terrain::Fog),
            TILE_FOG_OBSTACLE => Some(Terrain::FogObstacle),
            owner => usize::try_from(owner).ok().map(Terrain::Owned),
        }
    }

    /// Encode back into the raw terrain code.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Terrain::Owned(owner) => i32::try_from(owner).unwrap_or(i32::MAX),
            Terrain::Empty => TILE_EMPTY,
            Terrain::Mountain => TILE_MOUNTAIN,
            Terrain::Fog => TILE_FOG,
            Terrain::FogObstacle => TILE_FOG_OBSTACLE,
        }
    }

    /// Owning player, if the tile is visibly owned.
    #[must_use]
    pub const fn owner(self) -> Option<PlayerIndex> {
        match self {
            Terrain::Owned(owner) => Some(owner),
            _ => None,
        }
    }

    /// Empty or owned: visible and passable.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Terrain::Owned(_) | Terrain::Empty)
    }

    /// Fog or fog obstacle.
    #[must_use]
    pub const fn is_fogged(self) -> bool {
        matches!(self, Terrain::Fog | Terrain::FogObstacle)
    }
}

/// Dimensions of the map and index arithmetic over it.
///
/// Tiles are stored in row-major order; index `i` is at row `i / width`,
/// column `i % width`. Neighbours never wrap across a row boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Grid {
    width: usize,
    height: usize,
}

impl Grid {
    /// Create a grid. Returns `None` if either dimension is zero.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height })
    }

    /// Width of the map in tiles.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height of the map in tiles.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of tiles.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.width * self.height
    }

    /// Check if an index is on the map.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        index < self.size()
    }

    /// Coordinate of a tile index.
    #[must_use]
    pub const fn coord(&self, index: usize) -> Coord {
        Coord::new(index / self.width, index % self.width)
    }

    /// Tile index of a coordinate.
    #[must_use]
    pub const fn index(&self, coord: Coord) -> usize {
        coord.row * self.width + coord.col
    }

    /// Taxicab distance between two tiles.
    #[must_use]
    pub const fn distance(&self, a: usize, b: usize) -> usize {
        self.coord(a).distance(self.coord(b))
    }

    /// In-bounds 4-neighbours of a tile (up, right, down, left).
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> {
        let grid = *self;
        let (adjacent, count) = self.coord(index).adjacent(self.width, self.height);
        adjacent
            .into_iter()
            .take(usize::from(count))
            .map(move |coord| grid.index(coord))
    }

    /// Whether two tiles are in-bounds 4-neighbours.
    #[must_use]
    pub const fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.contains(a) && self.contains(b) && self.distance(a, b) == 1
    }
}
