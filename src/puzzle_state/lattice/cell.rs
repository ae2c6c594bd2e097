//! # Cell Module
//!
//! Integer lattice positions and the dense key used to index them.
//!
//! ## Key Layout
//!
//! A lattice with half extent `N` spans `[-N, N)` on every axis, so each axis has
//! `S = 2N` positions. A cell is keyed by shifting each coordinate into `[0, S)` and
//! reading the three offsets as the digits of a base-`S` number:
//!
//! ```text
//! key = ((x + N) * S + (y + N)) * S + (z + N)
//! ```
//!
//! Every digit is in `[0, S)`, and base-`S` representations are unique, so two
//! distinct in-range cells never share a key. The largest key is `S³ - 1`. With
//! `N <= 512` that is below `2³⁰`, so it always fits in a `u32`.

use std::fmt;

use cgmath::Point3;

use crate::error::ConfigError;

/// One discrete position in the lattice.
///
/// Equality is purely structural; a cell has no identity beyond its coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl Cell {
    /// Creates a cell at `(x, y, z)`.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Cell { x, y, z }
    }

    /// Sum of the coordinates: the cell's height along the (1,1,1) diagonal.
    pub fn layer(&self) -> i32 {
        self.x + self.y + self.z
    }

    /// The three axis predecessors that must all be filled for this cell to be
    /// supported: `(x-1,y,z)`, `(x,y-1,z)` and `(x,y,z-1)`.
    pub fn support_triple(&self) -> [Cell; 3] {
        [
            Cell::new(self.x - 1, self.y, self.z),
            Cell::new(self.x, self.y - 1, self.z),
            Cell::new(self.x, self.y, self.z - 1),
        ]
    }

    /// The cell's centre in lattice space.
    pub fn center(&self) -> Point3<f32> {
        Point3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

impl From<Point3<i32>> for Cell {
    fn from(point: Point3<i32>) -> Self {
        Cell::new(point.x, point.y, point.z)
    }
}

impl From<Cell> for Point3<i32> {
    fn from(cell: Cell) -> Self {
        Point3::new(cell.x, cell.y, cell.z)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Dense scalar key for a [`Cell`] inside a [`LatticeBounds`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey(pub u32);

impl CellKey {
    /// The key as an index into per-cell storage.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The bounded cube `[-N, N)³` that every lattice operation works inside.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LatticeBounds {
    half_extent: i32,
}

impl LatticeBounds {
    /// Largest supported half extent. Keeps `(2N)³` inside `u32`.
    pub const MAX_HALF_EXTENT: i32 = 512;

    /// Creates bounds spanning `[-half_extent, half_extent)` on each axis.
    pub fn new(half_extent: i32) -> Result<Self, ConfigError> {
        if !(1..=Self::MAX_HALF_EXTENT).contains(&half_extent) {
            return Err(ConfigError::InvalidHalfExtent {
                value: half_extent,
                max: Self::MAX_HALF_EXTENT,
            });
        }
        Ok(LatticeBounds { half_extent })
    }

    /// The half extent `N`.
    pub fn half_extent(&self) -> i32 {
        self.half_extent
    }

    /// Number of positions along one axis (`2N`).
    pub fn side(&self) -> u32 {
        (2 * self.half_extent) as u32
    }

    /// Total number of cells in the cube.
    pub fn volume(&self) -> usize {
        let side = self.side() as usize;
        side * side * side
    }

    /// Whether `cell` lies inside the cube.
    pub fn contains(&self, cell: Cell) -> bool {
        let range = -self.half_extent..self.half_extent;
        range.contains(&cell.x) && range.contains(&cell.y) && range.contains(&cell.z)
    }

    /// Encodes `cell`, or `None` if it is out of range.
    pub fn key_of(&self, cell: Cell) -> Option<CellKey> {
        if !self.contains(cell) {
            return None;
        }
        let side = self.side();
        let ox = (cell.x + self.half_extent) as u32;
        let oy = (cell.y + self.half_extent) as u32;
        let oz = (cell.z + self.half_extent) as u32;
        Some(CellKey((ox * side + oy) * side + oz))
    }

    /// Decodes `key` back into its cell, or `None` if the key is out of range.
    pub fn cell_of(&self, key: CellKey) -> Option<Cell> {
        if key.index() >= self.volume() {
            return None;
        }
        let side = self.side();
        let oz = key.0 % side;
        let oy = (key.0 / side) % side;
        let ox = key.0 / (side * side);
        Some(Cell::new(
            ox as i32 - self.half_extent,
            oy as i32 - self.half_extent,
            oz as i32 - self.half_extent,
        ))
    }

    /// Every cell in the cube, x-major then y then z (key order).
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let n = self.half_extent;
        (-n..n).flat_map(move |x| (-n..n).flat_map(move |y| (-n..n).map(move |z| Cell::new(x, y, z))))
    }

    /// Every cell whose coordinates sum to `layer`.
    pub fn layer(&self, layer: i32) -> impl Iterator<Item = Cell> {
        self.cells().filter(move |cell| cell.layer() == layer)
    }
}
