//! # Lattice Store
//!
//! Ground truth for which cells are filled and which are legally placeable.
//!
//! ## Storage
//!
//! Both sets are bit vectors indexed by [`CellKey`], one bit per cell in the bounded
//! cube, plus a running count of each. Membership checks are O(1). A cube with
//! half extent 4 needs 512 bits per set.
//!
//! ## Support Rule
//!
//! A cell is a candidate iff it is empty, sits above the base layer, and all three
//! cells one step lower on each axis are filled. Diagonal neighbours play no part.
//! The candidate set is only ever rebuilt by a full sweep in
//! [`LatticeStore::recompute_candidates`].

use bitvec::prelude::BitVec;
use log::{info, warn};

use crate::error::{InvalidPlacementReason, PlacementError};

use super::cell::{Cell, CellKey, LatticeBounds};

/// Owns the occupied and candidate sets for one puzzle session.
pub struct LatticeStore {
    bounds: LatticeBounds,
    base_layer: i32,
    /// One bit per cell, set when the cell holds a block.
    occupied: BitVec,
    occupied_count: usize,
    /// One bit per cell, set when the cell is currently placeable.
    candidates: BitVec,
    candidate_count: usize,
    /// Bumped on every candidate recomputation so readers can detect stale snapshots.
    revision: u64,
}

impl LatticeStore {
    /// Creates an empty store. Call [`initialize_base`](Self::initialize_base)
    /// before anything else.
    pub fn new(bounds: LatticeBounds, base_layer: i32) -> Self {
        let volume = bounds.volume();
        LatticeStore {
            bounds,
            base_layer,
            occupied: BitVec::repeat(false, volume),
            occupied_count: 0,
            candidates: BitVec::repeat(false, volume),
            candidate_count: 0,
            revision: 0,
        }
    }

    /// The cube this store covers.
    pub fn bounds(&self) -> LatticeBounds {
        self.bounds
    }

    /// The layer sum every support chain rests on.
    pub fn base_layer(&self) -> i32 {
        self.base_layer
    }

    /// Fills every cell on the base layer.
    ///
    /// The fill is all-or-nothing: if any base cell is already occupied, each such
    /// cell is logged, nothing changes, and the first duplicate is reported.
    ///
    /// # Returns
    /// The number of cells filled.
    pub fn initialize_base(&mut self) -> Result<usize, PlacementError> {
        let bounds = self.bounds;
        let mut duplicate = None;
        for cell in bounds.layer(self.base_layer) {
            if self.is_occupied(cell) {
                let err = PlacementError::DuplicateBaseFill { cell };
                warn!("{err}");
                duplicate.get_or_insert(err);
            }
        }
        if let Some(err) = duplicate {
            return Err(err);
        }

        let mut filled = 0;
        for cell in bounds.layer(self.base_layer) {
            if let Some(key) = bounds.key_of(cell) {
                self.occupied.set(key.index(), true);
                filled += 1;
            }
        }
        self.occupied_count += filled;
        info!("Base layer {} filled with {} cells", self.base_layer, filled);
        Ok(filled)
    }

    /// Whether `cell` holds a block. Out-of-range cells are never occupied.
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.bounds
            .key_of(cell)
            .is_some_and(|key| self.occupied[key.index()])
    }

    /// Whether `cell` is currently placeable.
    pub fn is_candidate(&self, cell: Cell) -> bool {
        self.bounds
            .key_of(cell)
            .is_some_and(|key| self.is_candidate_key(key))
    }

    /// Whether the cell behind `key` is currently placeable.
    pub fn is_candidate_key(&self, key: CellKey) -> bool {
        self.candidates
            .get(key.index())
            .is_some_and(|bit| *bit)
    }

    /// Tests the support rule for `cell` against the occupied set alone.
    pub fn is_supported(&self, cell: Cell) -> bool {
        cell.layer() > self.base_layer
            && !self.is_occupied(cell)
            && cell
                .support_triple()
                .iter()
                .all(|support| self.is_occupied(*support))
    }

    /// Rebuilds the candidate set with a full sweep of the cube.
    ///
    /// Never touches the occupied set.
    ///
    /// # Returns
    /// The number of candidates found.
    pub fn recompute_candidates(&mut self) -> usize {
        let bounds = self.bounds;
        self.candidates.fill(false);
        let mut count = 0;
        for (index, cell) in bounds.cells().enumerate() {
            if self.is_supported(cell) {
                self.candidates.set(index, true);
                count += 1;
            }
        }
        self.candidate_count = count;
        self.revision += 1;
        info!("Recalculated spaces: {count} candidates");
        count
    }

    /// Checks `cell` against the placement rules without changing anything.
    ///
    /// # Returns
    /// The cell's key if it is a current candidate.
    pub fn check_placement(&self, cell: Cell) -> Result<CellKey, PlacementError> {
        let reason = match self.bounds.key_of(cell) {
            None => InvalidPlacementReason::OutOfBounds,
            Some(key) if self.occupied[key.index()] => InvalidPlacementReason::AlreadyOccupied,
            Some(key) if !self.candidates[key.index()] => InvalidPlacementReason::Unsupported,
            Some(key) => return Ok(key),
        };
        Err(PlacementError::InvalidPlacement { cell, reason })
    }

    /// Places a block at `cell`.
    ///
    /// `cell` must be in the current candidate set. On success it moves from the
    /// candidate set to the occupied set. The candidate set is not recomputed;
    /// callers invoke [`recompute_candidates`](Self::recompute_candidates) once
    /// they are done committing.
    ///
    /// # Errors
    /// [`PlacementError::InvalidPlacement`] if the cell is out of range, already
    /// occupied or not a candidate. The store is left untouched.
    pub fn commit_placement(&mut self, cell: Cell) -> Result<CellKey, PlacementError> {
        let key = self
            .check_placement(cell)
            .inspect_err(|err| warn!("{err}"))?;

        self.occupied.set(key.index(), true);
        self.occupied_count += 1;
        self.candidates.set(key.index(), false);
        self.candidate_count -= 1;
        info!("Placed block at {cell}");
        Ok(key)
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.occupied_count
    }

    /// Number of candidate cells.
    pub fn candidate_count(&self) -> usize {
        self.candidate_count
    }

    /// Counter bumped by every [`recompute_candidates`](Self::recompute_candidates).
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Every occupied cell, in key order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.occupied
            .iter_ones()
            .filter_map(|index| self.bounds.cell_of(CellKey(index as u32)))
    }

    /// Every candidate cell, in key order.
    pub fn candidate_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.candidates
            .iter_ones()
            .filter_map(|index| self.bounds.cell_of(CellKey(index as u32)))
    }
}
