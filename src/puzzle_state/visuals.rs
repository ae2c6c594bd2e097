//! # Visuals Module
//!
//! The capability the presentation layer provides for every occupied or candidate
//! cell, and a ready-made implementation that tracks the resulting per-cell flags.
//!
//! The core never owns meshes. It signals flag changes through [`CellVisuals`] and
//! the presentation layer decides how to draw them. [`VisualState`] records those
//! signals so a renderer can pull a [`BoardSnapshot`] or a buffer of
//! [`CellInstance`]s after each change.

use std::collections::HashMap;

use log::debug;

use super::lattice::cell::Cell;
use super::lattice::store::LatticeStore;
use super::placement::orientation::Orientation;

/// Signals the core sends to whatever draws the board.
pub trait CellVisuals {
    /// Shows or hides the hover outline on `cell`.
    fn set_outlined(&mut self, cell: Cell, outlined: bool);

    /// Marks `cell` as the staged placement (translucent material) or clears it.
    fn set_tentative(&mut self, cell: Cell, tentative: bool);

    /// Poses the block drawn at `cell`.
    fn set_orientation(&mut self, cell: Cell, orientation: Orientation);

    /// Throws away every per-cell visual and re-derives them from `store`.
    /// Called after each commit, once the candidate set has been recomputed.
    fn rebuild(&mut self, store: &LatticeStore);
}

/// How a cell should be drawn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellKind {
    /// A placed block.
    Occupied,
    /// An empty slot a block may be placed in.
    Candidate,
}

/// Flags the presentation layer must honour for one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellVisual {
    /// The cell being drawn.
    pub cell: Cell,
    /// Placed block or open slot.
    pub kind: CellKind,
    /// Whether anything is drawn. Occupied cells are always visible; candidates
    /// only show a block while staged.
    pub visible: bool,
    /// Hover outline.
    pub outlined: bool,
    /// Staged for commit.
    pub tentative: bool,
    /// Pose of the drawn block.
    pub orientation: Orientation,
}

impl CellVisual {
    fn occupied(cell: Cell) -> Self {
        CellVisual {
            cell,
            kind: CellKind::Occupied,
            visible: true,
            outlined: false,
            tentative: false,
            orientation: Orientation::NEUTRAL,
        }
    }

    fn candidate(cell: Cell) -> Self {
        CellVisual {
            cell,
            kind: CellKind::Candidate,
            visible: false,
            outlined: false,
            tentative: false,
            orientation: Orientation::NEUTRAL,
        }
    }
}

/// GPU instance data for one drawn cell.
///
/// # Memory Layout
/// - Position: 3x i32 (12 bytes)
/// - Orientation ticks: u32 (4 bytes)
/// - Flags: u32 (4 bytes)
///
/// Total size: 20 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CellInstance {
    x: i32,
    y: i32,
    z: i32,
    ticks: u32,
    flags: u32,
}

impl CellInstance {
    /// Bit set for occupied cells.
    pub const OCCUPIED: u32 = 1;
    /// Bit set when the hover outline is shown.
    pub const OUTLINED: u32 = 1 << 1;
    /// Bit set for the staged cell.
    pub const TENTATIVE: u32 = 1 << 2;
    /// Bit set when the block is flipped.
    pub const FLIPPED: u32 = 1 << 3;

    /// Packs a visual into instance data.
    pub fn new(visual: &CellVisual) -> Self {
        let mut flags = 0;
        if visual.kind == CellKind::Occupied {
            flags |= Self::OCCUPIED;
        }
        if visual.outlined {
            flags |= Self::OUTLINED;
        }
        if visual.tentative {
            flags |= Self::TENTATIVE;
        }
        if visual.orientation.flip() {
            flags |= Self::FLIPPED;
        }
        CellInstance {
            x: visual.cell.x,
            y: visual.cell.y,
            z: visual.cell.z,
            ticks: visual.orientation.ticks() as u32,
            flags,
        }
    }

    /// The packed flag bits.
    pub fn flags(&self) -> u32 {
        self.flags
    }
}

/// A read-only copy of everything the renderer needs for one frame.
#[derive(Clone, Debug, Default)]
pub struct BoardSnapshot {
    /// Every placed block.
    pub occupied: Vec<CellVisual>,
    /// Every open slot.
    pub candidates: Vec<CellVisual>,
}

impl BoardSnapshot {
    /// The visual for `cell`, if it is occupied or a candidate.
    pub fn visual_at(&self, cell: Cell) -> Option<&CellVisual> {
        self.occupied
            .iter()
            .chain(self.candidates.iter())
            .find(|visual| visual.cell == cell)
    }

    /// Visible cells packed for instanced drawing, outlines included.
    pub fn instances(&self) -> Vec<CellInstance> {
        self.occupied
            .iter()
            .chain(self.candidates.iter())
            .filter(|visual| visual.visible || visual.outlined)
            .map(CellInstance::new)
            .collect()
    }
}

/// Per-cell visual flags, kept in sync with the core's signals.
#[derive(Default)]
pub struct VisualState {
    visuals: HashMap<Cell, CellVisual>,
}

impl VisualState {
    /// Creates an empty state. It fills in on the first [`CellVisuals::rebuild`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The visual for `cell`, if it is occupied or a candidate.
    pub fn get(&self, cell: Cell) -> Option<&CellVisual> {
        self.visuals.get(&cell)
    }

    /// Copies the current flags into a snapshot, both lists in key order.
    pub fn snapshot(&self, store: &LatticeStore) -> BoardSnapshot {
        let lookup = |cell: Cell, fallback: fn(Cell) -> CellVisual| {
            self.visuals.get(&cell).copied().unwrap_or_else(|| fallback(cell))
        };
        BoardSnapshot {
            occupied: store
                .occupied_cells()
                .map(|cell| lookup(cell, CellVisual::occupied))
                .collect(),
            candidates: store
                .candidate_cells()
                .map(|cell| lookup(cell, CellVisual::candidate))
                .collect(),
        }
    }

    fn entry(&mut self, cell: Cell) -> Option<&mut CellVisual> {
        let visual = self.visuals.get_mut(&cell);
        if visual.is_none() {
            debug!("No visual proxy for {cell}");
        }
        visual
    }
}

impl CellVisuals for VisualState {
    fn set_outlined(&mut self, cell: Cell, outlined: bool) {
        if let Some(visual) = self.entry(cell) {
            visual.outlined = outlined;
        }
    }

    fn set_tentative(&mut self, cell: Cell, tentative: bool) {
        if let Some(visual) = self.entry(cell) {
            if visual.kind == CellKind::Candidate {
                visual.tentative = tentative;
                visual.visible = tentative;
            }
        }
    }

    fn set_orientation(&mut self, cell: Cell, orientation: Orientation) {
        if let Some(visual) = self.entry(cell) {
            visual.orientation = orientation;
        }
    }

    fn rebuild(&mut self, store: &LatticeStore) {
        let mut visuals = HashMap::with_capacity(store.occupied_count() + store.candidate_count());
        // Placed blocks keep the pose they were committed with.
        for cell in store.occupied_cells() {
            let mut visual = CellVisual::occupied(cell);
            if let Some(previous) = self.visuals.get(&cell) {
                visual.orientation = previous.orientation;
            }
            visuals.insert(cell, visual);
        }
        for cell in store.candidate_cells() {
            visuals.insert(cell, CellVisual::candidate(cell));
        }
        debug!("Rebuilt {} visual proxies", visuals.len());
        self.visuals = visuals;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle_state::lattice::cell::LatticeBounds;

    fn store() -> LatticeStore {
        let mut store = LatticeStore::new(LatticeBounds::new(3).unwrap(), 1);
        store.initialize_base().unwrap();
        store.recompute_candidates();
        store
    }

    #[test]
    fn rebuild_covers_occupied_and_candidates() {
        let store = store();
        let mut visuals = VisualState::new();
        visuals.rebuild(&store);
        let snapshot = visuals.snapshot(&store);
        assert_eq!(snapshot.occupied.len(), store.occupied_count());
        assert_eq!(snapshot.candidates.len(), store.candidate_count());
        assert!(snapshot.occupied.iter().all(|v| v.visible));
        assert!(snapshot.candidates.iter().all(|v| !v.visible && !v.tentative));
    }

    #[test]
    fn tentative_candidate_becomes_visible() {
        let store = store();
        let mut visuals = VisualState::new();
        visuals.rebuild(&store);
        let cell = Cell::new(1, 1, 0);
        visuals.set_tentative(cell, true);
        visuals.set_orientation(cell, Orientation::new(2, true));
        let visual = visuals.get(cell).unwrap();
        assert!(visual.visible && visual.tentative);

        let instance = CellInstance::new(visual);
        assert_eq!(instance.flags(), CellInstance::TENTATIVE | CellInstance::FLIPPED);
        assert_eq!(bytemuck::bytes_of(&instance).len(), 20);
    }

    #[test]
    fn occupied_cells_ignore_tentative() {
        let store = store();
        let mut visuals = VisualState::new();
        visuals.rebuild(&store);
        visuals.set_tentative(Cell::new(1, 0, 0), true);
        assert!(!visuals.get(Cell::new(1, 0, 0)).unwrap().tentative);
    }

    #[test]
    fn committed_pose_survives_rebuild() {
        let mut store = store();
        let mut visuals = VisualState::new();
        visuals.rebuild(&store);
        let cell = Cell::new(1, 1, 0);
        visuals.set_orientation(cell, Orientation::new(4, false));
        store.commit_placement(cell).unwrap();
        store.recompute_candidates();
        visuals.rebuild(&store);
        let visual = visuals.get(cell).unwrap();
        assert_eq!(visual.kind, CellKind::Occupied);
        assert_eq!(visual.orientation, Orientation::new(4, false));
    }

    #[test]
    fn unknown_cells_are_ignored() {
        let mut visuals = VisualState::new();
        visuals.set_outlined(Cell::new(0, 0, 0), true);
        assert!(visuals.get(Cell::new(0, 0, 0)).is_none());
    }
}
