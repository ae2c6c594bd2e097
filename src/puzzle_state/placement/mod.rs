//! # Placement Session
//!
//! The transient interaction state in front of the lattice store: which candidate is
//! hovered, which one is staged for commit, and the pose the staged block will take.
//!
//! ## State Machine
//!
//! ```text
//! Idle     --hit found-------------------> Hovering
//! Hovering --hit cleared-----------------> Idle
//! Hovering --click on hovered cell-------> Selected
//! Selected --click on another cell-------> Selected (re-target)
//! Selected --click with no hover---------> Idle
//! Selected --click on the selected cell--> Idle (commit, after recompute)
//! Selected --commit action---------------> Idle (after recompute)
//! ```
//!
//! Hover and selection are independent: a selected cell stays staged while the
//! pointer wanders, and confirming takes a second click on it.
//!
//! The session only reads the candidate set. Commits are delegated to the
//! [`LatticeStore`].

use log::{debug, info, warn};

use crate::error::PlacementError;

use super::lattice::cell::{Cell, CellKey};
use super::lattice::store::LatticeStore;
use super::visuals::CellVisuals;
use orientation::Orientation;

pub mod orientation;

/// Coarse view of where the session is in its state machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing hovered or selected.
    Idle,
    /// A candidate is hovered and nothing is selected.
    Hovering,
    /// A candidate is staged for commit.
    Selected,
}

/// What a click did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing was hovered; any selection was dropped.
    Cleared,
    /// The hovered cell is now the staged placement.
    Selected(Cell),
    /// The staged cell was confirmed and placed.
    Committed(Cell),
}

/// Hover, selection and orientation for one player.
#[derive(Debug, Default)]
pub struct PlacementSession {
    hovered: Option<CellKey>,
    selected: Option<CellKey>,
    orientation: Orientation,
}

impl PlacementSession {
    /// Creates a session with nothing hovered or selected and the neutral pose.
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of the hovered cell.
    pub fn hovered(&self) -> Option<CellKey> {
        self.hovered
    }

    /// Key of the staged cell.
    pub fn selected(&self) -> Option<CellKey> {
        self.selected
    }

    /// The pose applied to the hovered and staged blocks.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Where the session is in its state machine.
    pub fn phase(&self) -> SessionPhase {
        match (self.hovered, self.selected) {
            (_, Some(_)) => SessionPhase::Selected,
            (Some(_), None) => SessionPhase::Hovering,
            (None, None) => SessionPhase::Idle,
        }
    }

    /// Moves hover to `hit`, or clears it when `hit` is `None`.
    ///
    /// A hit that is not a current candidate counts as a miss. Repeating the current
    /// hover is a no-op. Otherwise the old cell loses its outline (and its pose,
    /// unless it is staged) and the new cell gains both.
    pub fn update_hover(
        &mut self,
        store: &LatticeStore,
        hit: Option<Cell>,
        visuals: &mut impl CellVisuals,
    ) {
        let bounds = store.bounds();
        let next = hit
            .and_then(|cell| bounds.key_of(cell))
            .filter(|key| store.is_candidate_key(*key));
        if next == self.hovered {
            return;
        }

        if let Some(cell) = self.hovered.and_then(|key| bounds.cell_of(key)) {
            visuals.set_outlined(cell, false);
            if self.hovered != self.selected {
                visuals.set_orientation(cell, Orientation::NEUTRAL);
            }
        }
        if let Some(cell) = next.and_then(|key| bounds.cell_of(key)) {
            visuals.set_outlined(cell, true);
            visuals.set_orientation(cell, self.orientation);
            debug!("Hovering {cell}");
        } else {
            debug!("Hover cleared");
        }
        self.hovered = next;
    }

    /// Stages `cell` for commit, replacing any earlier selection.
    ///
    /// # Errors
    /// [`PlacementError::InvalidPlacement`] if `cell` is not a current candidate;
    /// the existing selection is kept.
    pub fn select(
        &mut self,
        store: &LatticeStore,
        cell: Cell,
        visuals: &mut impl CellVisuals,
    ) -> Result<(), PlacementError> {
        let key = store
            .check_placement(cell)
            .inspect_err(|err| warn!("Cannot select: {err}"))?;
        if self.selected == Some(key) {
            return Ok(());
        }

        self.clear_selection(store, visuals);
        visuals.set_tentative(cell, true);
        visuals.set_orientation(cell, self.orientation);
        self.selected = Some(key);
        debug!("Selected {cell}");
        Ok(())
    }

    /// Drops the staged placement, if any.
    pub fn clear_selection(&mut self, store: &LatticeStore, visuals: &mut impl CellVisuals) {
        let Some(key) = self.selected.take() else {
            return;
        };
        if let Some(cell) = store.bounds().cell_of(key) {
            visuals.set_tentative(cell, false);
            if self.hovered != Some(key) {
                visuals.set_orientation(cell, Orientation::NEUTRAL);
            }
            debug!("Unselected {cell}");
        }
    }

    /// Sets the pose to `ticks mod 6` and `flip`, and applies it to the staged and
    /// hovered cells straight away.
    pub fn set_orientation(
        &mut self,
        store: &LatticeStore,
        ticks: i32,
        flip: bool,
        visuals: &mut impl CellVisuals,
    ) {
        self.apply_orientation(store, Orientation::new(ticks, flip), visuals);
    }

    /// One tick clockwise.
    pub fn rotate_clockwise(&mut self, store: &LatticeStore, visuals: &mut impl CellVisuals) {
        self.apply_orientation(store, self.orientation.rotated_clockwise(), visuals);
    }

    /// One tick counter-clockwise.
    pub fn rotate_counter_clockwise(&mut self, store: &LatticeStore, visuals: &mut impl CellVisuals) {
        self.apply_orientation(store, self.orientation.rotated_counter_clockwise(), visuals);
    }

    /// Toggles the flip.
    pub fn toggle_flip(&mut self, store: &LatticeStore, visuals: &mut impl CellVisuals) {
        self.apply_orientation(store, self.orientation.flipped(), visuals);
    }

    fn apply_orientation(
        &mut self,
        store: &LatticeStore,
        orientation: Orientation,
        visuals: &mut impl CellVisuals,
    ) {
        self.orientation = orientation;
        let bounds = store.bounds();
        let mut targets = [self.selected, self.hovered];
        if targets[0] == targets[1] {
            targets[1] = None;
        }
        for cell in targets.into_iter().flatten().filter_map(|key| bounds.cell_of(key)) {
            visuals.set_orientation(cell, orientation);
        }
        debug!("Orientation {} flip {}", orientation.ticks(), orientation.flip());
    }

    /// Places the staged block.
    ///
    /// Delegates to [`LatticeStore::commit_placement`], recomputes candidates, then
    /// clears hover and selection (their cells are no longer candidates) and has the
    /// presentation layer rebuild from the new sets.
    ///
    /// # Errors
    /// - [`PlacementError::NoSelection`] if nothing is staged
    /// - [`PlacementError::StaleSelection`] if the staged cell stopped being a
    ///   candidate; the selection is dropped
    /// - [`PlacementError::InvalidPlacement`] if the store rejects the cell
    pub fn commit(
        &mut self,
        store: &mut LatticeStore,
        visuals: &mut impl CellVisuals,
    ) -> Result<Cell, PlacementError> {
        let Some(key) = self.selected else {
            warn!("{}", PlacementError::NoSelection);
            return Err(PlacementError::NoSelection);
        };
        let Some(cell) = store.bounds().cell_of(key) else {
            self.selected = None;
            return Err(PlacementError::NoSelection);
        };
        if !store.is_candidate_key(key) {
            let err = PlacementError::StaleSelection { cell };
            warn!("{err}");
            self.clear_selection(store, visuals);
            return Err(err);
        }

        visuals.set_orientation(cell, self.orientation);
        store.commit_placement(cell)?;
        store.recompute_candidates();
        self.selected = None;
        self.hovered = None;
        visuals.rebuild(store);
        info!(
            "Committed {cell} with orientation {} flip {}",
            self.orientation.ticks(),
            self.orientation.flip()
        );
        Ok(cell)
    }

    /// The two-click flow: a click with no hover clears the selection, a click on
    /// the staged cell commits it, and any other click stages the hovered cell.
    pub fn click(
        &mut self,
        store: &mut LatticeStore,
        visuals: &mut impl CellVisuals,
    ) -> Result<ClickOutcome, PlacementError> {
        let Some(hovered) = self.hovered else {
            self.clear_selection(store, visuals);
            return Ok(ClickOutcome::Cleared);
        };
        if self.selected == Some(hovered) {
            return self.commit(store, visuals).map(ClickOutcome::Committed);
        }
        let Some(cell) = store.bounds().cell_of(hovered) else {
            self.hovered = None;
            return Ok(ClickOutcome::Cleared);
        };
        self.select(store, cell, visuals)?;
        Ok(ClickOutcome::Selected(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle_state::lattice::cell::LatticeBounds;

    /// Records every signal so tests can check what the presentation layer was told.
    #[derive(Default)]
    struct Recorder {
        outlined: Vec<(Cell, bool)>,
        tentative: Vec<(Cell, bool)>,
        orientation: Vec<(Cell, Orientation)>,
        rebuilds: usize,
    }

    impl CellVisuals for Recorder {
        fn set_outlined(&mut self, cell: Cell, outlined: bool) {
            self.outlined.push((cell, outlined));
        }
        fn set_tentative(&mut self, cell: Cell, tentative: bool) {
            self.tentative.push((cell, tentative));
        }
        fn set_orientation(&mut self, cell: Cell, orientation: Orientation) {
            self.orientation.push((cell, orientation));
        }
        fn rebuild(&mut self, _store: &LatticeStore) {
            self.rebuilds += 1;
        }
    }

    const A: Cell = Cell::new(1, 1, 0);
    const B: Cell = Cell::new(1, 0, 1);

    fn setup() -> (LatticeStore, PlacementSession, Recorder) {
        let mut store = LatticeStore::new(LatticeBounds::new(4).unwrap(), 1);
        store.initialize_base().unwrap();
        store.recompute_candidates();
        (store, PlacementSession::new(), Recorder::default())
    }

    fn key(store: &LatticeStore, cell: Cell) -> Option<CellKey> {
        store.bounds().key_of(cell)
    }

    #[test]
    fn starts_idle() {
        let session = PlacementSession::new();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.orientation(), Orientation::NEUTRAL);
    }

    #[test]
    fn hover_outlines_and_poses_new_cell() {
        let (store, mut session, mut rec) = setup();
        session.set_orientation(&store, 2, true, &mut rec);
        session.update_hover(&store, Some(A), &mut rec);
        assert_eq!(session.hovered(), key(&store, A));
        assert_eq!(session.phase(), SessionPhase::Hovering);
        assert_eq!(rec.outlined, vec![(A, true)]);
        assert_eq!(rec.orientation.last(), Some(&(A, Orientation::new(2, true))));
    }

    #[test]
    fn repeated_hover_is_idempotent() {
        let (store, mut session, mut rec) = setup();
        session.update_hover(&store, Some(A), &mut rec);
        let signals = rec.outlined.len();
        session.update_hover(&store, Some(A), &mut rec);
        assert_eq!(rec.outlined.len(), signals);
    }

    #[test]
    fn moving_hover_resets_old_cell() {
        let (store, mut session, mut rec) = setup();
        session.update_hover(&store, Some(A), &mut rec);
        session.update_hover(&store, Some(B), &mut rec);
        assert!(rec.outlined.contains(&(A, false)));
        assert!(rec.orientation.contains(&(A, Orientation::NEUTRAL)));
        assert_eq!(rec.outlined.last(), Some(&(B, true)));

        session.update_hover(&store, None, &mut rec);
        assert_eq!(session.hovered(), None);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(rec.outlined.last(), Some(&(B, false)));
    }

    #[test]
    fn hits_outside_candidates_are_misses() {
        let (store, mut session, mut rec) = setup();
        session.update_hover(&store, Some(Cell::new(1, 0, 0)), &mut rec);
        assert_eq!(session.hovered(), None);
        session.update_hover(&store, Some(Cell::new(40, 0, 0)), &mut rec);
        assert_eq!(session.hovered(), None);
        assert!(rec.outlined.is_empty());
    }

    #[test]
    fn click_selects_then_retargets_then_clears() {
        let (mut store, mut session, mut rec) = setup();
        session.update_hover(&store, Some(A), &mut rec);
        assert_eq!(session.click(&mut store, &mut rec), Ok(ClickOutcome::Selected(A)));
        assert_eq!(session.phase(), SessionPhase::Selected);

        session.update_hover(&store, Some(B), &mut rec);
        assert_eq!(session.click(&mut store, &mut rec), Ok(ClickOutcome::Selected(B)));
        assert_eq!(session.selected(), key(&store, B));
        assert!(rec.tentative.contains(&(A, false)));

        session.update_hover(&store, None, &mut rec);
        assert_eq!(session.click(&mut store, &mut rec), Ok(ClickOutcome::Cleared));
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(rec.tentative.last(), Some(&(B, false)));
    }

    #[test]
    fn second_click_on_selection_commits() {
        let (mut store, mut session, mut rec) = setup();
        session.update_hover(&store, Some(A), &mut rec);
        session.click(&mut store, &mut rec).unwrap();
        assert_eq!(session.click(&mut store, &mut rec), Ok(ClickOutcome::Committed(A)));
        assert!(store.is_occupied(A));
        assert_eq!(session.hovered(), None);
        assert_eq!(session.selected(), None);
        assert_eq!(rec.rebuilds, 1);
    }

    #[test]
    fn selection_keeps_pose_when_hover_leaves() {
        let (mut store, mut session, mut rec) = setup();
        session.set_orientation(&store, 3, false, &mut rec);
        session.update_hover(&store, Some(A), &mut rec);
        session.click(&mut store, &mut rec).unwrap();
        rec.orientation.clear();
        session.update_hover(&store, Some(B), &mut rec);
        assert!(!rec.orientation.contains(&(A, Orientation::NEUTRAL)));
    }

    #[test]
    fn orientation_applies_to_selected_and_hovered() {
        let (mut store, mut session, mut rec) = setup();
        session.update_hover(&store, Some(A), &mut rec);
        session.click(&mut store, &mut rec).unwrap();
        session.update_hover(&store, Some(B), &mut rec);
        rec.orientation.clear();

        session.rotate_counter_clockwise(&store, &mut rec);
        let expected = Orientation::new(5, false);
        assert_eq!(session.orientation(), expected);
        assert_eq!(rec.orientation, vec![(A, expected), (B, expected)]);

        session.toggle_flip(&store, &mut rec);
        session.rotate_clockwise(&store, &mut rec);
        assert_eq!(session.orientation(), Orientation::new(0, true));
    }

    #[test]
    fn orientation_persists_across_hover_changes() {
        let (store, mut session, mut rec) = setup();
        session.set_orientation(&store, -2, true, &mut rec);
        session.update_hover(&store, Some(A), &mut rec);
        session.update_hover(&store, None, &mut rec);
        assert_eq!(session.orientation(), Orientation::new(4, true));
    }

    #[test]
    fn select_rejects_non_candidates() {
        let (store, mut session, mut rec) = setup();
        let err = session.select(&store, Cell::new(1, 1, 1), &mut rec).unwrap_err();
        assert!(matches!(err, PlacementError::InvalidPlacement { .. }));
        assert_eq!(session.selected(), None);
        assert!(rec.tentative.is_empty());
    }

    #[test]
    fn commit_without_selection_fails() {
        let (mut store, mut session, mut rec) = setup();
        let before = store.occupied_count();
        assert_eq!(session.commit(&mut store, &mut rec), Err(PlacementError::NoSelection));
        assert_eq!(store.occupied_count(), before);
    }

    #[test]
    fn stale_selection_is_dropped() {
        let (mut store, mut session, mut rec) = setup();
        session.select(&store, A, &mut rec).unwrap();
        // Another caller commits the same cell behind the session's back.
        store.commit_placement(A).unwrap();
        store.recompute_candidates();
        assert_eq!(
            session.commit(&mut store, &mut rec),
            Err(PlacementError::StaleSelection { cell: A })
        );
        assert_eq!(session.selected(), None);
    }
}
