//! # Puzzle State Module
//!
//! The core of the stacking puzzle: where blocks are, where they may go next, and
//! what the player is pointing at.
//!
//! ## Key Components
//!
//! * `PuzzleSession` - The context object that owns one lattice store and one
//!   placement session and routes every input through them
//! * `lattice` - Cells, keys and the occupied/candidate sets
//! * `placement` - Hover, selection and orientation
//! * `picking` - Ray hit-testing against candidate cells
//! * `visuals` - The per-cell visual proxy the presentation layer implements
//! * `camera_state` - Turns pointer positions into rays
//!
//! ## Event Model
//!
//! Everything runs synchronously on the thread that receives input. Each operation
//! finishes (including any candidate recomputation) before the next event is handled,
//! so hover and selection logic always sees the candidate set of the latest commit.

use log::{debug, info};

use crate::config::PuzzleConfig;
use crate::error::{ConfigError, PlacementError};
use lattice::cell::{Cell, LatticeBounds};
use lattice::store::LatticeStore;
use picking::{Ray, RayHitTest};
use placement::{ClickOutcome, PlacementSession};
use visuals::{BoardSnapshot, CellVisuals, VisualState};

pub mod camera_state;
pub mod lattice;
pub mod picking;
pub mod placement;
pub mod visuals;

/// Discrete actions the input layer can deliver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PuzzleAction {
    /// Turn the pending block one tick clockwise.
    RotateClockwise,
    /// Turn the pending block one tick counter-clockwise.
    RotateCounterClockwise,
    /// Flip the pending block along the board diagonal.
    ToggleFlip,
    /// Select the hovered cell, confirm it if already selected, or clear the selection.
    Click,
    /// Place the selected block.
    Commit,
}

/// One puzzle in progress.
///
/// Owns the [`LatticeStore`], the [`PlacementSession`] and the presentation layer's
/// [`CellVisuals`]. Event handlers get it passed in; there is no global state.
pub struct PuzzleSession<V: CellVisuals = VisualState> {
    store: LatticeStore,
    placement: PlacementSession,
    visuals: V,
}

impl<V: CellVisuals> PuzzleSession<V> {
    /// Starts a session: fills the base layer, computes the first candidates and
    /// builds the initial visuals.
    pub fn new(bounds: LatticeBounds, base_layer: i32, mut visuals: V) -> Self {
        let mut store = LatticeStore::new(bounds, base_layer);
        // A fresh store has nothing occupied, so the base fill cannot collide.
        let _ = store.initialize_base();
        store.recompute_candidates();
        visuals.rebuild(&store);
        info!(
            "Board initialised: half extent {}, {} blocks, {} open slots",
            bounds.half_extent(),
            store.occupied_count(),
            store.candidate_count()
        );
        PuzzleSession {
            store,
            placement: PlacementSession::new(),
            visuals,
        }
    }

    /// Starts a session sized by `config`.
    pub fn from_config(config: &PuzzleConfig, visuals: V) -> Result<Self, ConfigError> {
        Ok(Self::new(config.bounds()?, config.base_layer, visuals))
    }

    /// Read access to the occupied and candidate sets.
    pub fn store(&self) -> &LatticeStore {
        &self.store
    }

    /// Read access to hover, selection and orientation.
    pub fn placement(&self) -> &PlacementSession {
        &self.placement
    }

    /// The presentation layer's visuals.
    pub fn visuals(&self) -> &V {
        &self.visuals
    }

    /// The hovered cell.
    pub fn hovered_cell(&self) -> Option<Cell> {
        self.placement
            .hovered()
            .and_then(|key| self.store.bounds().cell_of(key))
    }

    /// The staged cell.
    pub fn selected_cell(&self) -> Option<Cell> {
        self.placement
            .selected()
            .and_then(|key| self.store.bounds().cell_of(key))
    }

    /// Moves hover to `hit` (or clears it).
    pub fn hover(&mut self, hit: Option<Cell>) {
        self.placement
            .update_hover(&self.store, hit, &mut self.visuals);
    }

    /// Hit-tests `ray` with `picker` and moves hover to the result.
    pub fn hover_ray(&mut self, ray: &Ray, picker: &impl RayHitTest) {
        let hit = picker.hit_test(ray);
        self.hover(hit);
    }

    /// Stages `cell` for commit.
    pub fn select(&mut self, cell: Cell) -> Result<(), PlacementError> {
        self.placement.select(&self.store, cell, &mut self.visuals)
    }

    /// Drops the staged cell.
    pub fn clear_selection(&mut self) {
        self.placement
            .clear_selection(&self.store, &mut self.visuals);
    }

    /// Sets the pending pose to `ticks mod 6` and `flip`.
    pub fn set_orientation(&mut self, ticks: i32, flip: bool) {
        self.placement
            .set_orientation(&self.store, ticks, flip, &mut self.visuals);
    }

    /// Places the staged block and recomputes candidates.
    pub fn commit(&mut self) -> Result<Cell, PlacementError> {
        let started = web_time::Instant::now();
        let cell = self.placement.commit(&mut self.store, &mut self.visuals)?;
        debug!("Commit and recompute took {:?}", started.elapsed());
        Ok(cell)
    }

    /// The two-click flow; see [`PlacementSession::click`].
    pub fn click(&mut self) -> Result<ClickOutcome, PlacementError> {
        let outcome = self.placement.click(&mut self.store, &mut self.visuals)?;
        debug!("Click: {outcome:?}");
        Ok(outcome)
    }

    /// Routes one input action.
    ///
    /// # Returns
    /// The cell placed by this action, if it placed one.
    pub fn apply(&mut self, action: PuzzleAction) -> Result<Option<Cell>, PlacementError> {
        match action {
            PuzzleAction::RotateClockwise => {
                self.placement
                    .rotate_clockwise(&self.store, &mut self.visuals);
            }
            PuzzleAction::RotateCounterClockwise => {
                self.placement
                    .rotate_counter_clockwise(&self.store, &mut self.visuals);
            }
            PuzzleAction::ToggleFlip => {
                self.placement
                    .toggle_flip(&self.store, &mut self.visuals);
            }
            PuzzleAction::Click => {
                if let ClickOutcome::Committed(cell) = self.click()? {
                    return Ok(Some(cell));
                }
            }
            PuzzleAction::Commit => return self.commit().map(Some),
        }
        Ok(None)
    }
}

impl PuzzleSession<VisualState> {
    /// Starts a session sized by `config` with the built-in [`VisualState`].
    pub fn with_default_visuals(config: &PuzzleConfig) -> Result<Self, ConfigError> {
        Self::from_config(config, VisualState::new())
    }

    /// Everything the renderer needs for the next frame.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.visuals.snapshot(&self.store)
    }
}
