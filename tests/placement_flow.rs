use stacking_puzzle::config::PuzzleConfig;
use stacking_puzzle::error::{InvalidPlacementReason, PlacementError};
use stacking_puzzle::puzzle_state::lattice::cell::{Cell, LatticeBounds};
use stacking_puzzle::puzzle_state::lattice::store::LatticeStore;
use stacking_puzzle::puzzle_state::placement::orientation::Orientation;
use stacking_puzzle::puzzle_state::placement::SessionPhase;
use stacking_puzzle::puzzle_state::{PuzzleAction, PuzzleSession};

fn session() -> PuzzleSession {
    PuzzleSession::with_default_visuals(&PuzzleConfig::default()).unwrap()
}

fn place(session: &mut PuzzleSession, cell: Cell) {
    session.hover(Some(cell));
    assert_eq!(session.apply(PuzzleAction::Click), Ok(None));
    assert_eq!(session.apply(PuzzleAction::Click), Ok(Some(cell)));
}

#[test]
fn first_layer_scenario() {
    let mut session = session();
    let first = [Cell::new(1, 1, 0), Cell::new(1, 0, 1), Cell::new(0, 1, 1)];
    for cell in first {
        assert!(session.store().is_candidate(cell), "{cell} should be open");
    }
    let apex = Cell::new(1, 1, 1);
    assert!(!session.store().is_candidate(apex));

    session.set_orientation(2, true);
    session.select(first[0]).unwrap();
    assert_eq!(session.commit(), Ok(first[0]));

    let store = session.store();
    assert!(store.is_occupied(first[0]));
    assert!(!store.is_candidate(first[0]));
    assert!(store.is_candidate(first[1]) && store.is_candidate(first[2]));
    assert!(!store.is_candidate(apex));

    let placed = *session.snapshot().visual_at(first[0]).unwrap();
    assert_eq!(placed.orientation, Orientation::new(2, true));

    place(&mut session, first[1]);
    assert!(!session.store().is_candidate(apex), "two of three supports is not enough");
    place(&mut session, first[2]);
    assert!(session.store().is_candidate(apex));
}

#[test]
fn commit_resets_hover_and_selection_but_keeps_orientation() {
    let mut session = session();
    let cell = Cell::new(0, 1, 1);
    session.hover(Some(cell));
    session.apply(PuzzleAction::RotateCounterClockwise).unwrap();
    session.apply(PuzzleAction::Click).unwrap();
    assert_eq!(session.placement().phase(), SessionPhase::Selected);

    session.apply(PuzzleAction::Commit).unwrap();
    assert_eq!(session.placement().phase(), SessionPhase::Idle);
    assert_eq!(session.hovered_cell(), None);
    assert_eq!(session.selected_cell(), None);
    assert_eq!(session.placement().orientation(), Orientation::new(5, false));
}

#[test]
fn rejected_commits_leave_the_board_alone() {
    let mut session = session();
    let occupied_before = session.store().occupied_count();

    assert_eq!(session.commit(), Err(PlacementError::NoSelection));

    let unsupported = Cell::new(1, 1, 1);
    assert_eq!(
        session.select(unsupported),
        Err(PlacementError::InvalidPlacement {
            cell: unsupported,
            reason: InvalidPlacementReason::Unsupported,
        })
    );
    let base = Cell::new(1, 0, 0);
    assert_eq!(
        session.select(base),
        Err(PlacementError::InvalidPlacement {
            cell: base,
            reason: InvalidPlacementReason::AlreadyOccupied,
        })
    );
    let outside = Cell::new(9, 0, 0);
    assert!(matches!(
        session.select(outside),
        Err(PlacementError::InvalidPlacement {
            reason: InvalidPlacementReason::OutOfBounds,
            ..
        })
    ));

    assert_eq!(session.store().occupied_count(), occupied_before);
    assert_eq!(session.placement().phase(), SessionPhase::Idle);
}

#[test]
fn base_fill_twice_is_rejected() {
    let mut store = LatticeStore::new(LatticeBounds::new(4).unwrap(), 1);
    let filled = store.initialize_base().unwrap();
    assert_eq!(store.occupied_count(), filled);
    assert!(matches!(
        store.initialize_base(),
        Err(PlacementError::DuplicateBaseFill { .. })
    ));
    assert_eq!(store.occupied_count(), filled);
}

#[test]
fn candidates_and_occupied_stay_disjoint() {
    let mut session = session();
    for _ in 0..20 {
        let Some(next) = session.store().candidate_cells().next() else {
            break;
        };
        session.select(next).unwrap();
        session.commit().unwrap();
        let store = session.store();
        assert!(store.candidate_cells().all(|cell| !store.is_occupied(cell)));
        assert!(store.candidate_cells().all(|cell| store.is_supported(cell)));
    }
}
