//! # Lattice
//!
//! The bounded cubic lattice blocks are stacked on.
//!
//! * **Cell**: integer positions, the dense [`CellKey`](cell::CellKey) codec and the
//!   [`LatticeBounds`](cell::LatticeBounds) they live in
//! * **Store**: the [`LatticeStore`](store::LatticeStore), owner of the occupied and
//!   candidate sets
//!
//! ## Data Flow
//!
//! 1. The base layer is filled once when a session starts
//! 2. The candidate set is derived from the occupied set by a full sweep
//! 3. A commit moves one candidate into the occupied set
//! 4. The caller recomputes candidates and the presentation layer re-derives its visuals

pub mod cell;
pub mod store;
