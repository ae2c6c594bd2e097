//! # Picking Module
//!
//! Resolves a pointer ray to the candidate cell under it.
//!
//! The board is drawn rotated so the lattice's (1,1,1) diagonal points up.
//! [`BoardTransform`] holds that rotation. [`CandidatePicker`] brings each ray into
//! lattice space and tests it against a unit cube per candidate. The nearest hit wins.
//!
//! Hits are resolved through a flat handle table built from the candidate set, so
//! turning a hit into a [`Cell`] is a single index.

use cgmath::{InnerSpace, Point3, Quaternion, Rotation, Vector3};
use log::debug;

use super::lattice::cell::Cell;
use super::lattice::store::LatticeStore;

/// Directions closer to zero than this are treated as parallel to a slab.
const PARALLEL_EPSILON: f32 = 1e-7;

/// A half-line in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// Start of the ray.
    pub origin: Point3<f32>,
    /// Unit direction of travel.
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Creates a ray, normalising `direction`.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Ray {
            origin,
            direction: direction.normalize(),
        }
    }

    /// The point `t` units along the ray.
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

/// Hit-test capability consumed by the core: the nearest candidate cell a ray hits.
pub trait RayHitTest {
    /// The nearest candidate cell along `ray`, if any.
    fn hit_test(&self, ray: &Ray) -> Option<Cell>;
}

/// Placement of the lattice in the world.
#[derive(Copy, Clone, Debug)]
pub struct BoardTransform {
    rotation: Quaternion<f32>,
}

impl Default for BoardTransform {
    /// Stands the lattice on its (1,1,1) diagonal.
    fn default() -> Self {
        let diagonal = Vector3::new(1.0, 1.0, 1.0).normalize();
        BoardTransform {
            rotation: Quaternion::between_vectors(diagonal, Vector3::unit_y()),
        }
    }
}

impl BoardTransform {
    /// A transform that leaves lattice and world space aligned.
    pub fn identity() -> Self {
        BoardTransform {
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }

    /// The lattice-to-world rotation.
    pub fn rotation(&self) -> Quaternion<f32> {
        self.rotation
    }

    /// World position of a cell's centre.
    pub fn cell_to_world(&self, cell: Cell) -> Point3<f32> {
        let center = cell.center();
        Point3::new(0.0, 0.0, 0.0)
            + self
                .rotation
                .rotate_vector(Vector3::new(center.x, center.y, center.z))
    }

    /// Expresses a world-space ray in lattice space.
    pub fn ray_to_lattice(&self, ray: &Ray) -> Ray {
        let inverse = self.rotation.invert();
        let origin = inverse.rotate_vector(Vector3::new(ray.origin.x, ray.origin.y, ray.origin.z));
        Ray {
            origin: Point3::new(origin.x, origin.y, origin.z),
            direction: inverse.rotate_vector(ray.direction),
        }
    }
}

/// Index into a [`CandidatePicker`]'s handle table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HitHandle(pub u32);

/// Ray-casts against the candidate cells of a [`LatticeStore`].
pub struct CandidatePicker {
    transform: BoardTransform,
    handles: Vec<Cell>,
    /// Store revision the handle table was built from.
    revision: Option<u64>,
}

impl CandidatePicker {
    /// Creates a picker with an empty handle table.
    pub fn new(transform: BoardTransform) -> Self {
        CandidatePicker {
            transform,
            handles: Vec::new(),
            revision: None,
        }
    }

    /// The board placement this picker tests against.
    pub fn transform(&self) -> &BoardTransform {
        &self.transform
    }

    /// Rebuilds the handle table if the store's candidates changed since the last call.
    ///
    /// # Returns
    /// `true` if the table was rebuilt.
    pub fn refresh(&mut self, store: &LatticeStore) -> bool {
        if self.revision == Some(store.revision()) {
            return false;
        }
        self.handles.clear();
        self.handles.extend(store.candidate_cells());
        self.revision = Some(store.revision());
        debug!("Picker tracking {} candidates", self.handles.len());
        true
    }

    /// The cell behind `handle`.
    pub fn cell_for(&self, handle: HitHandle) -> Option<Cell> {
        self.handles.get(handle.0 as usize).copied()
    }

    /// The nearest handle hit by `ray` and the distance to it.
    pub fn pick_handle(&self, ray: &Ray) -> Option<(HitHandle, f32)> {
        let local = self.transform.ray_to_lattice(ray);
        self.handles
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| {
                intersect_unit_cube(&local, cell.center()).map(|t| (HitHandle(index as u32), t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

impl RayHitTest for CandidatePicker {
    fn hit_test(&self, ray: &Ray) -> Option<Cell> {
        self.pick_handle(ray)
            .and_then(|(handle, _)| self.cell_for(handle))
    }
}

/// Slab test against the unit cube centred on `center`.
///
/// # Returns
/// Distance along the ray to the entry point, or `0.0` if the ray starts inside.
fn intersect_unit_cube(ray: &Ray, center: Point3<f32>) -> Option<f32> {
    let mut t_min = 0.0_f32;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let origin = ray.origin[axis];
        let direction = ray.direction[axis];
        let low = center[axis] - 0.5;
        let high = center[axis] + 0.5;

        if direction.abs() < PARALLEL_EPSILON {
            if origin < low || origin > high {
                return None;
            }
            continue;
        }

        let inverse = 1.0 / direction;
        let (near, far) = {
            let a = (low - origin) * inverse;
            let b = (high - origin) * inverse;
            if a <= b { (a, b) } else { (b, a) }
        };
        t_min = t_min.max(near);
        t_max = t_max.min(far);
        if t_min > t_max {
            return None;
        }
    }
    Some(t_min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle_state::lattice::cell::LatticeBounds;

    fn store() -> LatticeStore {
        let mut store = LatticeStore::new(LatticeBounds::new(4).unwrap(), 1);
        store.initialize_base().unwrap();
        store.recompute_candidates();
        store
    }

    #[test]
    fn slab_hit_and_miss() {
        let ray = Ray::new(Point3::new(-5.0, 0.0, 0.0), Vector3::unit_x());
        assert_eq!(intersect_unit_cube(&ray, Point3::new(0.0, 0.0, 0.0)), Some(4.5));
        assert_eq!(intersect_unit_cube(&ray, Point3::new(0.0, 2.0, 0.0)), None);
        // Behind the origin.
        assert_eq!(intersect_unit_cube(&ray, Point3::new(-8.0, 0.0, 0.0)), None);
    }

    #[test]
    fn picks_nearest_candidate_in_lattice_space() {
        let store = store();
        let mut picker = CandidatePicker::new(BoardTransform::identity());
        assert!(picker.refresh(&store));
        let ray = Ray::new(Point3::new(10.0, 1.0, 0.0), -Vector3::unit_x());
        assert_eq!(picker.hit_test(&ray), Some(Cell::new(1, 1, 0)));
    }

    #[test]
    fn looking_down_the_board_hits_the_cell_below() {
        let store = store();
        let mut picker = CandidatePicker::new(BoardTransform::default());
        picker.refresh(&store);
        let target = Cell::new(1, 0, 1);
        let above = picker.transform().cell_to_world(target) + Vector3::unit_y() * 50.0;
        let ray = Ray::new(above, -Vector3::unit_y());
        assert_eq!(picker.hit_test(&ray), Some(target));
    }

    #[test]
    fn board_transform_stands_diagonal_upright() {
        let transform = BoardTransform::default();
        let top = transform.cell_to_world(Cell::new(1, 1, 1));
        assert!((top.x).abs() < 1e-5 && (top.z).abs() < 1e-5);
        assert!((top.y - 3.0_f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn ray_pointing_away_misses() {
        let store = store();
        let mut picker = CandidatePicker::new(BoardTransform::default());
        picker.refresh(&store);
        let ray = Ray::new(Point3::new(0.0, 50.0, 0.0), Vector3::unit_y());
        assert_eq!(picker.hit_test(&ray), None);
    }

    #[test]
    fn refresh_only_rebuilds_on_new_revision() {
        let mut store = store();
        let mut picker = CandidatePicker::new(BoardTransform::default());
        assert!(picker.refresh(&store));
        assert!(!picker.refresh(&store));

        store.commit_placement(Cell::new(1, 1, 0)).unwrap();
        store.recompute_candidates();
        assert!(picker.refresh(&store));
        let tracked: Vec<Cell> = (0..store.candidate_count() as u32)
            .filter_map(|i| picker.cell_for(HitHandle(i)))
            .collect();
        assert!(!tracked.contains(&Cell::new(1, 1, 0)));
        assert_eq!(tracked.len(), store.candidate_count());
    }
}
