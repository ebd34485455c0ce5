#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure picking system that resolves world-space rays to the nearest cell.

use glam::{Vec2, Vec3};
use warehouse_grid_core::{CellCode, CellIndex};
use warehouse_grid_world::{query, Warehouse};

/// Half-line in world space with a unit-length direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    /// Creates a ray, returning `None` when the direction has no length.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        Some(Self { origin, direction })
    }

    /// Builds the ray passing through a point on the screen.
    ///
    /// `ndc` ranges over `-1.0..=1.0` on both axes with +Y pointing up. The
    /// camera looks from `eye` toward `target` with a vertical field of view
    /// of `fov_y` radians. Returns `None` for a degenerate camera, including
    /// one looking straight up or down.
    #[must_use]
    pub fn from_screen(ndc: Vec2, eye: Vec3, target: Vec3, fov_y: f32, aspect: f32) -> Option<Self> {
        let forward = (target - eye).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        if forward == Vec3::ZERO || right == Vec3::ZERO {
            return None;
        }
        let up = right.cross(forward);
        let half_height = (fov_y * 0.5).tan();
        let direction =
            forward + right * (ndc.x * half_height * aspect) + up * (ndc.y * half_height);
        Self::new(eye, direction)
    }

    /// Starting point of the ray.
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit direction of travel.
    #[must_use]
    pub const fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Distance along the ray at which it enters the box, if it does.
    ///
    /// An origin inside the box reports a distance of zero. Faces are part of
    /// the box, so a ray grazing a face counts as a hit.
    #[must_use]
    pub fn intersect_box(&self, min: Vec3, max: Vec3) -> Option<f32> {
        let mut near = 0.0_f32;
        let mut far = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let direction = self.direction[axis];
            if direction == 0.0 {
                // Parallel to this slab: the origin must already lie within it.
                if origin < min[axis] || origin > max[axis] {
                    return None;
                }
                continue;
            }

            let inverse = direction.recip();
            let entry = (min[axis] - origin) * inverse;
            let exit = (max[axis] - origin) * inverse;
            near = near.max(entry.min(exit));
            far = far.min(entry.max(exit));
        }

        (far >= near).then_some(near)
    }
}

/// Cell struck by a ray.
#[derive(Clone, Debug, PartialEq)]
pub struct PickHit {
    /// Arena index of the struck cell.
    pub index: CellIndex,
    /// Code of the struck cell.
    pub code: CellCode,
    /// Distance from the ray origin to the entry point.
    pub distance: f32,
}

/// Picking system testing rays against each cell's scaled volume.
///
/// Ties at exactly equal distance resolve to the cell that comes first in
/// layout order.
#[derive(Debug, Default)]
pub struct Picker;

impl Picker {
    /// Creates a new picker.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the nearest cell intersected by `ray`, if any.
    #[must_use]
    pub fn pick(&self, warehouse: &Warehouse, ray: &Ray) -> Option<PickHit> {
        let half_extent = query::footprint(warehouse) * 0.5;
        let mut best: Option<(CellIndex, f32)> = None;

        for (index, cell, handle) in query::slots(warehouse) {
            let half = half_extent * handle.scale();
            let centre = cell.position();
            let Some(distance) = ray.intersect_box(centre - half, centre + half) else {
                continue;
            };

            match best {
                Some((_, nearest)) if nearest <= distance => {}
                _ => best = Some((index, distance)),
            }
        }

        let (index, distance) = best?;
        let code = query::cell_at(warehouse, index)?.code().clone();
        Some(PickHit {
            index,
            code,
            distance,
        })
    }
}
