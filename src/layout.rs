//! Placement of the three gears inside the drawing bounds.
//!
//! The hub sits left of the bounds' center by its own radius. Mid and Small
//! hang off the hub along the up-right and down-right diagonals, pulled in so
//! each circumference overlaps the hub's by the tooth depth.

use std::f64::consts::SQRT_2;

use crate::math::{Point, Rect};

/// Intrinsic pixel size of a sprite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpriteSize {
    pub width: i32,
    pub height: i32,
}

impl SpriteSize {
    pub const fn new(width: i32, height: i32) -> Self {
        SpriteSize { width, height }
    }

    /// Effective radius; only the width counts, even for non-square sprites
    pub const fn radius(&self) -> i32 {
        self.width / 2
    }
}

/// Where a single gear is drawn and what it turns around
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    pub rect: Rect,
    pub center: Point,
}

impl Placement {
    /// Centers a sprite of `size` on `center`, keeping its intrinsic size
    fn centered(center: Point, size: SpriteSize) -> Self {
        let radius = size.radius();
        Placement {
            rect: Rect::new(
                center.x - radius,
                center.y - radius,
                size.width,
                size.height,
            ),
            center,
        }
    }
}

/// Placements of all three gears for one set of drawing bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Layout {
    pub bounds: Rect,
    pub hub: Placement,
    pub mid: Placement,
    pub small: Placement,
}

/// Sizes that stay fixed for the lifetime of a drawable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GearMetrics {
    pub hub: SpriteSize,
    pub mid: SpriteSize,
    pub small: SpriteSize,
    pub tooth_depth: i32,
}

impl GearMetrics {
    pub fn layout(&self, bounds: Rect) -> Layout {
        let mut layout = compute_layout(
            bounds.width,
            bounds.height,
            self.hub,
            self.mid,
            self.small,
            self.tooth_depth,
        );
        layout.bounds = bounds;
        layout
    }
}

/// Diagonal offset (on each axis) between the hub center and a gear of
/// `radius`, truncated toward zero.
pub fn diagonal_offset(hub_radius: i32, radius: i32, tooth_depth: i32) -> i32 {
    ((hub_radius + radius - tooth_depth) as f64 / SQRT_2) as i32
}

/// Computes the placements of the hub, mid and small gears.
///
/// Coordinates are relative to the bounds' top-left corner. Degenerate input
/// (zero bounds, zero-width sprites) yields coincident or empty placements.
pub fn compute_layout(
    bounds_width: i32,
    bounds_height: i32,
    hub: SpriteSize,
    mid: SpriteSize,
    small: SpriteSize,
    tooth_depth: i32,
) -> Layout {
    let cx = bounds_width / 2;
    let cy = bounds_height / 2;

    let hub_radius = hub.radius();
    let hub_center = Point::new(cx - hub_radius, cy);

    let d_mid = diagonal_offset(hub_radius, mid.radius(), tooth_depth);
    let mid_center = hub_center.offset(d_mid, -d_mid);

    let d_small = diagonal_offset(hub_radius, small.radius(), tooth_depth);
    let small_center = hub_center.offset(d_small, d_small);

    Layout {
        bounds: Rect::from_size(bounds_width, bounds_height),
        hub: Placement::centered(hub_center, hub),
        mid: Placement::centered(mid_center, mid),
        small: Placement::centered(small_center, small),
    }
}
