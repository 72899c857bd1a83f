use crate::graphics::Surface;
use crate::layout::{Layout, Placement};
use crate::sprite::{GearSprites, Sprite};

/// Mid gear turns this much faster than the hub, the other way round
pub const MID_SPEED: f32 = 1.33;
/// Fixed phase of the mid gear so its teeth sit between the hub's
pub const MID_PHASE: f32 = 10.0;
pub const SMALL_SPEED: f32 = 1.6;

/// Rotation of each gear for one frame, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GearAngles {
    pub hub: f32,
    pub mid: f32,
    pub small: f32,
}

impl GearAngles {
    pub fn from_base(base_angle: i32) -> Self {
        let base = base_angle as f32;
        GearAngles {
            hub: base,
            mid: -(base * MID_SPEED) + MID_PHASE,
            small: -(base * SMALL_SPEED),
        }
    }

    /// Same angles folded into `[0, 360)`
    pub fn normalized(&self) -> Self {
        GearAngles {
            hub: self.hub.rem_euclid(360.0),
            mid: self.mid.rem_euclid(360.0),
            small: self.small.rem_euclid(360.0),
        }
    }
}

/// Draws the three gears for one frame: hub, then mid, then small, each
/// rotated about its own center with the transform restored afterwards.
pub fn render(
    surface: &mut dyn Surface,
    base_angle: i32,
    layout: &Layout,
    sprites: &GearSprites,
) {
    let angles = GearAngles::from_base(base_angle);
    draw_rotated(surface, sprites.hub.as_ref(), &layout.hub, angles.hub);
    draw_rotated(surface, sprites.mid.as_ref(), &layout.mid, angles.mid);
    draw_rotated(surface, sprites.small.as_ref(), &layout.small, angles.small);
}

fn draw_rotated(
    surface: &mut dyn Surface,
    sprite: &dyn Sprite,
    placement: &Placement,
    degrees: f32,
) {
    let count = surface.save();
    surface.rotate(degrees, placement.center.x, placement.center.y);
    sprite.draw_at(surface, placement.rect);
    surface.restore_to_count(count);
}
