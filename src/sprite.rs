//! Gear sprites and the providers that create them.

use std::f64::consts::TAU;
use std::fmt;

use log::debug;
use thiserror::Error;

use crate::config::GearStyle;
use crate::graphics::{Bitmap, Rgba, Surface};
use crate::layout::{GearMetrics, SpriteSize};
use crate::math::{apply_lighting, Rect};

/// Largest sprite edge the procedural provider will build
pub const MAX_DIAMETER: u32 = 2048;

/// Which of the three gears a sprite plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GearRole {
    Hub,
    Mid,
    Small,
}

impl fmt::Display for GearRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GearRole::Hub => "hub",
            GearRole::Mid => "mid",
            GearRole::Small => "small",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpriteError {
    #[error("{role} gear needs at least 3 teeth (got {teeth})")]
    TooFewTeeth { role: GearRole, teeth: u32 },
    #[error("{role} gear diameter {diameter} exceeds {max}", max = MAX_DIAMETER)]
    TooLarge { role: GearRole, diameter: u32 },
}

/// An immutable image that knows its size and how to draw itself
pub trait Sprite {
    fn intrinsic_width(&self) -> i32;
    fn intrinsic_height(&self) -> i32;
    /// Draws the sprite into `dest` under the surface's current transform
    fn draw_at(&self, surface: &mut dyn Surface, dest: Rect);

    fn size(&self) -> SpriteSize {
        SpriteSize::new(self.intrinsic_width(), self.intrinsic_height())
    }
}

/// The three sprites of one gears drawable
pub struct GearSprites {
    pub hub: Box<dyn Sprite>,
    pub mid: Box<dyn Sprite>,
    pub small: Box<dyn Sprite>,
}

impl GearSprites {
    pub fn metrics(&self, tooth_depth: i32) -> GearMetrics {
        GearMetrics {
            hub: self.hub.size(),
            mid: self.mid.size(),
            small: self.small.size(),
            tooth_depth,
        }
    }
}

/// Source of the gear sprites, injected into the widget at construction
pub trait SpriteProvider {
    fn load(&self) -> Result<GearSprites, SpriteError>;
}

/// Sprite backed by a bitmap
pub struct BitmapSprite {
    bitmap: Bitmap,
}

impl BitmapSprite {
    pub fn new(bitmap: Bitmap) -> Self {
        BitmapSprite { bitmap }
    }
}

impl Sprite for BitmapSprite {
    fn intrinsic_width(&self) -> i32 {
        self.bitmap.width() as i32
    }

    fn intrinsic_height(&self) -> i32 {
        self.bitmap.height() as i32
    }

    fn draw_at(&self, surface: &mut dyn Surface, dest: Rect) {
        surface.draw_image(&self.bitmap, dest);
    }
}

/// Draws toothed gear bitmaps from their styles
pub struct ProceduralGears {
    pub hub: GearStyle,
    pub mid: GearStyle,
    pub small: GearStyle,
    /// Radial height of each tooth in pixels
    pub tooth_height: u32,
}

impl SpriteProvider for ProceduralGears {
    fn load(&self) -> Result<GearSprites, SpriteError> {
        let build = |role, style: &GearStyle| -> Result<Box<dyn Sprite>, SpriteError> {
            let bitmap = render_gear(role, style, self.tooth_height)?;
            debug!(
                "built {role} gear sprite {}x{} with {} teeth",
                bitmap.width(),
                bitmap.height(),
                style.teeth
            );
            Ok(Box::new(BitmapSprite::new(bitmap)))
        };
        Ok(GearSprites {
            hub: build(GearRole::Hub, &self.hub)?,
            mid: build(GearRole::Mid, &self.mid)?,
            small: build(GearRole::Small, &self.small)?,
        })
    }
}

/// Rasterizes a single gear: toothed rim, shaded body, axle hole
pub fn render_gear(
    role: GearRole,
    style: &GearStyle,
    tooth_height: u32,
) -> Result<Bitmap, SpriteError> {
    if style.teeth < 3 {
        return Err(SpriteError::TooFewTeeth {
            role,
            teeth: style.teeth,
        });
    }
    if style.diameter > MAX_DIAMETER {
        return Err(SpriteError::TooLarge {
            role,
            diameter: style.diameter,
        });
    }

    let size = style.diameter as usize;
    let mut bitmap = Bitmap::new(size, size);
    let outer = size as f64 / 2.0;
    let root = (outer - tooth_height.max(1) as f64).max(outer * 0.5);
    let hole = outer * 0.2;
    let axle = outer * 0.32;
    let base = Rgba::rgb(style.color[0], style.color[1], style.color[2]);

    for y in 0..size {
        for x in 0..size {
            let dx = x as f64 + 0.5 - outer;
            let dy = y as f64 + 0.5 - outer;
            let radius = dx.hypot(dy);
            if radius > outer || radius < hole {
                continue;
            }

            // Teeth occupy the first half of each angular slot
            let turn = dy.atan2(dx).rem_euclid(TAU) / TAU;
            let slot = (turn * style.teeth as f64).fract();
            if radius > root && slot >= 0.5 {
                continue;
            }

            let intensity = if radius < axle {
                0.55
            } else {
                1.0 - 0.3 * (radius / outer)
            };
            bitmap.set(x, y, apply_lighting(base, intensity));
        }
    }
    Ok(bitmap)
}
