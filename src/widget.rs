use std::time::Duration;

use log::debug;

use crate::clock::{RotationClock, TimeSource};
use crate::compositor::{render, GearAngles};
use crate::config::GearsConfig;
use crate::graphics::Surface;
use crate::layout::{GearMetrics, Layout};
use crate::math::Rect;
use crate::sprite::{GearSprites, SpriteError, SpriteProvider};

/// Interlocking gears drawable: sprites, cached layout and the rotation clock
pub struct GearsWidget<T: TimeSource> {
    sprites: GearSprites,
    metrics: GearMetrics,
    /// Replaced wholesale on every bounds change
    layout: Layout,
    clock: RotationClock<T>,
    intrinsic_width: i32,
    intrinsic_height: i32,
}

impl<T: TimeSource> GearsWidget<T> {
    pub fn new(
        provider: &dyn SpriteProvider,
        config: &GearsConfig,
        time: T,
    ) -> Result<Self, SpriteError> {
        let sprites = provider.load()?;
        let metrics = sprites.metrics(config.tooth_depth as i32);
        Ok(GearsWidget {
            sprites,
            metrics,
            layout: metrics.layout(Rect::default()),
            clock: RotationClock::new(time, config.period()),
            intrinsic_width: config.intrinsic_width as i32,
            intrinsic_height: config.intrinsic_height as i32,
        })
    }

    pub fn intrinsic_width(&self) -> i32 {
        self.intrinsic_width
    }

    pub fn intrinsic_height(&self) -> i32 {
        self.intrinsic_height
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn base_angle(&self) -> i32 {
        self.clock.base_angle()
    }

    pub fn period(&self) -> Duration {
        self.clock.period()
    }

    /// Position within the current turn, in `[0, 1)`
    pub fn phase(&self) -> f64 {
        self.clock.fraction()
    }

    pub fn angles(&self) -> GearAngles {
        GearAngles::from_base(self.clock.base_angle())
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Recomputes the gear placements for new bounds. Returns `false` when the
    /// bounds did not change and the cached layout was kept.
    pub fn on_bounds_changed(&mut self, bounds: Rect) -> bool {
        if bounds == self.layout.bounds {
            return false;
        }
        self.layout = self.metrics.layout(bounds);
        debug!("gear layout for {bounds:?}: {:?}", self.layout);
        true
    }

    /// Shown gears turn, hidden gears stop. Showing again restarts at phase 0.
    pub fn set_visible(&mut self, visible: bool) {
        if visible {
            self.clock.start();
        } else {
            self.clock.stop();
        }
    }

    /// Advances the clock; returns `true` when the gears need repainting
    pub fn tick(&mut self) -> bool {
        self.clock.tick()
    }

    pub fn paint(&self, surface: &mut dyn Surface) {
        self.paint_at(surface, self.clock.base_angle());
    }

    /// Paints the gears as they stand at `base_angle`, ignoring the clock
    pub fn paint_at(&self, surface: &mut dyn Surface, base_angle: i32) {
        render(surface, base_angle, &self.layout, &self.sprites);
    }
}
