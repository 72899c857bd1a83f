use std::time::{Duration, Instant};

/// Application state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppState {
    /// Enable debug mode
    pub debug: bool,
    /// Animation paused by the user
    pub paused: bool,
    /// Terminal focus; the gears only turn while focused and not paused
    pub focused: bool,
    /// Draw into the whole terminal instead of the drawable's intrinsic size
    pub fill: bool,
}

impl AppState {
    pub fn new(debug: bool, fill: bool) -> Self {
        AppState {
            debug,
            paused: false,
            focused: true,
            fill,
        }
    }

    /// Whether the gears should currently be visible and animating
    pub fn visible(&self) -> bool {
        self.focused && !self.paused
    }
}

/// Frames-per-second counter, refreshed once per second
pub struct FpsCounter {
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        FpsCounter {
            frames_since_last_update: 0,
            last_fps_calculation: now,
            fps: 0.0,
        }
    }

    /// Records one painted frame at `now`
    pub fn frame(&mut self, now: Instant) {
        self.frames_since_last_update += 1;
        let duration = now.duration_since(self.last_fps_calculation);
        if duration >= Duration::from_secs(1) {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}
