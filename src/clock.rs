//! Free-running rotation clock.
//!
//! The clock holds a single base angle in `[0, 360)` derived from elapsed time,
//! so it keeps the same speed whatever the host's tick cadence is.

use std::time::{Duration, Instant};

use log::info;

/// Default length of one full turn of the base angle
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(3000);

/// Monotonic time, measured from an arbitrary fixed epoch
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Time source backed by `Instant`
pub struct MonotonicTime {
    epoch: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        MonotonicTime {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

pub struct RotationClock<T: TimeSource> {
    source: T,
    period: Duration,
    /// Time at which the current run started, `None` while stopped
    started_at: Option<Duration>,
    fraction: f64,
    base_angle: i32,
}

impl<T: TimeSource> RotationClock<T> {
    /// Creates a stopped clock at angle 0. A zero period is bumped to 1 ms.
    pub fn new(source: T, period: Duration) -> Self {
        RotationClock {
            source,
            period: period.max(Duration::from_millis(1)),
            started_at: None,
            fraction: 0.0,
            base_angle: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Current base angle, always in `[0, 360)`
    pub fn base_angle(&self) -> i32 {
        self.base_angle
    }

    /// Position within the current period, in `[0, 1)`
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Starts the clock from phase 0. Does nothing if already running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.started_at = Some(self.source.now());
        self.fraction = 0.0;
        self.base_angle = 0;
        info!("gear clock started, period {:?}", self.period);
    }

    /// Freezes the base angle where it is
    pub fn stop(&mut self) {
        if self.started_at.take().is_some() {
            info!("gear clock stopped at {} degrees", self.base_angle);
        }
    }

    /// Advances the clock to the current time. Returns `true` when a redraw
    /// is needed, which is never the case for a stopped clock.
    pub fn tick(&mut self) -> bool {
        let Some(started_at) = self.started_at else {
            return false;
        };
        let elapsed = self.source.now().saturating_sub(started_at);
        let period = self.period.as_nanos();
        let into_cycle = elapsed.as_nanos() % period;

        self.fraction = into_cycle as f64 / period as f64;
        // truncated, so a full turn reads as 0 rather than 360
        self.base_angle = ((into_cycle * 360) / period) as i32;
        true
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeTime;
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn running_clock() -> (FakeTime, RotationClock<FakeTime>) {
        let time = FakeTime::default();
        let mut clock = RotationClock::new(time.clone(), DEFAULT_PERIOD);
        clock.start();
        (time, clock)
    }

    #[test]
    fn advances_linearly() {
        let (time, mut clock) = running_clock();
        time.advance(ms(750));
        assert!(clock.tick());
        assert_eq!(clock.base_angle(), 90);
        assert_eq!(clock.fraction(), 0.25);

        time.advance(ms(1500));
        clock.tick();
        assert_eq!(clock.base_angle(), 270);
    }

    #[test]
    fn irregular_ticks_complete_one_period() {
        let (time, mut clock) = running_clock();
        let steps = [7, 16, 33, 1, 250, 16, 16, 900, 61, 700, 500, 300, 200];
        assert_eq!(steps.iter().sum::<u64>(), 3000);

        let mut last = clock.base_angle();
        for (i, step) in steps.iter().enumerate() {
            time.advance(ms(*step));
            clock.tick();
            if i + 1 < steps.len() {
                assert!(clock.base_angle() >= last, "angle went backwards mid-cycle");
                last = clock.base_angle();
            }
        }
        assert_eq!(clock.base_angle(), 0);
        assert_eq!(clock.fraction(), 0.0);
    }

    #[test]
    fn never_emits_full_turn() {
        let (time, mut clock) = running_clock();
        for _ in 0..10_000 {
            time.advance(Duration::from_micros(997));
            clock.tick();
            assert!((0..360).contains(&clock.base_angle()));
        }
        // just before the period ends
        let (time, mut clock) = running_clock();
        time.advance(ms(2999));
        clock.tick();
        assert_eq!(clock.base_angle(), 359);
    }

    #[test]
    fn stop_freezes_and_skips_ticks() {
        let (time, mut clock) = running_clock();
        time.advance(ms(1000));
        clock.tick();
        clock.stop();
        assert!(!clock.is_running());

        time.advance(ms(400));
        assert!(!clock.tick());
        assert_eq!(clock.base_angle(), 120);
    }

    #[test]
    fn restart_resets_phase() {
        let (time, mut clock) = running_clock();
        time.advance(ms(1000));
        clock.tick();
        clock.stop();
        time.advance(ms(5000));

        clock.start();
        assert_eq!(clock.base_angle(), 0);
        time.advance(ms(250));
        clock.tick();
        assert_eq!(clock.base_angle(), 30);
    }

    #[test]
    fn start_is_idempotent() {
        let (time, mut clock) = running_clock();
        time.advance(ms(1500));
        clock.start();
        clock.tick();
        assert_eq!(clock.base_angle(), 180);
    }

    #[test]
    fn stopped_clock_starts_at_zero() {
        let clock = RotationClock::new(FakeTime::default(), ms(0));
        assert!(!clock.is_running());
        assert_eq!(clock.base_angle(), 0);
        assert_eq!(clock.period(), ms(1));
    }

    #[test]
    fn monotonic_time_never_goes_back() {
        let source = MonotonicTime::new();
        let first = source.now();
        assert!(source.now() >= first);
    }
}
