//! Drives a [`ParticleField`] at the pace of a frame clock.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::ParticleField;
use crate::render::Surface;

pub trait FrameClock {
    /// Blocks until the next frame is due. `false` means the clock has run out.
    fn wait_for_frame(&mut self) -> bool;
}

/// Wall-clock frame pacing at a fixed interval.
#[derive(Debug)]
pub struct IntervalClock {
    interval: Duration,
    next_frame: Option<Instant>,
    remaining: Option<u64>,
}

impl IntervalClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_frame: None,
            remaining: None,
        }
    }

    pub fn from_rate(frames_per_second: f32) -> Self {
        Self::new(Duration::from_secs_f32(1.0 / frames_per_second.max(1.0)))
    }

    /// Stops ticking after `frames` frames.
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.remaining = Some(frames);
        self
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::from_rate(60.0)
    }
}

impl FrameClock for IntervalClock {
    fn wait_for_frame(&mut self) -> bool {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return false;
            }
            *remaining -= 1;
        }

        let now = Instant::now();
        let due = self.next_frame.unwrap_or(now);
        if due > now {
            std::thread::sleep(due - now);
        }
        // A frame that ran late doesn't earn a burst of catch-up frames.
        self.next_frame = Some(due.max(now) + self.interval);
        true
    }
}

/// Runs update-and-render cycles while `field` is running and `clock`
/// keeps ticking. Returns how many cycles were rendered.
pub fn run<C, S>(field: &ParticleField, clock: &mut C, surface: &mut S) -> u64
where
    C: FrameClock + ?Sized,
    S: Surface + ?Sized,
{
    let mut frames = 0;
    while field.is_running() {
        if !clock.wait_for_frame() {
            break;
        }
        // `stop` may land between the check above and this call.
        if !field.frame(surface) {
            break;
        }
        frames += 1;
        trace!(frames, "frame rendered");
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldConfig, RecordingSurface, SurfaceSize};

    /// Ticks a fixed number of times, optionally stopping the field on the way.
    struct FakeClock<'a> {
        ticks: u64,
        stop_after: Option<(u64, &'a ParticleField)>,
    }

    impl FrameClock for FakeClock<'_> {
        fn wait_for_frame(&mut self) -> bool {
            if let Some((at, field)) = self.stop_after {
                if self.ticks == at {
                    field.stop();
                }
            }
            if self.ticks == 0 {
                return false;
            }
            self.ticks -= 1;
            true
        }
    }

    fn field() -> ParticleField {
        let field = ParticleField::new(FieldConfig {
            count: 8,
            ..FieldConfig::default()
        })
        .unwrap();
        field.start(SurfaceSize::new(120.0, 90.0)).unwrap();
        field
    }

    #[test]
    fn runs_until_clock_runs_out() {
        let field = field();
        let mut surface = RecordingSurface::new();
        let mut clock = FakeClock {
            ticks: 5,
            stop_after: None,
        };

        assert_eq!(run(&field, &mut clock, &mut surface), 5);
        assert_eq!(field.frames_rendered(), 5);
        assert!(field.is_running());
    }

    #[test]
    fn stop_during_a_tick_ends_the_loop() {
        let field = field();
        let mut surface = RecordingSurface::new();
        let mut clock = FakeClock {
            ticks: 10,
            stop_after: Some((7, &field)),
        };

        // Stopped when seven ticks were left: three frames made it out.
        assert_eq!(run(&field, &mut clock, &mut surface), 3);
        assert_eq!(surface.clears, 3);
        assert!(!field.is_running());
    }

    #[test]
    fn stopped_field_never_waits_on_the_clock() {
        let field = field();
        field.stop();
        let mut clock = IntervalClock::from_rate(1.0);
        assert_eq!(run(&field, &mut clock, &mut RecordingSurface::new()), 0);
    }

    #[test]
    fn interval_clock_honours_its_limit() {
        let mut clock = IntervalClock::new(Duration::from_millis(1)).with_limit(3);
        assert!(clock.wait_for_frame());
        assert!(clock.wait_for_frame());
        assert!(clock.wait_for_frame());
        assert!(!clock.wait_for_frame());
    }

    #[test]
    fn threaded_stop_is_synchronous() {
        let field = std::sync::Arc::new(field());
        let worker = {
            let field = field.clone();
            std::thread::spawn(move || {
                let mut clock = IntervalClock::new(Duration::from_millis(1));
                run(&field, &mut clock, &mut RecordingSurface::new())
            })
        };

        while field.frames_rendered() < 3 {
            std::thread::yield_now();
        }
        field.stop();
        let rendered = field.frames_rendered();
        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(field.frames_rendered(), rendered);
        assert!(worker.join().unwrap() >= 3);
    }
}
