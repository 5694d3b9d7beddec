//! A diagnostic frames-per-second meter.

use std::time::{Duration, Instant};

/// Minimum wall time between two reports.
const UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// Minimum number of frames between two reports.
const MIN_FRAMES: u32 = 10;

/// Sliding-window frame-rate reporter.
///
/// Call [`update`](Self::update) once per frame. The first call only seeds
/// the clock. Afterwards, once at least a second and at least ten frames have
/// gone by, the rate is logged at info level and returned, and a new window
/// starts.
#[derive(Debug, Default)]
pub struct FrameTimer {
    frames: u32,
    start: Option<Instant>,
}

impl FrameTimer {
    /// A timer that has not seen a frame yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a frame now.
    pub fn update(&mut self) -> Option<f64> {
        self.update_at(Instant::now())
    }

    /// Count a frame at `now`.
    pub fn update_at(&mut self, now: Instant) -> Option<f64> {
        let Some(start) = self.start else {
            self.start = Some(now);
            self.frames = 0;
            return None;
        };

        self.frames += 1;

        let elapsed = now.saturating_duration_since(start);
        if elapsed < UPDATE_INTERVAL || self.frames < MIN_FRAMES {
            return None;
        }

        // Precision loss is irrelevant at diagnostic frame rates.
        #[expect(clippy::cast_precision_loss)]
        let fps = f64::from(self.frames) * 1e9 / elapsed.as_nanos() as f64;
        log::info!("FPS: {fps:.1}");

        self.start = Some(now);
        self.frames = 0;
        Some(fps)
    }
}
