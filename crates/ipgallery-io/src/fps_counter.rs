use std::time::{Duration, Instant};

/// Weight of the previous estimate in the smoothed rate.
const SMOOTHING: f32 = 0.9;

/// A frame rate counter with an exponentially smoothed estimate.
///
/// # Examples
///
/// ```
/// use ipgallery_io::fps_counter::FpsCounter;
///
/// let mut counter = FpsCounter::new();
///
/// for _ in 0..10 {
///     counter.tick();
/// }
/// assert_eq!(counter.frames(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct FpsCounter {
    last_tick: Instant,
    frames: u64,
    fps: f32,
}

impl FpsCounter {
    /// Creates a counter starting now.
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    /// Returns the smoothed frames per second, 0 before the first tick.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Returns the number of frames counted so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Counts one frame and returns the time since the previous one.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.frames += 1;

        let secs = elapsed.as_secs_f32();
        if secs > 0.0 {
            let instant_fps = 1.0 / secs;
            self.fps = if self.fps == 0.0 {
                instant_fps
            } else {
                self.fps * SMOOTHING + instant_fps * (1.0 - SMOOTHING)
            };
        }
        elapsed
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
