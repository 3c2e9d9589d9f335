use std::time::{Duration, Instant};

use ipgallery_image::{Image, ImageSize};
use ipgallery_imgproc::resize;
use ipgallery_io::{
    capture::{self, FrameSource},
    fps_counter::FpsCounter,
    IoError,
};

use crate::{
    args::SourceOptions,
    controls::{Controls, EXIT_KEY},
    display::{Display, DisplayMode},
    trackbar::Trackbars,
    AppError,
};

/// Printed when neither the video file nor the camera open.
pub const NO_SOURCE_MESSAGE: &str = "No video file specified or camera connected.";

/// How long the loop waits for a key after each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// Aim at 25 fps: wait `max(2, 40 - elapsed)` milliseconds.
    #[default]
    Fixed25,
    /// Wait `1000 / max(1, fps)` milliseconds, `fps` being the position of
    /// the named trackbar.
    Trackbar(&'static str),
    /// Wait one millisecond.
    Minimal,
}

impl Pacing {
    /// The wait after a frame that took `elapsed` to process.
    pub fn wait(&self, elapsed: Duration, trackbars: &Trackbars) -> Duration {
        let ms = match self {
            Pacing::Fixed25 => {
                let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
                (40 - elapsed_ms.ceil() as i64).max(2) as u64
            }
            Pacing::Trackbar(name) => 1000 / trackbars.value(name).max(1) as u64,
            Pacing::Minimal => 1,
        };
        Duration::from_millis(ms)
    }
}

/// Per-frame state handed to a [`Demo`].
pub struct Context<'a> {
    /// The demo trackbars.
    pub trackbars: &'a mut Trackbars,
    /// The output windows.
    pub display: &'a Display,
    /// Index of the current frame, from 0.
    pub frame_index: u64,
    stop: bool,
}

impl Context<'_> {
    /// End the loop after this frame.
    pub fn stop(&mut self) {
        self.stop = true;
    }
}

/// A demo driven by a [`FrameLoop`].
///
/// Closures taking a frame and a [`Context`] are demos without key handling.
pub trait Demo {
    /// Process and display one frame.
    fn process(&mut self, frame: &Image<u8, 3>, ctx: &mut Context<'_>) -> Result<(), AppError>;

    /// Handle a key press other than the exit key.
    fn on_key(&mut self, _key: char, _ctx: &mut Context<'_>) -> Result<(), AppError> {
        Ok(())
    }
}

impl<F> Demo for F
where
    F: FnMut(&Image<u8, 3>, &mut Context<'_>) -> Result<(), AppError>,
{
    fn process(&mut self, frame: &Image<u8, 3>, ctx: &mut Context<'_>) -> Result<(), AppError> {
        self(frame, ctx)
    }
}

/// The capture, process, display and key loop of a demo.
pub struct FrameLoop {
    source: Box<dyn FrameSource>,
    rescale: f64,
    initial: Vec<(String, i32)>,
    display: Display,
    controls: Controls,
    trackbars: Trackbars,
    pacing: Pacing,
    counter: FpsCounter,
    pending: Option<Image<u8, 3>>,
}

impl FrameLoop {
    /// Open the frame source, display and stdin controls of a demo.
    ///
    /// Returns `Ok(None)` after printing [`NO_SOURCE_MESSAGE`] when no
    /// source can be opened.
    pub fn open(app_id: &str, options: &SourceOptions) -> Result<Option<Self>, AppError> {
        let source = match capture::open_source(options.video_file.as_deref(), options.camera_id) {
            Ok(source) => source,
            Err(IoError::NoSourceAvailable) => {
                println!("{NO_SOURCE_MESSAGE}");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let display = Display::new(app_id, &Display::mode_from_env())?;
        let controls = Controls::new()?;
        Ok(Some(Self::new(source, display, controls, options)))
    }

    /// Assemble a loop from its parts.
    pub fn new(
        source: Box<dyn FrameSource>,
        display: Display,
        controls: Controls,
        options: &SourceOptions,
    ) -> Self {
        Self {
            source,
            rescale: options.rescale,
            initial: options.initial.clone(),
            display,
            controls,
            trackbars: Trackbars::new(),
            pacing: Pacing::default(),
            counter: FpsCounter::new(),
            pending: None,
        }
    }

    /// A loop over an in-memory display, useful for tests.
    pub fn buffered(source: Box<dyn FrameSource>, controls: Controls) -> Result<Self, AppError> {
        let display = Display::new("ipgallery", &DisplayMode::Buffered)?;
        Ok(Self::new(source, display, controls, &SourceOptions::default()))
    }

    /// Set the key wait after every frame.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Add a trackbar. A matching `--set name=value` overrides `value`.
    pub fn add_trackbar(&mut self, name: &str, value: i32, max: i32) {
        let value = self
            .initial
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map_or(value, |(_, v)| *v);
        self.trackbars.add(name, value, max);
    }

    /// The demo trackbars.
    pub fn trackbars(&mut self) -> &mut Trackbars {
        &mut self.trackbars
    }

    /// The output windows.
    pub fn display(&self) -> &Display {
        &self.display
    }

    /// The nominal rate of the source, if known.
    pub fn source_fps(&self) -> Option<f64> {
        self.source.fps()
    }

    /// The size of the frames after rescaling, `None` if the stream is empty.
    ///
    /// The frame read to find out is kept for the next [`FrameLoop::grab`].
    pub fn frame_size(&mut self) -> Result<Option<ImageSize>, AppError> {
        if self.pending.is_none() {
            self.pending = self.grab()?;
        }
        Ok(self.pending.as_ref().map(|frame| frame.size()))
    }

    /// Grab the next frame, rescaled by the configured factor.
    pub fn grab(&mut self) -> Result<Option<Image<u8, 3>>, AppError> {
        if let Some(frame) = self.pending.take() {
            return Ok(Some(frame));
        }
        let Some(frame) = self.source.grab()? else {
            return Ok(None);
        };
        if self.rescale == 1.0 {
            return Ok(Some(frame));
        }
        Ok(Some(resize::rescale(&frame, self.rescale)?))
    }

    /// Wait for a key, `None` waiting until one arrives.
    pub fn wait_key(&mut self, timeout: Option<Duration>) -> Option<char> {
        self.controls.wait_key(timeout, &mut self.trackbars)
    }

    /// Run `demo` on every frame until the stream ends, the exit key is
    /// pressed, Ctrl-C is received or the demo stops.
    pub fn run<D: Demo>(&mut self, demo: &mut D) -> Result<(), AppError> {
        for (name, _) in &self.initial {
            if self.trackbars.get(name).is_none() {
                log::warn!("no trackbar named {name}");
            }
        }
        if self.trackbars.iter().next().is_some() {
            log::info!("trackbars: {} (type name=value to change)", self.trackbars.status());
        }

        let mut frame_index = 0u64;
        loop {
            if self.controls.is_cancelled() {
                break;
            }

            let Some(frame) = self.grab()? else {
                log::info!("end of stream after {frame_index} frames");
                break;
            };

            let start = Instant::now();
            self.display.set_frame(frame_index);

            let mut ctx = Context {
                trackbars: &mut self.trackbars,
                display: &self.display,
                frame_index,
                stop: false,
            };
            demo.process(&frame, &mut ctx)?;
            let mut stop = ctx.stop;

            let elapsed = start.elapsed();
            log::debug!("frame {frame_index} processed in {elapsed:?}");

            let wait = self.pacing.wait(elapsed, &self.trackbars);
            match self.controls.wait_key(Some(wait), &mut self.trackbars) {
                Some(EXIT_KEY) => stop = true,
                Some(key) => {
                    let mut ctx = Context {
                        trackbars: &mut self.trackbars,
                        display: &self.display,
                        frame_index,
                        stop,
                    };
                    demo.on_key(key, &mut ctx)?;
                    stop = ctx.stop;
                }
                None => {}
            }

            self.counter.tick();
            frame_index += 1;
            if stop {
                break;
            }
        }

        log::debug!(
            "processed {} frames at {:.1} fps",
            self.counter.frames(),
            self.counter.fps()
        );
        Ok(())
    }

    /// Release the source and flush the display.
    pub fn close(mut self) -> Result<(), AppError> {
        self.display.flush();
        self.source.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::Event;

    struct Counting {
        remaining: u32,
        value: u8,
    }

    impl FrameSource for Counting {
        fn grab(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            self.value += 1;
            Ok(Some(Image::from_size_val([8, 6].into(), self.value)?))
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    #[test]
    fn pacing_waits() {
        let mut bars = Trackbars::new();
        let p = Pacing::Fixed25;
        assert_eq!(p.wait(Duration::from_millis(10), &bars), Duration::from_millis(30));
        assert_eq!(p.wait(Duration::from_micros(10_200), &bars), Duration::from_millis(29));
        assert_eq!(p.wait(Duration::from_millis(100), &bars), Duration::from_millis(2));

        let s = Pacing::Trackbar("fps");
        bars.add("fps", 50, 100);
        assert_eq!(s.wait(Duration::ZERO, &bars), Duration::from_millis(20));
        bars.add("fps", 0, 100);
        assert_eq!(s.wait(Duration::ZERO, &bars), Duration::from_millis(1000));
        assert_eq!(Pacing::Minimal.wait(Duration::ZERO, &bars), Duration::from_millis(1));
    }

    #[test]
    fn runs_until_end_of_stream() -> Result<(), AppError> {
        let (controls, _tx) = Controls::detached();
        let source = Box::new(Counting {
            remaining: 3,
            value: 0,
        });
        let mut frame_loop = FrameLoop::buffered(source, controls)?.with_pacing(Pacing::Minimal);

        let mut seen = Vec::new();
        frame_loop.run(&mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            seen.push((ctx.frame_index, frame.as_slice()[0]));
            Ok(())
        })?;
        assert_eq!(seen, vec![(0, 1), (1, 2), (2, 3)]);
        frame_loop.close()
    }

    #[test]
    fn demo_can_stop_the_loop() -> Result<(), AppError> {
        let (controls, _tx) = Controls::detached();
        let source = Box::new(Counting {
            remaining: 10,
            value: 0,
        });
        let mut frame_loop = FrameLoop::buffered(source, controls)?.with_pacing(Pacing::Minimal);

        let mut frames = 0;
        frame_loop.run(&mut |_: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            frames += 1;
            if ctx.frame_index == 3 {
                ctx.stop();
            }
            Ok(())
        })?;
        assert_eq!(frames, 4);
        Ok(())
    }

    struct KeyDemo {
        keys: Vec<char>,
        frames: u32,
    }

    impl Demo for KeyDemo {
        fn process(&mut self, _frame: &Image<u8, 3>, _ctx: &mut Context<'_>) -> Result<(), AppError> {
            self.frames += 1;
            Ok(())
        }

        fn on_key(&mut self, key: char, _ctx: &mut Context<'_>) -> Result<(), AppError> {
            self.keys.push(key);
            Ok(())
        }
    }

    #[test]
    fn exit_key_stops_and_rescale_applies() -> Result<(), AppError> {
        let (controls, tx) = Controls::detached();
        let source = Box::new(Counting {
            remaining: 100,
            value: 0,
        });
        let options = SourceOptions::new(None, 0, 0.5, vec![("radius".to_string(), 9)])?;
        let display = Display::new("ipgallery_test", &DisplayMode::Buffered)?;
        let mut frame_loop = FrameLoop::new(source, display, controls, &options).with_pacing(Pacing::Minimal);
        frame_loop.add_trackbar("radius", 5, 100);
        assert_eq!(frame_loop.trackbars().value("radius"), 9);

        assert_eq!(frame_loop.frame_size()?, Some([4, 3].into()));
        let frame = frame_loop.grab()?;
        assert_eq!(frame.map(|f| f.as_slice()[0]), Some(1));

        for event in [Event::Key('g'), Event::Key(EXIT_KEY)] {
            tx.send(event)
                .map_err(|e| AppError::InvalidArgument(e.to_string()))?;
        }

        let mut demo = KeyDemo {
            keys: Vec::new(),
            frames: 0,
        };
        frame_loop.run(&mut demo)?;
        assert_eq!(demo.keys, vec!['g']);
        assert_eq!(demo.frames, 2);
        Ok(())
    }
}
