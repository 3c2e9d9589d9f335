use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use gst::prelude::*;
use ipgallery_image::{Image, ImageSize};

use crate::capture::FrameSource;
use crate::error::IoError;
use crate::gstreamer::error::StreamCaptureError;

/// How frames delivered by the pipeline are held until grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBuffering {
    /// Keep only the most recent frame. Older frames are dropped and logged
    /// as skipped, so a slow consumer always sees the live image.
    Latest,
    /// Queue up to the given number of frames, holding back the pipeline
    /// while the queue is full.
    Queue(usize),
}

#[derive(Default)]
struct FrameSlot {
    frames: VecDeque<Image<u8, 3>>,
    received: u64,
    skipped: u64,
    fps: Option<f64>,
    eos: bool,
    error: Option<String>,
    closing: bool,
}

#[derive(Default)]
struct Shared {
    slot: Mutex<FrameSlot>,
    ready: Condvar,
}

impl Shared {
    fn lock(&self) -> Result<MutexGuard<'_, FrameSlot>, StreamCaptureError> {
        self.slot
            .lock()
            .map_err(|_| StreamCaptureError::MutexPoisonError)
    }
}

/// A capture pipeline ending in an `appsink name=sink` delivering RGB frames.
pub struct StreamCapture {
    description: String,
    pipeline: gst::Pipeline,
    shared: Arc<Shared>,
    timeout: Duration,
    running: bool,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl StreamCapture {
    /// Default time [`StreamCapture::grab`] waits for a frame.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a new StreamCapture from a pipeline description.
    ///
    /// # Arguments
    ///
    /// * `pipeline_desc` - A GStreamer pipeline with an appsink named `sink`
    ///   negotiated to `video/x-raw,format=RGB`.
    /// * `buffering` - How frames are held until grabbed.
    pub fn new(pipeline_desc: &str, buffering: FrameBuffering) -> Result<Self, StreamCaptureError> {
        gst::init()?;

        log::debug!("capture pipeline: {pipeline_desc}");

        let pipeline = gst::parse::launch(pipeline_desc)?
            .dynamic_cast::<gst::Pipeline>()
            .map_err(StreamCaptureError::DowncastPipelineError)?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or(StreamCaptureError::GetElementByNameError)?
            .dynamic_cast::<gst_app::AppSink>()
            .map_err(StreamCaptureError::DowncastPipelineError)?;

        let shared = Arc::new(Shared::default());

        appsink.set_callbacks(
            gst_app::AppSinkCallbacks::builder()
                .new_sample({
                    let shared = shared.clone();
                    move |sink| {
                        let (frame, fps) = Self::extract_image_frame(sink).map_err(|err| {
                            log::error!("failed to extract frame: {err}");
                            gst::FlowError::Error
                        })?;
                        Self::store_frame(&shared, frame, fps, buffering)
                    }
                })
                .build(),
        );

        Ok(Self {
            description: pipeline_desc.to_string(),
            pipeline,
            shared,
            timeout: Self::DEFAULT_TIMEOUT,
            running: false,
            handle: None,
        })
    }

    fn store_frame(
        shared: &Shared,
        frame: Image<u8, 3>,
        fps: Option<f64>,
        buffering: FrameBuffering,
    ) -> Result<gst::FlowSuccess, gst::FlowError> {
        let mut slot = shared.slot.lock().map_err(|_| gst::FlowError::Error)?;

        if let FrameBuffering::Queue(capacity) = buffering {
            while slot.frames.len() >= capacity.max(1) && !slot.closing {
                slot = shared.ready.wait(slot).map_err(|_| gst::FlowError::Error)?;
            }
        }

        if slot.closing {
            return Err(gst::FlowError::Flushing);
        }

        let index = slot.received;
        slot.received += 1;
        if fps.is_some() {
            slot.fps = fps;
        }

        if buffering == FrameBuffering::Latest && slot.frames.pop_front().is_some() {
            slot.skipped += 1;
            log::info!("skipping frame {}", index - 1);
        }

        slot.frames.push_back(frame);
        shared.ready.notify_all();

        Ok(gst::FlowSuccess::Ok)
    }

    /// Starts the pipeline and a thread watching its bus.
    pub fn start(&mut self) -> Result<(), StreamCaptureError> {
        self.pipeline.set_state(gst::State::Playing)?;
        self.running = true;

        let bus = self.pipeline.bus().ok_or(StreamCaptureError::BusError)?;
        let shared = self.shared.clone();

        let handle = std::thread::spawn(move || loop {
            if shared.lock().map(|slot| slot.closing).unwrap_or(true) {
                break;
            }

            let Some(msg) = bus.timed_pop(gst::ClockTime::from_mseconds(100)) else {
                continue;
            };

            let mut error = None;
            match msg.view() {
                gst::MessageView::Eos(..) => log::debug!("capture received end of stream"),
                gst::MessageView::Error(err) => {
                    let text = format!(
                        "{} from {:?} ({:?})",
                        err.error(),
                        msg.src().map(|s| s.path_string()),
                        err.debug()
                    );
                    log::error!("capture pipeline error: {text}");
                    error = Some(text);
                }
                _ => continue,
            }

            if let Ok(mut slot) = shared.lock() {
                slot.eos = true;
                slot.error = error;
            }
            shared.ready.notify_all();
            break;
        });

        self.handle = Some(handle);

        Ok(())
    }

    /// Block until a frame is available without consuming it.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline fails or ends, or on timeout.
    pub fn wait_for_frame(&self, timeout: Duration) -> Result<(), StreamCaptureError> {
        if !self.running {
            return Err(StreamCaptureError::PipelineNotRunning);
        }

        let slot = self.shared.lock()?;
        let (slot, _) = self
            .shared
            .ready
            .wait_timeout_while(slot, timeout, |s| s.frames.is_empty() && !s.eos)
            .map_err(|_| StreamCaptureError::MutexPoisonError)?;

        if !slot.frames.is_empty() {
            return Ok(());
        }
        match (&slot.error, slot.eos) {
            (Some(err), _) => Err(StreamCaptureError::PipelineError(err.clone())),
            (None, true) => Err(StreamCaptureError::PipelineError(
                "stream ended before the first frame".to_string(),
            )),
            (None, false) => Err(StreamCaptureError::Timeout(timeout)),
        }
    }

    /// Grabs the next captured image frame.
    ///
    /// Waits up to the configured timeout for a frame to arrive.
    ///
    /// # Returns
    ///
    /// The frame, or `None` once the stream has ended and no frame is left.
    pub fn grab(&self) -> Result<Option<Image<u8, 3>>, StreamCaptureError> {
        if !self.running {
            return Err(StreamCaptureError::PipelineNotRunning);
        }

        let slot = self.shared.lock()?;
        let (mut slot, _) = self
            .shared
            .ready
            .wait_timeout_while(slot, self.timeout, |s| s.frames.is_empty() && !s.eos)
            .map_err(|_| StreamCaptureError::MutexPoisonError)?;

        if let Some(frame) = slot.frames.pop_front() {
            self.shared.ready.notify_all();
            return Ok(Some(frame));
        }

        match (&slot.error, slot.eos) {
            (Some(err), _) => Err(StreamCaptureError::PipelineError(err.clone())),
            (None, true) => Ok(None),
            (None, false) => Err(StreamCaptureError::Timeout(self.timeout)),
        }
    }

    /// Frame rate announced by the pipeline caps, if any.
    pub fn fps(&self) -> Option<f64> {
        self.shared.lock().ok().and_then(|slot| slot.fps)
    }

    /// Number of frames received and skipped so far.
    pub fn counters(&self) -> (u64, u64) {
        self.shared
            .lock()
            .map(|slot| (slot.received, slot.skipped))
            .unwrap_or((0, 0))
    }

    /// The pipeline description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Closes the stream capture pipeline.
    pub fn close(&mut self) -> Result<(), StreamCaptureError> {
        let (received, skipped) = self.counters();
        log::debug!("capture closing after {received} frames, {skipped} skipped");

        if let Ok(mut slot) = self.shared.lock() {
            slot.closing = true;
        }
        self.shared.ready.notify_all();

        if !self.pipeline.send_event(gst::event::Eos::new()) {
            log::debug!("capture pipeline did not accept the end of stream event");
        }

        self.pipeline.set_state(gst::State::Null)?;

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("capture bus thread panicked");
            }
        }

        self.running = false;
        Ok(())
    }

    /// Extracts an image frame and the announced frame rate from the AppSink.
    fn extract_image_frame(
        appsink: &gst_app::AppSink,
    ) -> Result<(Image<u8, 3>, Option<f64>), StreamCaptureError> {
        let sample = appsink.pull_sample()?;

        let caps = sample.caps().ok_or(StreamCaptureError::GetCapsError)?;

        let structure = caps
            .structure(0)
            .ok_or(StreamCaptureError::GetStructureError)?;

        let height = structure
            .get::<i32>("height")
            .map_err(|_| StreamCaptureError::GetHeightError)? as usize;

        let width = structure
            .get::<i32>("width")
            .map_err(|_| StreamCaptureError::GetWidthError)? as usize;

        let fps = structure
            .get::<gst::Fraction>("framerate")
            .ok()
            .filter(|f| f.numer() > 0 && f.denom() > 0)
            .map(|f| f.numer() as f64 / f.denom() as f64);

        let buffer = sample
            .buffer()
            .ok_or(StreamCaptureError::GetBufferError)?
            .map_readable()?;

        let data = unpad_rows(buffer.as_slice(), width * 3, height)
            .ok_or(StreamCaptureError::CreateImageFrameError)?;

        let image = Image::<u8, 3>::new(ImageSize { width, height }, data)
            .map_err(|_| StreamCaptureError::CreateImageFrameError)?;

        Ok((image, fps))
    }
}

// raw RGB rows are padded to a 4 byte stride
fn unpad_rows(data: &[u8], row_bytes: usize, rows: usize) -> Option<Vec<u8>> {
    if rows == 0 || row_bytes == 0 {
        return None;
    }
    let padded = row_bytes.next_multiple_of(4);
    let stride = if data.len() >= padded * (rows - 1) + row_bytes {
        padded
    } else {
        row_bytes
    };
    if data.len() < stride * (rows - 1) + row_bytes {
        return None;
    }
    Some(
        (0..rows)
            .flat_map(|r| data[r * stride..r * stride + row_bytes].iter().copied())
            .collect(),
    )
}

impl FrameSource for StreamCapture {
    fn grab(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
        Ok(StreamCapture::grab(self)?)
    }

    fn fps(&self) -> Option<f64> {
        StreamCapture::fps(self)
    }

    fn describe(&self) -> String {
        format!("gstreamer pipeline `{}`", self.description)
    }

    fn close(&mut self) -> Result<(), IoError> {
        Ok(StreamCapture::close(self)?)
    }
}

impl Drop for StreamCapture {
    fn drop(&mut self) {
        if self.running {
            if let Err(err) = self.close() {
                log::error!("error closing capture pipeline: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::unpad_rows;

    #[test]
    fn unpad_padded_rows() {
        // two rows of 3 bytes with a stride of 4
        let data = [1, 2, 3, 0, 4, 5, 6, 0];
        assert_eq!(unpad_rows(&data, 3, 2), Some(vec![1, 2, 3, 4, 5, 6]));
        assert_eq!(unpad_rows(&data[..4], 3, 2), None);

        let tight = [1, 2, 3, 4, 5, 6];
        assert_eq!(unpad_rows(&tight, 3, 2), Some(tight.to_vec()));
    }
}
