use std::path::{Path, PathBuf};

use gst::prelude::*;
use ipgallery_image::{Image, ImageSize};

use crate::capture::FrameSource;
use crate::error::IoError;
use crate::gstreamer::{
    capture::{FrameBuffering, StreamCapture},
    error::StreamCaptureError,
};

// gstreamer wants forward slashes in locations
fn location(path: &Path) -> String {
    if cfg!(windows) {
        path.to_string_lossy().replace('\\', "/")
    } else {
        path.to_string_lossy().into_owned()
    }
}

// raw RGB rows are expected with a 4 byte stride
fn pad_rows(img: &Image<u8, 3>) -> Vec<u8> {
    let row_bytes = img.width() * 3;
    let stride = row_bytes.next_multiple_of(4);
    if stride == row_bytes {
        return img.as_slice().to_vec();
    }
    let mut data = vec![0u8; stride * img.height()];
    for (dst, src) in data
        .chunks_exact_mut(stride)
        .zip(img.as_slice().chunks_exact(row_bytes))
    {
        dst[..row_bytes].copy_from_slice(src);
    }
    data
}

/// Frames decoded from a video file, in order and without drops.
pub struct VideoFileCapture {
    path: PathBuf,
    capture: StreamCapture,
}

impl VideoFileCapture {
    /// Create a reader for the video file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(IoError::FileDoesNotExist(path));
        }

        let pipeline = format!(
            "filesrc location=\"{}\" ! decodebin ! videoconvert ! video/x-raw,format=RGB ! appsink name=sink sync=false",
            location(&path)
        );
        let capture = StreamCapture::new(&pipeline, FrameBuffering::Queue(4))?;

        Ok(Self { path, capture })
    }

    /// Start decoding.
    pub fn start(&mut self) -> Result<(), IoError> {
        Ok(self.capture.start()?)
    }
}

impl FrameSource for VideoFileCapture {
    fn grab(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
        Ok(self.capture.grab()?)
    }

    fn fps(&self) -> Option<f64> {
        self.capture.fps()
    }

    fn describe(&self) -> String {
        format!("video file {}", self.path.display())
    }

    fn close(&mut self) -> Result<(), IoError> {
        Ok(self.capture.close()?)
    }
}

/// Writes RGB frames of a fixed size to a Motion JPEG AVI file.
///
/// # Example
///
/// ```no_run
/// use ipgallery_image::Image;
/// use ipgallery_io::gstreamer::VideoWriter;
///
/// let mut writer = VideoWriter::new("output.avi", 25, [640, 480].into()).unwrap();
/// writer.start().unwrap();
///
/// let frame = Image::<u8, 3>::from_size_val([640, 480].into(), 0).unwrap();
/// writer.write(&frame).unwrap();
/// writer.close().unwrap();
/// ```
pub struct VideoWriter {
    pipeline: gst::Pipeline,
    appsrc: gst_app::AppSrc,
    fps: u32,
    size: ImageSize,
    counter: u64,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl VideoWriter {
    /// Create a new VideoWriter.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to save the video file.
    /// * `fps` - The frames per second of the video.
    /// * `size` - The size of every frame.
    pub fn new(path: impl AsRef<Path>, fps: u32, size: ImageSize) -> Result<Self, StreamCaptureError> {
        if fps == 0 {
            return Err(StreamCaptureError::InvalidConfig(
                "fps must be positive".to_string(),
            ));
        }

        gst::init()?;

        let pipeline_str = format!(
            "appsrc name=src ! videoconvert ! video/x-raw,format=I420 ! jpegenc ! avimux ! filesink location=\"{}\"",
            location(path.as_ref())
        );
        log::debug!("writer pipeline: {}", pipeline_str);

        let pipeline = gst::parse::launch(&pipeline_str)?
            .dynamic_cast::<gst::Pipeline>()
            .map_err(StreamCaptureError::DowncastPipelineError)?;

        let appsrc = pipeline
            .by_name("src")
            .ok_or(StreamCaptureError::GetElementByNameError)?
            .dynamic_cast::<gst_app::AppSrc>()
            .map_err(StreamCaptureError::DowncastPipelineError)?;

        appsrc.set_format(gst::Format::Time);
        let caps = gst::Caps::builder("video/x-raw")
            .field("format", "RGB")
            .field("width", size.width as i32)
            .field("height", size.height as i32)
            .field("framerate", gst::Fraction::new(fps as i32, 1))
            .build();
        appsrc.set_caps(Some(&caps));
        appsrc.set_is_live(true);

        Ok(Self {
            pipeline,
            appsrc,
            fps,
            size,
            counter: 0,
            handle: None,
        })
    }

    /// The size every written frame must have.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.counter
    }

    /// Start the video writer.
    ///
    /// Set the pipeline to playing and launch a thread to handle the bus messages.
    pub fn start(&mut self) -> Result<(), StreamCaptureError> {
        self.pipeline.set_state(gst::State::Playing)?;
        let bus = self.pipeline.bus().ok_or(StreamCaptureError::BusError)?;

        let handle = std::thread::spawn(move || {
            for msg in bus.iter_timed(gst::ClockTime::NONE) {
                match msg.view() {
                    gst::MessageView::Eos(..) => {
                        log::debug!("writer bus thread received EOS");
                        break;
                    }
                    gst::MessageView::Error(err) => {
                        log::error!(
                            "writer error from {:?}: {} ({:?})",
                            msg.src().map(|s| s.path_string()),
                            err.error(),
                            err.debug()
                        );
                        break;
                    }
                    _ => {}
                }
            }
        });
        self.handle = Some(handle);
        Ok(())
    }

    /// Write a frame. Its size must match the writer size.
    pub fn write(&mut self, img: &Image<u8, 3>) -> Result<(), StreamCaptureError> {
        if self.handle.is_none() {
            return Err(StreamCaptureError::PipelineNotRunning);
        }

        if img.size() != self.size {
            return Err(StreamCaptureError::InvalidImageFormat(format!(
                "frame size {} does not match the video size {}",
                img.size(),
                self.size
            )));
        }

        let frame_ns = 1_000_000_000 / self.fps as u64;
        let mut buffer = gst::Buffer::from_mut_slice(pad_rows(img));
        let buffer_ref = buffer.get_mut().ok_or_else(|| {
            StreamCaptureError::InvalidConfig("Failed to get mutable buffer reference".to_string())
        })?;
        buffer_ref.set_pts(Some(gst::ClockTime::from_nseconds(self.counter * frame_ns)));
        buffer_ref.set_duration(Some(gst::ClockTime::from_nseconds(frame_ns)));

        self.appsrc.push_buffer(buffer)?;
        self.counter += 1;
        Ok(())
    }

    /// Close the video writer, finalising the file.
    pub fn close(&mut self) -> Result<(), StreamCaptureError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        match self.appsrc.end_of_stream() {
            Ok(_) => {}
            Err(gst::FlowError::Flushing) | Err(gst::FlowError::NotLinked) => {
                log::warn!("writer already stopped when sending EOS");
            }
            Err(err) => return Err(StreamCaptureError::GstreamerFlowError(err)),
        }

        if handle.join().is_err() {
            log::error!("writer bus thread panicked");
        }

        self.pipeline.set_state(gst::State::Null)?;
        log::debug!("wrote {} frames", self.counter);
        Ok(())
    }
}

impl Drop for VideoWriter {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::error!("error closing video writer: {err}");
        }
        if let Err(err) = self.pipeline.set_state(gst::State::Null) {
            log::error!("error stopping writer pipeline: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_video_file() {
        let res = VideoFileCapture::new("does/not/exist.avi");
        assert!(matches!(res, Err(IoError::FileDoesNotExist(_))));
    }

    #[test]
    fn rows_padded_to_stride() -> Result<(), ipgallery_image::ImageError> {
        let img = Image::<u8, 3>::new([1, 2].into(), vec![1, 2, 3, 4, 5, 6])?;
        assert_eq!(pad_rows(&img), vec![1, 2, 3, 0, 4, 5, 6, 0]);

        let aligned = Image::<u8, 3>::from_size_val([4, 1].into(), 9)?;
        assert_eq!(pad_rows(&aligned), vec![9; 12]);
        Ok(())
    }

    #[test]
    fn windows_location() {
        let loc = location(Path::new("out/video.avi"));
        assert!(loc.ends_with("video.avi"));
        assert!(!loc.contains('\\'));
    }
}
