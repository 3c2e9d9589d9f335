use std::time::Duration;

use ipgallery_image::ImageSize;

use crate::gstreamer::{
    capture::{FrameBuffering, StreamCapture},
    error::StreamCaptureError,
};

/// A configuration object for capturing frames from a V4L2 camera.
#[derive(Debug, Clone)]
pub struct V4L2CameraConfig {
    /// The camera device path
    pub device: String,
    /// The desired image size
    pub size: Option<ImageSize>,
    /// The desired frames per second
    pub fps: u32,
    /// How frames are held until grabbed
    pub buffering: FrameBuffering,
    /// How long to wait for the first frame when opening
    pub open_timeout: Duration,
}

impl V4L2CameraConfig {
    /// Creates a new V4L2CameraConfig object with default values.
    ///
    /// Note: The default device is "/dev/video0", the default image size is None,
    /// the default fps is 30 and frames are queued like a regular capture.
    pub fn new() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            size: None,
            fps: 30,
            buffering: FrameBuffering::Queue(4),
            open_timeout: Duration::from_secs(3),
        }
    }

    /// Sets the camera device path based on the camera id.
    ///
    /// # Arguments
    ///
    /// * `camera_id` - The desired camera id
    pub fn with_camera_id(mut self, camera_id: u32) -> Self {
        self.device = format!("/dev/video{}", camera_id);
        self
    }

    /// Sets the image size.
    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the frames per second.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Sets how frames are held until grabbed.
    pub fn with_buffering(mut self, buffering: FrameBuffering) -> Self {
        self.buffering = buffering;
        self
    }

    /// Returns the GStreamer pipeline description for this camera.
    pub fn pipeline_description(&self) -> String {
        let video_resize = if let Some(size) = self.size {
            format!("! video/x-raw,width={},height={} ", size.width, size.height)
        } else {
            "".to_string()
        };

        let sink = match self.buffering {
            FrameBuffering::Latest => "appsink name=sink sync=false max-buffers=1 drop=true",
            FrameBuffering::Queue(_) => "appsink name=sink sync=false",
        };

        format!(
            "v4l2src device={} {}! videorate ! video/x-raw,framerate={}/1 ! videoconvert ! video/x-raw,format=RGB ! {}",
            self.device, video_resize, self.fps, sink
        )
    }

    /// Open the camera and wait for its first frame.
    pub fn open(self) -> Result<StreamCapture, StreamCaptureError> {
        if self.device.is_empty() {
            return Err(StreamCaptureError::InvalidConfig(
                "device is empty".to_string(),
            ));
        }

        let mut capture = StreamCapture::new(&self.pipeline_description(), self.buffering)?;
        capture.start()?;
        capture.wait_for_frame(self.open_timeout)?;
        Ok(capture)
    }
}

impl Default for V4L2CameraConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_pipeline_description() {
        let config = V4L2CameraConfig::new()
            .with_camera_id(2)
            .with_size([640, 480].into())
            .with_fps(25)
            .with_buffering(FrameBuffering::Latest);

        let desc = config.pipeline_description();
        assert!(desc.starts_with("v4l2src device=/dev/video2 ! video/x-raw,width=640,height=480 !"));
        assert!(desc.contains("framerate=25/1"));
        assert!(desc.ends_with("max-buffers=1 drop=true"));

        let buffered = config.with_buffering(FrameBuffering::Queue(2));
        assert!(buffered.pipeline_description().ends_with("appsink name=sink sync=false"));
    }
}
