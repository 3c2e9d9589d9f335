/// Camera configuration for V4L2 devices.
pub mod camera;

/// The appsink based capture pipeline.
pub mod capture;

/// Error types for the gstreamer module.
pub mod error;

/// Video file reading and writing.
pub mod video;

pub use crate::gstreamer::camera::V4L2CameraConfig;
pub use crate::gstreamer::capture::{FrameBuffering, StreamCapture};
pub use crate::gstreamer::error::StreamCaptureError;
pub use crate::gstreamer::video::{VideoFileCapture, VideoWriter};

/// The version of the GStreamer library in use, e.g. `GStreamer 1.24.2`.
pub fn gstreamer_version() -> Result<String, StreamCaptureError> {
    gst::init()?;
    Ok(gst::version_string().to_string())
}

/// Returns true if GStreamer provides an element with the given name.
pub fn has_element(name: &str) -> Result<bool, StreamCaptureError> {
    gst::init()?;
    Ok(gst::ElementFactory::find(name).is_some())
}
