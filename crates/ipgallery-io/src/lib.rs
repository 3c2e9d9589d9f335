#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`IoError`] variants for file access, encoding/decoding failures
/// and capture sources.
pub mod error;

/// Frame rate counter for video processing.
pub mod fps_counter;

/// High-level image reading and writing functions.
///
/// See [`functional::read_image_any_rgb8`] for automatic format detection.
pub mod functional;

/// JPEG image encoding and decoding.
///
/// Pure Rust JPEG codec for reading and writing JPEG images, on disk and in memory.
pub mod jpeg;

/// Frame sources: still image sequences and, with the `gstreamer` feature,
/// cameras and video files.
pub mod capture;

/// GStreamer video I/O (feature-gated).
///
/// Camera and video file capture plus MJPEG/AVI writing.
/// Requires the `gstreamer` feature flag and system GStreamer libraries.
#[cfg(feature = "gstreamer")]
pub mod gstreamer;

pub use crate::error::IoError;
