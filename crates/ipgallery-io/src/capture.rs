use std::path::{Path, PathBuf};

use ipgallery_image::Image;

use crate::{error::IoError, functional};

/// A source of RGB frames: a camera, a video file or a sequence of stills.
pub trait FrameSource {
    /// Grab the next frame.
    ///
    /// Returns `Ok(None)` once the stream has ended.
    fn grab(&mut self) -> Result<Option<Image<u8, 3>>, IoError>;

    /// The nominal frame rate of the source, if known.
    fn fps(&self) -> Option<f64> {
        None
    }

    /// A short human readable description used in logs.
    fn describe(&self) -> String;

    /// Release the underlying device or file.
    fn close(&mut self) -> Result<(), IoError> {
        Ok(())
    }
}

/// A single still image or a directory of stills served as frames.
///
/// Frames are returned in file name order. A looping sequence starts over
/// after the last image, otherwise the stream ends there.
///
/// # Example
///
/// ```no_run
/// use ipgallery_io::capture::{FrameSource, ImageSequence};
///
/// let mut source = ImageSequence::open("frames/").unwrap().with_looping(false);
/// while let Some(frame) = source.grab().unwrap() {
///     println!("{}", frame.size());
/// }
/// ```
#[derive(Debug)]
pub struct ImageSequence {
    root: PathBuf,
    paths: Vec<PathBuf>,
    index: usize,
    looping: bool,
    fps: f64,
    // decoded frame when there is a single still
    still: Option<Image<u8, 3>>,
}

impl ImageSequence {
    /// Default rate reported for image sequences.
    pub const DEFAULT_FPS: f64 = 25.0;

    /// Open a still image file or a directory holding still images.
    ///
    /// The returned sequence loops by default.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let root = path.as_ref().to_path_buf();
        if !root.exists() {
            return Err(IoError::FileDoesNotExist(root));
        }

        let paths = if root.is_dir() {
            let mut paths = std::fs::read_dir(&root)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && functional::is_image_file(p))
                .collect::<Vec<_>>();
            paths.sort();
            paths
        } else if functional::is_image_file(&root) {
            vec![root.clone()]
        } else {
            return Err(IoError::InvalidFileExtension(root));
        };

        if paths.is_empty() {
            return Err(IoError::EmptyImageSequence(root));
        }

        log::debug!("image sequence {} with {} frames", root.display(), paths.len());

        Ok(Self {
            root,
            paths,
            index: 0,
            looping: true,
            fps: Self::DEFAULT_FPS,
            still: None,
        })
    }

    /// Set whether the sequence restarts after the last image.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Set the frame rate reported by [`FrameSource::fps`].
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Number of images in the sequence.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if the sequence holds no images.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequence {
    fn grab(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
        if self.index >= self.paths.len() {
            if !self.looping {
                return Ok(None);
            }
            self.index = 0;
        }

        let frame = if self.paths.len() == 1 {
            if self.still.is_none() {
                self.still = Some(functional::read_image_any_rgb8(&self.paths[0])?);
            }
            self.still.clone()
        } else {
            Some(functional::read_image_any_rgb8(&self.paths[self.index])?)
        };

        self.index += 1;
        Ok(frame)
    }

    fn fps(&self) -> Option<f64> {
        Some(self.fps)
    }

    fn describe(&self) -> String {
        format!("image sequence {}", self.root.display())
    }
}

/// Open the first available frame source.
///
/// The video file is tried first when given: a still image or a directory
/// is served as an [`ImageSequence`], anything else is opened as a video
/// with the `gstreamer` feature. Otherwise the camera `camera_id` is used,
/// preferring the non-buffered stream that always yields the latest frame
/// and falling back to a buffered stream.
///
/// # Errors
///
/// Returns [`IoError::NoSourceAvailable`] if no source could be opened.
pub fn open_source(
    video_file: Option<&Path>,
    camera_id: u32,
) -> Result<Box<dyn FrameSource>, IoError> {
    if let Some(path) = video_file {
        match open_file(path) {
            Ok(source) => {
                log::info!("using {}", source.describe());
                return Ok(source);
            }
            Err(err) => log::warn!("cannot open {}: {err}", path.display()),
        }
    }

    match open_camera(camera_id) {
        Ok(source) => {
            log::info!("using {}", source.describe());
            Ok(source)
        }
        Err(err) => {
            log::warn!("cannot open camera {camera_id}: {err}");
            Err(IoError::NoSourceAvailable)
        }
    }
}

fn open_file(path: &Path) -> Result<Box<dyn FrameSource>, IoError> {
    if path.is_dir() || functional::is_image_file(path) {
        return Ok(Box::new(ImageSequence::open(path)?));
    }
    open_video(path)
}

#[cfg(feature = "gstreamer")]
fn open_video(path: &Path) -> Result<Box<dyn FrameSource>, IoError> {
    let mut capture = crate::gstreamer::VideoFileCapture::new(path)?;
    capture.start()?;
    Ok(Box::new(capture))
}

#[cfg(not(feature = "gstreamer"))]
fn open_video(path: &Path) -> Result<Box<dyn FrameSource>, IoError> {
    log::info!("video file capture requires the gstreamer feature");
    Err(IoError::InvalidFileExtension(path.to_path_buf()))
}

#[cfg(feature = "gstreamer")]
fn open_camera(camera_id: u32) -> Result<Box<dyn FrameSource>, IoError> {
    use crate::gstreamer::{FrameBuffering, V4L2CameraConfig};

    let config = V4L2CameraConfig::new().with_camera_id(camera_id);
    match config.clone().with_buffering(FrameBuffering::Latest).open() {
        Ok(camera) => Ok(Box::new(camera)),
        Err(err) => {
            log::info!("non-buffered camera stream unavailable ({err}), camera input may be buffered");
            Ok(Box::new(config.open()?))
        }
    }
}

#[cfg(not(feature = "gstreamer"))]
fn open_camera(_camera_id: u32) -> Result<Box<dyn FrameSource>, IoError> {
    log::info!("camera capture requires the gstreamer feature");
    Err(IoError::NoSourceAvailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functional::write_image_any_rgb8;

    fn write_frames(dir: &Path, values: &[u8]) -> Result<(), IoError> {
        for (i, &v) in values.iter().enumerate() {
            let image = Image::<u8, 3>::from_size_val([4, 3].into(), v)?;
            write_image_any_rgb8(dir.join(format!("frame_{i:03}.png")), &image)?;
        }
        Ok(())
    }

    #[test]
    fn sequence_in_name_order() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        write_frames(tmp_dir.path(), &[10, 20, 30])?;
        std::fs::write(tmp_dir.path().join("notes.txt"), b"ignored")?;

        let mut seq = ImageSequence::open(tmp_dir.path())?.with_looping(false);
        assert_eq!(seq.len(), 3);

        let mut firsts = Vec::new();
        while let Some(frame) = seq.grab()? {
            firsts.push(frame.as_slice()[0]);
        }
        assert_eq!(firsts, vec![10, 20, 30]);
        assert!(seq.grab()?.is_none());
        Ok(())
    }

    #[test]
    fn single_still_loops() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        write_frames(tmp_dir.path(), &[77])?;

        let mut seq = ImageSequence::open(tmp_dir.path().join("frame_000.png"))?;
        for _ in 0..3 {
            let frame = seq.grab()?;
            assert!(frame.is_some_and(|f| f.as_slice().iter().all(|&v| v == 77)));
        }
        assert_eq!(seq.fps(), Some(ImageSequence::DEFAULT_FPS));
        Ok(())
    }

    #[test]
    fn empty_directory_is_an_error() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        assert!(matches!(
            ImageSequence::open(tmp_dir.path()),
            Err(IoError::EmptyImageSequence(_))
        ));
        Ok(())
    }

    #[test]
    fn open_source_uses_file_first() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        write_frames(tmp_dir.path(), &[5, 6])?;

        let mut source = open_source(Some(tmp_dir.path()), 0)?;
        assert!(source.grab()?.is_some());
        source.close()?;
        Ok(())
    }
}
