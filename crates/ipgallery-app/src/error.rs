/// An error type for the app module.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// An image operation failed.
    #[error(transparent)]
    ImageError(#[from] ipgallery_image::ImageError),

    /// Reading, writing or capturing failed.
    #[error(transparent)]
    IoError(#[from] ipgallery_io::IoError),

    /// Logging to the rerun viewer failed.
    #[error(transparent)]
    RecordingError(#[from] rerun::RecordingStreamError),

    /// The Ctrl-C handler could not be installed.
    #[error(transparent)]
    SignalError(#[from] ctrlc::Error),

    /// A trackbar with this name does not exist.
    #[error("Unknown trackbar: {0}")]
    UnknownTrackbar(String),

    /// A command line or runtime argument could not be parsed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
