/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the image size is not valid.
    #[error("Invalid image size ({0}, {1}) mismatch ({2}, {3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the image holds no pixel data.
    #[error("Image data is not initialized")]
    ImageDataNotInitialized,

    /// Error when the pixel index is out of bounds.
    #[error("Pixel index ({0}, {1}) out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index {0} out of bounds ({1})")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when the cast operation fails.
    #[error("Failed to cast image data to {0}")]
    CastError(String),

    /// Error when the number of histogram bins is not valid.
    #[error("Invalid histogram bins {0}")]
    InvalidHistogramBins(usize),

    /// Error when the kernel size is not valid.
    #[error("Invalid kernel size {0}: {1}")]
    InvalidKernelSize(usize, String),

    /// Error when a processing parameter is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error raised by the resize backend.
    #[error("Failed to resize the image: {0}")]
    ResizeError(String),
}
