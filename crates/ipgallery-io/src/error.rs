/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Invalid file extension.
    #[error("File does not have a valid extension: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// Error to open the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to decode the JPEG image.
    #[error("Error with Jpeg decoding. {0}")]
    JpegDecodingError(#[from] zune_jpeg::errors::DecodeErrors),

    /// Error to encode the JPEG image.
    #[error("Error with Jpeg encoding. {0}")]
    JpegEncodingError(#[from] jpeg_encoder::EncodingError),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] ipgallery_image::ImageError),

    /// Error to decode or encode the image with the image crate.
    #[error("Failed to decode the image. {0}")]
    ImageDecodeError(#[from] image::ImageError),

    /// The decoded image does not match the size of the destination.
    #[error("Decoded image size {0}x{1} does not match the destination {2}x{3}")]
    DecodeMismatchResolution(usize, usize, usize, usize),

    /// The image has dimensions the encoder cannot represent.
    #[error("Image of size {0}x{1} cannot be encoded")]
    UnsupportedImageSize(usize, usize),

    /// A directory was given as an image sequence but holds no images.
    #[error("No images found in: {0}")]
    EmptyImageSequence(std::path::PathBuf),

    /// Neither the video file nor the camera could be opened.
    #[error("No video file specified or camera connected.")]
    NoSourceAvailable,

    /// Error from a GStreamer capture or writer pipeline.
    #[cfg(feature = "gstreamer")]
    #[error(transparent)]
    StreamCaptureError(#[from] crate::gstreamer::StreamCaptureError),
}
