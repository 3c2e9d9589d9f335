#![deny(missing_docs)]
//! Image types and traits for generating and manipulating images

/// image representation for computer vision purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

/// image casting operations.
pub mod ops;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};

/// An 8-bit RGB frame, the native frame type of the capture sources.
pub type Rgb8 = Image<u8, 3>;

/// An 8-bit single channel frame.
pub type Gray8 = Image<u8, 1>;
