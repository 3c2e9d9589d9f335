#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// image basic operations module.
pub mod core;

/// discrete cosine transform module.
pub mod dct;

/// utilities to draw on images.
pub mod draw;

/// image filtering module.
pub mod filter;

/// discrete fourier transform module.
pub mod fourier;

/// frequency domain filters module.
pub mod frequency;

/// compute image histogram module.
pub mod histogram;

/// operations to normalize images.
pub mod normalize;

/// module containing parallization utilities.
pub mod parallel;

/// intensity point transforms module.
pub mod point;

/// utility functions for resizing images.
pub mod resize;

/// template matching module.
pub mod template;

/// operations to threshold images.
pub mod threshold;
