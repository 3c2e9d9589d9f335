//! Filter operations
//!
//! This module provides spatial smoothing and denoising filters.

/// Filter kernels
pub mod kernels;

/// Filter operations
mod ops;
pub use ops::*;

/// Separable filter operations
mod separable_filter;
pub use separable_filter::*;

/// Median filter
mod median;
pub use median::*;

/// Edge preserving filters
mod bilateral;
pub use bilateral::*;

/// Non-local means denoising
mod nlm;
pub use nlm::*;
