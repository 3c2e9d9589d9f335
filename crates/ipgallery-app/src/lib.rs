#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Command line arguments common to every demo.
pub mod args;

/// Runtime key presses and trackbar commands read from stdin.
pub mod controls;

/// Image windows rendered through a rerun recording stream.
pub mod display;

/// Error types for the app module.
pub mod error;

/// The per-frame capture, process, display and key loop.
pub mod runner;

/// Named integer sliders adjusted at runtime.
pub mod trackbar;

pub use crate::error::AppError;
