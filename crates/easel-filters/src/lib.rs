//! Easel Filters
//!
//! Whole-image filters operating directly on raw RGBA buffers.
//!
//! Features:
//! - PixelBuffer with clamped byte storage
//! - NxN kernel convolution (edge, sharpen, blur and custom kernels)
//! - Per-pixel maps (grayscale, sepia, invert, threshold, brightness, ...)
//! - Named filter lists

pub mod buffer;
pub mod kernel;
pub mod convolve;
pub mod pixel;
pub mod filter;

pub use buffer::{PixelBuffer, clamp_channel};
pub use kernel::Kernel;
pub use convolve::{convolve, convolve_in_place, edge, sharpen, blur};
pub use pixel::{
    luma, grayscale, greyscale, sepia, invert, invert_grayscale, invert_greyscale,
    silhouette, threshold, inverted_threshold, brightness, darkness,
};
pub use filter::{Filter, FilterList};

/// Filter error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("Invalid data length: expected {expected}, got {actual}")]
    InvalidDataLength { expected: usize, actual: usize },

    #[error("Invalid kernel: {len} weights do not form an odd square matrix")]
    InvalidKernel { len: usize },

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
