//! Easel Text - Text Measurement Helpers
//!
//! This crate provides the backend-independent text pieces of Easel:
//! - CSS font-size parsing into pixels (memoized)
//! - Font shorthand manipulation (size replacement, responsive sizing)
//! - Greedy word wrapping driven by a measured-width capability

pub mod units;
pub mod font;
pub mod wrap;

pub use units::{parse_font_size, clear_font_size_cache, FontSizeCache, FontUnit};
pub use font::{FontShorthand, with_font_size, responsive_font_size};
pub use wrap::{TextMeasure, wrap_lines, wrap_text, multiline_positions};

/// Text error types
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("Invalid font shorthand: {0}")]
    InvalidFont(String),
}

pub type Result<T> = std::result::Result<T, TextError>;
