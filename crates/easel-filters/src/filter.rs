//! Named filters

use std::str::FromStr;

use crate::{convolve, pixel, FilterError, Kernel, PixelBuffer};

/// A whole-image filter
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Grayscale,
    Sepia,
    Invert,
    InvertGrayscale,
    Silhouette,
    /// Binarize: white at or above the luma threshold
    Threshold(f64),
    /// Binarize: black at or above the luma threshold
    InvertedThreshold(f64),
    Brightness(f64),
    Darkness(f64),
    Edge,
    /// Sharpen with the given number of passes
    Sharpen(u32),
    /// Box blur with the given number of passes
    Blur(u32),
    Convolve {
        kernel: Kernel,
        preserve_transparency: bool,
    },
}

impl Filter {
    /// Apply to `buffer` in place
    pub fn apply(&self, buffer: &mut PixelBuffer) {
        match self {
            Self::Grayscale => pixel::grayscale(buffer),
            Self::Sepia => pixel::sepia(buffer),
            Self::Invert => pixel::invert(buffer),
            Self::InvertGrayscale => pixel::invert_grayscale(buffer),
            Self::Silhouette => pixel::silhouette(buffer),
            Self::Threshold(v) => pixel::threshold(buffer, *v),
            Self::InvertedThreshold(v) => pixel::inverted_threshold(buffer, *v),
            Self::Brightness(d) => pixel::brightness(buffer, *d),
            Self::Darkness(d) => pixel::darkness(buffer, *d),
            Self::Edge => convolve::edge(buffer),
            Self::Sharpen(n) => convolve::sharpen(buffer, *n),
            Self::Blur(n) => convolve::blur(buffer, *n),
            Self::Convolve { kernel, preserve_transparency } => {
                convolve::convolve_in_place(buffer, kernel, *preserve_transparency)
            }
        }
    }

    /// Filter name as accepted by `FromStr`
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Invert => "invert",
            Self::InvertGrayscale => "invert-grayscale",
            Self::Silhouette => "silhouette",
            Self::Threshold(_) => "threshold",
            Self::InvertedThreshold(_) => "inverted-threshold",
            Self::Brightness(_) => "brightness",
            Self::Darkness(_) => "darkness",
            Self::Edge => "edge",
            Self::Sharpen(_) => "sharpen",
            Self::Blur(_) => "blur",
            Self::Convolve { .. } => "convolve",
        }
    }
}

impl FromStr for Filter {
    type Err = FilterError;

    /// Parse a parameterless filter name; sharpen and blur get a single pass
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "grayscale" | "greyscale" => Self::Grayscale,
            "sepia" => Self::Sepia,
            "invert" => Self::Invert,
            "invert-grayscale" | "invert-greyscale" => Self::InvertGrayscale,
            "silhouette" => Self::Silhouette,
            "edge" => Self::Edge,
            "sharpen" => Self::Sharpen(1),
            "blur" => Self::Blur(1),
            _ => return Err(FilterError::UnknownFilter(s.to_string())),
        })
    }
}

/// Filters applied in order
#[derive(Debug, Clone, Default)]
pub struct FilterList {
    pub filters: Vec<Filter>,
}

impl FilterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn apply(&self, buffer: &mut PixelBuffer) {
        for filter in &self.filters {
            tracing::trace!(filter = filter.name(), "applying filter");
            filter.apply(buffer);
        }
    }
}
