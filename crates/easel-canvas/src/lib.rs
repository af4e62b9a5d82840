//! Easel Canvas
//!
//! A chainable 2D drawing facade over interchangeable drawing backends.
//!
//! Features:
//! - `Canvas` facade with chained drawing, text and filter methods
//! - `DrawingContext` trait exposing the standard 2D-canvas primitives
//! - tiny-skia raster backend and a headless recording backend
//! - Path2D, transforms and compositing
//! - Async image loading and PNG / data URL export
//! - Font registration backed by fontdb

pub mod color;
pub mod style;
pub mod transforms;
pub mod path;
pub mod compositing;
pub mod state;
pub mod context;
pub mod bitmap;
pub mod fonts;
pub mod backend;
pub mod config;
pub mod canvas;

pub use color::{Color, parse_css_color, hex, rgb, rgba, hsl, hsla, color, filter};
pub use style::{
    Paint, Gradient, GradientType, ColorStop, Pattern, PatternRepetition, PatternQuality,
    TextDrawingMode, LineCap, LineJoin, TextAlign, TextBaseline, FillRule,
};
pub use transforms::TransformMatrix;
pub use path::{Path2D, PathCommand};
pub use compositing::{CompositeOperation, blend_colors};
pub use state::{CanvasState, ClipRegion, StateStack};
pub use context::{DrawingContext, TextMetrics, Rect};
pub use bitmap::{Image, ImageSource, resolve_image, encode_png, to_data_url};
pub use fonts::{FontLibrary, FontVariant, FontSpec, FontStyle, register_font};
pub use backend::{Backend, BackendKind, SkiaBackend, SkiaContext, RecordingBackend, RecordingContext, DrawCommand, DisplayList};
pub use config::EaselConfig;
pub use canvas::{Canvas, ImageFit, CircularCoordinates, BorderRadius, RoundedRadius};

pub use easel_filters::{Filter, FilterList, Kernel, PixelBuffer};

/// Canvas error
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSurface { width: u32, height: u32 },

    #[error("`{feature}` is not supported by the {backend} backend")]
    NotSupported {
        backend: &'static str,
        feature: &'static str,
    },

    #[error("Unknown {kind}: `{value}`")]
    UnknownKeyword { kind: &'static str, value: String },

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Failed to load the image \"{source_id}\": {reason}")]
    ImageLoad { source_id: String, reason: String },

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Failed to register font {path}: {reason}")]
    FontRegistration { path: String, reason: String },

    #[error(transparent)]
    Filter(#[from] easel_filters::FilterError),
}

pub type Result<T> = std::result::Result<T, CanvasError>;
