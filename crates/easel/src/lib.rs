//! Easel
//!
//! Chainable 2D drawing on a pluggable backend, with text helpers and
//! whole-image pixel filters.
//!
//! # Example
//! ```rust,ignore
//! use easel::{Canvas, Color, EaselConfig};
//!
//! easel::init(&EaselConfig::default());
//! let mut canvas = Canvas::new(200, 100)?;
//! canvas
//!     .set_color(Color::rgb(30, 30, 30))
//!     .print_rectangle(0.0, 0.0, 200.0, 100.0)
//!     .set_color(Color::WHITE)
//!     .set_text_font("24px sans-serif")
//!     .print_text("hello", 10.0, 40.0);
//! let png = canvas.to_buffer()?;
//! ```

pub use easel_canvas::*;

// Re-export sub-crates for advanced usage
pub use easel_canvas as canvas;
pub use easel_filters as filters;
pub use easel_text as text;

pub use easel_text::{parse_font_size, wrap_lines, FontShorthand, TextMeasure};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the process backend. Returns the backend actually in use, which is
/// the first one installed if `init` already ran.
pub fn init(config: &EaselConfig) -> &'static dyn Backend {
    let mut config = config.clone();
    if cfg!(feature = "system-fonts") {
        config.load_system_fonts = true;
    }
    tracing::debug!(version = VERSION, backend = %config.backend, "initializing easel");
    backend::install(&config)
}

/// Install the backend described by `EASEL_*` environment variables
pub fn init_from_env() -> &'static dyn Backend {
    init(&EaselConfig::from_env())
}

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG`, defaulting to
/// `info`. Does nothing if a global subscriber is already set.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
