//! Drawing backends
//!
//! A backend creates drawing contexts and owns font registration. One is
//! installed per process at start-up; canvases created without an explicit
//! backend use it.

mod recording;
mod skia;

use std::{
    fmt,
    path::PathBuf,
    str::FromStr,
    sync::{OnceLock, PoisonError},
};

use serde::Deserialize;

pub use recording::{DisplayList, DrawCommand, RecordingBackend, RecordingContext};
pub use skia::{SkiaBackend, SkiaContext};

use crate::{
    config::EaselConfig,
    context::DrawingContext,
    fonts::{font_library, FontVariant},
    CanvasError, Result,
};

/// Available backend implementations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Skia,
    Recording,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skia => "skia",
            Self::Recording => "recording",
        }
    }

    /// Instantiate the backend with the configured default font
    pub fn create(self, config: &EaselConfig) -> Box<dyn Backend> {
        let font = config.default_font.clone();
        match self {
            Self::Skia => Box::new(SkiaBackend::with_default_font(font)),
            Self::Recording => Box::new(RecordingBackend::with_default_font(font)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skia" | "tiny-skia" => Ok(Self::Skia),
            "recording" | "headless" => Ok(Self::Recording),
            other => Err(CanvasError::UnknownKeyword {
                kind: "backend",
                value: other.to_string(),
            }),
        }
    }
}

/// A drawing backend
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// New context with a blank surface
    fn create_context(&self, width: u32, height: u32) -> Result<Box<dyn DrawingContext>>;

    /// Make font files available to contexts created by this backend
    fn register_font(&self, family: Option<&str>, paths: &[PathBuf]) -> Result<Vec<FontVariant>>;
}

static ACTIVE: OnceLock<Box<dyn Backend>> = OnceLock::new();

/// Install the process backend from `config`. Later calls keep the first
/// backend and return it.
pub fn install(config: &EaselConfig) -> &'static dyn Backend {
    if config.load_system_fonts {
        font_library()
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .load_system_fonts();
    }
    let backend = ACTIVE.get_or_init(|| {
        tracing::info!(backend = %config.backend, "installing drawing backend");
        config.backend.create(config)
    });
    if backend.kind() != config.backend {
        tracing::warn!(
            active = %backend.kind(),
            requested = %config.backend,
            "backend already installed"
        );
    }
    backend.as_ref()
}

/// The installed backend, installing the default one on first use
pub fn active() -> &'static dyn Backend {
    ACTIVE
        .get_or_init(|| {
            let config = EaselConfig::from_env();
            tracing::debug!(backend = %config.backend, "no backend installed, using environment");
            if config.load_system_fonts {
                font_library()
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .load_system_fonts();
            }
            config.backend.create(&config)
        })
        .as_ref()
}

/// Reject empty or oversized surfaces
pub(crate) fn check_surface(width: u32, height: u32) -> Result<()> {
    const MAX_SIDE: u32 = 1 << 15;
    if width == 0 || height == 0 || width > MAX_SIDE || height > MAX_SIDE {
        return Err(CanvasError::InvalidSurface { width, height });
    }
    Ok(())
}
