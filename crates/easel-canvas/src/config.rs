//! Easel Configuration

use serde::Deserialize;

use crate::backend::BackendKind;

/// Process-wide canvas settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EaselConfig {
    /// Backend installed at start-up
    pub backend: BackendKind,

    /// Load the system fonts into the font library
    pub load_system_fonts: bool,

    /// Font new contexts start with
    pub default_font: String,
}

impl Default for EaselConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Skia,
            load_system_fonts: false,
            default_font: "10px sans-serif".to_string(),
        }
    }
}

impl EaselConfig {
    /// Defaults overridden by `EASEL_BACKEND`, `EASEL_SYSTEM_FONTS` and
    /// `EASEL_DEFAULT_FONT`. Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an explicit variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup("EASEL_BACKEND") {
            match value.parse() {
                Ok(kind) => config.backend = kind,
                Err(e) => tracing::warn!(%value, error = %e, "ignoring EASEL_BACKEND"),
            }
        }

        if let Some(value) = lookup("EASEL_SYSTEM_FONTS") {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.load_system_fonts = true,
                "0" | "false" | "no" | "off" => config.load_system_fonts = false,
                _ => tracing::warn!(%value, "ignoring EASEL_SYSTEM_FONTS"),
            }
        }

        if let Some(value) = lookup("EASEL_DEFAULT_FONT") {
            if !value.trim().is_empty() {
                config.default_font = value;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EaselConfig::default();
        assert_eq!(config.backend, BackendKind::Skia);
        assert!(!config.load_system_fonts);
        assert_eq!(config.default_font, "10px sans-serif");
    }

    #[test]
    fn test_lookup_overrides() {
        let config = EaselConfig::from_lookup(|key| match key {
            "EASEL_BACKEND" => Some("recording".into()),
            "EASEL_SYSTEM_FONTS" => Some("TRUE".into()),
            "EASEL_DEFAULT_FONT" => Some("bold 14px serif".into()),
            _ => None,
        });
        assert_eq!(config.backend, BackendKind::Recording);
        assert!(config.load_system_fonts);
        assert_eq!(config.default_font, "bold 14px serif");
    }

    #[test]
    fn test_bad_values_ignored() {
        let config = EaselConfig::from_lookup(|key| match key {
            "EASEL_BACKEND" => Some("cairo".into()),
            "EASEL_SYSTEM_FONTS" => Some("maybe".into()),
            _ => None,
        });
        assert_eq!(config, EaselConfig::default());
    }
}
