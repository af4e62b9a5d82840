//! Font-size units
//!
//! Resolves CSS font sizes ("16px", "1.2em", "12pt", ...) to pixels at 96 px/in.
//! Results are memoized per input string for the lifetime of the process.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use regex::Regex;

static FONT_SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([\d.]+)(px|pt|pc|in|cm|mm|%|em|ex|ch|rem|q)")
        .expect("font size pattern is valid")
});

static GLOBAL_CACHE: LazyLock<FontSizeCache> = LazyLock::new(FontSizeCache::new);

/// CSS length unit accepted in font sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontUnit {
    Px,
    Pt,
    Pc,
    In,
    Cm,
    Mm,
    Percent,
    Em,
    Ex,
    Ch,
    Rem,
    Q,
}

impl FontUnit {
    /// Parse a lower-case unit suffix. Other spellings are unknown units.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "px" => Self::Px,
            "pt" => Self::Pt,
            "pc" => Self::Pc,
            "in" => Self::In,
            "cm" => Self::Cm,
            "mm" => Self::Mm,
            "%" => Self::Percent,
            "em" => Self::Em,
            "ex" => Self::Ex,
            "ch" => Self::Ch,
            "rem" => Self::Rem,
            "q" => Self::Q,
            _ => return None,
        })
    }

    /// Convert a magnitude in this unit to pixels.
    ///
    /// `%`, `ex` and `ch` have no fixed pixel ratio and pass through unchanged.
    pub fn to_px(self, value: f64) -> f64 {
        match self {
            Self::Pt => value / 0.75,
            Self::Pc => value * 16.0,
            Self::In => value * 96.0,
            Self::Cm => value * 96.0 / 2.54,
            Self::Mm => value * 96.0 / 25.4,
            Self::Em | Self::Rem => value * 16.0 / 0.75,
            Self::Q => value * 96.0 / 25.4 / 4.0,
            Self::Px | Self::Percent | Self::Ex | Self::Ch => value,
        }
    }
}

/// Memo table from font-size strings to resolved pixel values
#[derive(Debug, Default)]
pub struct FontSizeCache {
    entries: RwLock<HashMap<String, f64>>,
}

impl FontSizeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `font` to pixels, consulting the memo first.
    ///
    /// Strings without a recognizable size resolve to 0 and are not memoized.
    pub fn resolve(&self, font: &str) -> f64 {
        if let Some(px) = self.entries.read().ok().and_then(|map| map.get(font).copied()) {
            return px;
        }

        let Some(px) = parse_uncached(font) else {
            tracing::trace!(font, "no font size found");
            return 0.0;
        };

        if let Ok(mut map) = self.entries.write() {
            map.insert(font.to_string(), px);
        }
        px
    }

    /// Whether `font` has a memoized value
    pub fn contains(&self, font: &str) -> bool {
        self.entries.read().map(|map| map.contains_key(font)).unwrap_or(false)
    }

    /// Number of memoized entries
    pub fn len(&self) -> usize {
        self.entries.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every memoized entry
    pub fn clear(&self) {
        if let Ok(mut map) = self.entries.write() {
            map.clear();
        }
    }
}

fn parse_uncached(font: &str) -> Option<f64> {
    let caps = FONT_SIZE_PATTERN.captures(font)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    // a unit matched only case-insensitively keeps its raw magnitude
    match FontUnit::parse(caps.get(2)?.as_str()) {
        Some(unit) => Some(unit.to_px(value)),
        None => Some(value),
    }
}

/// Parse a font-size (or full font shorthand) into pixels using the process-wide memo
pub fn parse_font_size(font: &str) -> f64 {
    GLOBAL_CACHE.resolve(font)
}

/// Reset the process-wide font-size memo
pub fn clear_font_size_cache() {
    GLOBAL_CACHE.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_absolute_units() {
        let cache = FontSizeCache::new();
        assert_eq!(cache.resolve("16px"), 16.0);
        assert_eq!(cache.resolve("1in"), 96.0);
        assert_eq!(cache.resolve("2pc"), 32.0);
        assert!(approx(cache.resolve("12pt"), 16.0));
        assert!(approx(cache.resolve("2.54cm"), 96.0));
        assert!(approx(cache.resolve("25.4mm"), 96.0));
        assert!(approx(cache.resolve("4q"), 96.0 / 25.4));
    }

    #[test]
    fn test_relative_units() {
        let cache = FontSizeCache::new();
        assert!(approx(cache.resolve("1em"), 16.0 / 0.75));
        assert!(approx(cache.resolve("1rem"), 16.0 / 0.75));
        assert_eq!(cache.resolve("50%"), 50.0);
        assert_eq!(cache.resolve("3ex"), 3.0);
        assert_eq!(cache.resolve("3ch"), 3.0);
    }

    #[test]
    fn test_shorthand() {
        let cache = FontSizeCache::new();
        assert_eq!(cache.resolve("bold 24px Arial"), 24.0);
        assert!(approx(cache.resolve("12pt serif"), 16.0));
    }

    #[test]
    fn test_upper_case_units_pass_through() {
        let cache = FontSizeCache::new();
        assert_eq!(cache.resolve("12PT serif"), 12.0);
        assert_eq!(cache.resolve("1IN"), 1.0);
        assert_eq!(FontUnit::parse("Px"), None);
    }

    #[test]
    fn test_garbage() {
        let cache = FontSizeCache::new();
        assert_eq!(cache.resolve("garbage"), 0.0);
        assert_eq!(cache.resolve(""), 0.0);
        assert_eq!(cache.resolve("1.2.3px"), 0.0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_memoized() {
        let cache = FontSizeCache::new();
        let first = cache.resolve("1.5em");
        assert!(cache.contains("1.5em"));
        assert_eq!(cache.resolve("1.5em"), first);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(!cache.contains("1.5em"));
        assert_eq!(cache.resolve("1.5em"), first);
    }
}
