//! Fonts
//!
//! Process-wide font library backed by fontdb, CSS font shorthand parsing,
//! advance-based text measurement and glyph outlines via ttf-parser.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, PoisonError, RwLock};

use fontdb::{Database, Family, ID, Query, Stretch, Weight};
use ttf_parser::{Face, OutlineBuilder};

use crate::{
    context::TextMetrics,
    path::Path2D,
    style::{TextAlign, TextBaseline},
    transforms::TransformMatrix,
    CanvasError, Result,
};

static FONT_LIBRARY: LazyLock<RwLock<FontLibrary>> = LazyLock::new(|| RwLock::new(FontLibrary::new()));

/// The process-wide font library
pub fn font_library() -> &'static RwLock<FontLibrary> {
    &FONT_LIBRARY
}

/// Register font files into the process-wide library.
///
/// With a `family`, the faces also answer to that name in font strings.
pub fn register_font<P: AsRef<Path>>(family: Option<&str>, paths: &[P]) -> Result<Vec<FontVariant>> {
    FONT_LIBRARY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(family, paths)
}

/// Font style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl From<FontStyle> for fontdb::Style {
    fn from(style: FontStyle) -> Self {
        match style {
            FontStyle::Normal => fontdb::Style::Normal,
            FontStyle::Italic => fontdb::Style::Italic,
            FontStyle::Oblique => fontdb::Style::Oblique,
        }
    }
}

impl From<fontdb::Style> for FontStyle {
    fn from(style: fontdb::Style) -> Self {
        match style {
            fontdb::Style::Normal => FontStyle::Normal,
            fontdb::Style::Italic => FontStyle::Italic,
            fontdb::Style::Oblique => FontStyle::Oblique,
        }
    }
}

/// A registered face
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontVariant {
    pub family: String,
    pub weight: u16,
    pub style: FontStyle,
    pub path: PathBuf,
}

/// Parsed CSS font shorthand: `[style] [weight] size[/line-height] family[, family]*`
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub style: FontStyle,
    pub weight: u16,
    /// Size in pixels
    pub size: f64,
    pub families: Vec<String>,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            style: FontStyle::Normal,
            weight: 400,
            size: 10.0,
            families: vec!["sans-serif".to_string()],
        }
    }
}

impl FontSpec {
    /// Parse a font string; anything unrecognized falls back to the defaults
    pub fn parse(font: &str) -> Self {
        let mut spec = Self::default();
        let mut tokens = font.split_whitespace();

        for token in tokens.by_ref() {
            let size = easel_text::parse_font_size(token);
            if size > 0.0 {
                spec.size = size;
                break;
            }
            match token.to_ascii_lowercase().as_str() {
                "italic" => spec.style = FontStyle::Italic,
                "oblique" => spec.style = FontStyle::Oblique,
                "bold" | "bolder" => spec.weight = 700,
                "lighter" => spec.weight = 300,
                other => {
                    if let Ok(weight) = other.parse::<u16>() {
                        spec.weight = weight.clamp(1, 1000);
                    }
                }
            }
        }

        let rest = tokens.collect::<Vec<_>>().join(" ");
        let families: Vec<String> = rest
            .split(',')
            .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if !families.is_empty() {
            spec.families = families;
        }
        spec
    }
}

/// Font database plus registered family aliases
pub struct FontLibrary {
    db: Database,
    /// Lowercase alias -> real family names
    aliases: HashMap<String, Vec<String>>,
    system_fonts_loaded: bool,
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FontLibrary {
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            aliases: HashMap::new(),
            system_fonts_loaded: false,
        }
    }

    /// Load the system fonts (once)
    pub fn load_system_fonts(&mut self) {
        if self.system_fonts_loaded {
            return;
        }
        self.db.load_system_fonts();
        self.system_fonts_loaded = true;
        tracing::info!(faces = self.db.len(), "system fonts loaded");
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.len() == 0
    }

    /// Known family names, including registered aliases
    pub fn families(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .db
            .faces()
            .filter_map(|face| face.families.first().map(|(name, _)| name.clone()))
            .chain(self.aliases.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn has_family(&self, family: &str) -> bool {
        let lower = family.to_lowercase();
        self.aliases.contains_key(&lower)
            || self
                .db
                .faces()
                .any(|face| face.families.iter().any(|(name, _)| name.to_lowercase() == lower))
    }

    /// Load font files; every file must contribute at least one face
    pub fn register<P: AsRef<Path>>(&mut self, family: Option<&str>, paths: &[P]) -> Result<Vec<FontVariant>> {
        let mut variants = Vec::new();

        for path in paths {
            let path = path.as_ref();
            let registration_error = |reason: String| CanvasError::FontRegistration {
                path: path.display().to_string(),
                reason,
            };

            let known: HashSet<ID> = self.db.faces().map(|face| face.id).collect();
            self.db
                .load_font_file(path)
                .map_err(|e| registration_error(e.to_string()))?;

            let added: Vec<FontVariant> = self
                .db
                .faces()
                .filter(|face| !known.contains(&face.id))
                .map(|face| FontVariant {
                    family: family
                        .map(str::to_string)
                        .or_else(|| face.families.first().map(|(name, _)| name.clone()))
                        .unwrap_or_default(),
                    weight: face.weight.0,
                    style: face.style.into(),
                    path: path.to_path_buf(),
                })
                .collect();

            if added.is_empty() {
                return Err(registration_error("no font faces found".to_string()));
            }

            if let Some(alias) = family {
                let real_names = self
                    .db
                    .faces()
                    .filter(|face| !known.contains(&face.id))
                    .filter_map(|face| face.families.first().map(|(name, _)| name.clone()));
                let entry = self.aliases.entry(alias.to_lowercase()).or_default();
                for name in real_names {
                    if !entry.contains(&name) {
                        entry.push(name);
                    }
                }
            }

            tracing::debug!(path = %path.display(), faces = added.len(), "font registered");
            variants.extend(added);
        }

        Ok(variants)
    }

    /// Best face for `spec`, falling back to any sans-serif and then any face
    pub fn query(&self, spec: &FontSpec) -> Option<ID> {
        if self.is_empty() {
            return None;
        }

        let mut names: Vec<&str> = Vec::new();
        for requested in &spec.families {
            match self.aliases.get(&requested.to_lowercase()) {
                Some(real) => names.extend(real.iter().map(String::as_str)),
                None => names.push(requested.as_str()),
            }
        }

        let mut families: Vec<Family<'_>> = names.iter().map(|name| generic_family(name)).collect();
        families.push(Family::SansSerif);

        self.db
            .query(&Query {
                families: &families,
                weight: Weight(spec.weight),
                stretch: Stretch::Normal,
                style: spec.style.into(),
            })
            .or_else(|| self.db.faces().next().map(|face| face.id))
    }

    /// Run `f` against the parsed face for `spec`
    fn with_face<R>(&self, spec: &FontSpec, f: impl FnOnce(&Face<'_>) -> R) -> Option<R> {
        let id = self.query(spec)?;
        self.db
            .with_face_data(id, |data, index| Face::parse(data, index).ok().map(|face| f(&face)))
            .flatten()
    }

    /// Measure `text` using glyph advances. Without a usable face the width
    /// is approximated as half the font size per character.
    pub fn measure(&self, spec: &FontSpec, text: &str) -> TextMetrics {
        self.with_face(spec, |face| {
            let scale = spec.size / face.units_per_em() as f64;
            let advance: f64 = text
                .chars()
                .map(|c| {
                    face.glyph_index(c)
                        .and_then(|glyph| face.glyph_hor_advance(glyph))
                        .unwrap_or(0) as f64
                })
                .sum();
            TextMetrics::from_extents(
                advance * scale,
                face.ascender() as f64 * scale,
                -(face.descender() as f64) * scale,
            )
        })
        .unwrap_or_else(|| approximate_metrics(spec, text))
    }

    /// Glyph outlines for `text` with its baseline origin at (`x`, `y`) in
    /// user space. `h_scale` squeezes the run horizontally around `x`.
    pub fn text_path(
        &self,
        spec: &FontSpec,
        text: &str,
        x: f64,
        y: f64,
        h_scale: f64,
        transform: TransformMatrix,
    ) -> Option<Path2D> {
        self.with_face(spec, |face| {
            let scale = spec.size / face.units_per_em() as f64;
            let mut path = Path2D::new();
            path.set_transform(transform);

            let mut pen = 0.0;
            for c in text.chars() {
                let Some(glyph) = face.glyph_index(c) else {
                    continue;
                };
                let mut builder = GlyphPathBuilder {
                    path: &mut path,
                    origin_x: x + pen * h_scale,
                    origin_y: y,
                    scale_x: scale * h_scale,
                    scale_y: scale,
                };
                face.outline_glyph(glyph, &mut builder);
                pen += face.glyph_hor_advance(glyph).unwrap_or(0) as f64 * scale;
            }
            path
        })
    }
}

fn generic_family(name: &str) -> Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => Family::Serif,
        "sans-serif" => Family::SansSerif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name),
    }
}

/// Metrics when no face is available
pub fn approximate_metrics(spec: &FontSpec, text: &str) -> TextMetrics {
    let width = text.chars().count() as f64 * spec.size * 0.5;
    TextMetrics::from_extents(width, spec.size * 0.8, spec.size * 0.2)
}

/// Baseline-left origin for text drawn at (`x`, `y`) with the given alignment
pub fn aligned_origin(
    metrics: &TextMetrics,
    align: TextAlign,
    baseline: TextBaseline,
    x: f64,
    y: f64,
) -> (f64, f64) {
    let ascent = metrics.font_bounding_box_ascent;
    let descent = metrics.font_bounding_box_descent;
    let dy = match baseline {
        TextBaseline::Top => ascent,
        TextBaseline::Hanging => ascent * 0.8,
        TextBaseline::Middle => (ascent - descent) / 2.0,
        TextBaseline::Alphabetic => 0.0,
        TextBaseline::Ideographic | TextBaseline::Bottom => -descent,
    };
    (x + metrics.width * align.offset_factor(), y + dy)
}

/// Feeds ttf-parser outlines into a `Path2D`, flipping the y axis
struct GlyphPathBuilder<'a> {
    path: &'a mut Path2D,
    origin_x: f64,
    origin_y: f64,
    scale_x: f64,
    scale_y: f64,
}

impl GlyphPathBuilder<'_> {
    fn tx(&self, x: f32) -> f64 {
        self.origin_x + x as f64 * self.scale_x
    }

    fn ty(&self, y: f32) -> f64 {
        self.origin_y - y as f64 * self.scale_y
    }
}

impl OutlineBuilder for GlyphPathBuilder<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.tx(x), self.ty(y));
        self.path.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.tx(x), self.ty(y));
        self.path.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1, x, y) = (self.tx(x1), self.ty(y1), self.tx(x), self.ty(y));
        self.path.quadratic_curve_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = (self.tx(x1), self.ty(y1));
        let (x2, y2) = (self.tx(x2), self.ty(y2));
        let (x, y) = (self.tx(x), self.ty(y));
        self.path.bezier_curve_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shorthand() {
        let spec = FontSpec::parse("italic bold 16px \"Open Sans\", serif");
        assert_eq!(spec.style, FontStyle::Italic);
        assert_eq!(spec.weight, 700);
        assert_eq!(spec.size, 16.0);
        assert_eq!(spec.families, vec!["Open Sans".to_string(), "serif".to_string()]);
    }

    #[test]
    fn test_parse_numeric_weight_and_line_height() {
        let spec = FontSpec::parse("300 12px/1.5 monospace");
        assert_eq!(spec.weight, 300);
        assert_eq!(spec.size, 12.0);
        assert_eq!(spec.families, vec!["monospace".to_string()]);
    }

    #[test]
    fn test_parse_garbage_uses_defaults() {
        assert_eq!(FontSpec::parse("nonsense"), FontSpec::default());
    }

    #[test]
    fn test_empty_library_approximates() {
        let library = FontLibrary::new();
        let spec = FontSpec::parse("20px sans-serif");
        let metrics = library.measure(&spec, "abcd");
        assert_eq!(metrics.width, 40.0);
        assert!(library.text_path(&spec, "abcd", 0.0, 0.0, 1.0, TransformMatrix::identity()).is_none());
    }

    #[test]
    fn test_aligned_origin() {
        let metrics = TextMetrics::from_extents(100.0, 8.0, 2.0);
        let origin = aligned_origin(&metrics, TextAlign::Center, TextBaseline::Top, 50.0, 0.0);
        assert_eq!(origin, (0.0, 8.0));
        let origin = aligned_origin(&metrics, TextAlign::Right, TextBaseline::Bottom, 100.0, 20.0);
        assert_eq!(origin, (0.0, 18.0));
    }

    #[test]
    fn test_register_missing_file() {
        let mut library = FontLibrary::new();
        let err = library.register(Some("Ghost"), &["/no/such/font.ttf"]).unwrap_err();
        assert!(matches!(err, CanvasError::FontRegistration { .. }));
        assert!(!library.has_family("Ghost"));
    }
}
