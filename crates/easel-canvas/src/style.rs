//! Fill and stroke styles
//!
//! Paints, gradients, patterns and the enumerated line/text settings.

use std::str::FromStr;

use crate::{bitmap::Image, color::Color, CanvasError};

/// Anything a shape can be filled or stroked with
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Color(Color),
    Gradient(Gradient),
    Pattern(Pattern),
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Color(Color::BLACK)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Color(color)
    }
}

impl From<Gradient> for Paint {
    fn from(gradient: Gradient) -> Self {
        Paint::Gradient(gradient)
    }
}

impl From<Pattern> for Paint {
    fn from(pattern: Pattern) -> Self {
        Paint::Pattern(pattern)
    }
}

/// Gradient geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientType {
    Linear { x0: f64, y0: f64, x1: f64, y1: f64 },
    Radial { x0: f64, y0: f64, r0: f64, x1: f64, y1: f64, r1: f64 },
}

/// Gradient color stop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Color,
}

/// Linear or radial gradient
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub kind: GradientType,
    pub stops: Vec<ColorStop>,
}

impl Gradient {
    pub fn linear(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            kind: GradientType::Linear { x0, y0, x1, y1 },
            stops: Vec::new(),
        }
    }

    pub fn radial(x0: f64, y0: f64, r0: f64, x1: f64, y1: f64, r1: f64) -> Self {
        Self {
            kind: GradientType::Radial { x0, y0, r0, x1, y1, r1 },
            stops: Vec::new(),
        }
    }

    /// Add a stop; the offset is clamped to 0..=1 and stops stay sorted
    pub fn add_color_stop(&mut self, offset: f64, color: Color) {
        let offset = offset.clamp(0.0, 1.0);
        let at = self.stops.partition_point(|stop| stop.offset <= offset);
        self.stops.insert(at, ColorStop { offset, color });
    }

    pub fn with_stops(mut self, stops: impl IntoIterator<Item = (f64, Color)>) -> Self {
        for (offset, color) in stops {
            self.add_color_stop(offset, color);
        }
        self
    }
}

/// How a pattern repeats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatternRepetition {
    #[default]
    Repeat,
    RepeatX,
    RepeatY,
    NoRepeat,
}

impl FromStr for PatternRepetition {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "repeat" | "" => Ok(Self::Repeat),
            "repeat-x" => Ok(Self::RepeatX),
            "repeat-y" => Ok(Self::RepeatY),
            "no-repeat" => Ok(Self::NoRepeat),
            other => Err(CanvasError::UnknownKeyword {
                kind: "pattern repetition",
                value: other.to_string(),
            }),
        }
    }
}

/// Image pattern
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub image: Image,
    pub repetition: PatternRepetition,
}

impl Pattern {
    pub fn new(image: Image, repetition: PatternRepetition) -> Self {
        Self { image, repetition }
    }
}

/// Image sampling quality for patterns and drawn images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatternQuality {
    Fast,
    #[default]
    Good,
    Best,
    Nearest,
    Bilinear,
}

/// Whether text is drawn as outlines or glyphs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextDrawingMode {
    #[default]
    Path,
    Glyph,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Start,
    End,
    Left,
    Right,
    Center,
}

impl TextAlign {
    /// Horizontal offset factor applied to the measured width (left-to-right)
    pub fn offset_factor(self) -> f64 {
        match self {
            Self::Start | Self::Left => 0.0,
            Self::Center => -0.5,
            Self::End | Self::Right => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Hanging,
    Middle,
    #[default]
    Alphabetic,
    Ideographic,
    Bottom,
}

/// Winding rule used by fill, clip and hit tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_stops_sorted_and_clamped() {
        let mut gradient = Gradient::linear(0.0, 0.0, 10.0, 0.0);
        gradient.add_color_stop(0.8, Color::WHITE);
        gradient.add_color_stop(-1.0, Color::BLACK);
        gradient.add_color_stop(0.5, Color::rgb(255, 0, 0));

        let offsets: Vec<f64> = gradient.stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 0.8]);
    }

    #[test]
    fn test_repetition_parse() {
        assert_eq!("no-repeat".parse::<PatternRepetition>().unwrap(), PatternRepetition::NoRepeat);
        assert_eq!("".parse::<PatternRepetition>().unwrap(), PatternRepetition::Repeat);
        assert!(matches!(
            "tile".parse::<PatternRepetition>(),
            Err(CanvasError::UnknownKeyword { kind: "pattern repetition", .. })
        ));
    }
}
