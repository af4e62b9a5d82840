//! Font shorthand manipulation

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::TextError;

static SHORTHAND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)(\d+(?:\.\d+)?)(.+)$").expect("font shorthand pattern is valid")
});

/// A CSS font shorthand split around its numeric size.
///
/// `"bold 16px Arial"` becomes prefix `"bold "`, size `16` and rest `"px Arial"`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontShorthand {
    pub prefix: String,
    pub size: f64,
    pub rest: String,
}

impl FontShorthand {
    /// Same font with a different numeric size, unit untouched
    pub fn with_size(&self, size: f64) -> Self {
        Self {
            prefix: self.prefix.clone(),
            size,
            rest: self.rest.clone(),
        }
    }
}

impl FromStr for FontShorthand {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = SHORTHAND_PATTERN
            .captures(s)
            .ok_or_else(|| TextError::InvalidFont(s.to_string()))?;
        let size = caps[2]
            .parse()
            .map_err(|_| TextError::InvalidFont(s.to_string()))?;
        Ok(Self {
            prefix: caps[1].to_string(),
            size,
            rest: caps[3].to_string(),
        })
    }
}

impl fmt::Display for FontShorthand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, self.size, self.rest)
    }
}

/// Replace the numeric size in `font`, keeping style words, unit and family.
///
/// A font string without a size collapses to the bare number.
pub fn with_font_size(font: &str, size: f64) -> String {
    match font.parse::<FontShorthand>() {
        Ok(shorthand) => shorthand.with_size(size).to_string(),
        Err(_) => size.to_string(),
    }
}

/// Font size that makes text measured at `measured` px fit into `max_width`.
///
/// Text that already fits keeps its size; wider text shrinks proportionally.
pub fn responsive_font_size(size: f64, measured: f64, max_width: f64) -> f64 {
    if max_width > measured {
        size
    } else {
        max_width / measured * size
    }
}
