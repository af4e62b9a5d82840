//! Compositing Operations
//!
//! Global composite operations and a software implementation used by
//! backends that composite on a plain pixel buffer.

use std::str::FromStr;

use crate::CanvasError;

/// Composite operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompositeOperation {
    #[default]
    SourceOver,
    SourceIn,
    SourceOut,
    SourceAtop,
    DestinationOver,
    DestinationIn,
    DestinationOut,
    DestinationAtop,
    Lighter,
    Copy,
    Xor,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl FromStr for CompositeOperation {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "source-over" => Self::SourceOver,
            "source-in" => Self::SourceIn,
            "source-out" => Self::SourceOut,
            "source-atop" => Self::SourceAtop,
            "destination-over" => Self::DestinationOver,
            "destination-in" => Self::DestinationIn,
            "destination-out" => Self::DestinationOut,
            "destination-atop" => Self::DestinationAtop,
            "lighter" => Self::Lighter,
            "copy" => Self::Copy,
            "xor" => Self::Xor,
            "multiply" => Self::Multiply,
            "screen" => Self::Screen,
            "overlay" => Self::Overlay,
            "darken" => Self::Darken,
            "lighten" => Self::Lighten,
            "color-dodge" => Self::ColorDodge,
            "color-burn" => Self::ColorBurn,
            "hard-light" => Self::HardLight,
            "soft-light" => Self::SoftLight,
            "difference" => Self::Difference,
            "exclusion" => Self::Exclusion,
            "hue" => Self::Hue,
            "saturation" => Self::Saturation,
            "color" => Self::Color,
            "luminosity" => Self::Luminosity,
            other => {
                return Err(CanvasError::UnknownKeyword {
                    kind: "composite operation",
                    value: other.to_string(),
                })
            }
        })
    }
}

impl CompositeOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SourceOver => "source-over",
            Self::SourceIn => "source-in",
            Self::SourceOut => "source-out",
            Self::SourceAtop => "source-atop",
            Self::DestinationOver => "destination-over",
            Self::DestinationIn => "destination-in",
            Self::DestinationOut => "destination-out",
            Self::DestinationAtop => "destination-atop",
            Self::Lighter => "lighter",
            Self::Copy => "copy",
            Self::Xor => "xor",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::ColorDodge => "color-dodge",
            Self::ColorBurn => "color-burn",
            Self::HardLight => "hard-light",
            Self::SoftLight => "soft-light",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Color => "color",
            Self::Luminosity => "luminosity",
        }
    }

    /// Porter-Duff factors `(Fa, Fb)`; `None` for blend modes, which composite source-over
    fn porter_duff(self, sa: f64, da: f64) -> Option<(f64, f64)> {
        Some(match self {
            Self::SourceOver => (1.0, 1.0 - sa),
            Self::SourceIn => (da, 0.0),
            Self::SourceOut => (1.0 - da, 0.0),
            Self::SourceAtop => (da, 1.0 - sa),
            Self::DestinationOver => (1.0 - da, 1.0),
            Self::DestinationIn => (0.0, sa),
            Self::DestinationOut => (0.0, 1.0 - sa),
            Self::DestinationAtop => (1.0 - da, sa),
            Self::Lighter => (1.0, 1.0),
            Self::Copy => (1.0, 0.0),
            Self::Xor => (1.0 - da, 1.0 - sa),
            _ => return None,
        })
    }
}

/// Composite a non-premultiplied source pixel onto a destination pixel
pub fn blend_colors(src: [u8; 4], dst: [u8; 4], op: CompositeOperation) -> [u8; 4] {
    let unit = |v: u8| v as f64 / 255.0;
    let cs = [unit(src[0]), unit(src[1]), unit(src[2])];
    let cb = [unit(dst[0]), unit(dst[1]), unit(dst[2])];
    let (sa, da) = (unit(src[3]), unit(dst[3]));

    let (premultiplied, alpha) = match op.porter_duff(sa, da) {
        Some((fa, fb)) => {
            let alpha = sa * fa + da * fb;
            let co = [0, 1, 2].map(|i| sa * fa * cs[i] + da * fb * cb[i]);
            (co, alpha)
        }
        None => {
            let mixed = blend(op, cb, cs);
            let alpha = sa + da * (1.0 - sa);
            let co = [0, 1, 2].map(|i| {
                let source = (1.0 - da) * cs[i] + da * mixed[i];
                sa * source + da * cb[i] * (1.0 - sa)
            });
            (co, alpha)
        }
    };

    let alpha = alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return [0, 0, 0, 0];
    }
    let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [
        byte(premultiplied[0] / alpha),
        byte(premultiplied[1] / alpha),
        byte(premultiplied[2] / alpha),
        byte(alpha),
    ]
}

/// Blend function `B(Cb, Cs)` for the blend modes
fn blend(op: CompositeOperation, cb: [f64; 3], cs: [f64; 3]) -> [f64; 3] {
    use CompositeOperation as Op;
    match op {
        Op::Hue => set_lum(set_sat(cs, sat(cb)), lum(cb)),
        Op::Saturation => set_lum(set_sat(cb, sat(cs)), lum(cb)),
        Op::Color => set_lum(cs, lum(cb)),
        Op::Luminosity => set_lum(cb, lum(cs)),
        _ => [0, 1, 2].map(|i| blend_channel(op, cb[i], cs[i])),
    }
}

fn blend_channel(op: CompositeOperation, cb: f64, cs: f64) -> f64 {
    use CompositeOperation as Op;
    match op {
        Op::Multiply => cb * cs,
        Op::Screen => cb + cs - cb * cs,
        Op::Overlay => blend_channel(Op::HardLight, cs, cb),
        Op::Darken => cb.min(cs),
        Op::Lighten => cb.max(cs),
        Op::ColorDodge => {
            if cb == 0.0 {
                0.0
            } else if cs >= 1.0 {
                1.0
            } else {
                (cb / (1.0 - cs)).min(1.0)
            }
        }
        Op::ColorBurn => {
            if cb >= 1.0 {
                1.0
            } else if cs <= 0.0 {
                0.0
            } else {
                1.0 - ((1.0 - cb) / cs).min(1.0)
            }
        }
        Op::HardLight => {
            if cs <= 0.5 {
                cb * 2.0 * cs
            } else {
                let s = 2.0 * cs - 1.0;
                cb + s - cb * s
            }
        }
        Op::SoftLight => {
            if cs <= 0.5 {
                cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
            } else {
                let d = if cb <= 0.25 {
                    ((16.0 * cb - 12.0) * cb + 4.0) * cb
                } else {
                    cb.sqrt()
                };
                cb + (2.0 * cs - 1.0) * (d - cb)
            }
        }
        Op::Difference => (cb - cs).abs(),
        Op::Exclusion => cb + cs - 2.0 * cb * cs,
        _ => cs,
    }
}

fn lum(c: [f64; 3]) -> f64 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: [f64; 3]) -> [f64; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    c.map(|v| {
        let mut v = v;
        if n < 0.0 {
            v = l + (v - l) * l / (l - n);
        }
        if x > 1.0 {
            v = l + (v - l) * (1.0 - l) / (x - l);
        }
        v
    })
}

fn set_lum(c: [f64; 3], l: f64) -> [f64; 3] {
    let d = l - lum(c);
    clip_color(c.map(|v| v + d))
}

fn sat(c: [f64; 3]) -> f64 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

fn set_sat(c: [f64; 3], s: f64) -> [f64; 3] {
    let max = c[0].max(c[1]).max(c[2]);
    let min = c[0].min(c[1]).min(c[2]);
    if max - min <= 0.0 {
        return [0.0; 3];
    }
    c.map(|v| (v - min) * s / (max - min))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("source-over".parse::<CompositeOperation>().unwrap(), CompositeOperation::SourceOver);
        assert_eq!("difference".parse::<CompositeOperation>().unwrap(), CompositeOperation::Difference);
        let err = "plus-lighter".parse::<CompositeOperation>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown composite operation: `plus-lighter`");
        assert_eq!(CompositeOperation::ColorDodge.as_str(), "color-dodge");
    }

    #[test]
    fn test_source_over() {
        let out = blend_colors([255, 0, 0, 255], [0, 0, 255, 255], CompositeOperation::SourceOver);
        assert_eq!(out, [255, 0, 0, 255]);
        let half = blend_colors([255, 255, 255, 128], [0, 0, 0, 255], CompositeOperation::SourceOver);
        assert_eq!(half, [128, 128, 128, 255]);
    }

    #[test]
    fn test_difference_with_white_inverts() {
        let out = blend_colors([255, 255, 255, 255], [10, 200, 60, 255], CompositeOperation::Difference);
        assert_eq!(out, [245, 55, 195, 255]);
    }

    #[test]
    fn test_destination_out_erases() {
        let out = blend_colors([0, 0, 0, 255], [90, 90, 90, 255], CompositeOperation::DestinationOut);
        assert_eq!(out, [0, 0, 0, 0]);
    }

    #[test]
    fn test_multiply() {
        let out = blend_colors([128, 255, 0, 255], [255, 128, 255, 255], CompositeOperation::Multiply);
        assert_eq!(out, [128, 128, 0, 255]);
    }
}
