//! CSS colors
//!
//! Parsing of CSS color strings into RGBA and the string formatting helpers
//! used to build fill and stroke styles.

/// Color (RGBA, non-premultiplied)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create from hex string: `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

        match hex.len() {
            3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Some(Color::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Convert HSL (hue in degrees, saturation/lightness in 0..=1) to RGB
    pub fn from_hsla(h: f64, s: f64, l: f64, alpha: f64) -> Self {
        let h = h.rem_euclid(360.0) / 360.0;
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let channel = |t: f64| {
            let t = t.rem_euclid(1.0);
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            unit_to_byte(v)
        };

        Color::rgba(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0), unit_to_byte(alpha))
    }

    /// Alpha as a fraction in 0..=1
    pub fn alpha_f64(&self) -> f64 {
        self.a as f64 / 255.0
    }

    /// Copy with alpha multiplied by `factor`
    pub fn with_alpha_factor(self, factor: f64) -> Self {
        Self {
            a: unit_to_byte(self.alpha_f64() * factor),
            ..self
        }
    }
}

fn unit_to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Parse any supported CSS color: hex, `rgb()`/`rgba()`, `hsl()`/`hsla()`,
/// named keywords and `transparent`.
pub fn parse_css_color(input: &str) -> Option<Color> {
    let s = input.trim().to_ascii_lowercase();

    if s.starts_with('#') {
        return Color::from_hex(&s);
    }
    if s == "transparent" {
        return Some(Color::TRANSPARENT);
    }
    if let Some((name, args)) = split_function(&s) {
        return match name {
            "rgb" | "rgba" => parse_rgb_args(&args),
            "hsl" | "hsla" => parse_hsl_args(&args),
            _ => None,
        };
    }
    named_color(&s)
}

fn split_function(s: &str) -> Option<(&str, Vec<&str>)> {
    let open = s.find('(')?;
    let inner = s[open + 1..].strip_suffix(')')?;
    let args = inner
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    Some((s[..open].trim(), args))
}

fn parse_rgb_args(args: &[&str]) -> Option<Color> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let channel = |s: &str| -> Option<u8> {
        let v = match s.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok()? / 100.0 * 255.0,
            None => s.parse::<f64>().ok()?,
        };
        Some(v.clamp(0.0, 255.0).round() as u8)
    };
    let alpha = match args.get(3) {
        Some(a) => parse_alpha(a)?,
        None => 1.0,
    };
    Some(Color::rgba(channel(args[0])?, channel(args[1])?, channel(args[2])?, unit_to_byte(alpha)))
}

fn parse_hsl_args(args: &[&str]) -> Option<Color> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let hue = args[0].strip_suffix("deg").unwrap_or(args[0]).parse::<f64>().ok()?;
    let percent = |s: &str| -> Option<f64> {
        Some(s.strip_suffix('%').unwrap_or(s).parse::<f64>().ok()? / 100.0)
    };
    let alpha = match args.get(3) {
        Some(a) => parse_alpha(a)?,
        None => 1.0,
    };
    Some(Color::from_hsla(hue, percent(args[1])?, percent(args[2])?, alpha))
}

fn parse_alpha(s: &str) -> Option<f64> {
    match s.strip_suffix('%') {
        Some(pct) => Some(pct.parse::<f64>().ok()? / 100.0),
        None => s.parse::<f64>().ok(),
    }
}

/// Look up a CSS color keyword
pub fn named_color(name: &str) -> Option<Color> {
    NAMED_COLORS
        .binary_search_by(|(key, _)| key.cmp(&name))
        .ok()
        .map(|i| {
            let [r, g, b] = NAMED_COLORS[i].1;
            Color::rgb(r, g, b)
        })
}

/// Format `#{hex}`
pub fn hex(hex: &str) -> String {
    format!("#{hex}")
}

/// Format `rgb(r, g, b)`
pub fn rgb(red: u8, green: u8, blue: u8) -> String {
    format!("rgb({red}, {green}, {blue})")
}

/// Format `rgba(r, g, b, a)` with alpha in 0..=1
pub fn rgba(red: u8, green: u8, blue: u8, alpha: f64) -> String {
    format!("rgba({red}, {green}, {blue}, {alpha})")
}

/// Format `hsl(h, s%, l%)`
pub fn hsl(hue: f64, saturation: f64, lightness: f64) -> String {
    format!("hsl({hue}, {saturation}%, {lightness}%)")
}

/// Format `hsla(h, s%, l%, a)`
pub fn hsla(hue: f64, saturation: f64, lightness: f64, alpha: f64) -> String {
    format!("hsla({hue}, {saturation}%, {lightness}%, {alpha})")
}

/// Canonical CSS keyword for `name`, if it is one
pub fn color(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    NAMED_COLORS
        .binary_search_by(|(key, _)| key.cmp(&lower.as_str()))
        .ok()
        .map(|i| NAMED_COLORS[i].0)
}

/// Format a CSS filter function: `filter("blur", &["5px"])` gives `blur(5px)`.
/// `none` takes no arguments.
pub fn filter(name: &str, args: &[&str]) -> String {
    if name == "none" && args.is_empty() {
        return "none".to_string();
    }
    format!("{name}({})", args.join(" "))
}

/// CSS color keywords, sorted for binary search
static NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("aliceblue", [240, 248, 255]),
    ("antiquewhite", [250, 235, 215]),
    ("aqua", [0, 255, 255]),
    ("aquamarine", [127, 255, 212]),
    ("azure", [240, 255, 255]),
    ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]),
    ("black", [0, 0, 0]),
    ("blanchedalmond", [255, 235, 205]),
    ("blue", [0, 0, 255]),
    ("blueviolet", [138, 43, 226]),
    ("brown", [165, 42, 42]),
    ("burlywood", [222, 184, 135]),
    ("cadetblue", [95, 158, 160]),
    ("chartreuse", [127, 255, 0]),
    ("chocolate", [210, 105, 30]),
    ("coral", [255, 127, 80]),
    ("cornflowerblue", [100, 149, 237]),
    ("cornsilk", [255, 248, 220]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]),
    ("darkcyan", [0, 139, 139]),
    ("darkgoldenrod", [184, 134, 11]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkgrey", [169, 169, 169]),
    ("darkkhaki", [189, 183, 107]),
    ("darkmagenta", [139, 0, 139]),
    ("darkolivegreen", [85, 107, 47]),
    ("darkorange", [255, 140, 0]),
    ("darkorchid", [153, 50, 204]),
    ("darkred", [139, 0, 0]),
    ("darksalmon", [233, 150, 122]),
    ("darkseagreen", [143, 188, 143]),
    ("darkslateblue", [72, 61, 139]),
    ("darkslategray", [47, 79, 79]),
    ("darkslategrey", [47, 79, 79]),
    ("darkturquoise", [0, 206, 209]),
    ("darkviolet", [148, 0, 211]),
    ("deeppink", [255, 20, 147]),
    ("deepskyblue", [0, 191, 255]),
    ("dimgray", [105, 105, 105]),
    ("dimgrey", [105, 105, 105]),
    ("dodgerblue", [30, 144, 255]),
    ("firebrick", [178, 34, 34]),
    ("floralwhite", [255, 250, 240]),
    ("forestgreen", [34, 139, 34]),
    ("fuchsia", [255, 0, 255]),
    ("gainsboro", [220, 220, 220]),
    ("ghostwhite", [248, 248, 255]),
    ("gold", [255, 215, 0]),
    ("goldenrod", [218, 165, 32]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("greenyellow", [173, 255, 47]),
    ("grey", [128, 128, 128]),
    ("honeydew", [240, 255, 240]),
    ("hotpink", [255, 105, 180]),
    ("indianred", [205, 92, 92]),
    ("indigo", [75, 0, 130]),
    ("ivory", [255, 255, 240]),
    ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]),
    ("lavenderblush", [255, 240, 245]),
    ("lawngreen", [124, 252, 0]),
    ("lemonchiffon", [255, 250, 205]),
    ("lightblue", [173, 216, 230]),
    ("lightcoral", [240, 128, 128]),
    ("lightcyan", [224, 255, 255]),
    ("lightgoldenrodyellow", [250, 250, 210]),
    ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lightgrey", [211, 211, 211]),
    ("lightpink", [255, 182, 193]),
    ("lightsalmon", [255, 160, 122]),
    ("lightseagreen", [32, 178, 170]),
    ("lightskyblue", [135, 206, 250]),
    ("lightslategray", [119, 136, 153]),
    ("lightslategrey", [119, 136, 153]),
    ("lightsteelblue", [176, 196, 222]),
    ("lightyellow", [255, 255, 224]),
    ("lime", [0, 255, 0]),
    ("limegreen", [50, 205, 50]),
    ("linen", [250, 240, 230]),
    ("magenta", [255, 0, 255]),
    ("maroon", [128, 0, 0]),
    ("mediumaquamarine", [102, 205, 170]),
    ("mediumblue", [0, 0, 205]),
    ("mediumorchid", [186, 85, 211]),
    ("mediumpurple", [147, 112, 219]),
    ("mediumseagreen", [60, 179, 113]),
    ("mediumslateblue", [123, 104, 238]),
    ("mediumspringgreen", [0, 250, 154]),
    ("mediumturquoise", [72, 209, 204]),
    ("mediumvioletred", [199, 21, 133]),
    ("midnightblue", [25, 25, 112]),
    ("mintcream", [245, 255, 250]),
    ("mistyrose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]),
    ("navajowhite", [255, 222, 173]),
    ("navy", [0, 0, 128]),
    ("oldlace", [253, 245, 230]),
    ("olive", [128, 128, 0]),
    ("olivedrab", [107, 142, 35]),
    ("orange", [255, 165, 0]),
    ("orangered", [255, 69, 0]),
    ("orchid", [218, 112, 214]),
    ("palegoldenrod", [238, 232, 170]),
    ("palegreen", [152, 251, 152]),
    ("paleturquoise", [175, 238, 238]),
    ("palevioletred", [219, 112, 147]),
    ("papayawhip", [255, 239, 213]),
    ("peachpuff", [255, 218, 185]),
    ("peru", [205, 133, 63]),
    ("pink", [255, 192, 203]),
    ("plum", [221, 160, 221]),
    ("powderblue", [176, 224, 230]),
    ("purple", [128, 0, 128]),
    ("rebeccapurple", [102, 51, 153]),
    ("red", [255, 0, 0]),
    ("rosybrown", [188, 143, 143]),
    ("royalblue", [65, 105, 225]),
    ("saddlebrown", [139, 69, 19]),
    ("salmon", [250, 128, 114]),
    ("sandybrown", [244, 164, 96]),
    ("seagreen", [46, 139, 87]),
    ("seashell", [255, 245, 238]),
    ("sienna", [160, 82, 45]),
    ("silver", [192, 192, 192]),
    ("skyblue", [135, 206, 235]),
    ("slateblue", [106, 90, 205]),
    ("slategray", [112, 128, 144]),
    ("slategrey", [112, 128, 144]),
    ("snow", [255, 250, 250]),
    ("springgreen", [0, 255, 127]),
    ("steelblue", [70, 130, 180]),
    ("tan", [210, 180, 140]),
    ("teal", [0, 128, 128]),
    ("thistle", [216, 191, 216]),
    ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]),
    ("violet", [238, 130, 238]),
    ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]),
    ("whitesmoke", [245, 245, 245]),
    ("yellow", [255, 255, 0]),
    ("yellowgreen", [154, 205, 50]),
];
