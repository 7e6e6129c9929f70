//! Parsing of the CSS color strings carried by routes

use crate::ColorError;

/// Color used when a route does not specify one (or specifies garbage)
pub const DEFAULT_ROUTE_COLOR: &str = "blue";

/// Straight (non-premultiplied) 8-bit RGBA color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("silver", [192, 192, 192]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("white", [255, 255, 255]),
    ("maroon", [128, 0, 0]),
    ("red", [255, 0, 0]),
    ("purple", [128, 0, 128]),
    ("fuchsia", [255, 0, 255]),
    ("magenta", [255, 0, 255]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("olive", [128, 128, 0]),
    ("yellow", [255, 255, 0]),
    ("navy", [0, 0, 128]),
    ("blue", [0, 0, 255]),
    ("teal", [0, 128, 128]),
    ("aqua", [0, 255, 255]),
    ("cyan", [0, 255, 255]),
    ("orange", [255, 165, 0]),
    ("brown", [165, 42, 42]),
    ("pink", [255, 192, 203]),
    ("gold", [255, 215, 0]),
    ("violet", [238, 130, 238]),
    ("indigo", [75, 0, 130]),
    ("crimson", [220, 20, 60]),
    ("darkblue", [0, 0, 139]),
    ("darkgreen", [0, 100, 0]),
    ("darkred", [139, 0, 0]),
    ("darkorange", [255, 140, 0]),
    ("lightblue", [173, 216, 230]),
    ("lightgreen", [144, 238, 144]),
    ("skyblue", [135, 206, 235]),
    ("steelblue", [70, 130, 180]),
    ("tomato", [255, 99, 71]),
    ("coral", [255, 127, 80]),
    ("salmon", [250, 128, 114]),
    ("turquoise", [64, 224, 208]),
];

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Parse a CSS color: a named color, `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
    /// `rgb(r, g, b)` or `rgba(r, g, b, a)` with `a` in `0..=1`.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let s = input.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Err(ColorError::Empty);
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorError::Invalid(input.to_string()));
        }
        if let Some(args) = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_functional(args).ok_or_else(|| ColorError::Invalid(input.to_string()));
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, [r, g, b])| Self::opaque(*r, *g, *b))
            .ok_or_else(|| ColorError::Invalid(input.to_string()))
    }

    /// Parse `input`, falling back to [`DEFAULT_ROUTE_COLOR`] when it is empty or invalid
    pub fn parse_or_default(input: &str) -> Self {
        match Self::parse(input) {
            Ok(color) => color,
            Err(ColorError::Empty) => Self::default_route_color(),
            Err(e) => {
                tracing::warn!("{e}, using {DEFAULT_ROUTE_COLOR}");
                Self::default_route_color()
            }
        }
    }

    pub fn default_route_color() -> Self {
        Self::opaque(0, 0, 255)
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let nibble = |c: u8| (c as char).to_digit(16).map(|d| d as u8);
    let bytes = hex.as_bytes();
    match bytes.len() {
        3 | 4 => {
            let mut out = [255u8; 4];
            for (i, c) in bytes.iter().enumerate() {
                let d = nibble(*c)?;
                out[i] = d * 17;
            }
            Some(Rgba(out))
        }
        6 | 8 => {
            let mut out = [255u8; 4];
            for (i, pair) in bytes.chunks(2).enumerate() {
                out[i] = nibble(pair[0])? * 16 + nibble(pair[1])?;
            }
            Some(Rgba(out))
        }
        _ => None,
    }
}

fn parse_functional(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let mut out = [255u8; 4];
    for (i, part) in parts[..3].iter().enumerate() {
        let v: f64 = part.parse().ok()?;
        out[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    if let Some(alpha) = parts.get(3) {
        let a: f64 = alpha.parse().ok()?;
        out[3] = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    Some(Rgba(out))
}
