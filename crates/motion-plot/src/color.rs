use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unrecognized color {0:?}")]
pub struct ColorParseError(pub String);

/// Opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Named colors accepted in configuration.
const NAMED: &[(&str, Color)] = &[
    ("black", Color::rgb(0, 0, 0)),
    ("white", Color::rgb(255, 255, 255)),
    ("red", Color::rgb(255, 0, 0)),
    ("green", Color::rgb(0, 128, 0)),
    ("lime", Color::rgb(0, 255, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("orange", Color::rgb(255, 165, 0)),
    ("purple", Color::rgb(128, 0, 128)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("gray", Color::rgb(128, 128, 128)),
    ("grey", Color::rgb(128, 128, 128)),
];

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Reference line color, `#ccc`.
    pub const GUIDE: Color = Color::rgb(0xcc, 0xcc, 0xcc);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a color name or `#rgb` / `#rrggbb` hex string (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        let s = s.trim();
        let err = || ColorParseError(s.to_string());

        if let Some(hex) = s.strip_prefix('#') {
            let digit = |i: usize| {
                hex.get(i..i + 1)
                    .and_then(|d| u8::from_str_radix(d, 16).ok())
                    .ok_or_else(err)
            };
            return match hex.len() {
                3 => Ok(Self::rgb(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
                6 => Ok(Self::rgb(
                    digit(0)? * 16 + digit(1)?,
                    digit(2)? * 16 + digit(3)?,
                    digit(4)? * 16 + digit(5)?,
                )),
                _ => Err(err()),
            };
        }

        NAMED
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|&(_, color)| color)
            .ok_or_else(err)
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl std::str::FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
