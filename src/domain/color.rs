/// Block colors and the cyclic palette the builder indexes into.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Scale towards black (0.0 = black, 1.0 = unchanged). Used for the ghost tint.
    pub fn dimmed(self, factor: f32) -> Rgb {
        let f = factor.clamp(0.0, 1.0);
        Rgb {
            r: (self.r as f32 * f) as u8,
            g: (self.g as f32 * f) as u8,
            b: (self.b as f32 * f) as u8,
        }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::new(255, 255, 255)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseColorError {
    input: String,
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color '{}': expected #rrggbb", self.input)
    }
}

impl std::error::Error for ParseColorError {}

/// `#rrggbb`, the same form `from_str` reads.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse `#rrggbb` (leading `#` optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError { input: s.to_string() };
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Rgb { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }
}

const DEFAULT_COLORS: [Rgb; 6] = [
    Rgb::new(0xe0, 0x5a, 0x4f), // brick red
    Rgb::new(0xf2, 0xb1, 0x34), // amber
    Rgb::new(0x6c, 0xc5, 0x51), // leaf
    Rgb::new(0x3d, 0x9b, 0xe9), // sky
    Rgb::new(0x9b, 0x6b, 0xd6), // violet
    Rgb::new(0xe8, 0xe6, 0xe3), // chalk
];

/// Ordered, never-empty list of selectable colors.
#[derive(Clone, Debug)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Build from a list; an empty list falls back to the built-in colors.
    pub fn new(colors: Vec<Rgb>) -> Self {
        if colors.is_empty() {
            Palette::default()
        } else {
            Palette { colors }
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Color at `index`, wrapping.
    pub fn get(&self, index: usize) -> Rgb {
        self.colors[index % self.colors.len()]
    }

    pub fn next(&self, index: usize) -> usize {
        (index + 1) % self.colors.len()
    }

    pub fn prev(&self, index: usize) -> usize {
        if index == 0 || index >= self.colors.len() {
            self.colors.len() - 1
        } else {
            index - 1
        }
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette { colors: DEFAULT_COLORS.to_vec() }
    }
}
