//! Color value types shared by the compositing, segmentation and overlay code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a CSS-style hex color cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid hex color: {0}")]
pub struct ParseColorError(pub String);

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb` (leading `#` optional).
    ///
    /// ```ignore
    /// let c = Rgb::from_hex("#ff8800").unwrap();
    /// assert_eq!(c, Rgb::new(255, 136, 0));
    /// ```
    pub fn from_hex(s: &str) -> Result<Self, ParseColorError> {
        let hex = s.trim().trim_start_matches('#');
        let err = || ParseColorError(s.to_string());

        if !hex.is_ascii() {
            return Err(err());
        }

        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| err())?;
                let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| err())?;
                let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| err())?;
                Ok(Self::new(r, g, b))
            }
            3 => {
                let digit = |i: usize| -> Result<u8, ParseColorError> {
                    let v = u8::from_str_radix(&hex[i..i + 1], 16).map_err(|_| err())?;
                    Ok(v * 17)
                };
                Ok(Self::new(digit(0)?, digit(1)?, digit(2)?))
            }
            _ => Err(err()),
        }
    }

    /// Format as lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Euclidean distance in RGB space (0.0 to ~441.67).
    #[inline]
    pub fn distance(self, r: u8, g: u8, b: u8) -> f32 {
        let dr = self.r as f32 - r as f32;
        let dg = self.g as f32 - g as f32;
        let db = self.b as f32 - b as f32;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// Attach an alpha value (0.0 to 1.0).
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba::new(self.r, self.g, self.b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

/// An 8-bit RGBA color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

impl From<Rgb> for Rgba {
    fn from(c: Rgb) -> Self {
        Rgba::new(c.r, c.g, c.b, 255)
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(v: [u8; 4]) -> Self {
        Rgba::new(v[0], v[1], v[2], v[3])
    }
}
