//! Stroke styling for freehand annotation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// An RGB color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a color from channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = CoreError;

    /// Parse a `#RRGGBB` literal (case-insensitive hex digits).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| CoreError::InvalidColor(s.to_string()))?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(CoreError::InvalidColor(s.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| CoreError::InvalidColor(s.to_string()))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Style snapshot applied to strokes started after it is set.
///
/// Changing the style never affects a stroke that is already in progress;
/// the canvas engine snapshots the style at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// Stroke color.
    pub color: Rgb,
    /// Stroke width in pixels. Always at least 1.
    pub width: u32,
}

impl StrokeStyle {
    /// Create a style; a zero width is clamped to 1.
    #[must_use]
    pub fn new(color: Rgb, width: u32) -> Self {
        Self {
            color,
            width: width.max(1),
        }
    }
}

impl Default for StrokeStyle {
    /// Red at 5 px, the drawing-tool defaults.
    fn default() -> Self {
        Self {
            color: Rgb::new(0xFF, 0, 0),
            width: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_colors() {
        assert_eq!("#FF0000".parse::<Rgb>().expect("red"), Rgb::new(255, 0, 0));
        assert_eq!(
            "#00ff00".parse::<Rgb>().expect("lowercase green"),
            Rgb::new(0, 255, 0)
        );
        assert_eq!(
            "#123456".parse::<Rgb>().expect("mixed"),
            Rgb::new(0x12, 0x34, 0x56)
        );
    }

    #[test]
    fn test_parse_invalid_colors() {
        assert!("FF0000".parse::<Rgb>().is_err()); // missing '#'
        assert!("#FF00".parse::<Rgb>().is_err()); // too short
        assert!("#GG0000".parse::<Rgb>().is_err()); // non-hex
        assert!("#FF0000FF".parse::<Rgb>().is_err()); // too long
        assert!("".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let color = Rgb::new(0x00, 0xFF, 0x7F);
        let parsed: Rgb = color.to_string().parse().expect("round trip");
        assert_eq!(parsed, color);
    }

    #[test]
    fn test_default_style_matches_drawing_tools() {
        let style = StrokeStyle::default();
        assert_eq!(style.color, Rgb::new(255, 0, 0));
        assert_eq!(style.width, 5);
    }

    #[test]
    fn test_zero_width_clamped() {
        let style = StrokeStyle::new(Rgb::new(0, 0, 0), 0);
        assert_eq!(style.width, 1);
    }
}
