//! Hex color parsing for banner foreground/background values

use tracing::error;

/// 24-bit RGB color parsed from an "#RRGGBB" string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    /// Parse a 6-digit hex color. The leading '#' is optional.
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 {
            return None;
        }
        let n = u32::from_str_radix(hex, 16).ok()?;
        Some(Self {
            r: (n >> 16) as u8,
            g: (n >> 8) as u8,
            b: n as u8,
        })
    }

    /// Parse, falling back to a known-good default on invalid input.
    /// Invalid colors are logged, never fatal.
    pub fn parse_or(s: &str, fallback: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            error!(color = %s, using = %fallback, "invalid hex color, using default");
            Self::parse(fallback).unwrap_or(Self { r: 0, g: 0, b: 0 })
        })
    }

    /// X11 pixel value for background_pixel / GC foreground (0x00RRGGBB)
    pub fn pixel(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_hash() {
        assert_eq!(
            HexColor::parse("#00CC00"),
            Some(HexColor { r: 0, g: 0xCC, b: 0 })
        );
        assert_eq!(
            HexColor::parse("FF0000"),
            Some(HexColor { r: 0xFF, g: 0, b: 0 })
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(HexColor::parse(""), None);
        assert_eq!(HexColor::parse("#12345"), None);
        assert_eq!(HexColor::parse("#1234567"), None);
        assert_eq!(HexColor::parse("#GGGGGG"), None);
        assert_eq!(HexColor::parse("green"), None);
    }

    #[test]
    fn pixel_value_is_rgb_packed() {
        let c = HexColor::parse("#00CC00").unwrap();
        assert_eq!(c.pixel(), 0x00CC00);
        let c = HexColor::parse("#FFFFFF").unwrap();
        assert_eq!(c.pixel(), 0xFFFFFF);
    }

    #[test]
    fn parse_or_falls_back_on_invalid() {
        let c = HexColor::parse_or("not-a-color", "#00CC00");
        assert_eq!(c.pixel(), 0x00CC00);
        let c = HexColor::parse_or("#000000", "#00CC00");
        assert_eq!(c.pixel(), 0x000000);
    }
}
