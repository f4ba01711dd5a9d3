//! Banner label rasterization
//!
//! Resolves the configured face/weight to a font file via fontconfig (with
//! hardcoded path fallbacks for systems without a usable fontconfig cache)
//! and rasterizes the message with fontdue. Glyph coverage is blended over
//! the banner background color at rasterization time, so the resulting
//! bitmap can be uploaded with a plain PutImage.

use anyhow::{Context, Result};
use fontconfig::{Fontconfig, Pattern};
use fontdue::{Font, FontSettings};
use std::ffi::CString;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::color::HexColor;

/// Opaque label bitmap, 4 bytes per pixel in X11 native BGRX order
#[derive(Clone)]
pub struct Label {
    pub width: u16,
    pub height: u16,
    pub data: Vec<u8>,
}

/// Map the Pango-style size keywords used by the original config format to
/// pixel sizes. Unknown tokens fall back to "small".
pub fn size_token_px(token: &str) -> f32 {
    match token {
        "xx-small" => 7.0,
        "x-small" => 8.0,
        "small" => 10.0,
        "medium" => 12.0,
        "large" => 14.0,
        "x-large" => 17.0,
        "xx-large" => 20.0,
        other => {
            warn!(size = %other, "unknown size token, using small");
            10.0
        }
    }
}

/// Map a weight token to a fontconfig style name. None lets fontconfig pick
/// the family default.
fn weight_style(weight: &str) -> Option<&'static str> {
    match weight {
        "bold" | "ultrabold" | "heavy" => Some("Bold"),
        "light" | "ultralight" => Some("Light"),
        _ => None,
    }
}

fn fallback_paths(weight: &str) -> &'static [&'static str] {
    if weight_style(weight) == Some("Bold") {
        &[
            "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
            "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
        ]
    } else {
        &[
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
        ]
    }
}

/// Glyph rasterizer for the banner message
pub struct FontRenderer {
    font: Font,
    size: f32,
}

impl FontRenderer {
    /// Resolve face/weight to a font file and load it. The face token uses
    /// the original config spelling ("liberation-sans"); dashes are treated
    /// as spaces for the fontconfig family lookup.
    pub fn load(face: &str, weight: &str, size: f32) -> Result<Self> {
        if let Some(path) = find_font_path(face, weight) {
            match Self::from_path(path.clone(), size) {
                Ok(renderer) => return Ok(renderer),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load matched font, trying fallbacks");
                }
            }
        }

        for path in fallback_paths(weight) {
            if let Ok(renderer) = Self::from_path(PathBuf::from(path), size) {
                return Ok(renderer);
            }
        }

        anyhow::bail!(
            "could not load any font for face '{}' weight '{}'",
            face,
            weight
        )
    }

    fn from_path(path: PathBuf, size: f32) -> Result<Self> {
        let font_data = fs::read(&path)
            .with_context(|| format!("Failed to read font file: {}", path.display()))?;
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| anyhow::anyhow!("Failed to parse font {}: {}", path.display(), e))?;
        debug!(path = %path.display(), "loaded banner font");
        Ok(Self { font, size })
    }

    /// Rasterize the message, blending glyph coverage between the foreground
    /// and background colors. Returns None for text that lays out to an
    /// empty bitmap.
    pub fn render_label(&self, text: &str, fg: HexColor, bg: HexColor) -> Option<Label> {
        if text.is_empty() {
            return None;
        }

        let mut glyphs = Vec::new();
        let mut pen_x = 0.0f32;
        let mut max_ascent = 0i32;
        let mut max_descent = 0i32;

        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, self.size);
            let ascent = metrics.height as i32 + metrics.ymin;
            let descent = -metrics.ymin;
            max_ascent = max_ascent.max(ascent);
            max_descent = max_descent.max(descent);
            glyphs.push((pen_x as i32, metrics, bitmap));
            pen_x += metrics.advance_width;
        }

        let width = pen_x.ceil() as usize;
        let height = (max_ascent + max_descent) as usize;
        if width == 0 || height == 0 || width > u16::MAX as usize || height > u16::MAX as usize {
            return None;
        }

        // Start from solid background, blend each glyph's coverage in.
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            data.extend_from_slice(&[bg.b, bg.g, bg.r, 0xFF]);
        }

        for (x_offset, metrics, bitmap) in glyphs {
            let baseline_y = max_ascent - (metrics.height as i32 + metrics.ymin);
            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let px = x_offset + gx as i32;
                    let py = baseline_y + gy as i32;
                    if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                        continue;
                    }
                    let coverage = bitmap[gy * metrics.width + gx] as u32;
                    if coverage == 0 {
                        continue;
                    }
                    let blend = |f: u8, b: u8| -> u8 {
                        ((f as u32 * coverage + b as u32 * (255 - coverage)) / 255) as u8
                    };
                    let i = (py as usize * width + px as usize) * 4;
                    data[i] = blend(fg.b, bg.b);
                    data[i + 1] = blend(fg.g, bg.g);
                    data[i + 2] = blend(fg.r, bg.r);
                }
            }
        }

        Some(Label {
            width: width as u16,
            height: height as u16,
            data,
        })
    }
}

fn find_font_path(face: &str, weight: &str) -> Option<PathBuf> {
    let fc = Fontconfig::new()?;
    let mut pattern = Pattern::new(&fc);
    let family = CString::new(face.replace('-', " ")).ok()?;
    pattern.add_string(fontconfig::FC_FAMILY, &family);
    let style = weight_style(weight).and_then(|s| CString::new(s).ok());
    if let Some(style) = &style {
        pattern.add_string(fontconfig::FC_STYLE, style);
    }
    let matched = pattern.font_match();
    let path = PathBuf::from(matched.filename()?);
    // Fontconfig matches fuzzily and may hand back a cache entry for a
    // file that is gone; the hardcoded fallbacks cover that.
    path.exists().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_tokens_map_to_pixels() {
        assert_eq!(size_token_px("small"), 10.0);
        assert_eq!(size_token_px("medium"), 12.0);
        assert_eq!(size_token_px("xx-large"), 20.0);
    }

    #[test]
    fn unknown_size_token_falls_back_to_small() {
        assert_eq!(size_token_px("enormous"), size_token_px("small"));
    }

    #[test]
    fn weight_style_mapping() {
        assert_eq!(weight_style("bold"), Some("Bold"));
        assert_eq!(weight_style("light"), Some("Light"));
        assert_eq!(weight_style("normal"), None);
        assert_eq!(weight_style("oblique"), None);
    }

    #[test]
    fn fallback_paths_respect_weight() {
        assert!(fallback_paths("bold").iter().all(|p| p.contains("Bold")));
        assert!(fallback_paths("normal").iter().all(|p| !p.contains("Bold")));
    }
}
