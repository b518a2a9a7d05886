use eframe::egui::Color32;

use crate::error::{EngineError, Result};

/// Hue (degrees, 0..360), saturation and lightness (percent, 0..100).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self {
            h: h.rem_euclid(360.0),
            s: s.clamp(0.0, 100.0),
            l: l.clamp(0.0, 100.0),
        }
    }

    /// Convert to an opaque color.
    pub fn to_color32(self) -> Color32 {
        let h = self.h / 360.0;
        let s = self.s / 100.0;
        let l = self.l / 100.0;

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                hue_to_channel(p, q, h + 1.0 / 3.0),
                hue_to_channel(p, q, h),
                hue_to_channel(p, q, h - 1.0 / 3.0),
            )
        };

        Color32::from_rgb(unit_to_u8(r), unit_to_u8(g), unit_to_u8(b))
    }

    /// HSL of the color's RGB channels, rounded to whole degrees and percents.
    pub fn from_color32(color: Color32) -> Self {
        let r = color.r() as f32 / 255.0;
        let g = color.g() as f32 / 255.0;
        let b = color.b() as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let delta = max - min;

        let (h, s) = if delta == 0.0 {
            (0.0, 0.0)
        } else {
            let s = if l > 0.5 {
                delta / (2.0 - max - min)
            } else {
                delta / (max + min)
            };
            let h = if max == r {
                ((g - b) / delta).rem_euclid(6.0)
            } else if max == g {
                (b - r) / delta + 2.0
            } else {
                (r - g) / delta + 4.0
            };
            (h * 60.0, s)
        };

        Self::new(h.round(), (s * 100.0).round(), (l * 100.0).round())
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Color helpers the layer stack needs on top of egui's `Color32`.
pub trait ColorManipulation: Sized {
    /// Parse `#rrggbb` (leading `#` optional) into an opaque color.
    fn from_hex_rgb(hex: &str) -> Result<Self>;
    /// Format the RGB channels as `#rrggbb`; alpha is dropped.
    fn to_hex_rgb(&self) -> String;
    /// Shift the hue by `degrees`, keeping saturation and lightness.
    fn rotate_hue(&self, degrees: f32) -> Self;
    /// Unpremultiplied RGB channels.
    fn rgb(&self) -> [u8; 3];
}

impl ColorManipulation for Color32 {
    fn from_hex_rgb(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(EngineError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| EngineError::InvalidColor(hex.to_string()))
        };
        Ok(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    fn to_hex_rgb(&self) -> String {
        let [r, g, b] = self.rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    fn rotate_hue(&self, degrees: f32) -> Self {
        let hsl = Hsl::from_color32(Color32::from_rgb(self.r(), self.g(), self.b()));
        Hsl::new(hsl.h + degrees, hsl.s, hsl.l).to_color32()
    }

    fn rgb(&self) -> [u8; 3] {
        let [r, g, b, _] = self.to_srgba_unmultiplied();
        [r, g, b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let c = Color32::from_hex_rgb("#2d7a8f").unwrap();
        assert_eq!(c, Color32::from_rgb(0x2d, 0x7a, 0x8f));
        assert_eq!(c.to_hex_rgb(), "#2d7a8f");
        assert_eq!(Color32::from_hex_rgb("FFAA00").unwrap(), Color32::from_rgb(255, 170, 0));
    }

    #[test]
    fn malformed_hex_is_rejected() {
        for bad in ["", "#12345", "#12345g", "red", "#1234567"] {
            assert!(matches!(
                Color32::from_hex_rgb(bad),
                Err(EngineError::InvalidColor(_))
            ));
        }
    }

    #[test]
    fn yellow_from_hsl() {
        assert_eq!(Hsl::new(60.0, 100.0, 50.0).to_color32(), Color32::from_rgb(255, 255, 0));
    }

    #[test]
    fn rotating_yellow_backwards_moves_toward_orange() {
        let yellow = Color32::from_rgb(255, 255, 0);
        let next = yellow.rotate_hue(-15.0);
        assert_eq!(Hsl::from_color32(next), Hsl::new(45.0, 100.0, 50.0));
        assert_eq!(next, Color32::from_rgb(255, 191, 0));
    }

    #[test]
    fn hue_wraps_around() {
        let red = Color32::from_rgb(255, 0, 0);
        assert_eq!(Hsl::from_color32(red.rotate_hue(-15.0)).h, 345.0);
    }
}
