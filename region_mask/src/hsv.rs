//! 8-bit HSV pixels on the OpenCV scale.
//!
//! Hue is stored as half-degrees (0–180) so it fits in a byte; saturation
//! and value span the full 0–255 range.  Color bands in configuration files
//! are written in this scale, e.g. `[170, 100, 150]`.

use image::Rgb;
use palette::{FromColor, Hsv, Srgb};
use serde::{Deserialize, Serialize};

/// Largest hue value on the half-degree scale.
pub const MAX_HUE: u8 = 180;

/// A pixel in 8-bit HSV space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Hsv8 {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv8 {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Hsv8 { h, s, v }
    }

    /// Convert an RGB pixel.
    pub fn from_rgb(px: Rgb<u8>) -> Self {
        let [r, g, b] = px.0;
        let hsv: Hsv = Hsv::from_color(Srgb::new(r, g, b).into_format::<f32>());

        let h = (hsv.hue.into_positive_degrees() / 2.0)
            .round()
            .min(MAX_HUE as f32);
        Hsv8 {
            h: h as u8,
            s: unit_to_byte(hsv.saturation),
            v: unit_to_byte(hsv.value),
        }
    }
}

impl From<[u8; 3]> for Hsv8 {
    fn from([h, s, v]: [u8; 3]) -> Self {
        Hsv8 { h, s, v }
    }
}

impl From<Hsv8> for [u8; 3] {
    fn from(px: Hsv8) -> Self {
        [px.h, px.s, px.v]
    }
}

fn unit_to_byte(x: f32) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
