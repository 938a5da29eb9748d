//! Binary occupancy masks and the coverage threshold.
//!
//! [`classify`] counts matching pixels; the count is a plain pixel count,
//! and [`Coverage::threshold`] is expressed in pixels too, so the two sides
//! of the fire comparison always share one encoding.

use image::{GenericImageView, GrayImage, Luma, Rgb};

use crate::color_range::{ColorRange, RangeError};
use crate::hsv::Hsv8;
use crate::rect::Size;

/// Mask value of a matching pixel.  Non-matching pixels are 0.
pub const MASK_HIT: u8 = 255;

// ════════════════════════════════════════════════════════════════════════════
// Occupancy
// ════════════════════════════════════════════════════════════════════════════

/// Result of classifying one region.
#[derive(Clone, Debug, PartialEq)]
pub struct Occupancy {
    /// Number of pixels inside the color range.
    pub count: u64,
    /// Same dimensions as the region; [`MASK_HIT`] where a pixel matched.
    pub mask:  GrayImage,
}

/// Classify every pixel of `region` against `range`.
pub fn classify<V>(region: &V, range: &ColorRange) -> Occupancy
where
    V: GenericImageView<Pixel = Rgb<u8>>,
{
    let (w, h) = region.dimensions();
    let mut count = 0u64;
    let mask = GrayImage::from_fn(w, h, |x, y| {
        if range.matches(Hsv8::from_rgb(region.get_pixel(x, y))) {
            count += 1;
            Luma([MASK_HIT])
        } else {
            Luma([0])
        }
    });
    Occupancy { count, mask }
}

/// Like [`classify`] without building the mask.
pub fn count_matching<V>(region: &V, range: &ColorRange) -> u64
where
    V: GenericImageView<Pixel = Rgb<u8>>,
{
    region
        .pixels()
        .filter(|&(_, _, px)| range.matches(Hsv8::from_rgb(px)))
        .count() as u64
}

// ════════════════════════════════════════════════════════════════════════════
// Coverage
// ════════════════════════════════════════════════════════════════════════════

/// Fraction of a region that must match before it counts as contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coverage(f64);

impl Coverage {
    pub const DEFAULT: f64 = 0.8;

    pub fn new(ratio: f64) -> Result<Self, RangeError> {
        if ratio > 0.0 && ratio <= 1.0 {
            Ok(Coverage(ratio))
        } else {
            Err(RangeError::CoverageOutOfRange(ratio))
        }
    }

    pub fn ratio(&self) -> f64 { self.0 }

    /// Largest count that does *not* fire for a region of `size`.
    pub fn threshold(&self, size: Size) -> u64 {
        (size.width as f64 * size.height as f64 * self.0).floor() as u64
    }

    /// Strictly greater than the threshold.
    pub fn exceeded_by(&self, count: u64, size: Size) -> bool {
        count > self.threshold(size)
    }
}

impl Default for Coverage {
    fn default() -> Self {
        Coverage(Self::DEFAULT)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::REGION_SIZE;
    use image::RgbImage;

    const RED:  Rgb<u8> = Rgb([255, 0, 0]);
    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

    fn region(fill: Rgb<u8>) -> RgbImage {
        RgbImage::from_pixel(REGION_SIZE.width, REGION_SIZE.height, fill)
    }

    #[test]
    fn all_matching_region_exceeds_threshold() {
        let occ = classify(&region(RED), &ColorRange::red());
        assert_eq!(occ.count, 20_000);
        assert!(Coverage::default().exceeded_by(occ.count, REGION_SIZE));
        assert!(occ.mask.pixels().all(|p| p.0[0] == MASK_HIT));
    }

    #[test]
    fn non_matching_region_is_empty() {
        let occ = classify(&region(BLUE), &ColorRange::red());
        assert_eq!(occ.count, 0);
        assert!(!Coverage::default().exceeded_by(occ.count, REGION_SIZE));
        assert!(occ.mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn count_grows_with_painted_pixels() {
        let range = ColorRange::red();
        let mut img = region(BLUE);
        let mut last = 0;
        for row in 0..REGION_SIZE.height {
            for x in 0..REGION_SIZE.width {
                img.put_pixel(x, row, RED);
            }
            if row % 10 == 9 {
                let n = count_matching(&img, &range);
                assert!(n >= last);
                assert_eq!(n, u64::from((row + 1) * REGION_SIZE.width));
                last = n;
            }
        }
    }

    #[test]
    fn mask_marks_exact_pixels() {
        let mut img = RgbImage::from_pixel(4, 3, BLUE);
        img.put_pixel(1, 2, RED);
        img.put_pixel(3, 0, RED);
        let occ = classify(&img, &ColorRange::red());
        assert_eq!(occ.count, 2);
        assert_eq!(occ.mask.get_pixel(1, 2).0[0], MASK_HIT);
        assert_eq!(occ.mask.get_pixel(3, 0).0[0], MASK_HIT);
        assert_eq!(occ.mask.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn threshold_boundary_is_strict() {
        let cov = Coverage::default();
        assert_eq!(cov.threshold(REGION_SIZE), 16_000);
        assert!(!cov.exceeded_by(16_000, REGION_SIZE));
        assert!(cov.exceeded_by(16_001, REGION_SIZE));
    }

    #[test]
    fn coverage_bounds() {
        assert!(Coverage::new(0.0).is_err());
        assert!(Coverage::new(1.5).is_err());
        assert!(Coverage::new(f64::NAN).is_err());
        assert_eq!(Coverage::new(1.0).unwrap().threshold(REGION_SIZE), 20_000);
    }
}
