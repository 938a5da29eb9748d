//! Two-band HSV color ranges.
//!
//! A single inclusive HSV interval cannot describe red, whose hue straddles
//! the 180 → 0 seam.  A [`ColorRange`] therefore carries two bands and a
//! pixel matches when it falls inside either one.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hsv::{Hsv8, MAX_HUE};

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

/// HSV channel names, for error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Hue,
    Saturation,
    Value,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Channel::Hue        => "hue",
            Channel::Saturation => "saturation",
            Channel::Value      => "value",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    #[error("{channel} lower bound {lower} is above upper bound {upper}")]
    Inverted { channel: Channel, lower: u8, upper: u8 },
    #[error("hue bound {0} is outside 0..=180")]
    HueOutOfScale(u8),
    #[error("coverage {0} must be in (0, 1]")]
    CoverageOutOfRange(f64),
}

// ════════════════════════════════════════════════════════════════════════════
// HsvBand
// ════════════════════════════════════════════════════════════════════════════

/// One closed interval in HSV space.  Always `lower <= upper` per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BandBounds", into = "BandBounds")]
pub struct HsvBand {
    lower: Hsv8,
    upper: Hsv8,
}

/// Unvalidated serde shape of [`HsvBand`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct BandBounds {
    lower: Hsv8,
    upper: Hsv8,
}

impl HsvBand {
    pub fn new(lower: Hsv8, upper: Hsv8) -> Result<Self, RangeError> {
        for bound in [lower.h, upper.h] {
            if bound > MAX_HUE {
                return Err(RangeError::HueOutOfScale(bound));
            }
        }
        let pairs = [
            (Channel::Hue,        lower.h, upper.h),
            (Channel::Saturation, lower.s, upper.s),
            (Channel::Value,      lower.v, upper.v),
        ];
        for (channel, lo, hi) in pairs {
            if lo > hi {
                return Err(RangeError::Inverted { channel, lower: lo, upper: hi });
            }
        }
        Ok(HsvBand { lower, upper })
    }

    pub fn lower(&self) -> Hsv8 { self.lower }
    pub fn upper(&self) -> Hsv8 { self.upper }

    /// Inclusive on all three channels.
    pub fn contains(&self, px: Hsv8) -> bool {
        (self.lower.h..=self.upper.h).contains(&px.h)
            && (self.lower.s..=self.upper.s).contains(&px.s)
            && (self.lower.v..=self.upper.v).contains(&px.v)
    }
}

impl TryFrom<BandBounds> for HsvBand {
    type Error = RangeError;

    fn try_from(raw: BandBounds) -> Result<Self, Self::Error> {
        HsvBand::new(raw.lower, raw.upper)
    }
}

impl From<HsvBand> for BandBounds {
    fn from(band: HsvBand) -> Self {
        BandBounds { lower: band.lower, upper: band.upper }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ColorRange
// ════════════════════════════════════════════════════════════════════════════

/// The color an instrument reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorRange {
    pub first:  HsvBand,
    pub second: HsvBand,
}

impl ColorRange {
    pub fn new(first: HsvBand, second: HsvBand) -> Self {
        ColorRange { first, second }
    }

    /// A range whose hue does not wrap: both bands are the same interval.
    pub fn single(band: HsvBand) -> Self {
        ColorRange { first: band, second: band }
    }

    /// Saturated, bright red on both sides of the hue seam.
    pub fn red() -> Self {
        let band = |lo: [u8; 3], hi: [u8; 3]| HsvBand {
            lower: lo.into(),
            upper: hi.into(),
        };
        ColorRange {
            first:  band([170, 100, 150], [180, 255, 255]),
            second: band([0,   100, 150], [10,  255, 255]),
        }
    }

    pub fn matches(&self, px: Hsv8) -> bool {
        self.first.contains(px) || self.second.contains(px)
    }
}

impl Default for ColorRange {
    fn default() -> Self {
        ColorRange::red()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
