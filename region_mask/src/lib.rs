//! # region_mask
//!
//! Color detection and screen-region geometry for webcam "air instruments".
//!
//! * [`ColorRange`] — two inclusive HSV bands, so a hue range that wraps
//!   around 0 (red) can be expressed as one range.
//! * [`classify`] — turns an RGB region into a binary occupancy mask and a
//!   matching-pixel count.
//! * [`Coverage`] — the fraction of a region that must match before an
//!   instrument fires.
//! * [`assign_region`] — places up to four fixed-size regions along the
//!   lower quarter of the frame.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use region_mask::{assign_region, classify, ColorRange, ColumnMapping, Coverage, REGION_SIZE};
//! use image::RgbImage;
//!
//! let frame = RgbImage::new(1280, 720);
//! let rect  = assign_region(0, 2, frame.width(), frame.height(), ColumnMapping::Legacy).unwrap();
//! let (x, y, w, h) = rect.clip(frame.width(), frame.height()).unwrap();
//!
//! let area = image::imageops::crop_imm(&frame, x, y, w, h).to_image();
//! let occ  = classify(&area, &ColorRange::default());
//! let hit  = Coverage::default().exceeded_by(occ.count, REGION_SIZE);
//! println!("{} matching pixels, fire = {}", occ.count, hit);
//! ```

pub mod hsv;
pub mod color_range;
pub mod mask;
pub mod rect;
pub mod layout;

pub use hsv::Hsv8;
pub use color_range::{Channel, ColorRange, HsvBand, RangeError};
pub use mask::{classify, count_matching, Coverage, Occupancy, MASK_HIT};
pub use rect::{Point, Rect, Size};
pub use layout::{
    assign_region, column_for, layout_all, ColumnMapping, LayoutError,
    COLUMN_DIVISIONS, MAX_INSTRUMENTS, REGION_SIZE, ROW_EIGHTHS,
};
