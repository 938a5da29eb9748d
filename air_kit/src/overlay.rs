//! Drawing instrument icons onto the frame.

use image::RgbImage;
use region_mask::Rect;

/// Add `icon` onto the part of `frame` covered by `rect`, saturating each
/// channel at 255.  The icon's top-left pixel lands on `rect.top_left()`;
/// anything falling outside the frame is skipped.
pub fn composite_icon(frame: &mut RgbImage, rect: Rect, icon: &RgbImage) {
    let Some((x0, y0, w, h)) = rect.clip(frame.width(), frame.height()) else {
        return;
    };
    let tl = rect.top_left();
    // Offset of the clipped area inside the icon.
    let ox = (x0 as i64 - tl.x as i64) as u32;
    let oy = (y0 as i64 - tl.y as i64) as u32;

    for y in 0..h {
        for x in 0..w {
            let (ix, iy) = (ox + x, oy + y);
            if ix >= icon.width() || iy >= icon.height() {
                continue;
            }
            let src = icon.get_pixel(ix, iy);
            let dst = frame.get_pixel_mut(x0 + x, y0 + y);
            for c in 0..3 {
                dst.0[c] = dst.0[c].saturating_add(src.0[c]);
            }
        }
    }
}
