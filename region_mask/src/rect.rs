//! Integer screen geometry.

/// A point in frame pixel coordinates.  May lie outside the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Size {
    pub width:  u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Size { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Axis-aligned rectangle; `bottom_right` is exclusive.
///
/// Invariant: `top_left <= bottom_right` component-wise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    top_left:     Point,
    bottom_right: Point,
}

impl Rect {
    /// `None` if the corners are out of order.
    pub fn new(top_left: Point, bottom_right: Point) -> Option<Self> {
        (top_left.x <= bottom_right.x && top_left.y <= bottom_right.y)
            .then_some(Rect { top_left, bottom_right })
    }

    pub fn centered(center: Point, size: Size) -> Self {
        let half_w = (size.width / 2) as i32;
        let half_h = (size.height / 2) as i32;
        Rect {
            top_left:     Point::new(center.x - half_w, center.y - half_h),
            bottom_right: Point::new(center.x + half_w, center.y + half_h),
        }
    }

    pub fn top_left(&self)     -> Point { self.top_left }
    pub fn bottom_right(&self) -> Point { self.bottom_right }

    pub fn width(&self)  -> u32 { (self.bottom_right.x - self.top_left.x) as u32 }
    pub fn height(&self) -> u32 { (self.bottom_right.y - self.top_left.y) as u32 }
    pub fn size(&self)   -> Size { Size::new(self.width(), self.height()) }

    pub fn center(&self) -> Point {
        Point::new(
            (self.top_left.x + self.bottom_right.x) / 2,
            (self.top_left.y + self.bottom_right.y) / 2,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.top_left.x && p.x < self.bottom_right.x
            && p.y >= self.top_left.y && p.y < self.bottom_right.y
    }

    /// True when the whole rectangle lies inside a `width`×`height` frame.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.top_left.x >= 0
            && self.top_left.y >= 0
            && self.bottom_right.x as i64 <= width as i64
            && self.bottom_right.y as i64 <= height as i64
    }

    /// Intersection with a `width`×`height` frame as `(x, y, w, h)`, ready
    /// for `image::imageops::crop_imm`.  `None` when nothing overlaps.
    pub fn clip(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = self.top_left.x.clamp(0, width as i32);
        let y0 = self.top_left.y.clamp(0, height as i32);
        let x1 = self.bottom_right.x.clamp(0, width as i32);
        let y1 = self.bottom_right.y.clamp(0, height as i32);
        (x1 > x0 && y1 > y0)
            .then(|| (x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
