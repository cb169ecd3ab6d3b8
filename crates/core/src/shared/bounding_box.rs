/// Axis-aligned face box in pixel coordinates, stored as
/// `(top, right, bottom, left)` with exclusive right/bottom edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl BoundingBox {
    pub fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Builds a box from `[x1, y1, x2, y2]` float corners, rounding outward.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            top: y1.floor() as i32,
            right: x2.ceil() as i32,
            bottom: y2.ceil() as i32,
            left: x1.floor() as i32,
        }
    }

    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// Multiplies every coordinate by `factor`.
    ///
    /// Maps boxes found on a downscaled frame back onto the original frame
    /// (`factor = 1 / scale`).
    pub fn scaled(&self, factor: f64) -> Self {
        let s = |v: i32| (v as f64 * factor).round() as i32;
        Self {
            top: s(self.top),
            right: s(self.right),
            bottom: s(self.bottom),
            left: s(self.left),
        }
    }

    /// Intersects the box with a `width` x `height` frame.
    ///
    /// Returns `None` when nothing of the box is left inside the frame.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        let clamped = Self {
            top: self.top.clamp(0, height as i32),
            right: self.right.clamp(0, width as i32),
            bottom: self.bottom.clamp(0, height as i32),
            left: self.left.clamp(0, width as i32),
        };
        if clamped.area() == 0 {
            None
        } else {
            Some(clamped)
        }
    }

    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let inter = Self {
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
            left: self.left.max(other.left),
        }
        .area() as f64;
        if inter == 0.0 {
            return 0.0;
        }
        inter / (self.area() as f64 + other.area() as f64 - inter)
    }
}
