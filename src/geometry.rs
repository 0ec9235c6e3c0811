//! Bounding-box algebra for page layout.
//!
//! All coordinates follow the decoder convention: origin at the bottom-left
//! of the page, y increasing upward, raw layout units (pt). Comparisons are
//! exact; there is no fuzz epsilon.

use std::fmt;

/// An axis-aligned bounding box `(x0, y0, x1, y1)`.
#[derive(Copy, Clone, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x0, self.y0, self.x1, self.y1)
    }
}

impl Rect {
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Whether the horizontal extents of the two boxes overlap.
    ///
    /// The boxes are first swapped so that the left one comes first; the test
    /// is then `right.x0 <= left.x1 <= right.x1`. Used to decide whether a
    /// line shares a column region with an existing sub-block.
    pub fn x_overlaps(&self, other: &Rect) -> bool {
        let (left, right) = if self.x0 <= other.x0 {
            (self, other)
        } else {
            (other, self)
        };
        right.x0 <= left.x1 && left.x1 <= right.x1
    }

    /// Whether the horizontal gap between the two boxes is at least
    /// `ratio` times the height of the right-hand box.
    pub fn column_gap(&self, other: &Rect, ratio: f32) -> bool {
        let (left, right) = if self.x0 <= other.x0 {
            (self, other)
        } else {
            (other, self)
        };
        (right.x0 - left.x1) >= ratio * right.height()
    }

    /// Reflects the box against a page of height `page_h`, so that y grows
    /// downward (image convention). The core pipeline never calls this; it is
    /// exposed for consumers that render onto raster output.
    pub fn flipped_y(&self, page_h: f32) -> Rect {
        Rect {
            x0: self.x0,
            y0: page_h - self.y0,
            x1: self.x1,
            y1: page_h - self.y1,
        }
    }

    /// Comma-joined `x0,y0,x1,y1`, used both as an index key and in the XML
    /// output.
    pub fn bbox_string(&self) -> String {
        format!("{},{},{},{}", self.x0, self.y0, self.x1, self.y1)
    }

    /// Parses a string produced by [`Rect::bbox_string`].
    pub fn from_bbox_string(s: &str) -> Option<Rect> {
        let mut parts = s.split(',').map(|p| p.trim().parse::<f32>());
        let x0 = parts.next()?.ok()?;
        let y0 = parts.next()?.ok()?;
        let x1 = parts.next()?.ok()?;
        let y1 = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Rect { x0, y0, x1, y1 })
    }

    /// Coarse location key `(round(x0, -1), round(y1, -1))`: both coordinates
    /// rounded to the nearest multiple of ten. Blocks that sit at roughly the
    /// same spot on the page share a key.
    pub fn position_key(&self) -> (i64, i64) {
        (round_to_ten(self.x0), round_to_ten(self.y1))
    }
}

fn round_to_ten(v: f32) -> i64 {
    ((v / 10.0).round() as i64) * 10
}
