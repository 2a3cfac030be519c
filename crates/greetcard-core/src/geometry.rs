use serde::{Deserialize, Serialize};

/// A 2D point in canvas coordinates (CSS pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Rotate this point around `pivot` by `degrees` (clockwise on a y-down canvas).
    pub fn rotate_around(&self, pivot: &Point, degrees: f64) -> Self {
        let rad = degrees.to_radians();
        let (sin_r, cos_r) = rad.sin_cos();
        let dx = self.x - pivot.x;
        let dy = self.y - pivot.y;
        Self {
            x: pivot.x + dx * cos_r - dy * sin_r,
            y: pivot.y + dx * sin_r + dy * cos_r,
        }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        })
    }
}

/// A `width` x `height` rectangle centered on `center` and rotated about
/// that center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    pub center: Point,
    pub width: f64,
    pub height: f64,
    pub rotation_degrees: f64,
}

impl RotatedRect {
    pub fn new(center: Point, width: f64, height: f64, rotation_degrees: f64) -> Self {
        Self {
            center,
            width,
            height,
            rotation_degrees,
        }
    }

    /// A rectangle whose top-left corner sits at `anchor` before rotating
    /// about that anchor.
    pub fn anchored(anchor: Point, width: f64, height: f64, rotation_degrees: f64) -> Self {
        let center = anchor
            .translate(width / 2.0, height / 2.0)
            .rotate_around(&anchor, rotation_degrees);
        Self::new(center, width, height, rotation_degrees)
    }

    pub fn corners(&self) -> [Point; 4] {
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        let c = self.center;
        [
            Point::new(c.x - hw, c.y - hh),
            Point::new(c.x + hw, c.y - hh),
            Point::new(c.x + hw, c.y + hh),
            Point::new(c.x - hw, c.y + hh),
        ]
        .map(|p| p.rotate_around(&c, self.rotation_degrees))
    }

    /// Axis-aligned bounds of the rotated corners.
    pub fn bounds(&self) -> BBox {
        // Four corners, never empty.
        BBox::from_points(&self.corners()).unwrap_or(BBox::new(self.center, self.center))
    }

    /// Exact containment: `p` is rotated back into the rectangle's own
    /// frame and tested against the unrotated extents. Edges count.
    pub fn contains(&self, p: &Point) -> bool {
        let local = p.rotate_around(&self.center, -self.rotation_degrees);
        (local.x - self.center.x).abs() <= self.width / 2.0 + 1e-9
            && (local.y - self.center.y).abs() <= self.height / 2.0 + 1e-9
    }
}

/// Clamp `value` into `[min, max]`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}
