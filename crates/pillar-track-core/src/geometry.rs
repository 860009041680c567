//! Value types shared by the detection and tracking stages.
//!
//! Positions are explicit (x, y) structs rather than tuples so that
//! (row, col) and (x, y) conventions cannot be silently transposed.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Integer pixel position, x = column, y = row, row 0 at the top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn to_point2(self) -> Point2<f64> {
        Point2::new(self.x as f64, self.y as f64)
    }

    /// Nearest-integer conversion from continuous coordinates.
    #[inline]
    pub fn from_point2(p: Point2<f64>) -> Self {
        Self {
            x: p.x.round() as i32,
            y: p.y.round() as i32,
        }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: PixelPoint) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Candidate or confirmed pillar boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    pub center: PixelPoint,
    pub radius: i32,
}

impl Circle {
    pub fn new(center: PixelPoint, radius: i32) -> Self {
        Self { center, radius }
    }
}

/// Axis-aligned region with `x1 < x2` and `y1 < y2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn center_x(&self) -> i32 {
        (self.x1 + self.x2) / 2
    }

    pub fn center_y(&self) -> i32 {
        (self.y1 + self.y2) / 2
    }

    pub fn contains_point(&self, p: PixelPoint) -> bool {
        self.x1 <= p.x && p.x <= self.x2 && self.y1 <= p.y && p.y <= self.y2
    }

    /// True when the entire disk lies strictly inside the box, with no
    /// contact between the disk and the box edges.
    pub fn contains_disk(&self, c: &Circle) -> bool {
        self.x1 < c.center.x - c.radius
            && c.center.x + c.radius < self.x2
            && self.y1 < c.center.y - c.radius
            && c.center.y + c.radius < self.y2
    }
}

/// Estimated x positions of the two channel walls, `left_x < right_x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSides {
    pub left_x: i32,
    pub right_x: i32,
}

impl ChannelSides {
    pub fn new(left_x: i32, right_x: i32) -> Self {
        Self { left_x, right_x }
    }

    /// Channel width in pixels.
    pub fn width(&self) -> i32 {
        self.right_x - self.left_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = PixelPoint::new(0, 0);
        let b = PixelPoint::new(3, 4);
        assert_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn rounds_continuous_coordinates_to_nearest() {
        let p = PixelPoint::from_point2(Point2::new(2.5, -1.2));
        assert_eq!(p, PixelPoint::new(3, -1));
    }

    #[test]
    fn disk_touching_the_box_edge_is_outside() {
        let bbox = BoundingBox::new(0, 0, 100, 100);
        let inside = Circle::new(PixelPoint::new(50, 50), 10);
        let touching = Circle::new(PixelPoint::new(10, 50), 10);
        assert!(bbox.contains_disk(&inside));
        assert!(!bbox.contains_disk(&touching));
    }

    #[test]
    fn circle_serializes_with_named_fields() {
        let c = Circle::new(PixelPoint::new(4, 7), 12);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"center":{"x":4,"y":7},"radius":12}"#);
        let back: Circle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
