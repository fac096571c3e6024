//! Rectangle geometry.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at the origin.
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Check if the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Area shared with `other`.
    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let width = self.max_x().min(other.max_x()) - self.x.max(other.x);
        let height = self.max_y().min(other.max_y()) - self.y.max(other.y);
        width.max(0.0) * height.max(0.0)
    }

    /// Check if `other` lies within this rectangle, allowing `tolerance`.
    pub fn contains_rect(&self, other: &Rect, tolerance: f64) -> bool {
        other.x >= self.x - tolerance
            && other.y >= self.y - tolerance
            && other.max_x() <= self.max_x() + tolerance
            && other.max_y() <= self.max_y() + tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_and_bounds() {
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(rect.area(), 12.0);
        assert_eq!(rect.max_x(), 4.0);
        assert_eq!(rect.max_y(), 6.0);
        assert!(!rect.is_empty());
        assert!(Rect::from_size(0.0, 5.0).is_empty());
    }

    #[test]
    fn test_intersection() {
        let a = Rect::from_size(10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(10.0, 0.0, 5.0, 5.0);

        assert_eq!(a.intersection_area(&b), 25.0);
        // Touching edges do not overlap.
        assert_eq!(a.intersection_area(&c), 0.0);
    }

    #[test]
    fn test_contains_rect() {
        let outer = Rect::from_size(10.0, 10.0);
        assert!(outer.contains_rect(&Rect::new(2.0, 2.0, 8.0, 8.0), 0.0));
        assert!(!outer.contains_rect(&Rect::new(2.0, 2.0, 9.0, 8.0), 0.0));
        assert!(outer.contains_rect(&Rect::new(2.0, 2.0, 8.0 + 1e-12, 8.0), 1e-9));
    }
}
