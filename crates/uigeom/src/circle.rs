use crate::point::Point;
use crate::rect::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Largest circle that fits inside `rect`.
    pub fn inner_of(rect: &Rect) -> Self {
        Self::new(rect.center(), rect.width().min(rect.height()) / 2.0)
    }

    /// Smallest circle centered on `rect` that covers its longer side.
    pub fn outer_of(rect: &Rect) -> Self {
        Self::new(rect.center(), rect.width().max(rect.height()) / 2.0)
    }

    pub fn distance_to(&self, other: &Circle) -> f64 {
        self.center.distance_to(other.center)
    }
}
