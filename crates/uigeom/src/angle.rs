use crate::point::Point;

/// Angle of the segment `from -> to`, in degrees clockwise from "up".
///
/// Screen y grows downwards, so "up" is negative y. The result is in `[0, 360)`.
/// Endpoints on the same horizontal line give exactly 90 (to the right) or 270.
pub fn degrees_to_vertical(from: Point, to: Point) -> f64 {
    let dx = to.x - from.x;
    let dy = from.y - to.y;
    if dy == 0.0 {
        return if dx > 0.0 { 90.0 } else { 270.0 };
    }
    dx.atan2(dy).to_degrees().rem_euclid(360.0)
}

/// Projects a point at `degrees` (clockwise from up) on a circle.
pub fn point_on_circle(center: Point, radius: f64, degrees: f64) -> Point {
    let rad = degrees.to_radians();
    Point::new(center.x + radius * rad.sin(), center.y - radius * rad.cos())
}
