use crate::config::{Radius, Spacing};
use uigeom::angle::point_on_circle;
use uigeom::{Point, Rect, Size};

/// Arc geometry resolved against the current layout size.
///
/// The arc's center sits on the horizontal middle of the layout, one radius below the
/// top edge, so a child at the centered position touches the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub center: Point,
    pub radius: f64,
    pub spacing: Spacing,
}

impl ArcGeometry {
    pub fn resolve(size: Size, radius: Radius, spacing: Spacing) -> Self {
        let radius = radius.resolve(size);
        Self {
            center: Point::new(size.width / 2.0, radius),
            radius,
            spacing,
        }
    }

    /// Radius of the circle a child's center travels on.
    pub fn path_radius(&self, child: Size) -> f64 {
        (self.radius - child.height / 2.0).max(0.0)
    }

    /// Frame of a child displaced `steps` positions (fractional) from the centered one.
    ///
    /// `steps * spacing` is measured in px for linear spacing and in degrees for angular.
    pub fn frame_on_arc(&self, child: Size, displacement: f64) -> Rect {
        let r = self.path_radius(child);
        match self.spacing {
            Spacing::Linear(_) => {
                let cx = self.center.x + displacement;
                let dx = (cx - self.center.x).abs();
                let dy = (r * r - dx * dx).max(0.0).sqrt();
                let top = self.center.y - (dy + child.height / 2.0);
                Rect::from_origin(Point::new(cx - child.width / 2.0, top), child)
            }
            Spacing::Angular(_) => {
                Rect::centered_at(point_on_circle(self.center, r, displacement), child)
            }
        }
    }

    /// Center distance used when two children sit side by side.
    fn pitch(&self, child: Size) -> f64 {
        match self.spacing {
            Spacing::Linear(px) => px,
            Spacing::Angular(deg) => 2.0 * self.path_radius(child) * (deg.to_radians() / 2.0).sin(),
        }
    }

    /// Single child: centered horizontally at the top.
    pub fn frame_single(&self, child: Size) -> Rect {
        Rect::from_origin(Point::new(self.center.x - child.width / 2.0, 0.0), child)
    }

    /// Two children: side by side around the middle, no arc.
    pub fn frame_pair(&self, index: usize, child: Size) -> Rect {
        let half = self.pitch(child) / 2.0;
        let cx = if index == 0 {
            self.center.x - half
        } else {
            self.center.x + half
        };
        Rect::from_origin(Point::new(cx - child.width / 2.0, 0.0), child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Basis;

    fn geometry(spacing: Spacing) -> ArcGeometry {
        ArcGeometry::resolve(
            Size::new(400.0, 600.0),
            Radius::Ratio(0.7, Basis::Width),
            spacing,
        )
    }

    #[test]
    fn test_centered_child_touches_top() {
        let child = Size::new(40.0, 40.0);
        for spacing in [Spacing::Linear(60.0), Spacing::Angular(15.0)] {
            let rect = geometry(spacing).frame_on_arc(child, 0.0);
            assert!((rect.top - 0.0).abs() < 1e-9);
            assert!((rect.center().x - 200.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_linear_children_drop_along_the_circle() {
        let g = geometry(Spacing::Linear(60.0));
        let child = Size::new(40.0, 40.0);
        let right = g.frame_on_arc(child, 60.0);
        let left = g.frame_on_arc(child, -60.0);
        assert_eq!(right.center().x, 260.0);
        assert_eq!(left.center().x, 140.0);
        assert!(right.top > 0.0);
        assert_eq!(right.top, left.top);
        // r = 280 - 20, top = 280 - (sqrt(260^2 - 60^2) + 20)
        let expected = 280.0 - ((260.0f64 * 260.0 - 3600.0).sqrt() + 20.0);
        assert!((right.top - expected).abs() < 1e-9);
    }

    #[test]
    fn test_linear_child_beyond_radius_sits_on_center_line() {
        let g = geometry(Spacing::Linear(60.0));
        let rect = g.frame_on_arc(Size::new(40.0, 40.0), 1000.0);
        assert_eq!(rect.top, 280.0 - 20.0);
    }

    #[test]
    fn test_angular_children_rotate_around_center() {
        let g = geometry(Spacing::Angular(90.0));
        let rect = g.frame_on_arc(Size::new(40.0, 40.0), 90.0);
        let c = rect.center();
        assert!((c.x - (200.0 + 260.0)).abs() < 1e-9);
        assert!((c.y - 280.0).abs() < 1e-9);
    }

    #[test]
    fn test_special_cases_for_one_and_two_children() {
        let g = geometry(Spacing::Linear(60.0));
        let child = Size::new(40.0, 30.0);
        assert_eq!(g.frame_single(child), Rect::new(180.0, 0.0, 220.0, 30.0));
        assert_eq!(g.frame_pair(0, child), Rect::new(150.0, 0.0, 190.0, 30.0));
        assert_eq!(g.frame_pair(1, child), Rect::new(210.0, 0.0, 250.0, 30.0));
    }
}
