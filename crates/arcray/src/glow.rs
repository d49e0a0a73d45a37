use crate::config::GlowConfig;
use palette::Srgba;
use uigeom::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Srgba<f64>,
}

impl GradientStop {
    fn new(offset: f64, color: Srgba<f64>) -> Self {
        Self { offset, color }
    }
}

/// Radial gradient painting a ring border with a soft glow outside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGlow {
    pub center: Point,
    pub radius: f64,
    pub stops: [GradientStop; 6],
}

pub struct GlowDrawable {
    border_color: Srgba<f64>,
    glow_color: Srgba<f64>,
    border_width: f64,
    glow_width: f64,
    bounds: Rect,
    glow: Option<RadialGlow>,
}

impl GlowDrawable {
    pub fn new(config: &GlowConfig) -> Self {
        Self {
            border_color: *config.border_color,
            glow_color: *config.glow_color,
            border_width: config.border_width,
            glow_width: config.glow_width,
            bounds: Rect::default(),
            glow: None,
        }
    }

    pub fn apply_config(&mut self, config: &GlowConfig) {
        self.border_color = *config.border_color;
        self.glow_color = *config.glow_color;
        self.border_width = config.border_width;
        self.glow_width = config.glow_width;
        let bounds = self.bounds;
        self.set_bounds(bounds);
    }

    pub fn glow(&self) -> Option<&RadialGlow> {
        self.glow.as_ref()
    }

    /// Rebuilds the gradient for new bounds. Empty bounds keep the previous one.
    pub fn set_bounds(&mut self, bounds: Rect) {
        if bounds.is_empty() {
            return;
        }
        self.bounds = bounds;

        let radius = bounds.width() / 2.0 + self.border_width + self.glow_width;
        let border_end = (radius - self.glow_width) / radius;
        let border_start = (radius - self.glow_width - self.border_width) / radius;
        let transparent = Srgba::new(0.0, 0.0, 0.0, 0.0);

        self.glow = Some(RadialGlow {
            center: bounds.center(),
            radius,
            stops: [
                GradientStop::new(0.0, transparent),
                GradientStop::new(border_start, transparent),
                GradientStop::new(border_start, self.border_color),
                GradientStop::new(border_end, self.border_color),
                GradientStop::new(border_end, self.glow_color),
                GradientStop::new(1.0, transparent),
            ],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_rings() {
        let mut drawable = GlowDrawable::new(&GlowConfig {
            border_width: 5.0,
            glow_width: 10.0,
            ..GlowConfig::default()
        });
        assert!(drawable.glow().is_none());

        drawable.set_bounds(Rect::new(0.0, 0.0, 50.0, 50.0));
        let glow = drawable.glow().unwrap();
        assert_eq!(glow.center, Point::new(25.0, 25.0));
        assert_eq!(glow.radius, 40.0);
        let offsets: Vec<f64> = glow.stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.625, 0.625, 0.75, 0.75, 1.0]);
        assert_eq!(glow.stops[2].color, *GlowConfig::default().border_color);
        assert_eq!(glow.stops[4].color, *GlowConfig::default().glow_color);
        assert_eq!(glow.stops[5].color.alpha, 0.0);
    }

    #[test]
    fn test_empty_bounds_keep_gradient() {
        let mut drawable = GlowDrawable::new(&GlowConfig::default());
        drawable.set_bounds(Rect::new(10.0, 10.0, 30.0, 30.0));
        let before = *drawable.glow().unwrap();
        drawable.set_bounds(Rect::default());
        assert_eq!(*drawable.glow().unwrap(), before);
    }

    #[test]
    fn test_config_change_rebuilds_gradient() {
        let mut drawable = GlowDrawable::new(&GlowConfig::default());
        drawable.set_bounds(Rect::new(0.0, 0.0, 40.0, 40.0));
        drawable.apply_config(&GlowConfig {
            glow_width: 0.0,
            border_width: 0.0,
            ..GlowConfig::default()
        });
        let glow = drawable.glow().unwrap();
        assert_eq!(glow.radius, 20.0);
        assert_eq!(glow.stops[3].offset, 1.0);
    }
}
