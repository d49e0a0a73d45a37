use super::VELOCITY_HORIZON;
use crate::config::GestureConfig;
use std::collections::VecDeque;
use std::time::Duration;
use strum::{Display, EnumString};
use uigeom::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Point,
    pub time: Duration,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, position: Point, time: Duration) -> Self {
        Self {
            kind,
            position,
            time,
        }
    }
}

/// Horizontal velocity estimate from recent pointer samples.
///
/// Uses the least-squares slope of x over time for samples inside
/// [`VELOCITY_HORIZON`] of the newest one.
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    samples: VecDeque<(Duration, f64)>,
}

impl VelocityTracker {
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn add(&mut self, time: Duration, x: f64) {
        self.samples.push_back((time, x));
        while let Some(&(oldest, _)) = self.samples.front() {
            if time.saturating_sub(oldest) > VELOCITY_HORIZON {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Velocity in px/s, clamped to `±max_velocity`.
    pub fn velocity(&self, max_velocity: f64) -> f64 {
        let Some(&(latest, _)) = self.samples.back() else {
            return 0.0;
        };
        if self.samples.len() < 2 {
            return 0.0;
        }

        let points: Vec<(f64, f64)> = self
            .samples
            .iter()
            .map(|&(t, x)| (-(latest.saturating_sub(t).as_secs_f64()), x))
            .collect();
        let n = points.len() as f64;
        let mean_t = points.iter().map(|(t, _)| t).sum::<f64>() / n;
        let mean_x = points.iter().map(|(_, x)| x).sum::<f64>() / n;
        let (num, den) = points.iter().fold((0.0, 0.0), |(num, den), (t, x)| {
            let dt = t - mean_t;
            (num + dt * (x - mean_x), den + dt * dt)
        });
        if den == 0.0 {
            return 0.0;
        }
        (num / den).clamp(-max_velocity, max_velocity)
    }
}

/// What the arc layout must do in response to a pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureAction {
    /// Pointer went down; running animators must stop.
    Interrupt,
    /// Slop was exceeded; dragging starts with this first delta.
    StartDrag { delta: f64 },
    Drag { delta: f64 },
    Fling { velocity: f64 },
    Settle,
    Ignore,
}

/// Turns a pointer stream into scroll deltas, fling velocities and settle requests.
#[derive(Debug, Clone)]
pub struct GestureAdapter {
    config: GestureConfig,
    tracker: VelocityTracker,
    down: Option<Point>,
    last: Point,
    dragging: bool,
}

impl GestureAdapter {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            tracker: VelocityTracker::default(),
            down: None,
            last: Point::default(),
            dragging: false,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// `scrollable` is false while the layout has fewer than three children.
    pub fn on_event(&mut self, event: &PointerEvent, scrollable: bool) -> GestureAction {
        let x = event.position.x;
        let action = match event.kind {
            PointerKind::Down => {
                self.tracker.clear();
                self.tracker.add(event.time, x);
                self.down = Some(event.position);
                self.dragging = false;
                GestureAction::Interrupt
            }
            PointerKind::Move => {
                self.tracker.add(event.time, x);
                let delta = x - self.last.x;
                match self.down {
                    Some(_) if self.dragging => GestureAction::Drag { delta },
                    Some(down) if scrollable && (x - down.x).abs() > self.config.touch_slop => {
                        self.dragging = true;
                        GestureAction::StartDrag { delta }
                    }
                    _ => GestureAction::Ignore,
                }
            }
            PointerKind::Up | PointerKind::Cancel => {
                let action = if self.dragging {
                    let velocity = self.tracker.velocity(self.config.max_fling_velocity);
                    if velocity.abs() < self.config.min_fling_velocity {
                        GestureAction::Settle
                    } else {
                        GestureAction::Fling { velocity }
                    }
                } else {
                    GestureAction::Ignore
                };
                self.tracker.clear();
                self.down = None;
                self.dragging = false;
                action
            }
        };
        self.last = event.position;
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn event(kind: PointerKind, x: f64, t: u64) -> PointerEvent {
        PointerEvent::new(kind, Point::new(x, 50.0), ms(t))
    }

    #[test]
    fn test_velocity_of_steady_motion() {
        let mut tracker = VelocityTracker::default();
        for i in 0..6 {
            tracker.add(ms(i * 10), i as f64 * 10.0);
        }
        // 10 px every 10 ms
        assert!((tracker.velocity(8000.0) - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_velocity_ignores_stale_samples() {
        let mut tracker = VelocityTracker::default();
        tracker.add(ms(0), 0.0);
        tracker.add(ms(10), 500.0);
        tracker.add(ms(500), 500.0);
        tracker.add(ms(510), 500.0);
        assert_eq!(tracker.velocity(8000.0), 0.0);
    }

    #[test]
    fn test_velocity_is_clamped() {
        let mut tracker = VelocityTracker::default();
        tracker.add(ms(0), 0.0);
        tracker.add(ms(1), 100.0);
        assert_eq!(tracker.velocity(8000.0), 8000.0);
        assert_eq!(VelocityTracker::default().velocity(8000.0), 0.0);
    }

    #[test]
    fn test_slop_must_be_exceeded_before_dragging() {
        let mut adapter = GestureAdapter::new(GestureConfig::default());
        assert_eq!(
            adapter.on_event(&event(PointerKind::Down, 100.0, 0), true),
            GestureAction::Interrupt
        );
        assert_eq!(
            adapter.on_event(&event(PointerKind::Move, 105.0, 10), true),
            GestureAction::Ignore
        );
        assert_eq!(
            adapter.on_event(&event(PointerKind::Move, 112.0, 20), true),
            GestureAction::StartDrag { delta: 7.0 }
        );
        assert_eq!(
            adapter.on_event(&event(PointerKind::Move, 120.0, 30), true),
            GestureAction::Drag { delta: 8.0 }
        );
        assert!(adapter.is_dragging());
    }

    #[test]
    fn test_not_scrollable_never_drags() {
        let mut adapter = GestureAdapter::new(GestureConfig::default());
        adapter.on_event(&event(PointerKind::Down, 100.0, 0), false);
        assert_eq!(
            adapter.on_event(&event(PointerKind::Move, 300.0, 10), false),
            GestureAction::Ignore
        );
        assert_eq!(
            adapter.on_event(&event(PointerKind::Up, 300.0, 20), false),
            GestureAction::Ignore
        );
    }

    #[test]
    fn test_slow_release_settles() {
        let mut adapter = GestureAdapter::new(GestureConfig::default());
        adapter.on_event(&event(PointerKind::Down, 100.0, 0), true);
        adapter.on_event(&event(PointerKind::Move, 120.0, 100), true);
        adapter.on_event(&event(PointerKind::Move, 121.0, 200), true);
        assert_eq!(
            adapter.on_event(&event(PointerKind::Up, 121.0, 300), true),
            GestureAction::Settle
        );
        assert!(!adapter.is_dragging());
    }

    #[test]
    fn test_fast_release_flings_in_both_directions() {
        for direction in [1.0, -1.0] {
            let mut adapter = GestureAdapter::new(GestureConfig::default());
            adapter.on_event(&event(PointerKind::Down, 200.0, 0), true);
            for i in 1..=5u64 {
                adapter.on_event(
                    &event(PointerKind::Move, 200.0 + direction * 20.0 * i as f64, i * 10),
                    true,
                );
            }
            match adapter.on_event(&event(PointerKind::Cancel, 200.0 + direction * 100.0, 50), true)
            {
                GestureAction::Fling { velocity } => {
                    assert!((velocity - direction * 2000.0).abs() < 1e-6)
                }
                other => panic!("expected fling, got {:?}", other),
            }
        }
    }
}
