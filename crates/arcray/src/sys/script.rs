use crate::arc::PointerKind;
use crate::events::AppEvent;
use async_channel::Sender;
use std::time::Duration;
use uigeom::Point;

/// A straight horizontal drag, released while still moving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swipe {
    pub from: Point,
    pub distance: f64,
    pub steps: u32,
    pub step_interval: Duration,
}

impl Swipe {
    pub fn new(from: Point, distance: f64) -> Self {
        Self {
            from,
            distance,
            steps: 12,
            step_interval: Duration::from_millis(10),
        }
    }

    /// Pointer events with the delay to wait before sending each one.
    pub fn events(&self) -> Vec<(Duration, AppEvent)> {
        let steps = self.steps.max(1);
        let step = self.distance / steps as f64;
        let mut events = vec![(Duration::ZERO, AppEvent::Pointer(PointerKind::Down, self.from))];
        events.extend((1..=steps).map(|i| {
            let p = self.from.offset(step * i as f64, 0.0);
            (self.step_interval, AppEvent::Pointer(PointerKind::Move, p))
        }));
        let end = self.from.offset(self.distance, 0.0);
        events.push((Duration::ZERO, AppEvent::Pointer(PointerKind::Up, end)));
        events
    }
}

/// Plays `swipes` one after another, waits `linger` for the carousel to come to rest,
/// then asks the loop to quit.
pub async fn run_script(tx: Sender<AppEvent>, swipes: Vec<Swipe>, pause: Duration, linger: Duration) {
    for swipe in swipes {
        log::info!("Swiping {:.0}px from {:?}", swipe.distance, swipe.from);
        for (delay, event) in swipe.events() {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if tx.send(event).await.is_err() {
                return;
            }
        }
        tokio::time::sleep(pause).await;
    }
    tokio::time::sleep(linger).await;
    let _ = tx.send(AppEvent::Quit).await;
}
