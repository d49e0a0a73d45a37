use super::RayHandle;
use super::tracking::{Endpoint, Subscription, ViewId, ViewTree};
use std::time::Duration;
use uigeom::angle::degrees_to_vertical;
use uigeom::{Circle, Point, Rect, Size};

pub trait RayListener {
    fn on_start(&mut self, _ray: RayHandle) {}

    /// Called once per `start` when the ray reaches full length. The registry is
    /// free to mutate here; a non-persistent ray is already gone by then. Restarting
    /// the ray from here delivers its `on_start` right after this returns.
    fn on_end(&mut self, _ray: RayHandle, _rays: &mut RayRegistry) {}
}

/// One animated connector between two circles.
pub struct RayAnimation {
    pub from: Circle,
    pub to: Circle,
    /// Zero means the ray is always drawn complete and never reports an end.
    pub duration: Duration,
    /// Keeps the ray drawn at full length after it ends.
    pub persistent: bool,
    start_time: Option<Duration>,
    started: bool,
    listener: Option<Box<dyn RayListener>>,
    in_callback: bool,
    start_pending: bool,
}

impl RayAnimation {
    fn new(from: Circle, to: Circle) -> Self {
        Self {
            from,
            to,
            duration: Duration::ZERO,
            persistent: false,
            start_time: None,
            started: false,
            listener: None,
            in_callback: false,
            start_pending: false,
        }
    }

    pub fn set_listener(&mut self, listener: Box<dyn RayListener>) {
        self.listener = Some(listener);
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn fraction(&self, now: Duration) -> f64 {
        match self.start_time {
            Some(start) if !self.duration.is_zero() => {
                let passed = now.saturating_sub(start).min(self.duration);
                passed.as_secs_f64() / self.duration.as_secs_f64()
            }
            _ => 1.0,
        }
    }

    pub fn is_running(&self, now: Duration) -> bool {
        self.started && self.fraction(now) < 1.0
    }

    pub fn degrees_to_vertical(&self) -> f64 {
        degrees_to_vertical(self.from.center, self.to.center)
    }

    pub fn distance(&self) -> f64 {
        self.from.distance_to(&self.to)
    }
}

/// Where to paint one ray this frame.
///
/// `image` and `clip` are expressed before rotation: the canvas is rotated by
/// `rotation` degrees around `pivot` (the from-center), the ray image stretches from
/// the edge of the from-circle straight "up" to the edge of the to-circle, and `clip`
/// reveals the part of it grown so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayGeometry {
    pub ray: RayHandle,
    pub fraction: f64,
    pub rotation: f64,
    pub pivot: Point,
    pub image: Rect,
    pub clip: Rect,
}

impl RayGeometry {
    fn compute(ray: RayHandle, anim: &RayAnimation, fraction: f64, image_size: Size) -> Self {
        let from = anim.from.center;
        let left = from.x - image_size.width / 2.0;
        let right = from.x + image_size.width / 2.0;
        let top = from.y - (anim.distance() - anim.to.radius);
        let bottom = from.y - anim.from.radius;
        Self {
            ray,
            fraction,
            rotation: anim.degrees_to_vertical(),
            pivot: from,
            image: Rect::new(left, top, right, bottom),
            clip: Rect::new(left, (top - bottom) * fraction + bottom, right, bottom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RayFrame {
    pub rays: Vec<RayGeometry>,
    pub needs_next_frame: bool,
}

/// Tracks the active rays of an overlay and turns them into per-frame geometry.
pub struct RayRegistry {
    rays: Vec<(RayHandle, RayAnimation)>,
    subscriptions: Vec<Subscription>,
    image: Size,
    bounds: Rect,
    invalidated: bool,
}

impl RayRegistry {
    pub fn new(image: Size) -> Self {
        Self {
            rays: Vec::new(),
            subscriptions: Vec::new(),
            image,
            bounds: Rect::default(),
            invalidated: false,
        }
    }

    pub fn image(&self) -> Size {
        self.image
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.invalidated = true;
    }

    pub fn len(&self) -> usize {
        self.rays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rays.is_empty()
    }

    pub fn contains(&self, handle: RayHandle) -> bool {
        self.position(handle).is_some()
    }

    pub fn get(&self, handle: RayHandle) -> Option<&RayAnimation> {
        self.position(handle).map(|i| &self.rays[i].1)
    }

    pub fn get_mut(&mut self, handle: RayHandle) -> Option<&mut RayAnimation> {
        self.position(handle).map(|i| &mut self.rays[i].1)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_running(&self, now: Duration) -> bool {
        self.rays.iter().any(|(_, r)| r.is_running(now))
    }

    fn position(&self, handle: RayHandle) -> Option<usize> {
        self.rays.iter().position(|(h, _)| *h == handle)
    }

    pub fn add_ray(&mut self, from: Circle, to: Circle) -> RayHandle {
        let handle = RayHandle::unique();
        self.rays.push((handle, RayAnimation::new(from, to)));
        self.invalidated = true;
        handle
    }

    /// Adds a ray whose endpoints follow two views of `container`.
    ///
    /// Each endpoint starts on the inner circle of its view and its center is
    /// re-sampled in [`RayRegistry::on_pre_draw`]. Returns `None` if either view is gone.
    pub fn add_ray_for_views(
        &mut self,
        views: &dyn ViewTree,
        container: ViewId,
        from_view: ViewId,
        to_view: ViewId,
    ) -> Option<RayHandle> {
        let from = Circle::inner_of(&views.bounds_in(from_view, container)?);
        let to = Circle::inner_of(&views.bounds_in(to_view, container)?);
        let handle = self.add_ray(from, to);
        self.subscriptions.extend([
            Subscription::new(handle, Endpoint::From, from_view, container),
            Subscription::new(handle, Endpoint::To, to_view, container),
        ]);
        Some(handle)
    }

    pub fn remove_ray(&mut self, handle: RayHandle) -> bool {
        match self.position(handle) {
            Some(i) => {
                self.rays.remove(i);
                self.invalidated = true;
                true
            }
            None => false,
        }
    }

    pub fn set_duration(&mut self, handle: RayHandle, duration: Duration) -> bool {
        self.get_mut(handle).map(|r| r.duration = duration).is_some()
    }

    pub fn set_persistent(&mut self, handle: RayHandle, persistent: bool) -> bool {
        self.get_mut(handle).map(|r| r.persistent = persistent).is_some()
    }

    pub fn set_listener(&mut self, handle: RayHandle, listener: Box<dyn RayListener>) -> bool {
        self.get_mut(handle)
            .map(|r| r.set_listener(listener))
            .is_some()
    }

    pub fn start(&mut self, handle: RayHandle, now: Duration) -> bool {
        let Some(ray) = self.get_mut(handle) else {
            return false;
        };
        ray.start_time = Some(now);
        ray.started = true;
        match ray.listener.as_mut() {
            Some(listener) => listener.on_start(handle),
            None if ray.in_callback => ray.start_pending = true,
            None => {}
        }
        log::info!("ray {} started", handle);
        true
    }

    /// Re-samples tracked endpoints before a draw. Subscriptions whose ray was removed
    /// or whose view is gone cancel themselves. Returns whether anything moved.
    pub fn on_pre_draw(&mut self, views: &dyn ViewTree) -> bool {
        let Self {
            rays,
            subscriptions,
            invalidated,
            ..
        } = self;
        subscriptions.retain(|sub| {
            let Some((_, ray)) = rays.iter_mut().find(|(h, _)| *h == sub.ray) else {
                return false;
            };
            let Some(bounds) = sub.sample(views) else {
                log::debug!("view {} gone, ray {} stops tracking it", sub.view, sub.ray);
                return false;
            };
            let circle = match sub.endpoint {
                Endpoint::From => &mut ray.from,
                Endpoint::To => &mut ray.to,
            };
            let center = bounds.center();
            if circle.center != center {
                circle.center = center;
                *invalidated = true;
            }
            true
        });
        *invalidated
    }

    /// Produces this frame's geometry and finishes rays that reached full length.
    ///
    /// Finished non-persistent rays are removed once the pass is over, so they are
    /// still part of the returned frame and absent from the next one.
    pub fn draw(&mut self, now: Duration) -> RayFrame {
        self.invalidated = false;
        let mut geometries = Vec::with_capacity(self.rays.len());
        let mut completed = Vec::new();
        for (handle, ray) in &mut self.rays {
            let fraction = ray.fraction(now);
            geometries.push(RayGeometry::compute(*handle, ray, fraction, self.image));
            if ray.started && !ray.duration.is_zero() && fraction >= 1.0 {
                ray.started = false;
                completed.push(*handle);
            }
        }

        let finished: Vec<_> = completed
            .into_iter()
            .map(|handle| {
                let listener = match self.position(handle) {
                    Some(i) if !self.rays[i].1.persistent => {
                        let (_, ray) = self.rays.remove(i);
                        ray.listener
                    }
                    Some(i) => {
                        let ray = &mut self.rays[i].1;
                        ray.in_callback = ray.listener.is_some();
                        ray.listener.take()
                    }
                    None => None,
                };
                log::info!("ray {} finished", handle);
                (handle, listener)
            })
            .collect();

        for (handle, listener) in finished {
            let Some(mut listener) = listener else {
                continue;
            };
            listener.on_end(handle, self);
            let Some(ray) = self.get_mut(handle) else {
                continue;
            };
            ray.in_callback = false;
            if std::mem::take(&mut ray.start_pending) {
                listener.on_start(handle);
            }
            if ray.listener.is_none() {
                ray.listener = Some(listener);
            }
        }

        RayFrame {
            rays: geometries,
            needs_next_frame: self.is_running(now),
        }
    }

    /// Drops every ray and endpoint subscription.
    pub fn destroy(&mut self) {
        log::debug!(
            "destroying {} rays and {} subscriptions",
            self.rays.len(),
            self.subscriptions.len()
        );
        self.rays.clear();
        self.subscriptions.clear();
        self.invalidated = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn circle(x: f64, y: f64, r: f64) -> Circle {
        Circle::new(Point::new(x, y), r)
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Start(RayHandle),
        End(RayHandle),
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Call>>>);

    impl Recorder {
        fn ends(&self) -> usize {
            self.0
                .borrow()
                .iter()
                .filter(|c| matches!(c, Call::End(_)))
                .count()
        }
    }

    impl RayListener for Recorder {
        fn on_start(&mut self, ray: RayHandle) {
            self.0.borrow_mut().push(Call::Start(ray));
        }

        fn on_end(&mut self, ray: RayHandle, _rays: &mut RayRegistry) {
            self.0.borrow_mut().push(Call::End(ray));
        }
    }

    #[derive(Default)]
    struct FakeViews(HashMap<ViewId, Rect>);

    impl ViewTree for FakeViews {
        fn bounds_in(&self, view: ViewId, _container: ViewId) -> Option<Rect> {
            self.0.get(&view).copied()
        }
    }

    fn timed_ray(registry: &mut RayRegistry, persistent: bool) -> (RayHandle, Recorder) {
        let handle = registry.add_ray(circle(0.0, 0.0, 10.0), circle(0.0, 100.0, 10.0));
        let recorder = Recorder::default();
        assert!(registry.set_duration(handle, ms(1000)));
        assert!(registry.set_persistent(handle, persistent));
        assert!(registry.set_listener(handle, Box::new(recorder.clone())));
        (handle, recorder)
    }

    #[test]
    fn test_ray_grows_and_is_removed_after_completing_pass() {
        let mut registry = RayRegistry::new(Size::new(20.0, 300.0));
        let (handle, recorder) = timed_ray(&mut registry, false);
        assert!(registry.start(handle, ms(0)));
        assert_eq!(*recorder.0.borrow(), vec![Call::Start(handle)]);

        let frame = registry.draw(ms(0));
        let geometry = frame.rays[0];
        assert_eq!(geometry.fraction, 0.0);
        assert_eq!(geometry.clip.height(), 0.0);
        assert_eq!(geometry.rotation, 180.0);
        assert_eq!(geometry.image, Rect::new(-10.0, -90.0, 10.0, -10.0));
        assert!(frame.needs_next_frame);

        let frame = registry.draw(ms(500));
        assert_eq!(frame.rays[0].fraction, 0.5);
        assert_eq!(frame.rays[0].clip.height(), 40.0);

        registry.draw(ms(999));
        assert!(registry.contains(handle));
        assert_eq!(recorder.ends(), 0);

        let frame = registry.draw(ms(1000));
        assert_eq!(frame.rays.len(), 1);
        assert_eq!(frame.rays[0].fraction, 1.0);
        assert_eq!(frame.rays[0].clip, frame.rays[0].image);
        assert!(!frame.needs_next_frame);
        assert_eq!(recorder.ends(), 1);
        assert!(!registry.contains(handle));

        let frame = registry.draw(ms(1016));
        assert!(frame.rays.is_empty());
        assert_eq!(recorder.ends(), 1);
    }

    #[test]
    fn test_persistent_ray_stays_and_ends_once_per_start() {
        let mut registry = RayRegistry::new(Size::new(20.0, 300.0));
        let (handle, recorder) = timed_ray(&mut registry, true);
        registry.start(handle, ms(0));
        for t in [0, 500, 1000, 1016, 5000] {
            registry.draw(ms(t));
        }
        assert!(registry.contains(handle));
        assert_eq!(recorder.ends(), 1);
        assert_eq!(registry.draw(ms(6000)).rays[0].fraction, 1.0);

        registry.start(handle, ms(7000));
        registry.draw(ms(7500));
        assert_eq!(recorder.ends(), 1);
        registry.draw(ms(8000));
        registry.draw(ms(8016));
        assert_eq!(recorder.ends(), 2);
        assert!(registry.contains(handle));
    }

    struct Repeat {
        calls: Recorder,
        restart_at: Duration,
    }

    impl RayListener for Repeat {
        fn on_start(&mut self, ray: RayHandle) {
            self.calls.on_start(ray);
        }

        fn on_end(&mut self, ray: RayHandle, rays: &mut RayRegistry) {
            self.calls.0.borrow_mut().push(Call::End(ray));
            assert!(rays.start(ray, self.restart_at));
        }
    }

    #[test]
    fn test_restart_from_end_callback_reports_start() {
        let mut registry = RayRegistry::new(Size::new(20.0, 300.0));
        let (handle, _) = timed_ray(&mut registry, true);
        let calls = Recorder::default();
        registry.set_listener(
            handle,
            Box::new(Repeat {
                calls: calls.clone(),
                restart_at: ms(1000),
            }),
        );
        registry.start(handle, ms(0));
        registry.draw(ms(1000));
        assert_eq!(
            *calls.0.borrow(),
            vec![Call::Start(handle), Call::End(handle), Call::Start(handle)]
        );
        assert!(registry.get(handle).unwrap().is_started());
        assert_eq!(registry.draw(ms(1500)).rays[0].fraction, 0.5);

        registry.draw(ms(2000));
        assert_eq!(calls.ends(), 2);
        assert_eq!(calls.0.borrow().len(), 5);
    }

    #[test]
    fn test_unstarted_or_zero_duration_rays_never_end() {
        let mut registry = RayRegistry::new(Size::new(20.0, 300.0));
        let (pending, pending_rec) = timed_ray(&mut registry, false);
        let instant = registry.add_ray(circle(0.0, 0.0, 5.0), circle(50.0, 0.0, 5.0));
        registry.start(instant, ms(0));

        let frame = registry.draw(ms(2000));
        assert_eq!(frame.rays.len(), 2);
        assert!(frame.rays.iter().all(|g| g.fraction == 1.0));
        assert_eq!(frame.rays[1].rotation, 90.0);
        assert_eq!(pending_rec.ends(), 0);
        assert!(registry.contains(pending));
        assert!(registry.contains(instant));
        assert!(!frame.needs_next_frame);
    }

    #[test]
    fn test_horizontal_rays_point_sideways() {
        let mut registry = RayRegistry::new(Size::new(20.0, 300.0));
        let right = registry.add_ray(circle(0.0, 0.0, 1.0), circle(10.0, 0.0, 1.0));
        let left = registry.add_ray(circle(0.0, 0.0, 1.0), circle(-10.0, 0.0, 1.0));
        assert_eq!(registry.get(right).unwrap().degrees_to_vertical(), 90.0);
        assert_eq!(registry.get(left).unwrap().degrees_to_vertical(), 270.0);
    }

    struct Chain {
        victim: RayHandle,
        spawned: Rc<RefCell<Option<RayHandle>>>,
    }

    impl RayListener for Chain {
        fn on_end(&mut self, _ray: RayHandle, rays: &mut RayRegistry) {
            rays.remove_ray(self.victim);
            let next = rays.add_ray(circle(0.0, 0.0, 1.0), circle(0.0, -40.0, 1.0));
            *self.spawned.borrow_mut() = Some(next);
        }
    }

    #[test]
    fn test_end_callback_may_mutate_registry() {
        let mut registry = RayRegistry::new(Size::new(20.0, 300.0));
        let (first, _) = timed_ray(&mut registry, false);
        let (second, second_rec) = timed_ray(&mut registry, false);
        let victim = registry.add_ray(circle(0.0, 0.0, 1.0), circle(5.0, 5.0, 1.0));
        let spawned = Rc::new(RefCell::new(None));
        registry.set_listener(
            first,
            Box::new(Chain {
                victim,
                spawned: spawned.clone(),
            }),
        );

        registry.start(first, ms(0));
        registry.start(second, ms(0));
        let frame = registry.draw(ms(1000));
        assert_eq!(frame.rays.len(), 3);
        assert_eq!(second_rec.ends(), 1);

        let spawned = spawned.borrow().unwrap();
        assert!(!registry.contains(first));
        assert!(!registry.contains(second));
        assert!(!registry.contains(victim));
        assert!(registry.contains(spawned));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_tracked_endpoints_follow_views() {
        let container = ViewId::new(100);
        let (a, b) = (ViewId::new(1), ViewId::new(2));
        let mut views = FakeViews::default();
        views.0.insert(a, Rect::new(0.0, 0.0, 20.0, 40.0));
        views.0.insert(b, Rect::new(100.0, 0.0, 140.0, 40.0));

        let mut registry = RayRegistry::new(Size::new(20.0, 300.0));
        let handle = registry
            .add_ray_for_views(&views, container, a, b)
            .unwrap();
        let ray = registry.get(handle).unwrap();
        assert_eq!(ray.from, circle(10.0, 20.0, 10.0));
        assert_eq!(ray.to, circle(120.0, 20.0, 20.0));
        assert_eq!(registry.subscription_count(), 2);

        registry.draw(ms(0));
        assert!(!registry.on_pre_draw(&views));

        views.0.insert(b, Rect::new(100.0, 200.0, 140.0, 240.0));
        assert!(registry.on_pre_draw(&views));
        let ray = registry.get(handle).unwrap();
        assert_eq!(ray.to.center, Point::new(120.0, 220.0));
        assert_eq!(ray.to.radius, 20.0);
        let rotation = registry.draw(ms(16)).rays[0].rotation;
        assert!((rotation - (180.0 - (110.0f64 / 200.0).atan().to_degrees())).abs() < 1e-9);

        assert!(registry.remove_ray(handle));
        assert!(!registry.remove_ray(handle));
        registry.on_pre_draw(&views);
        assert_eq!(registry.subscription_count(), 0);
    }

    #[test]
    fn test_missing_views_cancel_tracking() {
        let container = ViewId::new(100);
        let (a, b) = (ViewId::new(1), ViewId::new(2));
        let mut views = FakeViews::default();
        views.0.insert(a, Rect::new(0.0, 0.0, 20.0, 20.0));
        let mut registry = RayRegistry::new(Size::new(20.0, 300.0));
        assert_eq!(registry.add_ray_for_views(&views, container, a, b), None);
        assert!(registry.is_empty());

        views.0.insert(b, Rect::new(50.0, 0.0, 70.0, 20.0));
        let handle = registry
            .add_ray_for_views(&views, container, a, b)
            .unwrap();
        views.0.remove(&a);
        registry.on_pre_draw(&views);
        assert_eq!(registry.subscription_count(), 1);
        assert_eq!(registry.get(handle).unwrap().from.center, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_destroy_releases_everything() {
        let container = ViewId::new(100);
        let mut views = FakeViews::default();
        views.0.insert(ViewId::new(1), Rect::new(0.0, 0.0, 20.0, 20.0));
        views.0.insert(ViewId::new(2), Rect::new(50.0, 0.0, 70.0, 20.0));
        let mut registry = RayRegistry::new(Size::new(20.0, 300.0));
        registry.add_ray_for_views(&views, container, ViewId::new(1), ViewId::new(2));
        timed_ray(&mut registry, true);

        registry.destroy();
        assert!(registry.is_empty());
        assert_eq!(registry.subscription_count(), 0);
        assert!(registry.draw(ms(0)).rays.is_empty());
    }
}
