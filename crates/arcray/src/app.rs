use crate::arc::{ArcLayout, ChildFrame, ChildId, LayoutError, PointerEvent, ScrollListener, ScrollPhase};
use crate::config::{self, Config};
use crate::events::AppEvent;
use crate::glow::GlowDrawable;
use crate::ray::{RayFrame, RayHandle, RayListener, RayOverlay, RayRegistry, ViewId, ViewTree};
use std::time::Duration;
use uigeom::{Rect, Size};

pub const ITEM_SIZE: Size = Size {
    width: 48.0,
    height: 48.0,
};

struct ScrollLogger;

impl ScrollListener for ScrollLogger {
    fn on_offset_changed(
        &mut self,
        old_index: Option<usize>,
        _old_offset: f64,
        new_index: Option<usize>,
        new_offset: f64,
    ) {
        if old_index != new_index {
            log::info!("Centered child {:?} -> {:?}", old_index, new_index);
        } else {
            log::trace!("Offset {:.1}", new_offset);
        }
    }

    fn on_phase_changed(&mut self, old: ScrollPhase, new: ScrollPhase) {
        log::info!("Scroll {} -> {}", old, new);
    }
}

struct RayLogger;

impl RayListener for RayLogger {
    fn on_end(&mut self, ray: RayHandle, rays: &mut RayRegistry) {
        log::info!("Ray {} reached its target, {} rays left", ray, rays.len());
    }
}

/// Carousel children seen as views; a child's view id is its child id.
struct ChildViews<'a>(&'a [ChildFrame]);

impl ViewTree for ChildViews<'_> {
    fn bounds_in(&self, view: ViewId, _container: ViewId) -> Option<Rect> {
        self.0
            .iter()
            .find(|f| u64::from(f.id) == u64::from(view))
            .map(|f| f.rect)
    }
}

fn view_of(id: ChildId) -> ViewId {
    ViewId::new(id.into())
}

/// Headless scene: a carousel under a ray overlay, with a glow around the centered child.
///
/// Whenever the carousel comes to rest on a new child, a ray grows from the first
/// child to it and keeps following both while they move.
pub struct Playground {
    config: Config,
    carousel: ArcLayout,
    overlay: RayOverlay,
    glow: GlowDrawable,
    frames: Vec<ChildFrame>,
    anchor: Option<ChildId>,
    ray: Option<RayHandle>,
    last_rays: Option<RayFrame>,
}

impl Playground {
    pub fn new(config: Config, size: Size, items: usize) -> Result<Self, LayoutError> {
        let mut carousel = ArcLayout::new(&config.arc, config.gesture.clone())?;
        carousel.add_scroll_listener(Box::new(ScrollLogger));
        for _ in 0..items {
            carousel.add_item(ITEM_SIZE);
        }
        carousel.on_size_changed(size);

        let mut overlay = RayOverlay::new(ViewId::new(0));
        overlay.on_size_changed(size);
        overlay.set_ray_image(config.ray.image);

        let glow = GlowDrawable::new(&config.glow);
        let mut playground = Self {
            config,
            carousel,
            overlay,
            glow,
            frames: Vec::new(),
            anchor: None,
            ray: None,
            last_rays: None,
        };
        playground.relayout();
        Ok(playground)
    }

    pub fn add_scroll_listener(&mut self, listener: Box<dyn ScrollListener>) {
        self.carousel.add_scroll_listener(listener);
    }

    pub fn carousel(&self) -> &ArcLayout {
        &self.carousel
    }

    pub fn overlay(&self) -> &RayOverlay {
        &self.overlay
    }

    pub fn glow(&self) -> &GlowDrawable {
        &self.glow
    }

    pub fn frames(&self) -> &[ChildFrame] {
        &self.frames
    }

    pub fn ray(&self) -> Option<RayHandle> {
        self.ray
    }

    pub fn last_rays(&self) -> Option<&RayFrame> {
        self.last_rays.as_ref()
    }

    /// Handles one event at `now`. Returns `false` once the loop should stop.
    pub fn update(&mut self, event: AppEvent, now: Duration) -> bool {
        match event {
            AppEvent::Frame => self.on_frame(now),
            AppEvent::Pointer(kind, position) => {
                self.carousel
                    .on_pointer(&PointerEvent::new(kind, position, now));
                // notifications and ray passes wait for the next frame
                if self.carousel.take_layout_request() {
                    self.relayout();
                }
            }
            AppEvent::ConfigReload => {
                log::info!("Reloading config");
                match config::load_config() {
                    Ok(config) => {
                        if let Err(e) = self.apply_config(config) {
                            log::error!("Rejected config: {}", e);
                        }
                    }
                    Err(e) => log::error!("Failed to reload config: {}", e),
                }
            }
            AppEvent::Quit => return false,
        }
        true
    }

    pub fn apply_config(&mut self, config: Config) -> Result<(), LayoutError> {
        self.carousel.set_radius(config.arc.radius)?;
        self.carousel.set_spacing(config.arc.spacing)?;
        self.carousel.set_gesture_config(config.gesture.clone())?;
        self.glow.apply_config(&config.glow);
        if config.ray.image != self.config.ray.image {
            self.overlay.set_ray_image(config.ray.image);
            self.anchor = None;
            self.ray = None;
        }
        self.config = config;
        Ok(())
    }

    fn on_frame(&mut self, now: Duration) {
        self.carousel.frame(now);
        if self.carousel.take_layout_request() {
            self.relayout();
        }
        self.follow_current(now);
        self.last_rays = self.overlay.frame(&ChildViews(&self.frames), now);
    }

    fn relayout(&mut self) {
        self.frames = self.carousel.layout();
        if let Some(rect) = self
            .carousel
            .current_index()
            .and_then(|i| self.carousel.child_frame(i))
        {
            self.glow.set_bounds(rect);
        }
    }

    fn follow_current(&mut self, now: Duration) {
        if self.carousel.phase() != ScrollPhase::Idle {
            return;
        }
        let current = self.carousel.current_child();
        if current == self.anchor {
            return;
        }
        self.anchor = current;

        let Some(registry) = self.overlay.registry_mut() else {
            return;
        };
        if let Some(old) = self.ray.take() {
            registry.remove_ray(old);
        }

        let (Some(origin), Some(target)) = (self.carousel.child_ids().next(), current) else {
            return;
        };
        let views = ChildViews(&self.frames);
        let Some(handle) = self
            .overlay
            .add_ray(&views, view_of(origin), view_of(target))
        else {
            return;
        };
        if let Some(registry) = self.overlay.registry_mut() {
            registry.set_duration(handle, Duration::from_millis(self.config.ray.duration_ms));
            registry.set_persistent(handle, true);
            registry.set_listener(handle, Box::new(RayLogger));
            registry.start(handle, now);
        }
        self.ray = Some(handle);
    }
}
