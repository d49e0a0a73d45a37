use super::RayHandle;
use super::registry::{RayFrame, RayRegistry};
use super::tracking::{ViewId, ViewTree};
use std::time::Duration;
use uigeom::{Point, Rect, Size};

/// Container that draws rays over its children.
///
/// The registry only exists once a ray image is set, and it starts drawing on the
/// frame after that.
pub struct RayOverlay {
    id: ViewId,
    registry: Option<RayRegistry>,
    attach_pending: bool,
    attached: bool,
    bounds: Rect,
}

impl RayOverlay {
    pub fn new(id: ViewId) -> Self {
        Self {
            id,
            registry: None,
            attach_pending: false,
            attached: false,
            bounds: Rect::default(),
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn registry(&self) -> Option<&RayRegistry> {
        self.registry.as_ref()
    }

    pub fn registry_mut(&mut self) -> Option<&mut RayRegistry> {
        self.registry.as_mut()
    }

    /// Replaces the registry, dropping every ray of the previous one.
    pub fn set_ray_image(&mut self, image: Size) {
        self.destroy_registry();
        let mut registry = RayRegistry::new(image);
        registry.set_bounds(self.bounds);
        self.registry = Some(registry);
        self.attach_pending = true;
        log::debug!("overlay {} ray image set to {:?}", self.id, image);
    }

    pub fn on_size_changed(&mut self, size: Size) {
        self.bounds = Rect::from_origin(Point::default(), size);
        if let Some(registry) = self.registry.as_mut() {
            registry.set_bounds(self.bounds);
        }
    }

    pub fn on_detached(&mut self) {
        self.destroy_registry();
    }

    pub fn add_ray(&mut self, views: &dyn ViewTree, from: ViewId, to: ViewId) -> Option<RayHandle> {
        let id = self.id;
        self.registry.as_mut()?.add_ray_for_views(views, id, from, to)
    }

    pub fn frame(&mut self, views: &dyn ViewTree, now: Duration) -> Option<RayFrame> {
        if std::mem::take(&mut self.attach_pending) && self.registry.is_some() {
            self.attached = true;
        }
        if !self.attached {
            return None;
        }
        let registry = self.registry.as_mut()?;
        registry.on_pre_draw(views);
        Some(registry.draw(now))
    }

    fn destroy_registry(&mut self) {
        if let Some(mut registry) = self.registry.take() {
            registry.destroy();
        }
        self.attach_pending = false;
        self.attached = false;
    }
}
