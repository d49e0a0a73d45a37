use super::RayHandle;
use derive_more::{Display, From, Into};
use uigeom::Rect;

/// Non-owning reference to a view in the host's tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into)]
pub struct ViewId(u64);

uigeom::impl_id_newtype!(ViewId);

/// The host's view hierarchy, as seen by the ray overlay.
pub trait ViewTree {
    /// Bounds of `view` relative to `container`, or `None` once the view is gone.
    fn bounds_in(&self, view: ViewId, container: ViewId) -> Option<Rect>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    From,
    To,
}

/// Keeps one ray endpoint glued to a view, re-sampled before every draw.
///
/// Dropped by the registry as soon as its ray is gone or its view disappears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub ray: RayHandle,
    pub endpoint: Endpoint,
    pub view: ViewId,
    pub container: ViewId,
}

impl Subscription {
    pub fn new(ray: RayHandle, endpoint: Endpoint, view: ViewId, container: ViewId) -> Self {
        Self {
            ray,
            endpoint,
            view,
            container,
        }
    }

    pub fn sample(&self, views: &dyn ViewTree) -> Option<Rect> {
        views.bounds_in(self.view, self.container)
    }
}
