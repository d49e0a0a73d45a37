use derive_more::{Display, From, Into};
use std::sync::atomic::{AtomicU64, Ordering};

pub mod overlay;
pub mod registry;
pub mod tracking;

pub use overlay::RayOverlay;
pub use registry::{RayAnimation, RayFrame, RayGeometry, RayListener, RayRegistry};
pub use tracking::{Endpoint, Subscription, ViewId, ViewTree};

/// Identifies a ray inside its registry. Stale handles are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into)]
pub struct RayHandle(u64);

uigeom::impl_id_newtype!(RayHandle);

static NEXT_RAY: AtomicU64 = AtomicU64::new(1);

impl RayHandle {
    /// A handle no registry in this process has handed out before.
    pub fn unique() -> Self {
        Self::new(NEXT_RAY.fetch_add(1, Ordering::Relaxed))
    }
}
