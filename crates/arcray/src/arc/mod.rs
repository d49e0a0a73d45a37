use std::time::Duration;

pub mod animator;
pub mod gesture;
pub mod layout;
pub mod placement;
pub mod state;

pub use gesture::{GestureAction, GestureAdapter, PointerEvent, PointerKind, VelocityTracker};
pub use layout::{ArcLayout, ChildFrame, ChildId, LayoutError};
pub use placement::ArcGeometry;
pub use state::{ScrollEvent, ScrollPhase, ScrollState};

/// Below this many children the layout has no centered child and cannot scroll.
pub const MIN_SCROLLABLE_CHILDREN: usize = 3;
/// Age of the oldest pointer sample that still counts towards release velocity.
pub const VELOCITY_HORIZON: Duration = Duration::from_millis(100);

/// Receives scroll notifications, one frame after the change that caused them.
pub trait ScrollListener {
    fn on_offset_changed(
        &mut self,
        _old_index: Option<usize>,
        _old_offset: f64,
        _new_index: Option<usize>,
        _new_offset: f64,
    ) {
    }

    fn on_phase_changed(&mut self, _old: ScrollPhase, _new: ScrollPhase) {}
}

impl ScrollEvent {
    pub fn dispatch(&self, listener: &mut dyn ScrollListener) {
        match *self {
            Self::OffsetChanged {
                old_index,
                old_offset,
                new_index,
                new_offset,
            } => listener.on_offset_changed(old_index, old_offset, new_index, new_offset),
            Self::PhaseChanged { old, new } => listener.on_phase_changed(old, new),
        }
    }
}
