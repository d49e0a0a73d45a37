use super::ScrollListener;
use super::animator::{Animator, Fling, Settle};
use super::gesture::{GestureAction, GestureAdapter, PointerEvent};
use super::placement::ArcGeometry;
use super::state::{ScrollEvent, ScrollPhase, ScrollState};
use crate::config::{ArcConfig, GestureConfig, Radius, Spacing};
use derive_more::{Display, From, Into};
use std::time::Duration;
use thiserror::Error;
use uigeom::{Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into)]
pub struct ChildId(u64);

uigeom::impl_id_newtype!(ChildId);

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("arc radius must be positive, got {0}")]
    InvalidRadius(Radius),
    #[error("arc spacing must be positive, got {0}")]
    InvalidSpacing(Spacing),
    #[error("invalid gesture config: {0}")]
    InvalidGesture(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Child {
    id: ChildId,
    size: Size,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildFrame {
    pub id: ChildId,
    pub rect: Rect,
}

/// Carousel that lays its children out on an arc and scrolls them with drag and fling.
///
/// The host feeds pointer events, frame ticks and size changes; scroll notifications
/// are posted and handed to listeners at the start of the next [`ArcLayout::frame`].
pub struct ArcLayout {
    state: ScrollState,
    children: Vec<Child>,
    next_id: ChildId,
    radius: Radius,
    spacing: Spacing,
    size: Size,
    gesture: GestureAdapter,
    animator: Option<Animator>,
    settle_target: Option<usize>,
    posted: Vec<ScrollEvent>,
    listeners: Vec<Box<dyn ScrollListener>>,
    layout_requested: bool,
}

fn check_radius(radius: Radius) -> Result<Radius, LayoutError> {
    let v = radius.value();
    if v.is_finite() && v > 0.0 {
        Ok(radius)
    } else {
        Err(LayoutError::InvalidRadius(radius))
    }
}

fn check_gesture(config: GestureConfig) -> Result<GestureConfig, LayoutError> {
    config
        .check()
        .map_err(|msg| LayoutError::InvalidGesture(msg.to_string()))?;
    Ok(config)
}

fn check_spacing(spacing: Spacing) -> Result<Spacing, LayoutError> {
    let v = spacing.value();
    if v.is_finite() && v > 0.0 {
        Ok(spacing)
    } else {
        Err(LayoutError::InvalidSpacing(spacing))
    }
}

impl ArcLayout {
    pub fn new(config: &ArcConfig, gesture: GestureConfig) -> Result<Self, LayoutError> {
        let radius = check_radius(config.radius)?;
        let spacing = check_spacing(config.spacing)?;
        let gesture = check_gesture(gesture)?;
        Ok(Self {
            state: ScrollState::new(spacing.value()),
            children: Vec::new(),
            next_id: ChildId::new(1),
            radius,
            spacing,
            size: Size::default(),
            gesture: GestureAdapter::new(gesture),
            animator: None,
            settle_target: None,
            posted: Vec::new(),
            listeners: Vec::new(),
            layout_requested: false,
        })
    }

    pub fn set_radius(&mut self, radius: Radius) -> Result<(), LayoutError> {
        self.radius = check_radius(radius)?;
        self.layout_requested = true;
        Ok(())
    }

    pub fn set_spacing(&mut self, spacing: Spacing) -> Result<(), LayoutError> {
        self.spacing = check_spacing(spacing)?;
        let event = self.state.set_span(spacing.value());
        self.post(event);
        self.layout_requested = true;
        Ok(())
    }

    pub fn set_gesture_config(&mut self, config: GestureConfig) -> Result<(), LayoutError> {
        self.gesture.set_config(check_gesture(config)?);
        Ok(())
    }

    pub fn add_scroll_listener(&mut self, listener: Box<dyn ScrollListener>) {
        self.listeners.push(listener);
    }

    pub fn add_item(&mut self, size: Size) -> ChildId {
        let id = self.next_id;
        self.next_id = id.next();
        let (at, event) = self.state.insert_child();
        self.children.insert(at, Child { id, size });
        if let Some(target) = self.settle_target.as_mut()
            && at <= *target
        {
            *target += 1;
        }
        self.post(event);
        self.layout_requested = true;
        id
    }

    /// Returns false when `id` is not a child of this layout.
    pub fn remove_item(&mut self, id: ChildId) -> bool {
        let Some(at) = self.index_of(id) else {
            return false;
        };
        self.children.remove(at);
        let event = self.state.remove_child(at);
        self.post(event);
        if let Some(target) = self.settle_target.as_mut()
            && at < *target
        {
            *target -= 1;
        }
        if !self.state.is_scrollable() {
            self.stop_animator();
            let event = self.state.set_phase(ScrollPhase::Idle);
            self.post(event);
        }
        self.layout_requested = true;
        true
    }

    pub fn index_of(&self, id: ChildId) -> Option<usize> {
        self.children.iter().position(|c| c.id == id)
    }

    pub fn child_ids(&self) -> impl Iterator<Item = ChildId> + '_ {
        self.children.iter().map(|c| c.id)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.current_index()
    }

    pub fn current_child(&self) -> Option<ChildId> {
        self.current_index()
            .and_then(|i| self.children.get(i))
            .map(|c| c.id)
    }

    pub fn offset(&self) -> f64 {
        self.state.offset()
    }

    pub fn phase(&self) -> ScrollPhase {
        self.state.phase()
    }

    pub fn scroll_state(&self) -> &ScrollState {
        &self.state
    }

    pub fn is_dragging_enabled(&self) -> bool {
        self.state.is_scrollable()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_some()
    }

    /// Smoothly scrolls `index` into the center. Edge children and out-of-range
    /// indices are ignored.
    pub fn set_current_index(&mut self, index: usize, now: Duration) -> bool {
        self.smooth_scroll_to(index, now)
    }

    pub fn on_size_changed(&mut self, size: Size) {
        if self.size != size {
            self.size = size;
            self.layout_requested = true;
        }
    }

    pub fn take_layout_request(&mut self) -> bool {
        std::mem::take(&mut self.layout_requested)
    }

    pub fn layout(&mut self) -> Vec<ChildFrame> {
        self.layout_requested = false;
        (0..self.children.len())
            .filter_map(|i| {
                let id = self.children[i].id;
                self.child_frame(i).map(|rect| ChildFrame { id, rect })
            })
            .collect()
    }

    pub fn child_frame(&self, index: usize) -> Option<Rect> {
        let child = self.children.get(index)?;
        let geometry = ArcGeometry::resolve(self.size, self.radius, self.spacing);
        let rect = match self.state.current_index() {
            Some(current) => {
                let steps = index as f64 - current as f64;
                geometry.frame_on_arc(child.size, steps * self.state.span() + self.state.offset())
            }
            None if self.children.len() == 2 => geometry.frame_pair(index, child.size),
            None => geometry.frame_single(child.size),
        };
        Some(rect)
    }

    /// Feeds one pointer event. Returns whether the layout consumed it.
    pub fn on_pointer(&mut self, event: &PointerEvent) -> bool {
        let action = self
            .gesture
            .on_event(event, self.state.is_scrollable());
        match action {
            GestureAction::Interrupt => {
                if self.stop_animator() {
                    let e = self.state.set_phase(ScrollPhase::Idle);
                    self.post(e);
                }
            }
            GestureAction::StartDrag { delta } | GestureAction::Drag { delta } => {
                self.stop_animator();
                let e = self.state.set_phase(ScrollPhase::Dragging);
                self.post(e);
                let delta = delta * self.scroll_per_px();
                let e = self.state.scroll_by(delta);
                self.post(e);
                self.layout_requested = true;
            }
            GestureAction::Settle => self.auto_settle(event.time),
            GestureAction::Fling { velocity } => {
                let velocity = velocity * self.scroll_per_px();
                self.start_fling(velocity, event.time)
            }
            GestureAction::Ignore => return false,
        }
        true
    }

    /// Runs one frame: delivers notifications posted since the last frame, then advances
    /// the running animator. Returns whether another frame is needed.
    pub fn frame(&mut self, now: Duration) -> bool {
        self.deliver_posted();
        self.advance_animator(now);
        self.animator.is_some() || !self.posted.is_empty()
    }

    fn advance_animator(&mut self, now: Duration) {
        let min_velocity = self.gesture.config().min_fling_velocity * self.scroll_per_px();
        let Some((x, done, slow)) = self.animator.as_ref().map(|a| {
            let slow = match a {
                Animator::Fling(f) => f.velocity_at(now).abs() < min_velocity,
                Animator::Settle(_) => false,
            };
            (a.value_at(now), a.is_done(now), slow)
        }) else {
            return;
        };

        let e = self.state.scroll_to(x);
        self.post(e);
        self.layout_requested = true;

        if slow {
            self.stop_animator();
            self.auto_settle(now);
        } else if done {
            if let Some(target) = self.settle_target {
                let e = self.state.snap_to(target);
                self.post(e);
            }
            self.stop_animator();
            let e = self.state.set_phase(ScrollPhase::Idle);
            self.post(e);
        }
    }

    /// Scroll units per px of pointer travel: 1 for linear spacing, degrees of arc
    /// along the centered child's path for angular spacing.
    fn scroll_per_px(&self) -> f64 {
        match self.spacing {
            Spacing::Linear(_) => 1.0,
            Spacing::Angular(_) => {
                let child = self
                    .state
                    .current_index()
                    .and_then(|i| self.children.get(i))
                    .map(|c| c.size)
                    .unwrap_or_default();
                let r = ArcGeometry::resolve(self.size, self.radius, self.spacing).path_radius(child);
                if r > 0.0 { (1.0 / r).to_degrees() } else { 0.0 }
            }
        }
    }

    fn start_fling(&mut self, velocity: f64, now: Duration) {
        self.stop_animator();
        let config = self.gesture.config();
        log::debug!("fling at {:.0} px/s", velocity);
        self.animator = Some(Animator::Fling(Fling::new(
            self.state.scroll_x(),
            velocity,
            config.fling_deceleration,
            now,
        )));
        let e = self.state.set_phase(ScrollPhase::Fling);
        self.post(e);
    }

    fn auto_settle(&mut self, now: Duration) {
        let settled = self
            .state
            .current_index()
            .is_some_and(|current| self.smooth_scroll_to(current, now));
        if !settled {
            self.stop_animator();
            let e = self.state.set_phase(ScrollPhase::Idle);
            self.post(e);
        }
    }

    fn smooth_scroll_to(&mut self, index: usize, now: Duration) -> bool {
        let Some(delta) = self.state.settle_delta(index) else {
            log::debug!("ignoring settle to unselectable index {}", index);
            return false;
        };
        self.stop_animator();
        let duration = Duration::from_millis(self.gesture.config().settle_duration_ms);
        log::debug!(
            "settle to {} (offset {:.1}, dx {:.1})",
            index,
            self.state.offset(),
            delta
        );
        self.animator = Some(Animator::Settle(Settle::new(
            self.state.scroll_x(),
            delta,
            now,
            duration,
        )));
        self.settle_target = Some(index);
        let e = self.state.set_phase(ScrollPhase::Settling);
        self.post(e);
        true
    }

    fn stop_animator(&mut self) -> bool {
        self.settle_target = None;
        self.animator.take().is_some()
    }

    fn post(&mut self, event: Option<ScrollEvent>) {
        self.posted.extend(event);
    }

    fn deliver_posted(&mut self) {
        let posted = std::mem::take(&mut self.posted);
        for event in &posted {
            for listener in &mut self.listeners {
                event.dispatch(listener.as_mut());
            }
        }
    }
}
