use super::MIN_SCROLLABLE_CHILDREN;
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, StrumDisplay)]
pub enum ScrollPhase {
    #[default]
    Idle,
    Dragging,
    Fling,
    Settling,
}

/// Change notification produced by a [`ScrollState`] mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollEvent {
    OffsetChanged {
        old_index: Option<usize>,
        old_offset: f64,
        new_index: Option<usize>,
        new_offset: f64,
    },
    PhaseChanged {
        old: ScrollPhase,
        new: ScrollPhase,
    },
}

/// Continuous scroll position of the arc layout and the discrete index derived from it.
///
/// Every mutator returns the notification it caused instead of firing it, so the
/// owner decides when listeners observe the change.
#[derive(Debug, Clone)]
pub struct ScrollState {
    current_index: Option<usize>,
    offset: f64,
    scroll_x: f64,
    phase: ScrollPhase,
    span: f64,
    child_count: usize,
}

impl ScrollState {
    pub fn new(span: f64) -> Self {
        Self {
            current_index: None,
            offset: 0.0,
            scroll_x: 0.0,
            phase: ScrollPhase::Idle,
            span,
            child_count: 0,
        }
    }

    /// Centered child, `None` while fewer than three children exist.
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Signed displacement from the centered position, within `(-span/2, span/2]`.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn scroll_x(&self) -> f64 {
        self.scroll_x
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    pub fn span(&self) -> f64 {
        self.span
    }

    pub fn child_count(&self) -> usize {
        self.child_count
    }

    pub fn is_scrollable(&self) -> bool {
        self.child_count >= MIN_SCROLLABLE_CHILDREN
    }

    /// Range `current_index` is clamped into; edge children are never current.
    pub fn index_bounds(&self) -> Option<(usize, usize)> {
        self.is_scrollable().then(|| (1, self.child_count - 2))
    }

    pub fn set_span(&mut self, span: f64) -> Option<ScrollEvent> {
        self.track_offset(|s| {
            s.span = span;
            s.normalize();
        })
    }

    /// Applies a gesture delta to both the raw accumulator and the offset.
    pub fn scroll_by(&mut self, delta: f64) -> Option<ScrollEvent> {
        if delta == 0.0 {
            return None;
        }
        self.track_offset(|s| {
            s.scroll_x += delta;
            s.offset += delta;
            s.normalize();
        })
    }

    /// Moves the raw accumulator to `x`, as animators do, forwarding the difference.
    pub fn scroll_to(&mut self, x: f64) -> Option<ScrollEvent> {
        self.scroll_by(x - self.scroll_x)
    }

    pub fn set_phase(&mut self, phase: ScrollPhase) -> Option<ScrollEvent> {
        let old = self.phase;
        if old == phase {
            return None;
        }
        log::debug!("scroll phase {} -> {}", old, phase);
        self.phase = phase;
        Some(ScrollEvent::PhaseChanged { old, new: phase })
    }

    /// Scroll distance that brings `target` to the centered position.
    ///
    /// `None` for edge children and out-of-range indices, which are not selectable.
    pub fn settle_delta(&self, target: usize) -> Option<f64> {
        let current = self.current_index?;
        if target == 0 || target >= self.child_count - 1 {
            return None;
        }
        Some(-((target as f64 - current as f64) * self.span + self.offset))
    }

    /// Centers `index` exactly, clamped into the selectable range.
    pub fn snap_to(&mut self, index: usize) -> Option<ScrollEvent> {
        let (first, last) = self.index_bounds()?;
        self.track_offset(|s| {
            s.current_index = Some(index.clamp(first, last));
            s.offset = 0.0;
        })
    }

    /// Registers a new child and returns the position it must be inserted at.
    ///
    /// The first child is appended and the second goes in front of it. From the third on,
    /// the new child is inserted at the current index (advanced by one when the existing
    /// count is odd) so it lands in the center.
    pub fn insert_child(&mut self) -> (usize, Option<ScrollEvent>) {
        let mut at = 0;
        let event = self.track_offset(|s| {
            at = match s.child_count {
                0 | 1 => 0,
                count => {
                    let mut current = if count == 2 {
                        1
                    } else {
                        s.current_index.unwrap_or(1)
                    };
                    if count % 2 == 1 {
                        current += 1;
                    }
                    s.current_index = Some(current);
                    current
                }
            };
            s.child_count += 1;
            s.normalize();
        });
        (at, event)
    }

    /// Unregisters the child at `at`, keeping the current child centered where possible.
    pub fn remove_child(&mut self, at: usize) -> Option<ScrollEvent> {
        if at >= self.child_count {
            return None;
        }
        self.track_offset(|s| {
            s.child_count -= 1;
            match (s.index_bounds(), s.current_index) {
                (Some((first, last)), current) => {
                    let mut current = current.unwrap_or(first);
                    if at < current {
                        current -= 1;
                    }
                    let clamped = current.clamp(first, last);
                    if clamped != current {
                        s.offset = 0.0;
                    }
                    s.current_index = Some(clamped);
                }
                (None, _) => s.current_index = None,
            }
            s.normalize();
        })
    }

    fn track_offset(&mut self, mutate: impl FnOnce(&mut Self)) -> Option<ScrollEvent> {
        let (old_index, old_offset) = (self.current_index, self.offset);
        mutate(self);
        (old_index != self.current_index || old_offset != self.offset).then_some(
            ScrollEvent::OffsetChanged {
                old_index,
                old_offset,
                new_index: self.current_index,
                new_offset: self.offset,
            },
        )
    }

    /// Clamps the offset at the boundary indices, then shifts the index by one span at a
    /// time until the offset is back within `(-span/2, span/2]`.
    fn normalize(&mut self) {
        let (Some(mut index), Some((first, last))) = (self.current_index, self.index_bounds())
        else {
            self.current_index = None;
            self.offset = 0.0;
            return;
        };
        let half = self.span / 2.0;
        loop {
            if index <= first && self.offset > 0.0 {
                self.offset = 0.0;
            }
            if index >= last && self.offset < 0.0 {
                self.offset = 0.0;
            }
            if self.offset > half {
                index -= 1;
                self.offset -= self.span;
            } else if self.offset <= -half {
                index += 1;
                self.offset += self.span;
            } else {
                break;
            }
        }
        if Some(index) != self.current_index {
            log::debug!("current index {:?} -> {}", self.current_index, index);
        }
        self.current_index = Some(index);
    }
}
