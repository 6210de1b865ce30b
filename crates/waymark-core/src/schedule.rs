#![forbid(unsafe_code)]

//! Deferred work that must wait for layout to settle.
//!
//! Two kinds of work never run inline with the protocol that requested
//! them: scrolling a freshly focused spot into view, and any geometry read
//! that depends on a marker that was just built, attached or resized.
//! Both are queued as [`DeferredTask`] values and run when the host
//! reports that layout has settled.
//!
//! Window resizes are gated by [`ResizeThrottle`] so a burst of resize
//! events repositions overlay markers at most once per interval, with one
//! trailing run after the burst.

use std::collections::VecDeque;
use std::time::Duration;

use web_time::Instant;

use crate::event::{SpotId, TourId};

/// Default minimum interval between resize-driven repositioning passes.
pub const DEFAULT_RESIZE_THROTTLE: Duration = Duration::from_millis(500);

/// A unit of work to run on the next settled tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// Scroll the spot's marker (or anchor) into view if it is not already.
    ScrollIntoView { tour: TourId, spot: SpotId },
    /// Recompute the smart arrow of a spot's marker.
    AdjustArrow { tour: TourId, spot: SpotId },
    /// Re-place every shown overlay marker of the active tour.
    RepositionOverlays,
}

/// FIFO queue of deferred tasks. Identical pending tasks are coalesced.
#[derive(Debug, Default)]
pub struct TaskQueue {
    pending: VecDeque<DeferredTask>,
}

impl TaskQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task. Returns `false` when an identical task is already pending.
    pub fn schedule(&mut self, task: DeferredTask) -> bool {
        if self.pending.contains(&task) {
            return false;
        }
        tracing::trace!(?task, "deferred task scheduled");
        self.pending.push_back(task);
        true
    }

    /// Take every pending task, oldest first.
    pub fn drain(&mut self) -> Vec<DeferredTask> {
        self.pending.drain(..).collect()
    }

    /// Drop pending tasks that match a predicate.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&DeferredTask) -> bool) {
        self.pending.retain(|t| !predicate(t));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeferredTask> {
        self.pending.iter()
    }
}

/// Leading-edge throttle with a single trailing run.
#[derive(Debug, Clone)]
pub struct ResizeThrottle {
    interval: Duration,
    last_run: Option<Instant>,
    trailing: bool,
}

impl Default for ResizeThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_THROTTLE)
    }
}

impl ResizeThrottle {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
            trailing: false,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record a resize at `now`. Returns `true` if work should run now;
    /// otherwise a trailing run is remembered.
    pub fn hit(&mut self, now: Instant) -> bool {
        if self.is_open(now) {
            self.last_run = Some(now);
            self.trailing = false;
            true
        } else {
            self.trailing = true;
            false
        }
    }

    /// Returns `true` (once) if a trailing run is owed and the interval
    /// has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.trailing && self.is_open(now) {
            self.last_run = Some(now);
            self.trailing = false;
            true
        } else {
            false
        }
    }

    /// Whether a trailing run is owed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.trailing
    }

    fn is_open(&self, now: Instant) -> bool {
        self.last_run
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_coalesces_identical_tasks() {
        let mut q = TaskQueue::new();
        assert!(q.schedule(DeferredTask::RepositionOverlays));
        assert!(!q.schedule(DeferredTask::RepositionOverlays));
        let t = DeferredTask::AdjustArrow {
            tour: TourId(0),
            spot: SpotId(1),
        };
        assert!(q.schedule(t));
        assert_eq!(q.drain(), vec![DeferredTask::RepositionOverlays, t]);
        assert!(q.is_empty());
    }

    #[test]
    fn cancel_where_drops_matching() {
        let mut q = TaskQueue::new();
        let tour = TourId(3);
        q.schedule(DeferredTask::ScrollIntoView {
            tour,
            spot: SpotId(1),
        });
        q.schedule(DeferredTask::RepositionOverlays);
        q.cancel_where(|t| matches!(t, DeferredTask::ScrollIntoView { .. }));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn throttle_runs_leading_then_trailing() {
        let mut throttle = ResizeThrottle::new(Duration::from_millis(500));
        let t0 = Instant::now();
        assert!(throttle.hit(t0));
        assert!(!throttle.hit(t0 + Duration::from_millis(100)));
        assert!(!throttle.hit(t0 + Duration::from_millis(200)));
        assert!(throttle.is_pending());
        assert!(!throttle.poll(t0 + Duration::from_millis(400)));
        assert!(throttle.poll(t0 + Duration::from_millis(500)));
        assert!(!throttle.poll(t0 + Duration::from_millis(2000)));
    }

    #[test]
    fn throttle_reopens_after_interval() {
        let mut throttle = ResizeThrottle::new(Duration::from_millis(50));
        let t0 = Instant::now();
        assert!(throttle.hit(t0));
        assert!(throttle.hit(t0 + Duration::from_millis(60)));
        assert!(!throttle.is_pending());
    }
}
