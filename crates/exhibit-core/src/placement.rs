//! Wall placement for the AR page.
//!
//! A hit-test tracker outside our control moves a "ghost" transform onto the
//! wall under the reticle. While nothing has been hit the tracker sits at the
//! origin. The visitor confirms once, and the model is pinned there for the
//! rest of the XR session.

use glam::{Quat, Vec3};
use instant::{Duration, Instant};

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Rotation applied after copying the tracker orientation, so the model
/// stands off the wall instead of lying in its plane.
pub const WALL_CORRECTION_X_DEG: f32 = -90.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementState {
    Scanning,
    Ready,
    Placed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

#[derive(Debug)]
pub struct WallPlacement {
    state: PlacementState,
    interval: Duration,
    last_poll: Option<Instant>,
}

impl Default for WallPlacement {
    fn default() -> Self {
        Self::new(POLL_INTERVAL)
    }
}

impl WallPlacement {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: PlacementState::Scanning,
            interval,
            last_poll: None,
        }
    }

    pub fn state(&self) -> PlacementState {
        self.state
    }

    /// Whether a poll at `now` would be evaluated (the throttle has elapsed).
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_poll {
            Some(last) => now >= last && now.duration_since(last) >= self.interval,
            None => true,
        }
    }

    /// Feed the tracker position. Returns the new state when it changed.
    ///
    /// Calls closer together than the poll interval are ignored, as is
    /// everything once the model has been placed.
    pub fn poll(&mut self, now: Instant, tracker_position: Vec3) -> Option<PlacementState> {
        if self.state == PlacementState::Placed || !self.is_due(now) {
            return None;
        }
        self.last_poll = Some(now);
        let hit = tracker_position != Vec3::ZERO;
        let next = match (self.state, hit) {
            (PlacementState::Scanning, true) => PlacementState::Ready,
            (PlacementState::Ready, false) => PlacementState::Scanning,
            (s, _) => s,
        };
        if next == self.state {
            None
        } else {
            log::debug!("[ar] {:?} -> {:?}", self.state, next);
            self.state = next;
            Some(next)
        }
    }

    /// Pin the model at the tracker pose. Only valid while `Ready`.
    pub fn confirm(&mut self, tracker: Pose) -> Option<Pose> {
        if self.state != PlacementState::Ready {
            return None;
        }
        self.state = PlacementState::Placed;
        Some(corrected_pose(tracker))
    }
}

/// Tracker pose with the wall correction applied about the local X axis.
pub fn corrected_pose(tracker: Pose) -> Pose {
    Pose {
        position: tracker.position,
        orientation: tracker.orientation
            * Quat::from_rotation_x(WALL_CORRECTION_X_DEG.to_radians()),
    }
}
