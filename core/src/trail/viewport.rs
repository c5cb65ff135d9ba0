//! Decides when the visible window and its backdrop must be recomputed.
//!
//! Background imagery is expensive to fetch, so a refresh only happens on the
//! first fix, when the newest point leaves the visible rectangle, when the
//! caller forces it, or once the minimum interval since the previous refresh
//! has elapsed.

use crate::prelude::{Extent, PlanarPoint};
use crate::trail::buffer::TrailBuffer;
use log::debug;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportState {
    Uninitialized,
    Initialized {
        visible: Extent,
        refreshed_at: Instant,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    FirstFix,
    OutOfView,
    Forced,
    IntervalElapsed,
}

/// New visible rectangle to apply and re-render the backdrop for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRefresh {
    pub visible: Extent,
    pub reason: RefreshReason,
}

#[derive(Debug, Clone)]
pub struct ViewportManager {
    state: ViewportState,
    initial_pad: f64,
    min_interval: Duration,
}

impl ViewportManager {
    pub const DEFAULT_INITIAL_PAD: f64 = 500.0;
    pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(2);

    pub fn new(initial_pad: f64, min_interval: Duration) -> Self {
        Self {
            state: ViewportState::Uninitialized,
            initial_pad,
            min_interval,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn visible(&self) -> Option<Extent> {
        match self.state {
            ViewportState::Uninitialized => None,
            ViewportState::Initialized { visible, .. } => Some(visible),
        }
    }

    /// Runs the refresh policy against the trail's newest point and applies
    /// the resulting transition. Returns `None` when nothing changes.
    pub fn evaluate(
        &mut self,
        trail: &TrailBuffer,
        now: Instant,
        force: bool,
    ) -> Option<ViewportRefresh> {
        let newest = trail.latest_point()?;
        let refresh = self.decide(trail, newest, now, force)?;

        let refreshed_at = match self.state {
            ViewportState::Initialized { refreshed_at, .. } => refreshed_at.max(now),
            ViewportState::Uninitialized => now,
        };
        self.state = ViewportState::Initialized {
            visible: refresh.visible,
            refreshed_at,
        };
        debug!("viewport refresh ({:?}): {:?}", refresh.reason, refresh.visible);
        Some(refresh)
    }

    fn decide(
        &self,
        trail: &TrailBuffer,
        newest: PlanarPoint,
        now: Instant,
        force: bool,
    ) -> Option<ViewportRefresh> {
        let (visible, refreshed_at) = match self.state {
            ViewportState::Uninitialized => {
                return Some(ViewportRefresh {
                    visible: Extent::centered(newest, self.initial_pad),
                    reason: RefreshReason::FirstFix,
                });
            }
            ViewportState::Initialized {
                visible,
                refreshed_at,
            } => (visible, refreshed_at),
        };

        let reason = if !visible.contains(newest) {
            RefreshReason::OutOfView
        } else if force {
            RefreshReason::Forced
        } else if now.saturating_duration_since(refreshed_at) >= self.min_interval {
            RefreshReason::IntervalElapsed
        } else {
            return None;
        };

        trail
            .current_extent()
            .map(|visible| ViewportRefresh { visible, reason })
    }
}

impl Default for ViewportManager {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INITIAL_PAD, Self::DEFAULT_MIN_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Fix;
    use chrono::Utc;

    fn fix_at(x: f64, y: f64) -> Fix {
        Fix {
            timestamp: Utc::now(),
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            bearing_raw: None,
            speed_raw: None,
            altitude_raw: None,
            link: None,
            planar: Some(PlanarPoint::new(x, y)),
        }
    }

    fn single_point_trail(x: f64, y: f64) -> TrailBuffer {
        let mut trail = TrailBuffer::with_capacity(1);
        trail.append(fix_at(x, y));
        trail
    }

    #[test]
    fn empty_trail_does_nothing() {
        let mut manager = ViewportManager::default();
        let trail = TrailBuffer::with_capacity(1);
        assert_eq!(manager.evaluate(&trail, Instant::now(), true), None);
        assert_eq!(manager.state(), ViewportState::Uninitialized);
    }

    #[test]
    fn first_fix_initializes_centered_view() {
        let mut manager = ViewportManager::new(100.0, Duration::from_secs(2));
        let trail = single_point_trail(1000.0, 2000.0);
        let refresh = manager.evaluate(&trail, Instant::now(), false).unwrap();
        assert_eq!(refresh.reason, RefreshReason::FirstFix);
        assert_eq!(
            refresh.visible,
            Extent {
                min_x: 900.0,
                max_x: 1100.0,
                min_y: 1900.0,
                max_y: 2100.0,
            }
        );
        assert_eq!(manager.visible(), Some(refresh.visible));
    }

    #[test]
    fn inside_point_within_guard_is_a_no_op() {
        let mut manager = ViewportManager::new(100.0, Duration::from_secs(2));
        let start = Instant::now();
        manager.evaluate(&single_point_trail(0.0, 0.0), start, false);

        let trail = single_point_trail(50.0, -50.0);
        let later = start + Duration::from_millis(500);
        assert_eq!(manager.evaluate(&trail, later, false), None);
        assert_eq!(
            manager.state(),
            ViewportState::Initialized {
                visible: Extent::centered(PlanarPoint::new(0.0, 0.0), 100.0),
                refreshed_at: start,
            }
        );
    }

    #[test]
    fn outside_point_refreshes_despite_guard() {
        let mut manager = ViewportManager::new(100.0, Duration::from_secs(2));
        let start = Instant::now();
        manager.evaluate(&single_point_trail(0.0, 0.0), start, false);

        let trail = single_point_trail(500.0, 0.0);
        let refresh = manager
            .evaluate(&trail, start + Duration::from_millis(10), false)
            .unwrap();
        assert_eq!(refresh.reason, RefreshReason::OutOfView);
        assert_eq!(refresh.visible, trail.current_extent().unwrap());
        assert!(refresh.visible.contains(PlanarPoint::new(500.0, 0.0)));
    }

    #[test]
    fn force_bypasses_guard() {
        let mut manager = ViewportManager::new(100.0, Duration::from_secs(2));
        let start = Instant::now();
        manager.evaluate(&single_point_trail(0.0, 0.0), start, false);

        let refresh = manager
            .evaluate(&single_point_trail(10.0, 10.0), start, true)
            .unwrap();
        assert_eq!(refresh.reason, RefreshReason::Forced);
    }

    #[test]
    fn elapsed_guard_allows_refit() {
        let mut manager = ViewportManager::new(100.0, Duration::from_secs(2));
        let start = Instant::now();
        manager.evaluate(&single_point_trail(0.0, 0.0), start, false);

        let refresh = manager
            .evaluate(
                &single_point_trail(10.0, 10.0),
                start + Duration::from_secs(3),
                false,
            )
            .unwrap();
        assert_eq!(refresh.reason, RefreshReason::IntervalElapsed);
    }

    #[test]
    fn refresh_time_never_moves_backwards() {
        let mut manager = ViewportManager::new(100.0, Duration::from_secs(2));
        let start = Instant::now() + Duration::from_secs(10);
        manager.evaluate(&single_point_trail(0.0, 0.0), start, false);
        manager.evaluate(
            &single_point_trail(1.0, 1.0),
            start - Duration::from_secs(5),
            true,
        );
        match manager.state() {
            ViewportState::Initialized { refreshed_at, .. } => assert_eq!(refreshed_at, start),
            ViewportState::Uninitialized => panic!("expected initialized viewport"),
        }
    }
}
