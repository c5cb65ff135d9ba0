//! Display-side orchestration: drains the fix queue each tick and drives the
//! trail, the viewport policy and the renderer.

pub mod render;
pub mod status;

pub use render::{RecordingSink, RenderFrame, RenderSink};

use crate::config::SessionConfig;
use crate::math::projection::{Projector, WebMercator};
use crate::trail::{FixReceiver, TrailBuffer, ViewportManager, ViewportRefresh};
use std::time::Instant;

/// Outcome of one display tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub drained: usize,
    pub refresh: Option<ViewportRefresh>,
    /// Status block handed to the renderer, when a frame was drawn.
    pub status: Option<String>,
}

pub struct LiveSession {
    feed: FixReceiver,
    projector: Box<dyn Projector>,
    trail: TrailBuffer,
    viewport: ViewportManager,
    force_refresh: bool,
}

impl LiveSession {
    pub fn new(config: &SessionConfig, feed: FixReceiver) -> Self {
        Self::with_projector(config, feed, Box::new(WebMercator::new()))
    }

    pub fn with_projector(
        config: &SessionConfig,
        feed: FixReceiver,
        projector: Box<dyn Projector>,
    ) -> Self {
        Self {
            feed,
            projector,
            trail: TrailBuffer::with_capacity(config.max_points),
            viewport: ViewportManager::new(config.initial_pad_m, config.refresh_interval()),
            force_refresh: config.force_refresh,
        }
    }

    /// One non-reentrant display tick.
    pub fn tick(&mut self, now: Instant, sink: &mut dyn RenderSink) -> TickReport {
        let drained = self.feed.try_take_all();
        let mut report = TickReport {
            drained: drained.len(),
            ..Default::default()
        };
        for fix in drained {
            let fix = self.projector.attach(fix);
            self.trail.append(fix);
        }

        if report.drained == 0 && !self.force_refresh {
            return report;
        }

        report.refresh = self.viewport.evaluate(&self.trail, now, self.force_refresh);
        if let Some(refresh) = &report.refresh {
            sink.refresh_background(&refresh.visible, self.projector.frame());
        }

        let (Some(latest), Some(visible)) = (self.trail.latest(), self.viewport.visible()) else {
            return report;
        };
        let Some(current) = latest.planar else {
            return report;
        };
        let status = status::summarize(latest, self.trail.len());
        let (trail_x, trail_y) = self.trail.coordinates();
        sink.draw(&RenderFrame {
            trail_x,
            trail_y,
            current,
            visible,
            status: status.clone(),
        });
        report.status = Some(status);
        report
    }

    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    pub fn viewport(&self) -> &ViewportManager {
        &self.viewport
    }

    pub fn frame(&self) -> &str {
        self.projector.frame()
    }

    /// True once the producer is gone and every fix has been drained.
    pub fn feed_closed(&self) -> bool {
        self.feed.is_closed()
    }
}
