use log::info;
use trailcore::session::{RenderFrame, RenderSink};
use trailcore::Extent;

/// Render sink for terminals: prints each new status block and logs
/// background refreshes.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    last_status: Option<String>,
    background_refreshes: usize,
    frames: usize,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn background_refreshes(&self) -> usize {
        self.background_refreshes
    }

    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl RenderSink for ConsoleSink {
    fn refresh_background(&mut self, visible: &Extent, frame: &str) {
        self.background_refreshes += 1;
        info!(
            "backdrop {} refreshed: {:.0} x {:.0} m around ({:.1}, {:.1})",
            frame,
            visible.width(),
            visible.height(),
            (visible.min_x + visible.max_x) / 2.0,
            (visible.min_y + visible.max_y) / 2.0
        );
    }

    fn draw(&mut self, frame: &RenderFrame) {
        self.frames += 1;
        if self.last_status.as_deref() == Some(frame.status.as_str()) {
            return;
        }
        println!("{}\n---", frame.status);
        self.last_status = Some(frame.status.clone());
    }
}
