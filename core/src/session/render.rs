use crate::prelude::{Extent, PlanarPoint};

/// Everything a renderer needs to draw one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub trail_x: Vec<f64>,
    pub trail_y: Vec<f64>,
    pub current: PlanarPoint,
    pub visible: Extent,
    pub status: String,
}

/// Drawing backend driven by the live session.
pub trait RenderSink {
    /// Re-renders the backdrop imagery for `visible` in planar `frame`.
    fn refresh_background(&mut self, visible: &Extent, frame: &str);

    fn draw(&mut self, frame: &RenderFrame);
}

/// Sink that keeps what it was given; used by tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub backgrounds: Vec<(Extent, String)>,
    pub frames: Vec<RenderFrame>,
}

impl RenderSink for RecordingSink {
    fn refresh_background(&mut self, visible: &Extent, frame: &str) {
        self.backgrounds.push((*visible, frame.to_string()));
    }

    fn draw(&mut self, frame: &RenderFrame) {
        self.frames.push(frame.clone());
    }
}
