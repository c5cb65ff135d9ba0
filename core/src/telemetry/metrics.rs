use serde::Serialize;

/// Counters kept by one reassembler instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReassemblyStats {
    pub lines: usize,
    pub fixes_emitted: usize,
    pub packets_discarded: usize,
    pub malformed_lines: usize,
    pub no_fix_notices: usize,
}

impl ReassemblyStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_line(&mut self) {
        self.lines += 1;
    }

    pub fn record_emitted(&mut self) {
        self.fixes_emitted += 1;
    }

    pub fn record_discarded(&mut self) {
        self.packets_discarded += 1;
    }

    pub fn record_malformed(&mut self) {
        self.malformed_lines += 1;
    }

    pub fn record_no_fix(&mut self) {
        self.no_fix_notices += 1;
    }
}
