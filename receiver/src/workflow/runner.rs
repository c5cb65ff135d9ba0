use crate::display::ConsoleSink;
use anyhow::Context;
use log::info;
use std::time::{Duration, Instant};
use tokio::signal;
use tokio::time::{self, MissedTickBehavior};
use trailcore::session::LiveSession;

pub struct RunSummary {
    pub ticks: usize,
    pub fixes: usize,
    pub background_refreshes: usize,
    pub frames: usize,
    pub trail_len: usize,
}

/// Foreground display loop: one session tick per interval until Ctrl+C or
/// until the producer is gone and the queue is drained.
pub struct Runner {
    session: LiveSession,
    sink: ConsoleSink,
    tick: Duration,
}

impl Runner {
    pub fn new(session: LiveSession, tick: Duration) -> Self {
        Self {
            session,
            sink: ConsoleSink::new(),
            tick,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<RunSummary> {
        let mut ticker = time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let ctrl_c = signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let mut ticks = 0;
        let mut fixes = 0;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.session.tick(Instant::now(), &mut self.sink);
                    ticks += 1;
                    fixes += report.drained;
                    if self.session.feed_closed() {
                        info!("telemetry feed closed");
                        break;
                    }
                }
                result = &mut ctrl_c => {
                    result.context("awaiting Ctrl+C to exit")?;
                    info!("interrupt received");
                    break;
                }
            }
        }

        Ok(RunSummary {
            ticks,
            fixes,
            background_refreshes: self.sink.background_refreshes(),
            frames: self.sink.frames(),
            trail_len: self.session.trail().len(),
        })
    }
}
