use anyhow::Context;
use clap::Parser;
use generator::GeneratorConfig;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Builder as TokioBuilder;
use trailcore::producer::spawn_producer;
use trailcore::session::LiveSession;
use trailcore::trail::fix_queue;
use trailcore::SessionConfig;
use workflow::config::{load_session_config, SourceKind};
use workflow::runner::Runner;

mod display;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Live GPS trail from receiver UART logs")]
struct Args {
    /// Load session settings from YAML instead of the flags below
    #[arg(long)]
    config: Option<PathBuf>,
    /// Serial port (e.g. /dev/ttyUSB0)
    #[arg(long)]
    port: Option<String>,
    #[arg(long, default_value_t = 115_200)]
    baud: u32,
    /// Display update period in seconds
    #[arg(long, default_value_t = 0.5)]
    interval: f64,
    /// Trail length cap
    #[arg(long, default_value_t = 3000)]
    max_points: usize,
    /// Refresh the viewport and backdrop on every tick (debugging)
    #[arg(long, default_value_t = false)]
    force_refresh: bool,
    #[arg(long, default_value_t = 250)]
    read_timeout_ms: u64,
    /// Replay a captured receiver log instead of a serial port
    #[arg(long)]
    replay: Option<PathBuf>,
    #[arg(long, default_value_t = 0)]
    replay_pace_ms: u64,
    /// Generate synthetic receiver output
    #[arg(long, default_value_t = false)]
    simulate: bool,
    /// Synthetic receiver settings in YAML (implies --simulate)
    #[arg(long)]
    generator: Option<PathBuf>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Stop the synthetic receiver after this many packets
    #[arg(long)]
    packets: Option<usize>,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            port: self.port.clone(),
            baud: self.baud,
            interval_secs: self.interval,
            max_points: self.max_points,
            force_refresh: self.force_refresh,
            read_timeout_ms: self.read_timeout_ms,
            replay: self.replay.clone(),
            replay_pace_ms: self.replay_pace_ms,
            ..Default::default()
        }
    }

    fn generator_config(&self) -> anyhow::Result<Option<GeneratorConfig>> {
        if let Some(path) = &self.generator {
            return GeneratorConfig::load(path).map(Some);
        }
        Ok(self.simulate.then(|| GeneratorConfig {
            seed: self.seed,
            packets: self.packets,
            ..Default::default()
        }))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_session_config(args.config.as_ref(), args.session_config())?;
    let source_kind = SourceKind::select(&config, args.generator_config()?)?;
    let source = source_kind.open(config.read_timeout())?;

    let (sender, feed) = fix_queue();
    let producer = spawn_producer(source, sender).context("starting producer thread")?;
    let mut runner = Runner::new(LiveSession::new(&config, feed), config.tick_interval());

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for the display loop")?;
    let summary = runtime.block_on(runner.run())?;

    match producer.shutdown(Duration::from_secs(1)) {
        Some(report) => {
            if let Some(err) = report.error {
                warn!("telemetry source failed: {err}");
            }
            info!(
                "reassembly: {} lines, {} fixes, {} discarded, {} malformed, {} no-fix",
                report.stats.lines,
                report.stats.fixes_emitted,
                report.stats.packets_discarded,
                report.stats.malformed_lines,
                report.stats.no_fix_notices
            );
        }
        None => warn!("producer did not stop within 1s"),
    }

    println!(
        "Session ended -> ticks {}, fixes {}, frames {}, backdrop refreshes {}, trail {}",
        summary.ticks,
        summary.fixes,
        summary.frames,
        summary.background_refreshes,
        summary.trail_len
    );
    Ok(())
}
