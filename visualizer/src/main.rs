use clap::Parser;
use iced::{
    time,
    widget::{canvas::Canvas, column, row, scrollable, text, Column, Container},
    Alignment, Element, Length, Subscription, Task, Theme,
};
use log::error;
use map::MapCanvas;
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};
use trailcore::{
    producer::{spawn_producer, ProducerHandle},
    session::LiveSession,
    trail::fix_queue,
    transport::{open_replay, open_serial, LineSource},
    SessionConfig, TrailResult,
};

mod map;

#[derive(Parser)]
#[command(author, version, about = "Live GPS trail map from receiver UART logs")]
struct Args {
    /// Load session settings from YAML instead of the flags below
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    port: Option<String>,
    #[arg(long, default_value_t = 115_200)]
    baud: u32,
    #[arg(long, default_value_t = 0.5)]
    interval: f64,
    #[arg(long, default_value_t = 3000)]
    max_points: usize,
    #[arg(long, default_value_t = false)]
    force_refresh: bool,
    #[arg(long)]
    replay: Option<PathBuf>,
    #[arg(long, default_value_t = 0)]
    replay_pace_ms: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig {
            port: args.port,
            baud: args.baud,
            interval_secs: args.interval,
            max_points: args.max_points,
            force_refresh: args.force_refresh,
            replay: args.replay,
            replay_pace_ms: args.replay_pace_ms,
            ..Default::default()
        },
    };
    config.validate()?;

    iced::application(
        move || Visualizer::boot(config.clone()),
        Visualizer::update,
        Visualizer::view,
    )
    .title(application_title)
    .subscription(application_subscription)
    .theme(application_theme)
    .run()
    .map_err(|err| anyhow::anyhow!("visualizer failed: {err}"))
}

fn application_title(_: &Visualizer) -> String {
    "Live GPS Trail".into()
}

fn application_subscription(state: &Visualizer) -> Subscription<Message> {
    time::every(state.tick).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

fn open_source(config: &SessionConfig) -> TrailResult<Box<dyn LineSource>> {
    if let Some(path) = &config.replay {
        return Ok(Box::new(open_replay(
            path,
            Duration::from_millis(config.replay_pace_ms),
        )?));
    }
    match &config.port {
        Some(port) => Ok(Box::new(open_serial(port, config.baud, config.read_timeout())?)),
        None => Err(trailcore::TrailError::InvalidConfig(
            "no telemetry source: pass --port or --replay".into(),
        )),
    }
}

struct Visualizer {
    session: LiveSession,
    canvas: MapCanvas,
    producer: Option<ProducerHandle>,
    tick: Duration,
    status: String,
    history: Vec<String>,
    feed_reported: bool,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
}

impl Visualizer {
    fn boot(config: SessionConfig) -> (Self, Task<Message>) {
        let (sender, feed) = fix_queue();
        let mut history = Vec::new();
        let mut status = "Waiting for telemetry...".to_string();

        // A source that fails to open leaves the map up with an empty trail.
        let producer = match open_source(&config).and_then(|source| spawn_producer(source, sender)) {
            Ok(handle) => Some(handle),
            Err(err) => {
                error!("telemetry source unavailable: {err}");
                status = format!("Telemetry error: {err}");
                history.push(status.clone());
                None
            }
        };

        (
            Visualizer {
                session: LiveSession::new(&config, feed),
                canvas: MapCanvas::default(),
                producer,
                tick: config.tick_interval(),
                status,
                history,
                feed_reported: false,
            },
            Task::none(),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                let report = state.session.tick(Instant::now(), &mut state.canvas);
                if let Some(refresh) = report.refresh {
                    state.push_history(format!(
                        "Backdrop refreshed ({:?}): {:.0} x {:.0} m",
                        refresh.reason,
                        refresh.visible.width(),
                        refresh.visible.height()
                    ));
                }
                if let Some(status) = report.status {
                    state.status = status;
                }
                if state.session.feed_closed() && !state.feed_reported {
                    state.feed_reported = true;
                    state.push_history("Telemetry feed closed".into());
                }
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let map = Canvas::new(state.canvas.program())
            .width(Length::Fill)
            .height(Length::Fill);

        let backdrop_info = match state.canvas.backdrop() {
            Some(backdrop) => text(format!(
                "{} | grid {:.0} m | refresh #{}",
                backdrop.frame, backdrop.grid_step, backdrop.generation
            ))
            .size(12),
            None => text("No backdrop yet").size(12),
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let info_column = column![
            text("Last fix").size(22),
            text(&state.status).size(14),
            backdrop_info,
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(240.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(360.0));

        let layout = row![map, info_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

impl Drop for Visualizer {
    fn drop(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.shutdown(Duration::from_secs(1));
        }
    }
}
