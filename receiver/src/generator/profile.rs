use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use trailcore::transport::{LineSource, ReadOutcome};
use trailcore::TrailResult;

const METERS_PER_DEGREE: f64 = 111_320.0;

/// Configuration for a synthetic receiver that prints firmware-style logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub start_lat: f64,
    pub start_lon: f64,
    pub speed_mps: f64,
    pub heading_deg: f64,
    pub packet_interval_ms: u64,
    /// Chance that a packet reports "No fix acquired!" instead of a position.
    pub no_fix_ratio: f64,
    /// Chance of a garbled line between packets.
    pub garble_ratio: f64,
    pub seed: u64,
    /// Stop after this many packets; run forever when `None`.
    pub packets: Option<usize>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_lat: 40.7128,
            start_lon: -74.006,
            speed_mps: 1.5,
            heading_deg: 45.0,
            packet_interval_ms: 1000,
            no_fix_ratio: 0.05,
            garble_ratio: 0.05,
            seed: 0,
            packets: None,
        }
    }
}

impl GeneratorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading generator config {}", path_ref.display()))?;
        let config: GeneratorConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing generator config {}", path_ref.display()))?;
        Ok(config)
    }
}

/// Line source that simulates a receiver tracking a wandering target.
pub struct SyntheticSource {
    config: GeneratorConfig,
    rng: StdRng,
    lat: f64,
    lon: f64,
    heading: f64,
    emitted: usize,
    lines: VecDeque<Vec<u8>>,
    next_packet: Instant,
    idle_slice: Duration,
    started: Instant,
}

impl SyntheticSource {
    /// `idle_slice` bounds how long one read may wait for the next packet.
    pub fn new(config: GeneratorConfig, idle_slice: Duration) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let now = Instant::now();
        Self {
            lat: config.start_lat,
            lon: config.start_lon,
            heading: config.heading_deg,
            config,
            rng,
            emitted: 0,
            lines: VecDeque::new(),
            next_packet: now,
            idle_slice,
            started: now,
        }
    }

    fn exhausted(&self) -> bool {
        self.config.packets.is_some_and(|limit| self.emitted >= limit)
    }

    fn advance_target(&mut self) {
        let interval_s = self.config.packet_interval_ms.max(1) as f64 / 1000.0;
        let distance = self.config.speed_mps * interval_s;
        self.heading = (self.heading + self.rng.gen_range(-10.0..10.0)).rem_euclid(360.0);
        let heading = self.heading.to_radians();
        self.lat += distance * heading.cos() / METERS_PER_DEGREE;
        self.lon += distance * heading.sin() / (METERS_PER_DEGREE * self.lat.to_radians().cos());
    }

    fn log_line(&self, body: &str) -> Vec<u8> {
        let uptime = self.started.elapsed();
        let secs = uptime.as_secs();
        format!(
            "[{:02}:{:02}:{:02}.{:03},000] <inf> main: {}\r\n",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60,
            uptime.subsec_millis(),
            body
        )
        .into_bytes()
    }

    fn queue_packet(&mut self) {
        if self.rng.gen_bool(self.config.garble_ratio.clamp(0.0, 1.0)) {
            let noise: Vec<u8> = (0..12).map(|_| self.rng.gen()).collect();
            self.lines.push_back(noise);
        }

        let size = 24;
        let rssi: i32 = self.rng.gen_range(-110..-60);
        let snr: i32 = self.rng.gen_range(-5..12);
        let header = self.log_line(&format!(
            "Packet received ({size} bytes | {rssi} dBm | {snr} dB:"
        ));
        self.lines.push_back(header);

        if self.rng.gen_bool(self.config.no_fix_ratio.clamp(0.0, 1.0)) {
            let notice = self.log_line("\tNo fix acquired!");
            self.lines.push_back(notice);
            return;
        }

        self.advance_target();
        let fields = [
            format!("\tLatitude: {}", (self.lat * 1e9).round() as i64),
            format!("\tLongitude: {}", (self.lon * 1e9).round() as i64),
            format!("\tBearing: {}", (self.heading * 1000.0).round() as i64),
            format!("\tSpeed: {}", (self.config.speed_mps * 100.0).round() as i64),
            format!("\tAltitude: {}", 10_000 + self.rng.gen_range(-500..500)),
        ];
        for field in fields {
            let line = self.log_line(&field);
            self.lines.push_back(line);
        }
    }
}

impl LineSource for SyntheticSource {
    fn read_line(&mut self) -> TrailResult<ReadOutcome> {
        if let Some(line) = self.lines.pop_front() {
            return Ok(ReadOutcome::Line(line));
        }
        if self.exhausted() {
            return Ok(ReadOutcome::Closed);
        }

        let now = Instant::now();
        if now < self.next_packet {
            thread::sleep((self.next_packet - now).min(self.idle_slice));
            return Ok(ReadOutcome::Idle);
        }

        self.queue_packet();
        self.emitted += 1;
        self.next_packet = now + Duration::from_millis(self.config.packet_interval_ms);
        Ok(self
            .lines
            .pop_front()
            .map_or(ReadOutcome::Idle, ReadOutcome::Line))
    }

    fn describe(&self) -> String {
        format!("synthetic receiver (seed {})", self.config.seed)
    }
}
