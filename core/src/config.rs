use crate::prelude::{TrailError, TrailResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings shared by the headless receiver and the visualizer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Serial device, e.g. `/dev/ttyUSB0`.
    pub port: Option<String>,
    pub baud: u32,
    /// Display tick period in seconds.
    pub interval_secs: f64,
    /// Trail capacity.
    pub max_points: usize,
    /// Refresh the viewport and backdrop on every tick.
    pub force_refresh: bool,
    pub read_timeout_ms: u64,
    /// Half-width of the first viewport, in planar units (meters).
    pub initial_pad_m: f64,
    /// Minimum spacing between background refreshes in seconds.
    pub refresh_interval_secs: f64,
    /// Replay a captured log instead of opening the serial port.
    pub replay: Option<PathBuf>,
    /// Delay between replayed lines in milliseconds.
    pub replay_pace_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: 115_200,
            interval_secs: 0.5,
            max_points: 3000,
            force_refresh: false,
            read_timeout_ms: 250,
            initial_pad_m: 500.0,
            refresh_interval_secs: 2.0,
            replay: None,
            replay_pace_ms: 0,
        }
    }
}

impl SessionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> TrailResult<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: SessionConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TrailResult<()> {
        if self.max_points == 0 {
            return Err(TrailError::InvalidConfig("max_points must be at least 1".into()));
        }
        if seconds("interval_secs", self.interval_secs)?.is_zero() {
            return Err(TrailError::InvalidConfig(format!(
                "interval_secs must be positive, got {}",
                self.interval_secs
            )));
        }
        seconds("refresh_interval_secs", self.refresh_interval_secs)?;
        if !(self.initial_pad_m.is_finite() && self.initial_pad_m >= 0.0) {
            return Err(TrailError::InvalidConfig(format!(
                "initial_pad_m must be finite and not negative, got {}",
                self.initial_pad_m
            )));
        }
        Ok(())
    }

    /// Falls back to the default period when `interval_secs` is unusable;
    /// `validate` reports that case as an error.
    pub fn tick_interval(&self) -> Duration {
        seconds("interval_secs", self.interval_secs).unwrap_or(Duration::from_millis(500))
    }

    pub fn refresh_interval(&self) -> Duration {
        seconds("refresh_interval_secs", self.refresh_interval_secs)
            .unwrap_or(Duration::from_secs(2))
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

fn seconds(name: &str, value: f64) -> TrailResult<Duration> {
    Duration::try_from_secs_f64(value).map_err(|err| {
        TrailError::InvalidConfig(format!("{name} is not a usable duration ({value}): {err}"))
    })
}
