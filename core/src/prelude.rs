use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::math::units;

/// Signal quality reported by the receiver alongside a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkQuality {
    pub size_bytes: u32,
    pub rssi_dbm: i32,
    pub snr_db: i32,
}

/// Point in the planar display frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One completed position sample.
///
/// Optional telemetry fields keep their raw integer units; use the accessor
/// methods for physical values. `planar` stays `None` until the fix is
/// projected on its way into the trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub timestamp: DateTime<Utc>,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub bearing_raw: Option<i64>,
    pub speed_raw: Option<i64>,
    pub altitude_raw: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkQuality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planar: Option<PlanarPoint>,
}

impl Fix {
    pub fn bearing_deg(&self) -> Option<f64> {
        units::bearing_degrees(self.bearing_raw)
    }

    pub fn speed_mps(&self) -> Option<f64> {
        units::speed_mps(self.speed_raw)
    }

    pub fn altitude_m(&self) -> Option<f64> {
        units::altitude_m(self.altitude_raw)
    }

    /// Attaches planar coordinates. A fix that already carries them is
    /// returned unchanged.
    pub fn with_planar(mut self, point: PlanarPoint) -> Self {
        if self.planar.is_none() {
            self.planar = Some(point);
        }
        self
    }
}

/// Axis-aligned rectangle in planar coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn centered(center: PlanarPoint, pad: f64) -> Self {
        Self {
            min_x: center.x - pad,
            max_x: center.x + pad,
            min_y: center.y - pad,
            max_y: center.y + pad,
        }
    }

    /// Inclusive containment; NaN coordinates are never inside.
    pub fn contains(&self, point: PlanarPoint) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Common error type for the trail pipeline.
#[derive(thiserror::Error, Debug)]
pub enum TrailError {
    #[error("transport failure: {0}")]
    Transport(#[from] serialport::Error),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse failure: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type TrailResult<T> = Result<T, TrailError>;
