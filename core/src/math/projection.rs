use crate::prelude::{Fix, PlanarPoint};
use std::f64::consts::PI;

/// Geographic to planar transform with parameters fixed at construction.
pub trait Projector: Send {
    /// Identifier of the target planar frame, e.g. `EPSG:3857`.
    fn frame(&self) -> &str;

    fn project(&self, longitude_deg: f64, latitude_deg: f64) -> PlanarPoint;

    /// Projects a fix and attaches the result.
    fn attach(&self, fix: Fix) -> Fix {
        let point = self.project(fix.longitude_deg, fix.latitude_deg);
        fix.with_planar(point)
    }
}

/// Spherical (pseudo) Mercator used by web tile services.
#[derive(Debug, Clone, Copy)]
pub struct WebMercator {
    radius: f64,
}

impl WebMercator {
    pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

    pub fn new() -> Self {
        Self {
            radius: Self::EARTH_RADIUS_M,
        }
    }
}

impl Default for WebMercator {
    fn default() -> Self {
        Self::new()
    }
}

impl Projector for WebMercator {
    fn frame(&self) -> &str {
        "EPSG:3857"
    }

    fn project(&self, longitude_deg: f64, latitude_deg: f64) -> PlanarPoint {
        let x = self.radius * longitude_deg.to_radians();
        let y = self.radius * (PI / 4.0 + latitude_deg.to_radians() / 2.0).tan().ln();
        PlanarPoint::new(x, y)
    }
}
