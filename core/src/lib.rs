//! Packet reassembly and live trail state for serial GPS telemetry.
//!
//! Receiver log lines are folded into position fixes on a producer thread,
//! handed across a queue, and projected into a bounded trail whose viewport
//! is refreshed only when it has to be.

pub mod config;
pub mod math;
pub mod packet;
pub mod prelude;
pub mod producer;
pub mod session;
pub mod telemetry;
pub mod trail;
pub mod transport;

pub use config::SessionConfig;
pub use prelude::{Extent, Fix, LinkQuality, PlanarPoint, TrailError, TrailResult};
