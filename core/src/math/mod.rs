pub mod projection;
pub mod units;

pub use projection::{Projector, WebMercator};
