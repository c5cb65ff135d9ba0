pub mod metrics;

pub use metrics::ReassemblyStats;
