pub mod buffer;
pub mod queue;
pub mod viewport;

pub use buffer::TrailBuffer;
pub use queue::{fix_queue, FixReceiver, FixSender, QueueClosed};
pub use viewport::{RefreshReason, ViewportManager, ViewportRefresh, ViewportState};
