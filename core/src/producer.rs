//! Background activity that reads the transport, reassembles packets and
//! hands completed fixes to the display loop.

use crate::packet::{decode_line, Reassembler};
use crate::prelude::TrailResult;
use crate::telemetry::ReassemblyStats;
use crate::trail::FixSender;
use crate::transport::{LineSource, ReadOutcome};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Summary returned by the producer thread when it exits.
#[derive(Debug, Clone, Default)]
pub struct ProducerReport {
    pub stats: ReassemblyStats,
    /// Fatal transport error that ended the stream, if any.
    pub error: Option<String>,
}

/// Decoded lines from a transport until it closes, fails or is stopped.
struct TransportLines<S> {
    source: S,
    stop: Arc<AtomicBool>,
    error: Option<String>,
}

impl<S: LineSource> Iterator for TransportLines<S> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if self.stop.load(Ordering::Relaxed) {
                return None;
            }
            match self.source.read_line() {
                Ok(ReadOutcome::Line(bytes)) => return Some(decode_line(&bytes)),
                Ok(ReadOutcome::Idle) => continue,
                Ok(ReadOutcome::Closed) => {
                    info!("{} closed", self.source.describe());
                    return None;
                }
                Err(err) => {
                    error!("transport error on {}: {}", self.source.describe(), err);
                    self.error = Some(err.to_string());
                    return None;
                }
            }
        }
    }
}

pub struct ProducerHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<ProducerReport>>,
}

impl ProducerHandle {
    /// Asks the producer to exit after its current read. Idempotent.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stops the producer and waits up to `timeout` for it to exit.
    ///
    /// Returns `None` if the thread is still blocked in the transport when
    /// the timeout expires, or if it panicked.
    pub fn shutdown(mut self, timeout: Duration) -> Option<ProducerReport> {
        self.stop();
        let deadline = Instant::now() + timeout;
        while !self.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        if !self.is_finished() {
            warn!("producer still running after {:?}; detaching", timeout);
            return None;
        }
        match self.thread.take()?.join() {
            Ok(report) => Some(report),
            Err(_) => {
                error!("producer thread panicked");
                None
            }
        }
    }
}

impl Drop for ProducerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawns the producer thread for `source`.
///
/// On stop or end of stream any complete packet still in progress is
/// flushed into the queue before the thread exits.
pub fn spawn_producer<S>(source: S, sender: FixSender) -> TrailResult<ProducerHandle>
where
    S: LineSource + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let lines = TransportLines {
        source,
        stop: stop.clone(),
        error: None,
    };
    let stop_on_close = stop.clone();

    let thread = thread::Builder::new()
        .name("fix-producer".into())
        .spawn(move || {
            info!("producer reading from {}", lines.source.describe());
            let mut reassembler = Reassembler::new(lines);
            for fix in &mut reassembler {
                if sender.put(fix).is_err() {
                    debug!("display loop gone; stopping producer");
                    stop_on_close.store(true, Ordering::Relaxed);
                }
            }
            let stats = reassembler.stats();
            let lines = reassembler.into_lines();
            info!(
                "producer finished: {} lines, {} fixes, {} discarded, {} malformed",
                stats.lines, stats.fixes_emitted, stats.packets_discarded, stats.malformed_lines
            );
            ProducerReport {
                stats,
                error: lines.error,
            }
        })?;

    Ok(ProducerHandle {
        stop,
        thread: Some(thread),
    })
}
