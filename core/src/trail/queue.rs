use crate::prelude::Fix;
use tokio::sync::mpsc::{self, error::TryRecvError};

/// Returned by [`FixSender::put`] once the consuming side is gone.
#[derive(thiserror::Error, Debug)]
#[error("fix queue consumer dropped")]
pub struct QueueClosed(pub Fix);

/// Creates the hand-off between the producer thread and the display loop.
///
/// The channel is unbounded so `put` never blocks; order is FIFO.
pub fn fix_queue() -> (FixSender, FixReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        FixSender { inner: tx },
        FixReceiver {
            inner: rx,
            disconnected: false,
        },
    )
}

#[derive(Debug, Clone)]
pub struct FixSender {
    inner: mpsc::UnboundedSender<Fix>,
}

impl FixSender {
    pub fn put(&self, fix: Fix) -> Result<(), QueueClosed> {
        self.inner.send(fix).map_err(|err| QueueClosed(err.0))
    }
}

#[derive(Debug)]
pub struct FixReceiver {
    inner: mpsc::UnboundedReceiver<Fix>,
    disconnected: bool,
}

impl FixReceiver {
    /// Drains every fix currently queued without blocking.
    pub fn try_take_all(&mut self) -> Vec<Fix> {
        let mut drained = Vec::new();
        loop {
            match self.inner.try_recv() {
                Ok(fix) => drained.push(fix),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
        drained
    }

    /// True once every sender is dropped and the queue has been drained.
    pub fn is_closed(&self) -> bool {
        self.disconnected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fix_at(lat: f64) -> Fix {
        Fix {
            timestamp: Utc::now(),
            latitude_deg: lat,
            longitude_deg: 0.0,
            bearing_raw: None,
            speed_raw: None,
            altitude_raw: None,
            link: None,
            planar: None,
        }
    }

    #[test]
    fn draining_empty_queue_is_idempotent() {
        let (_tx, mut rx) = fix_queue();
        assert!(rx.try_take_all().is_empty());
        assert!(rx.try_take_all().is_empty());
        assert!(!rx.is_closed());
    }

    #[test]
    fn drains_in_fifo_order_from_another_thread() {
        let (tx, mut rx) = fix_queue();
        std::thread::spawn(move || {
            for i in 0..5 {
                tx.put(fix_at(i as f64)).unwrap();
            }
        })
        .join()
        .unwrap();

        let lats: Vec<f64> = rx.try_take_all().iter().map(|f| f.latitude_deg).collect();
        assert_eq!(lats, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(rx.try_take_all().is_empty());
        assert!(rx.is_closed());
    }

    #[test]
    fn put_fails_once_consumer_is_gone() {
        let (tx, rx) = fix_queue();
        drop(rx);
        let err = tx.put(fix_at(3.0)).unwrap_err();
        assert_eq!(err.0.latitude_deg, 3.0);
    }
}
