//! Line-oriented transports feeding the reassembler.

use crate::prelude::{TrailError, TrailResult};
use serialport::SerialPort;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Result of one read attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Raw bytes of one line, terminator included when present.
    Line(Vec<u8>),
    /// Read timed out without a complete line.
    Idle,
    /// The source has no more data.
    Closed,
}

/// "Read next line or time out" collaborator owned by the producer thread.
pub trait LineSource: Send {
    fn read_line(&mut self) -> TrailResult<ReadOutcome>;

    fn describe(&self) -> String;
}

impl LineSource for Box<dyn LineSource> {
    fn read_line(&mut self) -> TrailResult<ReadOutcome> {
        (**self).read_line()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Line reader over any buffered byte stream.
///
/// Bytes received before a read timeout are kept and completed by the next
/// read, so a slow device never splits a line in two.
pub struct ReaderSource<R> {
    reader: R,
    pending: Vec<u8>,
    pace: Duration,
    label: String,
}

impl<R: BufRead + Send> ReaderSource<R> {
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            pace: Duration::ZERO,
            label: label.into(),
        }
    }

    /// Sleeps for `pace` after every delivered line.
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }
}

impl<R: BufRead + Send> LineSource for ReaderSource<R> {
    fn read_line(&mut self) -> TrailResult<ReadOutcome> {
        match self.reader.read_until(b'\n', &mut self.pending) {
            Ok(0) if self.pending.is_empty() => Ok(ReadOutcome::Closed),
            Ok(_) => {
                let line = std::mem::take(&mut self.pending);
                if !self.pace.is_zero() {
                    thread::sleep(self.pace);
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(ReadOutcome::Idle)
            }
            Err(err) => Err(TrailError::Io(err)),
        }
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

pub type SerialSource = ReaderSource<BufReader<Box<dyn SerialPort>>>;
pub type ReplaySource = ReaderSource<BufReader<File>>;

/// Opens a serial device as 8N1 with the given read timeout.
pub fn open_serial(port: &str, baud: u32, timeout: Duration) -> TrailResult<SerialSource> {
    let serial = serialport::new(port, baud)
        .timeout(timeout)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .open()?;
    Ok(ReaderSource::new(
        BufReader::new(serial),
        format!("{port}@{baud}"),
    ))
}

/// Opens a captured receiver log for replay.
pub fn open_replay<P: AsRef<Path>>(path: P, pace: Duration) -> TrailResult<ReplaySource> {
    let path = path.as_ref();
    let file = File::open(path)?;
    Ok(ReaderSource::new(BufReader::new(file), path.display().to_string()).with_pace(pace))
}
