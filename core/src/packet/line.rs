//! Recognition of single receiver log lines.
//!
//! Patterns are matched anywhere in the line so that log prefixes such as
//! `[00:00:12.345,000] <inf> main:` and terminal color codes are tolerated.

use crate::prelude::LinkQuality;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BOUNDARY_RE: Regex = Regex::new(r"Packet received").unwrap();
    static ref LINK_RE: Regex =
        Regex::new(r"Packet received \((\d+) bytes \| (-?\d+) dBm \| (-?\d+) dB").unwrap();
    static ref NO_FIX_RE: Regex = Regex::new(r"No fix acquired").unwrap();
    static ref FIELD_RES: [(Field, Regex); 5] = [
        (Field::Latitude, Regex::new(r"Latitude:\s*(-?\d+)").unwrap()),
        (Field::Longitude, Regex::new(r"Longitude:\s*(-?\d+)").unwrap()),
        (Field::Bearing, Regex::new(r"Bearing:\s*(-?\d+)").unwrap()),
        (Field::Speed, Regex::new(r"Speed:\s*(-?\d+)").unwrap()),
        (Field::Altitude, Regex::new(r"Altitude:\s*(-?\d+)").unwrap()),
    ];
}

/// Telemetry slot a field line writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Latitude,
    Longitude,
    Bearing,
    Speed,
    Altitude,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Start of a new packet, with the receiver's link report when present.
    Boundary(Option<LinkQuality>),
    Field(Field, i64),
    /// A field label matched but its integer did not fit.
    Malformed(Field),
    NoFix,
    Ignored,
}

pub fn classify(line: &str) -> LineKind {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Ignored;
    }

    if BOUNDARY_RE.is_match(line) {
        return LineKind::Boundary(parse_link(line));
    }

    for (field, re) in FIELD_RES.iter() {
        if let Some(caps) = re.captures(line) {
            return match caps[1].parse::<i64>() {
                Ok(value) => LineKind::Field(*field, value),
                Err(_) => LineKind::Malformed(*field),
            };
        }
    }

    if NO_FIX_RE.is_match(line) {
        return LineKind::NoFix;
    }

    LineKind::Ignored
}

fn parse_link(line: &str) -> Option<LinkQuality> {
    let caps = LINK_RE.captures(line)?;
    Some(LinkQuality {
        size_bytes: caps[1].parse().ok()?,
        rssi_dbm: caps[2].parse().ok()?,
        snr_db: caps[3].parse().ok()?,
    })
}

/// Best-effort decoding of raw transport bytes; invalid sequences are dropped.
pub fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .collect::<String>()
        .trim()
        .to_string()
}
