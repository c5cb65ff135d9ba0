use crate::math::units::nano_to_degrees;
use crate::packet::line::{classify, Field, LineKind};
use crate::prelude::{Fix, LinkQuality};
use crate::telemetry::ReassemblyStats;
use chrono::{DateTime, Utc};
use log::debug;

/// Fields collected for the packet currently being received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketBuild {
    pub latitude_nano: Option<i64>,
    pub longitude_nano: Option<i64>,
    pub bearing: Option<i64>,
    pub speed: Option<i64>,
    pub altitude: Option<i64>,
    pub link: Option<LinkQuality>,
}

impl PacketBuild {
    fn opened_by(link: Option<LinkQuality>) -> Self {
        Self {
            link,
            ..Default::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.latitude_nano.is_some() && self.longitude_nano.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Converts a complete packet into a fix stamped with `at`.
    pub fn into_fix(self, at: DateTime<Utc>) -> Option<Fix> {
        let (lat, lon) = (self.latitude_nano?, self.longitude_nano?);
        Some(Fix {
            timestamp: at,
            latitude_deg: nano_to_degrees(lat),
            longitude_deg: nano_to_degrees(lon),
            bearing_raw: self.bearing,
            speed_raw: self.speed,
            altitude_raw: self.altitude,
            link: self.link,
            planar: None,
        })
    }

    fn set(&mut self, field: Field, value: i64) {
        let slot = match field {
            Field::Latitude => &mut self.latitude_nano,
            Field::Longitude => &mut self.longitude_nano,
            Field::Bearing => &mut self.bearing,
            Field::Speed => &mut self.speed,
            Field::Altitude => &mut self.altitude,
        };
        *slot = Some(value);
    }
}

/// What one line did to the packet in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Pending,
    Emitted(Fix),
    Discarded,
    Rejected(Field),
    NoFix,
}

/// Pure transition: folds one classified line into the packet in progress.
///
/// Every boundary starts a fresh packet, whether or not the previous one was
/// complete, so optional fields never carry over between packets.
pub fn advance(build: PacketBuild, kind: LineKind, at: DateTime<Utc>) -> (PacketBuild, Step) {
    match kind {
        LineKind::Boundary(link) => {
            let next = PacketBuild::opened_by(link);
            if build.is_complete() {
                let step = build.into_fix(at).map_or(Step::Discarded, Step::Emitted);
                (next, step)
            } else if build.is_empty() {
                (next, Step::Pending)
            } else {
                (next, Step::Discarded)
            }
        }
        LineKind::Field(field, value) => {
            let mut build = build;
            build.set(field, value);
            (build, Step::Pending)
        }
        LineKind::Malformed(field) => (build, Step::Rejected(field)),
        LineKind::NoFix => (build, Step::NoFix),
        LineKind::Ignored => (build, Step::Pending),
    }
}

/// Stateful wrapper around [`advance`] that owns the single packet in
/// progress and its counters.
#[derive(Debug, Default)]
pub struct PacketAssembler {
    current: PacketBuild,
    stats: ReassemblyStats,
}

impl PacketAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, line: &str) -> Option<Fix> {
        self.feed_at(line, Utc::now())
    }

    pub fn feed_at(&mut self, line: &str, at: DateTime<Utc>) -> Option<Fix> {
        self.stats.record_line();
        let build = std::mem::take(&mut self.current);
        let (next, step) = advance(build, classify(line), at);
        self.current = next;

        match step {
            Step::Emitted(fix) => {
                self.stats.record_emitted();
                Some(fix)
            }
            Step::Discarded => {
                self.stats.record_discarded();
                debug!("dropping incomplete packet at boundary");
                None
            }
            Step::Rejected(field) => {
                self.stats.record_malformed();
                debug!("skipping malformed {:?} line: {}", field, line.trim());
                None
            }
            Step::NoFix => {
                self.stats.record_no_fix();
                None
            }
            Step::Pending => None,
        }
    }

    /// End of input: emits the packet in progress if complete and resets.
    pub fn finish(&mut self) -> Option<Fix> {
        self.finish_at(Utc::now())
    }

    pub fn finish_at(&mut self, at: DateTime<Utc>) -> Option<Fix> {
        let build = std::mem::take(&mut self.current);
        if build.is_complete() {
            self.stats.record_emitted();
            build.into_fix(at)
        } else {
            if !build.is_empty() {
                self.stats.record_discarded();
            }
            None
        }
    }

    pub fn pending(&self) -> &PacketBuild {
        &self.current
    }

    pub fn stats(&self) -> ReassemblyStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(assembler: &mut PacketAssembler, lines: &[&str]) -> Vec<Fix> {
        lines
            .iter()
            .filter_map(|line| assembler.feed(line))
            .collect()
    }

    #[test]
    fn complete_packet_is_emitted_at_next_boundary() {
        let mut assembler = PacketAssembler::new();
        let fixes = feed_all(
            &mut assembler,
            &[
                "Packet received",
                "Latitude: 407128000",
                "Longitude: -740060000",
                "Packet received",
            ],
        );
        assert_eq!(fixes.len(), 1);
        assert!((fixes[0].latitude_deg - 0.407128).abs() < 1e-9);
        assert!((fixes[0].longitude_deg - -0.74006).abs() < 1e-9);
        assert_eq!(assembler.stats().fixes_emitted, 1);
    }

    #[test]
    fn incomplete_packet_is_discarded_and_counted() {
        let mut assembler = PacketAssembler::new();
        let fixes = feed_all(
            &mut assembler,
            &["Packet received", "Latitude: 1", "Packet received"],
        );
        assert!(fixes.is_empty());
        assert_eq!(assembler.stats().packets_discarded, 1);
        assert!(assembler.pending().is_empty());
    }

    #[test]
    fn bare_boundaries_never_emit() {
        let mut assembler = PacketAssembler::new();
        let fixes = feed_all(&mut assembler, &["Packet received", "Packet received"]);
        assert!(fixes.is_empty());
        assert_eq!(assembler.stats().packets_discarded, 0);
        assert_eq!(assembler.finish(), None);
    }

    #[test]
    fn last_write_wins_within_a_packet() {
        let mut assembler = PacketAssembler::new();
        feed_all(
            &mut assembler,
            &["Latitude: 1000000000", "Longitude: 0", "Latitude: 2000000000"],
        );
        let fix = assembler.finish().unwrap();
        assert_eq!(fix.latitude_deg, 2.0);
    }

    #[test]
    fn optional_fields_reset_on_every_boundary() {
        let mut assembler = PacketAssembler::new();
        let mut fixes = feed_all(
            &mut assembler,
            &[
                "Packet received",
                "Bearing: 90000",
                "Speed: 150",
                "Latitude: 1",
                "Packet received",
                "Latitude: 2",
                "Longitude: 2",
            ],
        );
        fixes.extend(assembler.finish());
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].bearing_raw, None);
        assert_eq!(fixes[0].speed_raw, None);
    }

    #[test]
    fn malformed_line_is_skipped_without_losing_packet() {
        let mut assembler = PacketAssembler::new();
        feed_all(
            &mut assembler,
            &[
                "Latitude: 5",
                "Longitude: 123456789012345678901234567890",
                "Longitude: 6",
            ],
        );
        let fix = assembler.finish().unwrap();
        assert_eq!(fix.longitude_deg, 6e-9);
        assert_eq!(assembler.stats().malformed_lines, 1);
    }

    #[test]
    fn link_quality_belongs_to_the_packet_the_boundary_opens() {
        let mut assembler = PacketAssembler::new();
        let mut fixes = feed_all(
            &mut assembler,
            &[
                "Packet received (24 bytes | -90 dBm | 5 dB:",
                "Latitude: 1",
                "Longitude: 1",
                "Packet received",
                "Latitude: 2",
                "Longitude: 2",
            ],
        );
        fixes.extend(assembler.finish());
        assert_eq!(fixes.len(), 2);
        assert_eq!(fixes[0].link.map(|l| l.rssi_dbm), Some(-90));
        assert_eq!(fixes[1].link, None);
    }

    #[test]
    fn advance_is_a_pure_fold() {
        let at = Utc::now();
        let (build, step) = advance(
            PacketBuild::default(),
            LineKind::Field(Field::Latitude, 7),
            at,
        );
        assert_eq!(step, Step::Pending);
        assert_eq!(build.latitude_nano, Some(7));

        let (build, step) = advance(build, LineKind::Boundary(None), at);
        assert_eq!(step, Step::Discarded);
        assert!(build.is_empty());
    }

    #[test]
    fn no_fix_notices_are_counted() {
        let mut assembler = PacketAssembler::new();
        feed_all(&mut assembler, &["Packet received", "\tNo fix acquired!"]);
        assert_eq!(assembler.stats().no_fix_notices, 1);
        assert_eq!(assembler.stats().lines, 2);
    }
}
