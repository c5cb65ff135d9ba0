use crate::prelude::Fix;
use chrono::Local;

pub const UNKNOWN: &str = "unknown";

/// Multi-line status block for the newest fix.
pub fn summarize(fix: &Fix, points: usize) -> String {
    let bearing = fix
        .bearing_deg()
        .map_or_else(|| UNKNOWN.to_string(), |deg| format!("{deg:.1}°"));
    let speed = fix
        .speed_mps()
        .map_or_else(|| UNKNOWN.to_string(), |mps| format!("{mps:.2} m/s"));
    let altitude = fix
        .altitude_m()
        .map_or_else(|| UNKNOWN.to_string(), |m| format!("{m:.2} m"));

    let mut lines = vec![
        format!(
            "Last fix @ {}",
            fix.timestamp.with_timezone(&Local).format("%H:%M:%S")
        ),
        format!("Lat: {:.6}  Lon: {:.6}", fix.latitude_deg, fix.longitude_deg),
        format!("Bearing: {bearing}   Speed: {speed}   Alt: {altitude}"),
    ];
    if let Some(link) = fix.link {
        lines.push(format!("Link: {} dBm / {} dB", link.rssi_dbm, link.snr_db));
    }
    lines.push(format!("Points: {points}"));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::LinkQuality;
    use chrono::Utc;

    fn sample() -> Fix {
        Fix {
            timestamp: Utc::now(),
            latitude_deg: 40.7128,
            longitude_deg: -74.006,
            bearing_raw: Some(45_000),
            speed_raw: Some(123),
            altitude_raw: Some(12_345),
            link: None,
            planar: None,
        }
    }

    #[test]
    fn converts_all_known_fields() {
        let text = summarize(&sample(), 2);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Last fix @ "));
        assert_eq!(lines[1], "Lat: 40.712800  Lon: -74.006000");
        assert_eq!(lines[2], "Bearing: 45.0°   Speed: 1.23 m/s   Alt: 12.35 m");
        assert_eq!(lines[3], "Points: 2");
    }

    #[test]
    fn absent_fields_render_unknown_not_zero() {
        let fix = Fix {
            bearing_raw: None,
            speed_raw: None,
            altitude_raw: None,
            ..sample()
        };
        let text = summarize(&fix, 1);
        assert!(text.contains("Bearing: unknown   Speed: unknown   Alt: unknown"));
    }

    #[test]
    fn link_quality_line_only_when_known() {
        let fix = Fix {
            link: Some(LinkQuality {
                size_bytes: 24,
                rssi_dbm: -87,
                snr_db: 7,
            }),
            ..sample()
        };
        assert!(summarize(&fix, 1).contains("Link: -87 dBm / 7 dB"));
        assert!(!summarize(&sample(), 1).contains("Link:"));
    }
}
