//! Raw telemetry integers to physical units.

pub fn nano_to_degrees(nanodegrees: i64) -> f64 {
    nanodegrees as f64 / 1e9
}

pub fn bearing_degrees(raw: Option<i64>) -> Option<f64> {
    raw.map(|millideg| millideg as f64 / 1000.0)
}

pub fn speed_mps(raw: Option<i64>) -> Option<f64> {
    raw.map(|centi| centi as f64 / 100.0)
}

pub fn altitude_m(raw: Option<i64>) -> Option<f64> {
    raw.map(|millimeters| millimeters as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nanodegrees_convert_to_degrees() {
        assert!((nano_to_degrees(40_712_800_000) - 40.7128).abs() < 1e-6);
        assert!((nano_to_degrees(-74_006_000_000) - -74.006).abs() < 1e-6);
        // Short values are still nanodegrees, not scaled microdegrees.
        assert!((nano_to_degrees(407_128_000) - 0.407128).abs() < 1e-9);
        assert!((nano_to_degrees(-740_060_000) - -0.74006).abs() < 1e-9);
    }

    #[test]
    fn optional_fields_scale_or_stay_unknown() {
        assert_eq!(bearing_degrees(Some(45_000)), Some(45.0));
        assert_eq!(speed_mps(Some(123)), Some(1.23));
        assert_eq!(altitude_m(Some(-2_500)), Some(-2.5));
        assert_eq!(bearing_degrees(None), None);
        assert_eq!(speed_mps(None), None);
        assert_eq!(altitude_m(None), None);
    }
}
