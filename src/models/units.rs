use std::fmt::Write;

/// Converts a speed in km/h to a pace in min/km. The mapping is its own
/// inverse: applying it twice returns the input.
pub fn speed_to_pace(speed_kmh: f64) -> f64 {
    60.0 / speed_kmh
}

/// Converts a pace in min/km back to a speed in km/h.
pub fn pace_to_speed(pace_min_km: f64) -> f64 {
    60.0 / pace_min_km
}

/// Meters per second to kilometers per hour.
pub fn mps_to_kmh(mps: f64) -> f64 {
    mps * 3.6
}

/// Kilometers per hour to meters per second.
pub fn kmh_to_mps(kmh: f64) -> f64 {
    kmh / 3.6
}

/// Formats a pace in min/km as `MM:SS min/km`.
pub fn pace_str(pace_min_km: f64) -> String {
    let total_secs = (pace_min_km.max(0.0) * 60.0).round() as u64;
    let mut out = String::new();
    let _ = write!(out, "{:02}:{:02} min/km", total_secs / 60, total_secs % 60);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pace_speed_symmetry() {
        for x in [1.0, 4.5, 10.0, 12.34] {
            assert!((speed_to_pace(speed_to_pace(x)) - x).abs() < 1e-12);
            assert!((pace_to_speed(speed_to_pace(x)) - x).abs() < 1e-12);
        }
    }

    #[test]
    fn pace_formatting() {
        // 12 km/h is a 5:00 min/km pace.
        assert_eq!(pace_str(speed_to_pace(12.0)), "05:00 min/km");
        assert_eq!(pace_str(5.5), "05:30 min/km");
        // Rounding carries into the minute.
        assert_eq!(pace_str(4.9999), "05:00 min/km");
    }

    #[test]
    fn speed_conversions() {
        assert!((mps_to_kmh(10.0) - 36.0).abs() < 1e-12);
        assert!((kmh_to_mps(36.0) - 10.0).abs() < 1e-12);
    }
}
