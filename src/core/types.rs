//! VideoStat Core Type Definitions
//!
//! Fundamental aliases shared across the core modules.

/// Project unique identifier (normalized title key, e.g. `summer_trip`)
pub type ProjectId = String;

/// Footage duration in hours (floating point)
pub type Hours = f64;

/// Rounds an hour value to two decimal places.
///
/// Footage totals are presentation-facing; everything that leaves the
/// scanner goes through this.
pub fn round_hours(value: Hours) -> Hours {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_hours_two_decimals() {
        assert_eq!(round_hours(1.23456), 1.23);
        assert_eq!(round_hours(1.235), 1.24);
        assert_eq!(round_hours(0.0), 0.0);
        assert_eq!(round_hours(2.0), 2.0);
    }
}
