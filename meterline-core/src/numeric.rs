//! Fixed-precision helpers shared by the payload encoder and the display
//!
//! Uses `libm` so rounding behaves identically on `no_std` targets and the host.

/// Round `value` to `decimals` places, half away from zero
///
/// Non-finite inputs are returned unchanged.
pub fn round_to(value: f64, decimals: u8) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = libm::pow(10.0, decimals as f64);
    libm::round(value * scale) / scale
}

/// `part / whole * 100`, or `None` when `whole` is zero
pub fn percent(part: u64, whole: u64) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(part as f64 / whole as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to(392.857, 2), 392.86);
        assert_eq!(round_to(-0.125, 2), -0.13);
        assert_eq!(round_to(41.75, 1), 41.8);
        assert_eq!(round_to(5.0, 0), 5.0);
    }

    #[test]
    fn non_finite_passes_through() {
        assert!(round_to(f64::NAN, 2).is_nan());
        assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
    }

    #[test]
    fn percent_of_zero_is_none() {
        assert_eq!(percent(1, 0), None);
        assert_eq!(percent(50, 200), Some(25.0));
    }
}
