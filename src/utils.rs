//! Utility functions for the cue-remote-ble crate.

/// Convert a 0..1 fraction to an integer percentage.
///
/// The input is clamped into `[0, 1]` before scaling and the result is
/// rounded half away from zero. `NaN` maps to 0.
///
/// # Example
///
/// ```
/// use cue_remote_ble::fraction_to_percent;
///
/// assert_eq!(fraction_to_percent(0.6), 60);
/// assert_eq!(fraction_to_percent(1.4), 100);
/// assert_eq!(fraction_to_percent(-0.2), 0);
/// ```
#[inline]
pub fn fraction_to_percent(fraction: f64) -> u8 {
    if fraction.is_nan() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Convert an integer percentage to a 0..1 fraction.
///
/// # Example
///
/// ```
/// use cue_remote_ble::percent_to_fraction;
///
/// assert!((percent_to_fraction(60) - 0.6).abs() < 0.001);
/// ```
#[inline]
pub fn percent_to_fraction(percent: u8) -> f64 {
    percent as f64 / 100.0
}

/// Format bytes as space-separated hex for log output.
pub(crate) fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
