//! Intensity data structures.

use crate::utils::{fraction_to_percent, percent_to_fraction};

/// Vibration intensity as an integer percentage (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Intensity(u8);

impl Intensity {
    /// Highest percentage.
    pub const MAX: u8 = 100;

    /// Intensity the remote starts with.
    pub const DEFAULT_PERCENT: u8 = 60;

    /// Create from a percentage, clamping values above 100.
    pub fn from_percent(percent: u8) -> Self {
        Self(percent.min(Self::MAX))
    }

    /// Create from a 0..1 fraction.
    ///
    /// Out-of-range input is clamped and the result rounded half away
    /// from zero.
    pub fn from_fraction(fraction: f64) -> Self {
        Self(fraction_to_percent(fraction))
    }

    /// Get the percentage.
    pub fn percent(&self) -> u8 {
        self.0
    }

    /// Get the intensity as a 0..1 fraction.
    pub fn fraction(&self) -> f64 {
        percent_to_fraction(self.0)
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Self(Self::DEFAULT_PERCENT)
    }
}

impl std::fmt::Display for Intensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}
