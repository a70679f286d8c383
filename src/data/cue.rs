//! Cue data structures.
//!
//! A cue is the match situation shown to the viewer and, outside demo mode,
//! forwarded to the peripheral.

/// The three cue states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum Cue {
    /// Nothing in particular is happening.
    #[default]
    Normal = 0,
    /// A scoring chance for the watched side.
    Chance = 1,
    /// The watched side is under pressure.
    Pinch = 2,
}

impl Cue {
    /// All cues in wire-value order.
    pub const ALL: [Cue; 3] = [Cue::Normal, Cue::Chance, Cue::Pinch];

    /// Create from raw wire value.
    ///
    /// Returns `None` for values outside 0..=2.
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Normal),
            1 => Some(Self::Chance),
            2 => Some(Self::Pinch),
            _ => None,
        }
    }

    /// Convert to raw wire value.
    pub fn to_raw(&self) -> u8 {
        *self as u8
    }

    /// Get a human-readable name for this cue.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Chance => "Chance",
            Self::Pinch => "Pinch",
        }
    }
}

impl std::fmt::Display for Cue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Cue {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "chance" => Ok(Self::Chance),
            "pinch" => Ok(Self::Pinch),
            _ => Err(crate::error::Error::InvalidParameter {
                name: "cue".to_string(),
                value: s.to_string(),
            }),
        }
    }
}
