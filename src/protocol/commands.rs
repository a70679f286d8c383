//! Command encoding.
//!
//! Every command is a fixed-width write to the cue characteristic:
//!
//! | Command       | Bytes         |
//! |---------------|---------------|
//! | Set cue       | `[0x01, cue]` |
//! | Set intensity | `[0x02, pct]` |
//! | Stop          | `[0xFF]`      |
//!
//! Nothing is read back from the peripheral.

use crate::data::{Cue, Intensity};

/// Command opcodes (the leading byte of each write).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Set cue (0x01).
    SetCue = 0x01,
    /// Set intensity (0x02).
    SetIntensity = 0x02,
    /// Stop (0xFF).
    Stop = 0xFF,
}

impl Opcode {
    /// Create from raw byte value.
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::SetCue),
            0x02 => Some(Self::SetIntensity),
            0xFF => Some(Self::Stop),
            _ => None,
        }
    }

    /// Convert to raw byte value.
    pub fn to_raw(&self) -> u8 {
        *self as u8
    }
}

/// A command for the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch the peripheral to a cue.
    SetCue(Cue),
    /// Emergency stop, independent of the current cue.
    Stop,
    /// Set the vibration intensity.
    SetIntensity(Intensity),
}

impl Command {
    /// Build a Set Intensity command from a 0..1 fraction.
    ///
    /// The fraction is clamped and rescaled to a percentage.
    pub fn set_intensity(fraction: f64) -> Self {
        Self::SetIntensity(Intensity::from_fraction(fraction))
    }

    /// Get the opcode.
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::SetCue(_) => Opcode::SetCue,
            Self::Stop => Opcode::Stop,
            Self::SetIntensity(_) => Opcode::SetIntensity,
        }
    }

    /// Serialize the command to the bytes written to the characteristic.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::SetCue(cue) => vec![Opcode::SetCue.to_raw(), cue.to_raw()],
            Self::Stop => vec![Opcode::Stop.to_raw()],
            Self::SetIntensity(intensity) => {
                vec![Opcode::SetIntensity.to_raw(), intensity.percent()]
            }
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SetCue(cue) => write!(f, "SetCue({})", cue),
            Self::Stop => write!(f, "Stop"),
            Self::SetIntensity(intensity) => write!(f, "SetIntensity({})", intensity),
        }
    }
}
