//! Data structures for remote state.
//!
//! This module contains the value types carried by commands and shown
//! by the remote's screens.

pub mod cue;
pub mod intensity;

pub use cue::Cue;
pub use intensity::Intensity;
