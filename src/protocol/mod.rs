//! Protocol module for constructing peripheral commands.

pub mod commands;

pub use commands::{Command, Opcode};
