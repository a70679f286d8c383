// Allow unusual byte groupings for UUIDs which have standard format
#![allow(clippy::unusual_byte_groupings)]

//! # cue-remote-ble
//!
//! A small Bluetooth Low Energy remote that sends cue, stop and intensity
//! commands to a haptic peripheral.
//!
//! The peripheral exposes one writable characteristic. Every command is a
//! fire-and-forget write of one or two bytes; nothing is read back.
//!
//! ## Features
//!
//! - **Connection Management**: select a device, open the GATT link and
//!   resolve the cue characteristic, with cleanup on unsolicited disconnects
//! - **Commands**: cue (`[0x01, v]`), stop (`[0xFF]`), intensity (`[0x02, p]`)
//! - **Pluggable Host**: the Bluetooth stack is injected through
//!   [`ble::BleHost`]; [`BtleplugHost`] is the production implementation
//! - **Session State**: demo mode, pause, mute and optimistic cue/intensity
//!   display shared by all screens
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cue_remote_ble::{BtleplugHost, ConnectionConfig, Cue, Remote, Result};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let host = BtleplugHost::new().await;
//!     let remote = Remote::new(Arc::new(host));
//!
//!     remote.connect(&ConnectionConfig::default()).await?;
//!     println!("{}", remote.state());
//!
//!     remote.set_intensity(0.6).await?;
//!     remote.set_cue(Cue::Chance).await?;
//!     remote.stop().await?;
//!
//!     remote.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Platform Notes
//!
//! ### macOS
//! Requires Bluetooth permission. Add `NSBluetoothAlwaysUsageDescription`
//! to your Info.plist for bundled apps.
//!
//! ### Linux
//! Requires BlueZ. User may need to be in the `bluetooth` group.
//!
//! ### Windows
//! Requires Windows 10 or later with Bluetooth LE support.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for data types

// Public modules
pub mod ble;
pub mod data;
pub mod error;
pub mod protocol;
pub mod remote;
pub mod session;
pub mod utils;

// Re-exports for convenience
pub use ble::{BtleplugHost, ConnectionConfig, ConnectionManager, ConnectionState};
pub use data::{Cue, Intensity};
pub use error::{Error, Result};
pub use protocol::{Command, Opcode};
pub use remote::Remote;
pub use session::{SendMode, Session, SessionState};
pub use utils::{fraction_to_percent, percent_to_fraction};
