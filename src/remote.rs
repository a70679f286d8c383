//! Remote struct and methods.
//!
//! Represents the single cue peripheral the remote controls.

use std::sync::Arc;
use tracing::{debug, info};

use crate::ble::connection::{ConnectionConfig, ConnectionManager, ConnectionState, StateCallback};
use crate::ble::host::BleHost;
use crate::data::Cue;
use crate::error::Result;
use crate::protocol::Command;

/// Sends cue, stop and intensity commands to a BLE peripheral.
///
/// All sends are fire-and-forget: `Ok` means the platform accepted the
/// write, not that the peripheral acted on it.
pub struct Remote {
    connection: ConnectionManager,
}

impl Remote {
    /// Create a remote on a host BLE capability.
    pub fn new(host: Arc<dyn BleHost>) -> Self {
        Self {
            connection: ConnectionManager::new(host),
        }
    }

    // === Connection ===

    /// Whether the host exposes BLE at all.
    pub fn is_supported(&self) -> bool {
        self.connection.is_supported()
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Replace the state-change subscriber. `None` detaches it.
    pub fn set_on_state_change(&self, callback: Option<StateCallback>) {
        self.connection.set_on_state_change(callback);
    }

    /// Select a device and connect to its cue characteristic.
    pub async fn connect(&self, config: &ConnectionConfig) -> Result<()> {
        info!(
            "Connecting (service {}, characteristic {})",
            config.service_uuid, config.characteristic_uuid
        );
        self.connection.connect(config).await
    }

    /// Disconnect. Safe to call when already disconnected.
    pub async fn disconnect(&self) -> Result<()> {
        self.connection.disconnect().await
    }

    // === Commands ===

    /// Send a cue.
    pub async fn set_cue(&self, cue: Cue) -> Result<()> {
        self.send(Command::SetCue(cue)).await
    }

    /// Send the emergency stop.
    pub async fn stop(&self) -> Result<()> {
        self.send(Command::Stop).await
    }

    /// Send an intensity given as a 0..1 fraction.
    ///
    /// The fraction is clamped into range and sent as a whole percentage.
    pub async fn set_intensity(&self, fraction: f64) -> Result<()> {
        self.send(Command::set_intensity(fraction)).await
    }

    /// Encode and write a command.
    pub async fn send(&self, command: Command) -> Result<()> {
        debug!("Sending {}", command);
        self.connection.write(&command.to_bytes()).await
    }
}

impl std::fmt::Debug for Remote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Remote")
            .field("supported", &self.is_supported())
            .field("state", &self.state())
            .finish()
    }
}
