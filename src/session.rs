//! Shared state behind the remote's screens.
//!
//! The operator console, the parent setup screen and the parent live view
//! all render one [`SessionState`] and mutate it through [`Session`].
//! Local state is updated before anything is sent and is never rolled back:
//! a failed send only leaves its message in [`SessionState::error`].

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::ble::connection::{ConnectionConfig, ConnectionState};
use crate::data::{Cue, Intensity};
use crate::error::Result;
use crate::remote::Remote;

/// Where commands currently go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SendMode {
    /// Demo mode, nothing is sent.
    Demo,
    /// Commands are written to the peripheral.
    Live,
    /// Demo mode is off but nothing is connected.
    Offline,
}

/// Everything the screens display.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionState {
    /// Mirror of the remote's connection state.
    pub connection: ConnectionState,
    /// Suppress all outbound writes.
    pub demo: bool,
    /// Currently displayed cue.
    pub cue: Cue,
    /// Suppress cue sends.
    pub paused: bool,
    /// Viewer-side mute toggle.
    pub muted: bool,
    /// Displayed intensity.
    pub intensity: Intensity,
    /// When the displayed cue last changed.
    pub last_cue_at: DateTime<Utc>,
    /// Message of the last failed action, empty when none.
    pub error: String,
}

impl SessionState {
    /// Where commands currently go.
    pub fn send_mode(&self) -> SendMode {
        if self.demo {
            SendMode::Demo
        } else if self.connection.connected {
            SendMode::Live
        } else {
            SendMode::Offline
        }
    }

    /// Check if an error is being shown.
    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            connection: ConnectionState::default(),
            demo: true,
            cue: Cue::default(),
            paused: false,
            muted: false,
            intensity: Intensity::default(),
            last_cue_at: Utc::now(),
            error: String::new(),
        }
    }
}

/// UI actions over a shared [`Remote`].
pub struct Session {
    remote: Arc<Remote>,
    state: Arc<RwLock<SessionState>>,
    config: RwLock<ConnectionConfig>,
}

impl Session {
    /// Create a session and start mirroring the remote's connection state.
    ///
    /// Takes over the remote's state-change slot.
    pub fn new(remote: Arc<Remote>) -> Self {
        let state = Arc::new(RwLock::new(SessionState {
            connection: remote.state(),
            ..SessionState::default()
        }));

        let mirror = state.clone();
        remote.set_on_state_change(Some(Arc::new(move |connection: &ConnectionState| {
            mirror.write().connection = connection.clone();
        })));

        Self {
            remote,
            state,
            config: RwLock::new(ConnectionConfig::default()),
        }
    }

    /// Get the remote.
    pub fn remote(&self) -> &Arc<Remote> {
        &self.remote
    }

    /// Get a copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Whether the host exposes BLE at all.
    pub fn is_supported(&self) -> bool {
        self.remote.is_supported()
    }

    // === Configuration ===

    /// Get the connection config.
    pub fn config(&self) -> ConnectionConfig {
        self.config.read().clone()
    }

    /// Replace the connection config used by the next connect.
    pub fn set_config(&self, config: ConnectionConfig) {
        *self.config.write() = config;
    }

    /// Set the service identifier.
    pub fn set_service_uuid(&self, service_uuid: impl Into<String>) {
        self.config.write().service_uuid = service_uuid.into();
    }

    /// Set the characteristic identifier.
    pub fn set_characteristic_uuid(&self, characteristic_uuid: impl Into<String>) {
        self.config.write().characteristic_uuid = characteristic_uuid.into();
    }

    // === Toggles ===

    /// Turn demo mode on or off. Turning it on clears the error.
    pub fn set_demo(&self, demo: bool) {
        let mut state = self.state.write();
        state.demo = demo;
        if demo {
            state.error.clear();
        }
    }

    /// Toggle pause and return the new value.
    pub fn toggle_paused(&self) -> bool {
        let mut state = self.state.write();
        state.paused = !state.paused;
        state.paused
    }

    /// Toggle mute and return the new value.
    pub fn toggle_muted(&self) -> bool {
        let mut state = self.state.write();
        state.muted = !state.muted;
        state.muted
    }

    // === Connection ===

    /// Connect with the current config.
    pub async fn connect(&self) {
        self.clear_error();
        let config = self.config();
        let result = self.remote.connect(&config).await;
        self.record(result);
    }

    /// Disconnect.
    pub async fn disconnect(&self) {
        self.clear_error();
        let result = self.remote.disconnect().await;
        self.record(result);
    }

    /// First-time pairing: leave demo mode, then connect.
    pub async fn begin_pairing(&self) {
        self.set_demo(false);
        self.connect().await;
    }

    // === Commands ===

    /// Show a cue and, unless in demo mode or paused, send it.
    pub async fn push_cue(&self, cue: Cue) {
        let send = {
            let mut state = self.state.write();
            state.cue = cue;
            state.last_cue_at = Utc::now();
            !state.demo && !state.paused
        };

        if !send {
            debug!("Cue {} shown locally only", cue);
            return;
        }

        self.clear_error();
        let result = self.remote.set_cue(cue).await;
        self.record(result);
    }

    /// Send the emergency stop unless in demo mode.
    pub async fn push_stop(&self) {
        let demo = {
            let mut state = self.state.write();
            state.error.clear();
            state.demo
        };

        if demo {
            debug!("Stop suppressed in demo mode");
            return;
        }

        let result = self.remote.stop().await;
        self.record(result);
    }

    /// Show an intensity percentage and, unless in demo mode, send it.
    pub async fn push_intensity(&self, percent: u8) {
        let intensity = Intensity::from_percent(percent);
        let demo = {
            let mut state = self.state.write();
            state.intensity = intensity;
            state.demo
        };

        if demo {
            debug!("Intensity {} shown locally only", intensity);
            return;
        }

        self.clear_error();
        let result = self.remote.set_intensity(intensity.fraction()).await;
        self.record(result);
    }

    fn clear_error(&self) {
        self.state.write().error.clear();
    }

    /// Store a failure as the displayed error.
    fn record(&self, result: Result<()>) {
        if let Err(e) = result {
            warn!("Remote action failed: {}", e);
            self.state.write().error = e.to_string();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.remote.set_on_state_change(None);
    }
}
