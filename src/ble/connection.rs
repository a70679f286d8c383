//! BLE connection management.
//!
//! Owns the single link to the cue peripheral: device, GATT server and the
//! writable characteristic, plus the [`ConnectionState`] observed by the UI.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::ble::host::{BleDevice, BleHost, DeviceRequest, GattCharacteristic, GattServer};
use crate::ble::uuids::{
    parse_identifier, DEFAULT_CHARACTERISTIC_UUID, DEFAULT_DEVICE_NAME, DEFAULT_SERVICE_UUID,
};
use crate::error::{Error, Result};
use crate::utils::hex;

/// Identifiers used to locate the cue characteristic, plus device selection options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionConfig {
    /// Service identifier, full UUID or 16/32-bit short form.
    pub service_uuid: String,
    /// Characteristic identifier, full UUID or 16/32-bit short form.
    pub characteristic_uuid: String,
    /// Only select devices whose advertised name starts with this prefix.
    pub name_prefix: Option<String>,
    /// How long device selection may take.
    pub selection_timeout: Duration,
}

impl ConnectionConfig {
    /// Default device selection timeout.
    pub const DEFAULT_SELECTION_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a config for the given identifiers.
    pub fn new(service_uuid: impl Into<String>, characteristic_uuid: impl Into<String>) -> Self {
        Self {
            service_uuid: service_uuid.into(),
            characteristic_uuid: characteristic_uuid.into(),
            ..Self::default()
        }
    }

    /// Restrict selection to devices with this name prefix.
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    /// Set the device selection timeout.
    pub fn with_selection_timeout(mut self, timeout: Duration) -> Self {
        self.selection_timeout = timeout;
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            service_uuid: DEFAULT_SERVICE_UUID.to_string(),
            characteristic_uuid: DEFAULT_CHARACTERISTIC_UUID.to_string(),
            name_prefix: None,
            selection_timeout: Self::DEFAULT_SELECTION_TIMEOUT,
        }
    }
}

/// Connection state shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionState {
    /// Whether a characteristic is held.
    pub connected: bool,
    /// Advertised name of the connected device, empty when disconnected.
    pub device_name: String,
}

impl ConnectionState {
    /// State after a successful connect.
    pub fn connected(device_name: impl Into<String>) -> Self {
        Self {
            connected: true,
            device_name: device_name.into(),
        }
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.connected {
            write!(f, "Connected ({})", self.device_name)
        } else {
            write!(f, "Disconnected")
        }
    }
}

/// Subscriber for connection state changes.
pub type StateCallback = Arc<dyn Fn(&ConnectionState) + Send + Sync>;

/// Handles held while connected.
struct Link {
    /// Generation this link was installed under.
    generation: u64,
    device: Arc<dyn BleDevice>,
    server: Arc<dyn GattServer>,
    characteristic: Arc<dyn GattCharacteristic>,
    /// Task watching for unsolicited disconnects.
    watcher: tokio::task::JoinHandle<()>,
}

/// Manages the connection to the cue peripheral.
pub struct ConnectionManager {
    /// Host BLE capability.
    host: Arc<dyn BleHost>,
    /// Active link, if connected.
    link: Arc<RwLock<Option<Link>>>,
    /// Current connection state.
    state: Arc<RwLock<ConnectionState>>,
    /// The single state-change subscriber.
    on_state_change: Arc<RwLock<Option<StateCallback>>>,
    /// Bumped on every installed link so stale watchers can tell they are stale.
    generation: Arc<AtomicU64>,
}

impl ConnectionManager {
    /// Create a new connection manager on a host capability.
    pub fn new(host: Arc<dyn BleHost>) -> Self {
        Self {
            host,
            link: Arc::new(RwLock::new(None)),
            state: Arc::new(RwLock::new(ConnectionState::default())),
            on_state_change: Arc::new(RwLock::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Whether the host exposes BLE at all.
    pub fn is_supported(&self) -> bool {
        self.host.is_supported()
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state.read().clone()
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        self.state.read().is_connected()
    }

    /// Replace the state-change subscriber. `None` detaches it.
    pub fn set_on_state_change(&self, callback: Option<StateCallback>) {
        *self.on_state_change.write() = callback;
    }

    /// Select a device and open the link to its cue characteristic.
    ///
    /// Connecting while already connected replaces the previous link.
    pub async fn connect(&self, config: &ConnectionConfig) -> Result<()> {
        if !self.host.is_supported() {
            return Err(Error::UnsupportedEnvironment);
        }

        let service_uuid = parse_identifier("service_uuid", &config.service_uuid)?;
        let characteristic_uuid =
            parse_identifier("characteristic_uuid", &config.characteristic_uuid)?;

        let request = DeviceRequest {
            service_uuid,
            name_prefix: config.name_prefix.clone(),
            timeout: config.selection_timeout,
        };

        let device = self.host.request_device(&request).await?;
        let device_id = device.id();
        debug!("Device selected: {} ({:?})", device_id, device.name());

        // Subscribe before connecting so a drop during setup is not missed.
        let disconnects = device.disconnect_events();

        let server = device.connect_gatt().await?;
        info!("GATT connected to {}", device_id);

        let characteristic = match Self::lookup(&server, service_uuid, characteristic_uuid).await {
            Ok(characteristic) => characteristic,
            Err(e) => {
                warn!("Characteristic lookup failed: {}", e);
                if let Err(e) = server.disconnect().await {
                    warn!("Failed to close GATT link after lookup failure: {}", e);
                }
                return Err(e);
            }
        };

        let name = device
            .name()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_DEVICE_NAME.to_string());

        info!("Connected to {}", name);

        let connected = ConnectionState::connected(name);

        // Link and state change together so the watcher never sees one without the other.
        let (previous, changed) = {
            let mut link = self.link.write();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            let watcher = self.spawn_disconnect_watcher(disconnects, generation);

            let previous = link.replace(Link {
                generation,
                device,
                server,
                characteristic,
                watcher,
            });

            (previous, Self::update_state(&self.state, connected.clone()))
        };

        if changed {
            Self::notify(&self.state, &self.on_state_change, &connected);
        }

        if let Some(previous) = previous {
            if previous.device.id() == device_id {
                // Same peripheral: the platform link now belongs to the new handles.
                debug!("Reusing link to {}", device_id);
                previous.watcher.abort();
            } else {
                debug!("Replacing link to {}", previous.device.id());
                Self::release(previous).await;
            }
        }

        Ok(())
    }

    /// Close the link.
    ///
    /// The platform disconnect is best-effort; handles and state are
    /// cleared regardless, and calling this while disconnected is a no-op.
    pub async fn disconnect(&self) -> Result<()> {
        let disconnected = ConnectionState::default();

        let (link, changed) = {
            let mut link = self.link.write();
            (
                link.take(),
                Self::update_state(&self.state, disconnected.clone()),
            )
        };

        if let Some(link) = link {
            info!("Disconnecting from {}", link.device.id());
            Self::release(link).await;
        }

        if changed {
            Self::notify(&self.state, &self.on_state_change, &disconnected);
        }

        Ok(())
    }

    /// Write raw bytes to the characteristic.
    ///
    /// Fails with [`Error::NotConnected`] when no characteristic is held.
    /// A failed write does not change the connection state.
    pub async fn write(&self, data: &[u8]) -> Result<()> {
        let characteristic = self
            .link
            .read()
            .as_ref()
            .map(|link| link.characteristic.clone())
            .ok_or(Error::NotConnected)?;

        trace!("Writing [{}] to {}", hex(data), characteristic.uuid());

        characteristic.write_value(data).await
    }

    /// Resolve the characteristic through the service.
    async fn lookup(
        server: &Arc<dyn GattServer>,
        service_uuid: uuid::Uuid,
        characteristic_uuid: uuid::Uuid,
    ) -> Result<Arc<dyn GattCharacteristic>> {
        let service = server.primary_service(service_uuid).await?;
        let characteristic = service.characteristic(characteristic_uuid).await?;
        debug!(
            "Resolved characteristic {} on service {}",
            characteristic.uuid(),
            service.uuid()
        );
        Ok(characteristic)
    }

    /// Stop watching a link and close it if the platform still has it up.
    async fn release(link: Link) {
        link.watcher.abort();

        if link.server.is_connected().await {
            if let Err(e) = link.server.disconnect().await {
                warn!("Failed to disconnect: {}", e);
            }
        }
    }

    /// Run cleanup when the platform drops the link on its own.
    fn spawn_disconnect_watcher(
        &self,
        mut disconnects: tokio::sync::broadcast::Receiver<crate::ble::host::DisconnectEvent>,
        generation: u64,
    ) -> tokio::task::JoinHandle<()> {
        let link = self.link.clone();
        let state = self.state.clone();
        let on_state_change = self.on_state_change.clone();

        tokio::spawn(async move {
            let event = match disconnects.recv().await {
                Ok(event) => event,
                Err(_) => return,
            };

            let disconnected = ConnectionState::default();

            let (removed, changed) = {
                let mut link = link.write();
                match link.as_ref() {
                    Some(current) if current.generation == generation => {
                        let removed = link.take();
                        (removed, Self::update_state(&state, disconnected.clone()))
                    }
                    _ => (None, false),
                }
            };

            if removed.is_none() {
                debug!("Ignoring disconnect of replaced link {}", event.device_id);
                return;
            }

            info!("Device {} disconnected", event.device_id);
            if changed {
                Self::notify(&state, &on_state_change, &disconnected);
            }
        })
    }

    /// Store a new state. Returns whether it differs from the old one.
    fn update_state(state: &RwLock<ConnectionState>, new_state: ConnectionState) -> bool {
        let old_state = std::mem::replace(&mut *state.write(), new_state.clone());

        if old_state == new_state {
            return false;
        }

        debug!("Connection state changed: {} -> {}", old_state, new_state);
        true
    }

    /// Hand a published state to the subscriber, unless it was already superseded.
    ///
    /// Must not be called with the link lock held.
    fn notify(
        state: &RwLock<ConnectionState>,
        on_state_change: &RwLock<Option<StateCallback>>,
        published: &ConnectionState,
    ) {
        if *state.read() != *published {
            return;
        }

        let callback = on_state_change.read().clone();
        if let Some(callback) = callback {
            callback(published);
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(link) = self.link.write().take() {
            link.watcher.abort();
        }
    }
}
