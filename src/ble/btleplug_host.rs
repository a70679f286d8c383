//! Host BLE capability backed by `btleplug`.
//!
//! Device selection scans with the requested service as filter and takes
//! the first peripheral that matches, standing in for an interactive device
//! picker. A scan that finds nothing within the request timeout counts as a
//! dismissed picker.

use async_trait::async_trait;
use btleplug::api::{
    Central, CentralEvent, CharPropFlags, Characteristic, Manager as _, Peripheral as _,
    ScanFilter, Service, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::ble::host::{
    BleDevice, BleHost, DeviceRequest, DisconnectEvent, GattCharacteristic, GattServer,
    GattService,
};
use crate::error::{Error, Result};
use crate::utils::hex;

/// [`BleHost`] on the first Bluetooth adapter of the system.
pub struct BtleplugHost {
    /// The adapter used for scanning, `None` when the system has none.
    adapter: Option<Adapter>,
}

impl BtleplugHost {
    /// Create a host on the first available adapter.
    ///
    /// Never fails: a system without Bluetooth yields a host whose
    /// [`BleHost::is_supported`] returns `false`.
    pub async fn new() -> Self {
        let manager = match Manager::new().await {
            Ok(manager) => manager,
            Err(e) => {
                warn!("Bluetooth manager unavailable: {}", e);
                return Self { adapter: None };
            }
        };

        let adapter = match manager.adapters().await {
            Ok(adapters) => adapters.into_iter().next(),
            Err(e) => {
                warn!("Failed to list Bluetooth adapters: {}", e);
                None
            }
        };

        if let Some(ref adapter) = adapter {
            info!(
                "Using Bluetooth adapter: {:?}",
                adapter.adapter_info().await.ok()
            );
        }

        Self { adapter }
    }

    /// Create a host on a specific adapter.
    pub fn with_adapter(adapter: Adapter) -> Self {
        Self {
            adapter: Some(adapter),
        }
    }

    /// Get the underlying adapter.
    pub fn adapter(&self) -> Option<&Adapter> {
        self.adapter.as_ref()
    }

    /// Wait for the first peripheral that satisfies the request.
    async fn select(
        adapter: &Adapter,
        request: &DeviceRequest,
    ) -> Result<(Peripheral, Option<String>)> {
        // Subscribe before checking known peripherals so nothing slips between the two.
        let mut events = adapter.events().await?;

        for peripheral in adapter.peripherals().await? {
            if let Some(found) = Self::candidate(adapter, &peripheral.id(), request).await {
                return Ok(found);
            }
        }

        while let Some(event) = events.next().await {
            let id = match event {
                CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
                CentralEvent::ServicesAdvertisement { id, .. } => id,
                _ => continue,
            };

            if let Some(found) = Self::candidate(adapter, &id, request).await {
                return Ok(found);
            }
        }

        Err(Error::UserCancelled)
    }

    /// Check a peripheral against the request.
    ///
    /// With a name prefix the name decides; otherwise the device must
    /// advertise the requested service (some platforms ignore the scan filter).
    async fn candidate(
        adapter: &Adapter,
        id: &PeripheralId,
        request: &DeviceRequest,
    ) -> Option<(Peripheral, Option<String>)> {
        let peripheral = adapter.peripheral(id).await.ok()?;
        let properties = peripheral.properties().await.ok()??;
        let name = properties.local_name.clone();

        let accepted = match &request.name_prefix {
            Some(prefix) => name
                .as_deref()
                .map(|n| n.starts_with(prefix.as_str()))
                .unwrap_or(false),
            None => properties.services.contains(&request.service_uuid),
        };

        trace!("Peripheral {:?} ({:?}) accepted: {}", id, name, accepted);

        if accepted {
            Some((peripheral, name))
        } else {
            None
        }
    }
}

#[async_trait]
impl BleHost for BtleplugHost {
    fn is_supported(&self) -> bool {
        self.adapter.is_some()
    }

    async fn request_device(&self, request: &DeviceRequest) -> Result<Arc<dyn BleDevice>> {
        let adapter = self.adapter.as_ref().ok_or(Error::UnsupportedEnvironment)?;

        info!(
            "Scanning up to {:?} for a device with service {}",
            request.timeout, request.service_uuid
        );

        let filter = ScanFilter {
            services: match request.name_prefix {
                Some(_) => vec![],
                None => vec![request.service_uuid],
            },
        };
        adapter.start_scan(filter).await?;

        let selected = tokio::time::timeout(request.timeout, Self::select(adapter, request)).await;

        if let Err(e) = adapter.stop_scan().await {
            warn!("Failed to stop scan: {}", e);
        }

        let (peripheral, name) = match selected {
            Ok(result) => result?,
            Err(_) => {
                debug!("No device selected within {:?}", request.timeout);
                return Err(Error::UserCancelled);
            }
        };

        info!("Selected device {:?} ({:?})", peripheral.id(), name);

        Ok(Arc::new(BtleplugDevice::new(adapter.clone(), peripheral, name)))
    }
}

/// A peripheral selected through [`BtleplugHost`].
pub struct BtleplugDevice {
    /// The peripheral handle.
    peripheral: Peripheral,
    /// Name advertised at selection time.
    name: Option<String>,
    /// Channel for unsolicited disconnects.
    disconnect_tx: broadcast::Sender<DisconnectEvent>,
    /// Task forwarding adapter disconnect events for this peripheral.
    watcher: tokio::task::JoinHandle<()>,
}

impl BtleplugDevice {
    fn new(adapter: Adapter, peripheral: Peripheral, name: Option<String>) -> Self {
        let (disconnect_tx, _) = broadcast::channel(4);

        let id = peripheral.id();
        let tx = disconnect_tx.clone();

        let watcher = tokio::spawn(async move {
            let mut events = match adapter.events().await {
                Ok(events) => events,
                Err(e) => {
                    warn!("Failed to get adapter events: {}", e);
                    return;
                }
            };

            while let Some(event) = events.next().await {
                if let CentralEvent::DeviceDisconnected(disconnected) = event {
                    if disconnected == id {
                        debug!("Device disconnected: {:?}", id);
                        let _ = tx.send(DisconnectEvent {
                            device_id: format!("{:?}", id),
                        });
                    }
                }
            }

            debug!("Disconnect watcher ended");
        });

        Self {
            peripheral,
            name,
            disconnect_tx,
            watcher,
        }
    }
}

#[async_trait]
impl BleDevice for BtleplugDevice {
    fn id(&self) -> String {
        format!("{:?}", self.peripheral.id())
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    async fn connect_gatt(&self) -> Result<Arc<dyn GattServer>> {
        self.peripheral
            .connect()
            .await
            .map_err(|e| Error::ConnectionFailed {
                reason: e.to_string(),
            })?;

        self.peripheral
            .discover_services()
            .await
            .map_err(|e| Error::ConnectionFailed {
                reason: format!("service discovery failed: {}", e),
            })?;

        Ok(Arc::new(BtleplugServer {
            peripheral: self.peripheral.clone(),
        }))
    }

    fn disconnect_events(&self) -> broadcast::Receiver<DisconnectEvent> {
        self.disconnect_tx.subscribe()
    }
}

impl Drop for BtleplugDevice {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

/// GATT link of a [`BtleplugDevice`].
struct BtleplugServer {
    peripheral: Peripheral,
}

#[async_trait]
impl GattServer for BtleplugServer {
    async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    async fn primary_service(&self, uuid: Uuid) -> Result<Arc<dyn GattService>> {
        let service = self
            .peripheral
            .services()
            .into_iter()
            .find(|s| s.uuid == uuid)
            .ok_or_else(|| Error::ServiceNotFound {
                uuid: uuid.to_string(),
            })?;

        debug!(
            "Found service {} with {} characteristics",
            uuid,
            service.characteristics.len()
        );

        Ok(Arc::new(BtleplugService {
            peripheral: self.peripheral.clone(),
            service,
        }))
    }

    async fn disconnect(&self) -> Result<()> {
        self.peripheral.disconnect().await?;
        Ok(())
    }
}

struct BtleplugService {
    peripheral: Peripheral,
    service: Service,
}

#[async_trait]
impl GattService for BtleplugService {
    fn uuid(&self) -> Uuid {
        self.service.uuid
    }

    async fn characteristic(&self, uuid: Uuid) -> Result<Arc<dyn GattCharacteristic>> {
        let characteristic = self
            .service
            .characteristics
            .iter()
            .find(|c| c.uuid == uuid)
            .cloned()
            .ok_or_else(|| {
                for c in &self.service.characteristics {
                    debug!("  Available characteristic: {}", c.uuid);
                }
                Error::CharacteristicNotFound {
                    uuid: uuid.to_string(),
                }
            })?;

        debug!(
            "Found characteristic {}, properties: {:?}",
            uuid, characteristic.properties
        );

        Ok(Arc::new(BtleplugCharacteristic {
            peripheral: self.peripheral.clone(),
            characteristic,
        }))
    }
}

struct BtleplugCharacteristic {
    peripheral: Peripheral,
    characteristic: Characteristic,
}

#[async_trait]
impl GattCharacteristic for BtleplugCharacteristic {
    fn uuid(&self) -> Uuid {
        self.characteristic.uuid
    }

    async fn write_value(&self, data: &[u8]) -> Result<()> {
        let write_type = write_type_for(self.characteristic.properties);

        self.peripheral
            .write(&self.characteristic, data, write_type)
            .await?;

        trace!(
            "Wrote [{}] to characteristic {} ({:?})",
            hex(data),
            self.characteristic.uuid,
            write_type
        );

        Ok(())
    }
}

/// Prefer acknowledged writes when the characteristic supports them.
fn write_type_for(properties: CharPropFlags) -> WriteType {
    if properties.contains(CharPropFlags::WRITE) {
        WriteType::WithResponse
    } else {
        WriteType::WithoutResponse
    }
}
