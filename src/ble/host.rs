//! Host BLE capability.
//!
//! The connection manager never talks to a Bluetooth stack directly. It is
//! handed a [`BleHost`] which selects a device, and works through the
//! handles that come back from it: [`BleDevice`] → [`GattServer`] →
//! [`GattService`] → [`GattCharacteristic`].
//!
//! [`crate::ble::btleplug_host::BtleplugHost`] implements these traits on
//! `btleplug`; tests substitute fakes.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::Result;

/// Options for device selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRequest {
    /// Service the selected device must expose.
    pub service_uuid: Uuid,
    /// Only accept devices whose advertised name starts with this prefix.
    pub name_prefix: Option<String>,
    /// How long selection may run before it is treated as dismissed.
    pub timeout: Duration,
}

/// Emitted when the platform reports that a device dropped its link
/// without being asked to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectEvent {
    /// Identifier of the device that disconnected.
    pub device_id: String,
}

/// Entry point to the host's BLE stack.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BleHost: Send + Sync {
    /// Whether the host has any BLE capability at all.
    fn is_supported(&self) -> bool;

    /// Select a device.
    ///
    /// Fails with [`crate::Error::UserCancelled`] when selection is
    /// dismissed or nothing suitable is found.
    async fn request_device(&self, request: &DeviceRequest) -> Result<Arc<dyn BleDevice>>;
}

/// A selected peripheral.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BleDevice: Send + Sync {
    /// Platform identifier of the device.
    fn id(&self) -> String;

    /// Advertised name, if the device exposes one.
    fn name(&self) -> Option<String>;

    /// Open the GATT link.
    async fn connect_gatt(&self) -> Result<Arc<dyn GattServer>>;

    /// Receiver for unsolicited disconnects of this device.
    fn disconnect_events(&self) -> broadcast::Receiver<DisconnectEvent>;
}

/// An open GATT link.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GattServer: Send + Sync {
    /// Whether the link is still up at the platform level.
    async fn is_connected(&self) -> bool;

    /// Look up a primary service.
    async fn primary_service(&self, uuid: Uuid) -> Result<Arc<dyn GattService>>;

    /// Close the link.
    async fn disconnect(&self) -> Result<()>;
}

/// A primary service on the device.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GattService: Send + Sync {
    /// Service UUID.
    fn uuid(&self) -> Uuid;

    /// Look up a characteristic of this service.
    async fn characteristic(&self, uuid: Uuid) -> Result<Arc<dyn GattCharacteristic>>;
}

/// A writable characteristic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GattCharacteristic: Send + Sync {
    /// Characteristic UUID.
    fn uuid(&self) -> Uuid;

    /// Write a value. Success means the platform accepted the write.
    async fn write_value(&self, data: &[u8]) -> Result<()>;
}
