//! In-memory host capability for driving the remote without hardware.

#![allow(dead_code)]

use async_trait::async_trait;
use cue_remote_ble::ble::{
    BleDevice, BleHost, DeviceRequest, DisconnectEvent, GattCharacteristic, GattServer,
    GattService, DEFAULT_CHARACTERISTIC_UUID, DEFAULT_SERVICE_UUID,
};
use cue_remote_ble::{Error, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

pub struct FakeHost {
    supported: bool,
    device: Mutex<Option<Arc<FakeDevice>>>,
    pub requests: AtomicUsize,
    pub last_request: Mutex<Option<DeviceRequest>>,
}

impl FakeHost {
    pub fn unsupported() -> Arc<Self> {
        Arc::new(Self {
            supported: false,
            device: Mutex::new(None),
            requests: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    /// A host whose device picker is always dismissed.
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            supported: true,
            device: Mutex::new(None),
            requests: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn with_device(device: Arc<FakeDevice>) -> Arc<Self> {
        let host = Self::empty();
        host.set_device(device);
        host
    }

    /// Device returned by the next selection.
    pub fn set_device(&self, device: Arc<FakeDevice>) {
        *self.device.lock() = Some(device);
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BleHost for FakeHost {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn request_device(&self, request: &DeviceRequest) -> Result<Arc<dyn BleDevice>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request.clone());

        let device = self.device.lock().clone();
        match device {
            Some(device) => Ok(device as Arc<dyn BleDevice>),
            None => Err(Error::UserCancelled),
        }
    }
}

pub struct FakeDevice {
    id: String,
    name: Option<String>,
    disconnect_tx: broadcast::Sender<DisconnectEvent>,
    pub server: Arc<FakeServer>,
    pub fail_gatt: AtomicBool,
}

impl FakeDevice {
    /// A device exposing the default cue service and characteristic.
    pub fn new(id: &str, name: Option<&str>) -> Arc<Self> {
        Self::with_service(id, name, DEFAULT_SERVICE_UUID, DEFAULT_CHARACTERISTIC_UUID)
    }

    pub fn with_service(
        id: &str,
        name: Option<&str>,
        service_uuid: Uuid,
        characteristic_uuid: Uuid,
    ) -> Arc<Self> {
        let (disconnect_tx, _) = broadcast::channel(4);
        let characteristic = Arc::new(FakeCharacteristic::new(characteristic_uuid));
        let service = Arc::new(FakeService {
            uuid: service_uuid,
            characteristics: vec![characteristic],
        });

        Arc::new(Self {
            id: id.to_string(),
            name: name.map(str::to_string),
            disconnect_tx,
            server: Arc::new(FakeServer {
                connected: AtomicBool::new(false),
                services: vec![service],
                disconnect_calls: AtomicUsize::new(0),
                fail_disconnect: AtomicBool::new(false),
            }),
            fail_gatt: AtomicBool::new(false),
        })
    }

    /// The cue characteristic of the first service.
    pub fn characteristic(&self) -> Arc<FakeCharacteristic> {
        self.server.services[0].characteristics[0].clone()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.characteristic().writes.lock().clone()
    }

    /// Drop the link from the peripheral side.
    pub fn power_off(&self) {
        self.server.connected.store(false, Ordering::SeqCst);
        let _ = self.disconnect_tx.send(DisconnectEvent {
            device_id: self.id.clone(),
        });
    }
}

#[async_trait]
impl BleDevice for FakeDevice {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    async fn connect_gatt(&self) -> Result<Arc<dyn GattServer>> {
        if self.fail_gatt.load(Ordering::SeqCst) {
            return Err(Error::ConnectionFailed {
                reason: "GATT unreachable".to_string(),
            });
        }
        self.server.connected.store(true, Ordering::SeqCst);
        Ok(self.server.clone() as Arc<dyn GattServer>)
    }

    fn disconnect_events(&self) -> broadcast::Receiver<DisconnectEvent> {
        self.disconnect_tx.subscribe()
    }
}

pub struct FakeServer {
    pub connected: AtomicBool,
    services: Vec<Arc<FakeService>>,
    pub disconnect_calls: AtomicUsize,
    pub fail_disconnect: AtomicBool,
}

impl FakeServer {
    pub fn is_up(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GattServer for FakeServer {
    async fn is_connected(&self) -> bool {
        self.is_up()
    }

    async fn primary_service(&self, uuid: Uuid) -> Result<Arc<dyn GattService>> {
        self.services
            .iter()
            .find(|s| s.uuid == uuid)
            .map(|s| s.clone() as Arc<dyn GattService>)
            .ok_or_else(|| Error::ServiceNotFound {
                uuid: uuid.to_string(),
            })
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(Error::Bluetooth(btleplug::Error::PermissionDenied));
        }
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeService {
    uuid: Uuid,
    characteristics: Vec<Arc<FakeCharacteristic>>,
}

#[async_trait]
impl GattService for FakeService {
    fn uuid(&self) -> Uuid {
        self.uuid
    }

    async fn characteristic(&self, uuid: Uuid) -> Result<Arc<dyn GattCharacteristic>> {
        self.characteristics
            .iter()
            .find(|c| c.uuid == uuid)
            .map(|c| c.clone() as Arc<dyn GattCharacteristic>)
            .ok_or_else(|| Error::CharacteristicNotFound {
                uuid: uuid.to_string(),
            })
    }
}

pub struct FakeCharacteristic {
    uuid: Uuid,
    pub writes: Mutex<Vec<Vec<u8>>>,
    pub fail_writes: AtomicBool,
}

impl FakeCharacteristic {
    fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            writes: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl GattCharacteristic for FakeCharacteristic {
    fn uuid(&self) -> Uuid {
        self.uuid
    }

    async fn write_value(&self, data: &[u8]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Bluetooth(btleplug::Error::NotConnected));
        }
        self.writes.lock().push(data.to_vec());
        Ok(())
    }
}

/// Poll until `condition` holds, giving spawned tasks a chance to run.
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
