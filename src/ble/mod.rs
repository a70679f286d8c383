//! BLE communication module.
//!
//! This module provides the host capability abstraction, its `btleplug`
//! implementation, and the connection manager for the cue peripheral.

pub mod btleplug_host;
pub mod connection;
pub mod host;
pub mod uuids;

pub use btleplug_host::BtleplugHost;
pub use connection::{ConnectionConfig, ConnectionManager, ConnectionState, StateCallback};
pub use host::{
    BleDevice, BleHost, DeviceRequest, DisconnectEvent, GattCharacteristic, GattServer,
    GattService,
};
pub use uuids::*;
