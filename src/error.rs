//! Error types for the cue-remote-ble crate.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Bluetooth-related error from the underlying BLE library.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// The host exposes no Bluetooth Low Energy capability.
    #[error("Bluetooth Low Energy is not available in this environment")]
    UnsupportedEnvironment,

    /// Device selection was dismissed or produced no device.
    #[error("Device selection cancelled")]
    UserCancelled,

    /// Operation requires a connection but no characteristic is held.
    #[error("Not connected")]
    NotConnected,

    /// Failed to establish the GATT connection.
    #[error("Connection failed: {reason}")]
    ConnectionFailed {
        /// Description of why the connection failed.
        reason: String,
    },

    /// Service not found on the device.
    #[error("Service not found: {uuid}")]
    ServiceNotFound {
        /// The identifier of the service that was not found.
        uuid: String,
    },

    /// Characteristic not found on the device.
    #[error("Characteristic not found: {uuid}")]
    CharacteristicNotFound {
        /// The identifier of the characteristic that was not found.
        uuid: String,
    },

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter {
        /// The name of the parameter.
        name: String,
        /// The invalid value that was provided.
        value: String,
    },
}

impl Error {
    /// Check if this error belongs to the connection-failure category
    /// (GATT connect or service/characteristic lookup).
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::ServiceNotFound { .. }
                | Self::CharacteristicNotFound { .. }
        )
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
