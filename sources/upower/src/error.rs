//! Error handling for the UPower backend.

use thiserror::Error;

/// Result type for UPower operations
pub type Result<T> = std::result::Result<T, UPowerError>;

#[derive(Error, Debug)]
pub enum UPowerError {
    /// Could not reach the system bus
    #[error("Failed to connect to the system bus: {0}")]
    Connection(#[source] zbus::Error),

    /// A property read failed or had the wrong type
    #[error("Failed to read UPower property {name}: {source}")]
    Property {
        name: &'static str,
        #[source]
        source: zbus::Error,
    },

    /// `EnergyFull` was zero, negative or NaN
    #[error("Invalid battery capacity: EnergyFull = {energy_full}")]
    InvalidCapacity { energy_full: f64 },

    /// `check` was called before a successful `init`
    #[error("UPower source is not initialized")]
    NotInitialized,
}

impl UPowerError {
    pub fn property(name: &'static str, source: zbus::Error) -> Self {
        Self::Property { name, source }
    }
}
