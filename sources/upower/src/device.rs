//! UPower device properties and their mapping to [`PowerStatus`].

use crate::error::{Result, UPowerError};
use xbattbar_rs_core::PowerStatus;

/// UPower device state codes.
/// See: https://upower.freedesktop.org/docs/Device.html#Device:state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Unknown,
    Charging,
    Discharging,
    Empty,
    FullyCharged,
    PendingCharge,
    PendingDischarge,
}

impl From<u32> for DeviceState {
    fn from(code: u32) -> Self {
        match code {
            1 => Self::Charging,
            2 => Self::Discharging,
            3 => Self::Empty,
            4 => Self::FullyCharged,
            5 => Self::PendingCharge,
            6 => Self::PendingDischarge,
            _ => Self::Unknown,
        }
    }
}

/// The subset of `org.freedesktop.UPower.Device` properties the bar reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProperties {
    /// Current energy in Wh
    pub energy: f64,
    /// Energy when full in Wh
    pub energy_full: f64,
    pub state: DeviceState,
    /// Seconds until full, 0 if unknown
    pub time_to_full: i64,
    /// Seconds until empty, 0 if unknown
    pub time_to_empty: i64,
}

impl DeviceProperties {
    /// Reduce the device properties to a [`PowerStatus`].
    ///
    /// Pending states are ambiguous, so they keep a best-guess charging flag
    /// and report no time estimate.
    ///
    /// # Errors
    ///
    /// Returns [`UPowerError::InvalidCapacity`] when `EnergyFull` is not a
    /// positive number.
    pub fn to_status(&self) -> Result<PowerStatus> {
        if self.energy_full.is_nan() || self.energy_full <= 0.0 {
            return Err(UPowerError::InvalidCapacity {
                energy_full: self.energy_full,
            });
        }

        let (charging, time_remaining) = match self.state {
            DeviceState::FullyCharged | DeviceState::Empty => (false, 0.0),
            DeviceState::Charging => (true, self.time_to_full as f32),
            DeviceState::Discharging => (false, self.time_to_empty as f32),
            DeviceState::PendingCharge => (true, f32::NAN),
            DeviceState::PendingDischarge | DeviceState::Unknown => (false, f32::NAN),
        };

        Ok(PowerStatus::new(
            (self.energy / self.energy_full) as f32,
            time_remaining,
            charging,
        ))
    }
}
