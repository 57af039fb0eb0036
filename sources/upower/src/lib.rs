//! Battery status from the UPower system daemon.
//!
//! Reads the aggregate `DisplayDevice` over the system D-Bus on every poll.

pub mod device;
pub mod error;

pub use device::{DeviceProperties, DeviceState};
pub use error::UPowerError;

use async_trait::async_trait;
use tracing::debug;
use xbattbar_rs_core::{BarError, PowerStatus, StatusSource};
use zbus::{proxy, CacheProperties, Connection};

const NAME: &str = "upower";

#[proxy(
    interface = "org.freedesktop.UPower.Device",
    default_service = "org.freedesktop.UPower",
    default_path = "/org/freedesktop/UPower/devices/DisplayDevice"
)]
trait Device {
    #[zbus(property)]
    fn energy(&self) -> zbus::Result<f64>;

    #[zbus(property)]
    fn energy_full(&self) -> zbus::Result<f64>;

    #[zbus(property)]
    fn state(&self) -> zbus::Result<u32>;

    #[zbus(property)]
    fn time_to_full(&self) -> zbus::Result<i64>;

    #[zbus(property)]
    fn time_to_empty(&self) -> zbus::Result<i64>;
}

/// [`StatusSource`] backed by UPower.
#[derive(Default)]
pub struct UPowerSource {
    proxy: Option<DeviceProxy<'static>>,
}

impl UPowerSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn connect() -> error::Result<DeviceProxy<'static>> {
        let conn = Connection::system().await.map_err(UPowerError::Connection)?;
        DeviceProxy::builder(&conn)
            .cache_properties(CacheProperties::No)
            .build()
            .await
            .map_err(UPowerError::Connection)
    }

    async fn read_properties(&self) -> error::Result<DeviceProperties> {
        let proxy = self.proxy.as_ref().ok_or(UPowerError::NotInitialized)?;
        Ok(DeviceProperties {
            energy: proxy
                .energy()
                .await
                .map_err(|e| UPowerError::property("Energy", e))?,
            energy_full: proxy
                .energy_full()
                .await
                .map_err(|e| UPowerError::property("EnergyFull", e))?,
            state: proxy
                .state()
                .await
                .map_err(|e| UPowerError::property("State", e))?
                .into(),
            time_to_full: proxy
                .time_to_full()
                .await
                .map_err(|e| UPowerError::property("TimeToFull", e))?,
            time_to_empty: proxy
                .time_to_empty()
                .await
                .map_err(|e| UPowerError::property("TimeToEmpty", e))?,
        })
    }
}

#[async_trait]
impl StatusSource for UPowerSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn init(&mut self, args: &str) -> xbattbar_rs_core::Result<()> {
        if !args.is_empty() {
            return Err(BarError::config_with_value(
                "The upower checker takes no arguments",
                args,
            ));
        }
        let proxy = Self::connect()
            .await
            .map_err(|e| BarError::backend_init_with_source(NAME, "cannot reach UPower", e))?;
        debug!("connected to UPower DisplayDevice");
        self.proxy = Some(proxy);
        Ok(())
    }

    async fn check(&mut self) -> xbattbar_rs_core::Result<PowerStatus> {
        self.read_properties()
            .await
            .and_then(|props| props.to_status())
            .map_err(|e| BarError::backend_poll_with_source(NAME, e.to_string(), e))
    }

    async fn stop(&mut self) {
        self.proxy = None;
    }
}
