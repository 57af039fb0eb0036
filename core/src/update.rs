//! Timer-driven status polling.

use crate::controller::BarEvent;
use crate::error::Result;
use crate::status::StatusSource;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Polls a [`StatusSource`] at a fixed interval and publishes each result.
///
/// A failed poll is logged and published as `None`; the loop keeps going.
/// It stops when the shutdown flag flips, when the shutdown sender is dropped,
/// or when the rendering side hangs up.
pub struct UpdateLoop {
    source: Box<dyn StatusSource>,
    args: String,
    interval: Duration,
    events: mpsc::Sender<BarEvent>,
    shutdown: watch::Receiver<bool>,
}

impl UpdateLoop {
    #[must_use]
    pub fn new(
        source: Box<dyn StatusSource>,
        args: impl Into<String>,
        interval: Duration,
        events: mpsc::Sender<BarEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            source,
            args: args.into(),
            interval,
            events,
            shutdown,
        }
    }

    /// Initialize the source, then poll until shut down.
    ///
    /// # Errors
    ///
    /// Only initialization errors are returned; they are fatal for the bar.
    pub async fn run(mut self) -> Result<()> {
        self.source.init(&self.args).await?;
        info!(
            backend = self.source.name(),
            interval_ms = self.interval.as_millis() as u64,
            "status source ready"
        );

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let result = tokio::select! {
                result = self.source.check() => result,
                _ = self.shutdown.changed() => break,
            };

            let status = match result {
                Ok(status) => {
                    debug!(
                        level = status.charge_level,
                        charging = status.charging,
                        time_left = ?status.time_remaining(),
                        "polled battery status"
                    );
                    Some(status)
                }
                Err(e) => {
                    warn!("Failed to check battery level: {}", e);
                    None
                }
            };

            if self.events.send(BarEvent::Status(status)).await.is_err() {
                debug!("renderer gone, stopping update loop");
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.changed() => break,
            }
        }

        self.source.stop().await;
        info!(backend = self.source.name(), "status source stopped");
        Ok(())
    }
}
