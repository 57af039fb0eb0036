//! Synthetic battery source for testing the bar.
//!
//! `init` starts an HTTP control endpoint; whatever was last set through it is
//! returned verbatim by `check`. The time estimate is always unknown.
//!
//! ```sh
//! xbattbar-rs --checker debug:127.0.0.1:7070 &
//! curl 'http://127.0.0.1:7070/?plug=0&level=150'
//! ```

pub mod control;
pub mod error;

pub use control::{apply_params, SharedStatus};
pub use error::DebugError;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};
use xbattbar_rs_core::{BarError, PowerStatus, StatusSource};

const NAME: &str = "debug";

/// Listen address used when the selector has no arguments.
pub const DEFAULT_ADDR: &str = "127.0.0.1:7070";

struct Server {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// [`StatusSource`] driven by HTTP requests.
pub struct DebugSource {
    status: SharedStatus,
    server: Option<Server>,
}

impl Default for DebugSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: Arc::new(Mutex::new(PowerStatus::default())),
            server: None,
        }
    }

    /// Address the control endpoint is bound to, once initialized.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().map(|server| server.addr)
    }

    /// Accept `host:port`, or `:port` for every interface.
    fn listen_addr(args: &str) -> String {
        match args {
            "" => DEFAULT_ADDR.to_owned(),
            port if port.starts_with(':') => format!("0.0.0.0{port}"),
            addr => addr.to_owned(),
        }
    }

    async fn start(&mut self, addr: &str) -> error::Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| DebugError::bind(addr, e))?;
        let local = listener.local_addr().map_err(|e| DebugError::bind(addr, e))?;

        let app = control::router(Arc::clone(&self.status));
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = served {
                error!("Debug control endpoint failed: {}", e);
            }
        });

        info!(addr = %local, "debug control endpoint listening");
        self.server = Some(Server {
            addr: local,
            shutdown,
            task,
        });
        Ok(())
    }
}

#[async_trait]
impl StatusSource for DebugSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn init(&mut self, args: &str) -> xbattbar_rs_core::Result<()> {
        self.stop().await;
        let addr = Self::listen_addr(args);
        self.start(&addr).await.map_err(|e| {
            BarError::backend_init_with_source(NAME, format!("cannot listen on {addr}"), e)
        })
    }

    async fn check(&mut self) -> xbattbar_rs_core::Result<PowerStatus> {
        Ok(*self.status.lock())
    }

    async fn stop(&mut self) {
        if let Some(server) = self.server.take() {
            let _ = server.shutdown.send(());
            if let Err(e) = server.task.await {
                error!("Debug control endpoint task failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_addr() {
        assert_eq!(DebugSource::listen_addr(""), DEFAULT_ADDR);
        assert_eq!(DebugSource::listen_addr(":8080"), "0.0.0.0:8080");
        assert_eq!(DebugSource::listen_addr("localhost:1"), "localhost:1");
    }

    #[tokio::test]
    async fn test_check_returns_last_set_values() {
        let mut source = DebugSource::new();
        let initial = source.check().await.unwrap();
        assert_eq!(initial.charge_level, 0.0);
        assert!(!initial.charging);
        assert!(initial.time_remaining.is_nan());

        source.status.lock().charge_level = 0.6;
        assert_eq!(source.check().await.unwrap().charge_level, 0.6);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let mut source = DebugSource::new();
        source.init("127.0.0.1:0").await.unwrap();
        assert!(source.local_addr().is_some());
        source.stop().await;
        source.stop().await;
        assert!(source.local_addr().is_none());
    }

    #[tokio::test]
    async fn test_bind_failure_is_init_error() {
        let mut first = DebugSource::new();
        first.init("127.0.0.1:0").await.unwrap();
        let taken = first.local_addr().unwrap().to_string();

        let mut second = DebugSource::new();
        let err = second.init(&taken).await.unwrap_err();
        assert!(matches!(err, BarError::BackendInit { .. }));
        first.stop().await;
    }
}
