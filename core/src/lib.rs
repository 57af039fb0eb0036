//! # xbattbar-rs-core
//!
//! Core library for xbattbar-rs, a thin always-on-top screen-edge bar that
//! shows battery charge as a colored fill.
//!
//! ## Features
//!
//! - **Perceptual color ramp** - charge level is mapped to color in Oklab
//! - **Pluggable status sources** - [`StatusSource`] trait with backends in
//!   sibling crates (UPower over D-Bus, HTTP-driven debug source)
//! - **Surface-agnostic rendering** - [`BarRenderer`] draws through the
//!   [`Surface`] trait, so it can be tested without a display
//! - **Single rendering task** - [`BarController`] serializes status updates
//!   and window events through one channel
//! - **Configuration management** - RON config file with validation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xbattbar_rs_core::{BarController, BarRenderer, GlobalConfig, Surface, UpdateLoop};
//! # async fn run<S: Surface + Send + 'static>(
//! #     surface: S,
//! #     geometry: xbattbar_rs_core::BarGeometry,
//! #     source: Box<dyn xbattbar_rs_core::StatusSource>,
//! # ) -> xbattbar_rs_core::Result<()> {
//! let config = GlobalConfig::load()?;
//! let selector = config.selector()?;
//!
//! let (events_tx, events_rx) = tokio::sync::mpsc::channel(16);
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let renderer = BarRenderer::new(geometry, config.palette.clone());
//! tokio::spawn(BarController::new(renderer, surface).run(events_rx));
//!
//! UpdateLoop::new(source, selector.args, config.update_interval_duration(), events_tx, shutdown_rx)
//!     .run()
//!     .await
//! # }
//! ```

pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod layout;
pub mod popup;
pub mod render;
pub mod status;
pub mod update;

pub use color::{LinearRgb, Oklab, PackedColor, Srgb};
pub use config::GlobalConfig;
pub use controller::{BarController, BarEvent, RenderState, WindowEvent};
pub use error::{BarError, Result};
pub use layout::{BarGeometry, Orientation, Rect, ScreenEdge};
pub use popup::{PopupController, PopupState};
pub use render::{BarColors, BarRenderer, Palette, Surface, Target, TextExtents};
pub use status::{PowerStatus, SourceKind, SourceSelector, StatusSource};
pub use update::UpdateLoop;
