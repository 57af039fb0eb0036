//! Battery status values and the pluggable sources that produce them.

use crate::error::{BarError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// One battery reading. Produced fresh on every poll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerStatus {
    /// Fraction of capacity remaining, 0 (empty) to 1 (full)
    pub charge_level: f32,
    /// Seconds until full or empty, NaN if unknown
    pub time_remaining: f32,
    pub charging: bool,
}

impl PowerStatus {
    #[must_use]
    pub fn new(charge_level: f32, time_remaining: f32, charging: bool) -> Self {
        Self {
            charge_level,
            time_remaining,
            charging,
        }
    }

    /// A reading with no time estimate.
    #[must_use]
    pub fn without_estimate(charge_level: f32, charging: bool) -> Self {
        Self::new(charge_level, f32::NAN, charging)
    }

    /// Charge level clamped to [0,1]; sources may report slightly outside it.
    #[must_use]
    pub fn clamped_level(&self) -> f32 {
        if self.charge_level.is_nan() {
            return 0.0;
        }
        self.charge_level.clamp(0.0, 1.0)
    }

    /// Rounded charge percentage, 0 to 100.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        (self.clamped_level() * 100.0).round() as u8
    }

    /// Time remaining, if the source knows it and it fits in a [`Duration`].
    ///
    /// [`Duration`]: std::time::Duration
    #[must_use]
    pub fn time_remaining(&self) -> Option<std::time::Duration> {
        std::time::Duration::try_from_secs_f32(self.time_remaining).ok()
    }
}

impl Default for PowerStatus {
    fn default() -> Self {
        Self::without_estimate(0.0, false)
    }
}

/// Capability to report the current battery status.
///
/// Calls are made one at a time from the update loop; `check` is awaited to
/// completion before the next poll is scheduled.
#[async_trait]
pub trait StatusSource: Send {
    /// Short backend name used in logs and errors.
    fn name(&self) -> &str;

    /// Connect to the backing service or start listening.
    ///
    /// `args` is the part of the selector after the `:`, empty if absent.
    ///
    /// # Errors
    ///
    /// Returns [`BarError::BackendInit`] if the backend is unavailable.
    async fn init(&mut self, args: &str) -> Result<()>;

    /// Poll the current status.
    ///
    /// # Errors
    ///
    /// Returns [`BarError::BackendPoll`] on transport failure or malformed data.
    async fn check(&mut self) -> Result<PowerStatus>;

    /// Release backend resources. Calling it twice is harmless.
    async fn stop(&mut self) {}
}

/// Known status backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceKind {
    /// System power daemon over D-Bus
    #[default]
    UPower,
    /// In-process values set through an HTTP control endpoint
    Debug,
}

impl SourceKind {
    pub const ALL: &'static [SourceKind] = &[SourceKind::UPower, SourceKind::Debug];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UPower => "upower",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = BarError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(|k| k.as_str()).collect();
                BarError::config_with_value(
                    format!("Unknown checker '{s}'. Valid options: {}", valid.join(", ")),
                    s,
                )
            })
    }
}

/// Parsed `name` or `name:args` backend selector.
///
/// # Examples
///
/// ```rust
/// use xbattbar_rs_core::{SourceKind, SourceSelector};
///
/// let selector: SourceSelector = "debug:127.0.0.1:9000".parse().unwrap();
/// assert_eq!(selector.kind, SourceKind::Debug);
/// assert_eq!(selector.args, "127.0.0.1:9000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceSelector {
    pub kind: SourceKind,
    pub args: String,
}

impl FromStr for SourceSelector {
    type Err = BarError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (name, args) = s.split_once(':').unwrap_or((s, ""));
        Ok(Self {
            kind: name.trim().parse()?,
            args: args.to_owned(),
        })
    }
}

impl fmt::Display for SourceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}:{}", self.kind, self.args)
        }
    }
}
