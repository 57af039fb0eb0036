//! Error handling for the debug source.

use thiserror::Error;

/// Result type for debug source operations
pub type Result<T> = std::result::Result<T, DebugError>;

#[derive(Error, Debug)]
pub enum DebugError {
    /// The control endpoint could not listen on the requested address
    #[error("Failed to listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

impl DebugError {
    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }
}
