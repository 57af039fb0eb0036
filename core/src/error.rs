//! Error type shared by every part of the bar.

/// Result type for bar operations
pub type Result<T> = std::result::Result<T, BarError>;

/// Common error types for the bar.
///
/// Only [`BarError::BackendInit`] and [`BarError::Config`] are fatal; poll and
/// draw failures are contained by the task that hit them.
#[derive(Debug, thiserror::Error)]
pub enum BarError {
    /// The status source could not be brought up.
    #[error("Failed to initialize {backend} backend: {message}")]
    BackendInit {
        /// Backend name as given in the selector
        backend: String,
        /// What went wrong
        message: String,
        /// Optional source error for chaining
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A single status poll failed.
    #[error("Failed to poll {backend} backend: {message}")]
    BackendPoll {
        /// Backend name as given in the selector
        backend: String,
        /// What went wrong
        message: String,
        /// Optional source error for chaining
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The drawing surface rejected a request.
    #[error("Draw error: {message}")]
    Draw {
        /// Description of the failed operation
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error (invalid settings, unknown backend, etc.).
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration issue
        message: String,
        /// The invalid configuration value if applicable
        value: Option<String>,
    },

    /// I/O error while reading or writing configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing configuration text.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of what failed to parse
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl BarError {
    /// Create a backend initialization error.
    pub fn backend_init<B: Into<String>, S: Into<String>>(backend: B, message: S) -> Self {
        Self::BackendInit {
            backend: backend.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a backend initialization error with a source error.
    pub fn backend_init_with_source<B, S, E>(backend: B, message: S, source: E) -> Self
    where
        B: Into<String>,
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::BackendInit {
            backend: backend.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a poll error.
    pub fn backend_poll<B: Into<String>, S: Into<String>>(backend: B, message: S) -> Self {
        Self::BackendPoll {
            backend: backend.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a poll error with a source error.
    pub fn backend_poll_with_source<B, S, E>(backend: B, message: S, source: E) -> Self
    where
        B: Into<String>,
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::BackendPoll {
            backend: backend.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a draw error.
    pub fn draw<S: Into<String>>(message: S) -> Self {
        Self::Draw {
            message: message.into(),
            source: None,
        }
    }

    /// Create a draw error with a source error.
    pub fn draw_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Draw {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            value: None,
        }
    }

    /// Create a new configuration error with the invalid value.
    pub fn config_with_value<S: Into<String>, V: Into<String>>(message: S, value: V) -> Self {
        Self::Config {
            message: message.into(),
            value: Some(value.into()),
        }
    }

    /// Create a new parse error with a source error.
    pub fn parse_with_source<S: Into<String>, E>(message: S, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Parse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the process cannot continue after this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::BackendInit { .. } | Self::Config { .. })
    }
}
