//! Common error types for the workshop publisher

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by shared infrastructure (configuration, environment)
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

impl Error {
    /// Get the error code for logs and caller diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "CONFIGURATION_ERROR",
            Error::InvalidValue { .. } => "INVALID_VALUE",
        }
    }
}
