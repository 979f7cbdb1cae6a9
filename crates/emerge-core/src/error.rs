//! Error types shared by the extraction crates.

use thiserror::Error;

/// Result type alias using emerge's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A required identity field was empty when building a result.
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    /// A language parser was wired without one of its mandatory pieces.
    #[error("missing configuration: {what}")]
    MissingConfiguration { what: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("file result already registered: {unique_key}")]
    DuplicateFile { unique_key: String },

    #[error("unknown file result handle: {0}")]
    UnknownFile(usize),

    #[error("unknown entity result handle: {0}")]
    UnknownEntity(usize),
}

impl Error {
    pub fn missing_configuration(what: impl Into<String>) -> Self {
        Self::MissingConfiguration { what: what.into() }
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Whether this error comes from language wiring rather than from the data.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingConfiguration { .. } | Self::InvalidConfiguration { .. }
        )
    }
}
