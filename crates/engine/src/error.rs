use mado_extension::{ErrorKind, Rid};

use crate::browser::BrowserError;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the host while serving an op.
///
/// The `Display` form is what modules receive from `error_to_string`, the
/// derived `Debug` form is what they receive from `error_to_debug`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{url} is invalid")]
    InvalidUrl { url: String },

    /// The request could not be completed, or the site refused it.
    #[error("Request error from {url}: {message}")]
    RequestError { url: String, message: String },

    /// The site answered with something the module could not use.
    #[error("Unexpected response from {url}: {message}")]
    UnexpectedError { url: String, message: String },

    /// Unknown, closed or mistyped resource handle.
    #[error("Bad resource ID ({message}): {rid}")]
    ResourceError { rid: Rid, message: String },

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("{0}")]
    External(String),
}

impl Error {
    pub fn request(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RequestError {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn unexpected(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnexpectedError {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn resource(rid: Rid, message: impl Into<String>) -> Self {
        Self::ResourceError {
            rid,
            message: message.into(),
        }
    }

    /// Kind reported to modules alongside the stored record.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Self::RequestError { .. } | Self::Browser(_) => ErrorKind::RequestError,
            Self::UnexpectedError { .. } => ErrorKind::UnexpectedError,
            Self::ResourceError { .. } => ErrorKind::ResourceError,
            Self::External(_) => ErrorKind::Custom,
        }
    }
}
