use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;

use crate::ops::{ErrorJson, ErrorKind, Host, Rid};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error record produced at the op boundary.
///
/// The record itself is only a handle: rendering is always delegated to the
/// host so every kind is formatted the same way, and a host-stored record keeps
/// its host-side entry alive until [`Error::close`] is called.
pub struct Error {
    json: ErrorJson,
    host: Arc<dyn Host>,
    backtrace: Backtrace,
}

impl Error {
    pub fn new(host: Arc<dyn Host>, json: ErrorJson) -> Self {
        Self {
            json,
            host,
            backtrace: Backtrace::capture(),
        }
    }

    pub fn request_error(host: &Arc<dyn Host>, url: &str, message: &str) -> Self {
        let json = host.error_request_error(url, message);
        Self::new(host.clone(), json)
    }

    pub fn unexpected_error(host: &Arc<dyn Host>, url: &str, message: &str) -> Self {
        let json = host.error_unexpected_error(url, message);
        Self::new(host.clone(), json)
    }

    pub fn invalid_url(host: &Arc<dyn Host>, url: &str) -> Self {
        let json = host.error_invalid_url(url);
        Self::new(host.clone(), json)
    }

    /// A module-side error carrying only a message.
    pub fn message(host: &Arc<dyn Host>, message: impl Into<String>) -> Self {
        Self::new(host.clone(), ErrorJson::custom(message))
    }

    /// Normalizes any failure caught at a module boundary.
    ///
    /// A report that already wraps an [`Error`] gives that record back
    /// untouched; everything else becomes a `Custom` record holding the report
    /// and its cause chain.
    pub fn from_catch(host: &Arc<dyn Host>, report: eyre::Report) -> Self {
        match report.downcast::<Error>() {
            Ok(error) => error,
            Err(report) => Self::message(host, format!("{report:#}")),
        }
    }

    /// Converts a panic payload into a `Custom` record.
    pub fn from_panic(host: &Arc<dyn Host>, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        Self::message(host, format!("module panicked: {message}"))
    }

    pub fn kind(&self) -> ErrorKind {
        self.json.kind()
    }

    pub fn json(&self) -> &ErrorJson {
        &self.json
    }

    /// Host-side id of the record, if it lives in the host table.
    pub fn rid(&self) -> Option<Rid> {
        match self.json {
            ErrorJson::Resource { rid, .. } => Some(rid),
            ErrorJson::Custom { .. } => None,
        }
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Host-rendered message. Repeatable, no side effects.
    pub fn into_string(&self) -> String {
        self.host.error_to_string(&self.json)
    }

    /// Host-rendered debug view. Repeatable, no side effects.
    pub fn into_debug(&self) -> String {
        self.host.error_to_debug(&self.json)
    }

    /// Releases the host-side record. Closing twice is reported by the host.
    pub fn close(&self) -> Result<()> {
        self.host.error_close(&self.json).bind(&self.host)
    }

    /// Closes a record that is being discarded. A failed close is logged and
    /// its own record released as well.
    pub fn release(&self) {
        if let Err(failed) = self.close() {
            tracing::warn!(kind = %failed.kind(), "failed to release error record: {failed}");
            if failed.close().is_err() {
                tracing::warn!("giving up on releasing error record");
            }
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind())
            .field("json", &self.json)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.into_string())
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.json == other.json
    }
}
