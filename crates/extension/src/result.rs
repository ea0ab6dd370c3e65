//! Combinators on top of `Result<T, Error>`.
//!
//! `map`, `unwrap_or` and `unwrap_or_else` come from std and already behave as
//! required: the error side passes through untouched and the closure never runs
//! on it. This module adds the two throw modes, the cheap existence check and the
//! catch-all adapter used at module boundaries.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::error::Error;
use crate::ops::Host;

pub trait ResultExt<T>: Sized {
    fn is_error(&self) -> bool;

    /// Returns the payload, or raises the error record itself.
    ///
    /// The record can be recovered from the report with
    /// `report.downcast::<Error>()`.
    fn throw(self) -> eyre::Result<T>;

    /// Returns the payload, or raises the host debug view followed by the
    /// captured backtrace. The error's host record is released before raising.
    fn throw_debug(self) -> eyre::Result<T>;

    /// `Some(self)` when ok, `None` when the result holds an error.
    fn ok_or_null(&self) -> Option<&Self>;
}

impl<T> ResultExt<T> for Result<T, Error> {
    fn is_error(&self) -> bool {
        self.is_err()
    }

    fn throw(self) -> eyre::Result<T> {
        self.map_err(eyre::Report::new)
    }

    fn throw_debug(self) -> eyre::Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(error) => {
                let message = format!("{}\n{}", error.into_debug(), error.backtrace());

                error.release();

                Err(eyre::Report::msg(message))
            }
        }
    }

    fn ok_or_null(&self) -> Option<&Self> {
        match self {
            Ok(_) => Some(self),
            Err(_) => None,
        }
    }
}

/// Runs `future` and folds every way it can fail into an [`Error`].
///
/// Reports wrapping an [`Error`] keep their record, other reports become
/// `Custom`, and a panic inside the future is caught and becomes `Custom` too.
pub async fn catch_and_return<T, F>(host: &Arc<dyn Host>, future: F) -> Result<T, Error>
where
    F: Future<Output = eyre::Result<T>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(report)) => Err(Error::from_catch(host, report)),
        Err(payload) => Err(Error::from_panic(host, payload)),
    }
}
