use async_trait::async_trait;
use mado_types::HttpRequest;

use crate::error::{Error, Result};

/// A fully read HTTP response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponseData {
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
    pub body: Vec<u8>,
}

impl HttpResponseData {
    /// Body as UTF-8 text. Bodies that are not valid UTF-8 are rejected
    /// rather than patched with replacement characters.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.clone())
            .map_err(|e| Error::unexpected(&self.url, format!("response body is not valid UTF-8: {e}")))
    }
}

#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponseData>;
}
