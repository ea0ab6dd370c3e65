use std::sync::Arc;

use mado_types::HttpRequest;
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::ops::Host;
use crate::resource::{HTTP_CLIENT, HTTP_RESPONSE, Resource};
use crate::Result;

/// Host-side HTTP client.
#[derive(Debug)]
pub struct HttpClient {
    resource: Resource,
}

impl HttpClient {
    /// Opens a new client in the host.
    pub fn new(host: Arc<dyn Host>) -> Self {
        let rid = host.http_client_new();
        Self {
            resource: Resource::new(host, rid, &HTTP_CLIENT),
        }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        self.resource.host()
    }

    /// Issues exactly one request through the host.
    #[tracing::instrument(skip_all, fields(client = self.resource.rid(), url = %request.url))]
    pub async fn get(&self, request: HttpRequest) -> Result<HttpResponse> {
        let host = self.host();
        let response = host
            .http_client_get(self.resource.rid(), request)
            .await
            .bind(host)?;

        tracing::debug!(status = response.status, "received response");

        Ok(HttpResponse {
            status: response.status,
            url: response.url,
            body: Resource::new(host.clone(), response.rid, &HTTP_RESPONSE),
        })
    }

    /// New handle to the same host client.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            resource: self.resource.try_clone()?,
        })
    }

    pub fn close(&self) -> Result<()> {
        self.resource.close()
    }
}

/// Response whose body is kept by the host until [`HttpResponse::close`].
#[derive(Debug)]
pub struct HttpResponse {
    status: u16,
    url: String,
    body: Resource,
}

impl HttpResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Final URL after redirects.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> &Resource {
        &self.body
    }

    /// Returns whether the response status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fails with a `RequestError` when the status is not 2xx. The body is
    /// released in that case.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let error = Error::request_error(
            self.body.host(),
            &self.url,
            &format!("HTTP request failed with status {}", self.status),
        );
        if let Err(close) = self.close() {
            tracing::warn!("failed to release response body: {close}");
            close.release();
        }

        Err(error)
    }

    /// Reads the body as text. Every call goes back to the host.
    pub async fn text(&self) -> Result<String> {
        let host = self.body.host();
        host.http_response_text(self.body.rid()).await.bind(host)
    }

    /// Reads the body and parses it as JSON.
    ///
    /// A body that is not valid JSON is an `UnexpectedError`, distinct from
    /// whatever [`HttpResponse::text`] may fail with.
    pub async fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let text = self.text().await?;

        serde_json::from_str(&text).map_err(|e| {
            Error::unexpected_error(self.body.host(), &self.url, &format!("invalid json: {e}"))
        })
    }

    pub fn close(&self) -> Result<()> {
        self.body.close()
    }
}
