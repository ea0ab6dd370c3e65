use std::time::Duration;

use async_trait::async_trait;
use mado_types::HttpRequest;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::{HttpExecutor, HttpResponseData};
use crate::config::EngineConfig;
use crate::error::{Error, Result};

pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl Default for ReqwestExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestExecutor {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }

        let client = builder
            .build()
            .map_err(|e| Error::External(format!("failed to build http client: {e}")))?;

        Ok(Self { client })
    }
}

fn header_map(request: &HttpRequest) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (key, value) in request.header.iter().flatten() {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| Error::request(&request.url, format!("bad header name {key}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::request(&request.url, format!("bad header value for {key}: {e}")))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    #[tracing::instrument(skip_all, fields(url = %request.url))]
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponseData> {
        let url = url::Url::parse(&request.url).map_err(|_| Error::InvalidUrl {
            url: request.url.clone(),
        })?;

        let response = self
            .client
            .get(url)
            .headers(header_map(&request)?)
            .send()
            .await
            .map_err(|e| Error::request(&request.url, e.to_string()))?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        tracing::debug!(status, "response received");

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::request(&url, e.to_string()))?
            .to_vec();

        Ok(HttpResponseData { status, url, body })
    }
}
