//! The op boundary between modules and the host runtime.
//!
//! Every host primitive a module can reach is a method on [`Host`]. Arguments and
//! return values are plain serializable data; anything the host owns (clients,
//! responses, tabs, errors) crosses the boundary as a numeric [`Rid`]. Failures
//! come back as [`ResultJson::Err`] carrying an [`ErrorJson`] that must be bound to
//! the host before use, see [`ResultJson::bind`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use mado_types::{ChapterImageInfo, HttpRequest};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Resource id handed out by the host.
pub type Rid = u32;

/// Wire form of a host result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
pub enum ResultJson<T> {
    Ok(T),
    Err(ErrorJson),
}

impl<T> ResultJson<T> {
    /// Attaches the host to the error side, turning the wire value into a
    /// regular [`Result`].
    pub fn bind(self, host: &Arc<dyn Host>) -> crate::Result<T> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Err(json) => Err(Error::new(host.clone(), json)),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

impl<T> From<Result<T, ErrorJson>> for ResultJson<T> {
    fn from(value: Result<T, ErrorJson>) -> Self {
        match value {
            Ok(value) => Self::Ok(value),
            Err(error) => Self::Err(error),
        }
    }
}

impl<T> From<ResultJson<T>> for Result<T, ErrorJson> {
    fn from(value: ResultJson<T>) -> Self {
        match value {
            ResultJson::Ok(value) => Ok(value),
            ResultJson::Err(error) => Err(error),
        }
    }
}

/// Discriminant of an error record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Network or HTTP level failure.
    RequestError,
    /// The site answered, but not in the expected shape.
    UnexpectedError,
    /// The identifier did not match the module's pattern.
    InvalidUrl,
    /// A handle was unknown to the host or already closed.
    ResourceError,
    /// Anything else, usually a foreign failure caught at a module boundary.
    Custom,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RequestError => "RequestError",
            Self::UnexpectedError => "UnexpectedError",
            Self::InvalidUrl => "InvalidUrl",
            Self::ResourceError => "ResourceError",
            Self::Custom => "Custom",
        };
        f.write_str(name)
    }
}

/// Wire form of an error record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
pub enum ErrorJson {
    /// Error stored in the host table.
    Resource { rid: Rid, kind: ErrorKind },
    /// Error that only exists on the module side.
    Custom { message: String },
}

impl ErrorJson {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Resource { kind, .. } => *kind,
            Self::Custom { .. } => ErrorKind::Custom,
        }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }

    fn unsupported(op: &str) -> Self {
        Self::custom(format!("{op} is not supported by this host"))
    }
}

/// Response metadata returned by `http_client_get`. The body stays in the host
/// under `rid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseJson {
    pub status: u16,
    pub url: String,
    pub rid: Rid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRequest {
    pub url: String,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl TabRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Operations exposed by the host runtime.
///
/// Resource close ops are synchronous so that they can run from `Drop`.
/// Browser and chapter task ops are optional; the default bodies report them as
/// unsupported.
#[async_trait]
pub trait Host: Send + Sync {
    fn http_client_new(&self) -> Rid;
    fn http_client_clone(&self, rid: Rid) -> ResultJson<Rid>;
    fn http_client_close(&self, rid: Rid) -> ResultJson<()>;
    async fn http_client_get(&self, rid: Rid, request: HttpRequest) -> ResultJson<ResponseJson>;

    async fn http_response_text(&self, rid: Rid) -> ResultJson<String>;
    fn http_response_clone(&self, rid: Rid) -> ResultJson<Rid>;
    fn http_response_close(&self, rid: Rid) -> ResultJson<()>;

    fn error_request_error(&self, url: &str, message: &str) -> ErrorJson;
    fn error_unexpected_error(&self, url: &str, message: &str) -> ErrorJson;
    fn error_invalid_url(&self, url: &str) -> ErrorJson;
    fn error_to_string(&self, error: &ErrorJson) -> String;
    fn error_to_debug(&self, error: &ErrorJson) -> String;
    fn error_close(&self, error: &ErrorJson) -> ResultJson<()>;

    async fn browser_new_tab(&self, _config: BrowserConfig) -> ResultJson<Rid> {
        ResultJson::Err(ErrorJson::unsupported("browser_new_tab"))
    }

    fn tab_clone(&self, _rid: Rid) -> ResultJson<Rid> {
        ResultJson::Err(ErrorJson::unsupported("tab_clone"))
    }

    fn tab_close(&self, _rid: Rid) -> ResultJson<()> {
        ResultJson::Err(ErrorJson::unsupported("tab_close"))
    }

    async fn tab_goto(&self, _rid: Rid, _request: TabRequest) -> ResultJson<()> {
        ResultJson::Err(ErrorJson::unsupported("tab_goto"))
    }

    async fn tab_wait_for_navigation(&self, _rid: Rid) -> ResultJson<()> {
        ResultJson::Err(ErrorJson::unsupported("tab_wait_for_navigation"))
    }

    async fn tab_content(&self, _rid: Rid) -> ResultJson<String> {
        ResultJson::Err(ErrorJson::unsupported("tab_content"))
    }

    async fn tab_url(&self, _rid: Rid) -> ResultJson<String> {
        ResultJson::Err(ErrorJson::unsupported("tab_url"))
    }

    async fn tab_wait_for_element(&self, _rid: Rid, _selector: String) -> ResultJson<()> {
        ResultJson::Err(ErrorJson::unsupported("tab_wait_for_element"))
    }

    async fn tab_wait_for_element_by_xpath(&self, _rid: Rid, _xpath: String) -> ResultJson<()> {
        ResultJson::Err(ErrorJson::unsupported("tab_wait_for_element_by_xpath"))
    }

    async fn tab_click(&self, _rid: Rid, _selector: String) -> ResultJson<()> {
        ResultJson::Err(ErrorJson::unsupported("tab_click"))
    }

    async fn tab_evaluate(&self, _rid: Rid, _script: String) -> ResultJson<serde_json::Value> {
        ResultJson::Err(ErrorJson::unsupported("tab_evaluate"))
    }

    async fn tab_reload(&self, _rid: Rid) -> ResultJson<()> {
        ResultJson::Err(ErrorJson::unsupported("tab_reload"))
    }

    async fn tab_reload_force(&self, _rid: Rid) -> ResultJson<()> {
        ResultJson::Err(ErrorJson::unsupported("tab_reload_force"))
    }

    fn chapter_task_new(&self) -> ResultJson<Rid> {
        ResultJson::Err(ErrorJson::unsupported("chapter_task_new"))
    }

    fn chapter_task_add(&self, _rid: Rid, _image: ChapterImageInfo) -> ResultJson<()> {
        ResultJson::Err(ErrorJson::unsupported("chapter_task_add"))
    }

    fn chapter_task_to_array(&self, _rid: Rid) -> ResultJson<Vec<ChapterImageInfo>> {
        ResultJson::Err(ErrorJson::unsupported("chapter_task_to_array"))
    }

    fn chapter_task_clone(&self, _rid: Rid) -> ResultJson<Rid> {
        ResultJson::Err(ErrorJson::unsupported("chapter_task_clone"))
    }

    fn chapter_task_close(&self, _rid: Rid) -> ResultJson<()> {
        ResultJson::Err(ErrorJson::unsupported("chapter_task_close"))
    }
}
