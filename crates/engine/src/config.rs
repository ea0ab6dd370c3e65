use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";

/// Environment variable naming a running browser to connect to instead of
/// launching one.
pub const BROWSER_WS_ENV: &str = "CHROMIUM_WS_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub user_agent: String,
    /// Websocket URL of a remote browser. Takes precedence over launching.
    pub browser_ws_url: Option<String>,
    pub headless: bool,
    /// Request timeout, 0 disables it.
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            browser_ws_url: None,
            headless: true,
            timeout_secs: 30,
        }
    }
}

impl EngineConfig {
    /// Applies overrides from the process environment.
    pub fn with_env(mut self) -> Self {
        match std::env::var(BROWSER_WS_ENV) {
            Ok(ws_url) if !ws_url.is_empty() => self.browser_ws_url = Some(ws_url),
            _ => {}
        }
        self
    }
}
