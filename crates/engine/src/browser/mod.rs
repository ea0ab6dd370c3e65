//! Browser backends behind the tab ops.

mod chrome;

use std::sync::Arc;

use async_trait::async_trait;
use mado_extension::BrowserConfig;

pub use self::chrome::ChromeBrowser;

#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("Browser initialization failed: {0}")]
    Launch(String),

    #[error("Tab creation failed: {0}")]
    NewTab(String),

    #[error("Navigation error: {0}")]
    Navigate(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("failed to get content: {0}")]
    Content(String),

    #[error("JavaScript execution error: {0}")]
    Evaluate(String),

    #[error("browser task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait BrowserExecutor: Send + Sync {
    async fn new_tab(&self, config: &BrowserConfig) -> Result<Arc<dyn TabExecutor>, BrowserError>;
}

#[async_trait]
pub trait TabExecutor: Send + Sync {
    async fn goto(&self, url: &str, user_agent: Option<&str>) -> Result<(), BrowserError>;

    async fn wait_for_navigation(&self) -> Result<(), BrowserError>;

    async fn content(&self) -> Result<String, BrowserError>;

    async fn url(&self) -> Result<String, BrowserError>;

    async fn wait_for_element(&self, selector: &str) -> Result<(), BrowserError>;

    async fn wait_for_element_by_xpath(&self, xpath: &str) -> Result<(), BrowserError>;

    async fn click(&self, selector: &str) -> Result<(), BrowserError>;

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError>;

    async fn reload(&self, ignore_cache: bool) -> Result<(), BrowserError>;

    /// Called once, when the last handle to the tab is closed.
    fn close(&self);
}
