use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use mado_extension::BrowserConfig;
use tokio::sync::OnceCell;

use super::{BrowserError, BrowserExecutor, TabExecutor};
use crate::config::EngineConfig;

/// Runs `f` on the blocking pool, inside the current span.
async fn blocking<F, R>(f: F) -> Result<R, BrowserError>
where
    F: FnOnce() -> Result<R, BrowserError> + Send + 'static,
    R: Send + 'static,
{
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || {
        let _span = span.entered();
        f()
    })
    .await
    .map_err(|e| BrowserError::Task(e.to_string()))?
}

/// Headless Chrome, launched or connected on first use.
pub struct ChromeBrowser {
    config: EngineConfig,
    browser: OnceCell<Browser>,
}

impl ChromeBrowser {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            browser: OnceCell::new(),
        }
    }

    async fn browser(&self) -> Result<&Browser, BrowserError> {
        self.browser
            .get_or_try_init(|| {
                let ws_url = self.config.browser_ws_url.clone();
                let headless = self.config.headless;

                blocking(move || match ws_url {
                    Some(ws_url) => {
                        tracing::info!("connecting to browser at {ws_url}");
                        Browser::connect(ws_url).map_err(|e| BrowserError::Launch(e.to_string()))
                    }
                    None => {
                        tracing::info!("launching headless chrome");
                        let options = LaunchOptions::default_builder()
                            .headless(headless)
                            .idle_browser_timeout(Duration::from_secs(60 * 60))
                            .build()
                            .map_err(|e| BrowserError::Launch(e.to_string()))?;

                        Browser::new(options).map_err(|e| BrowserError::Launch(e.to_string()))
                    }
                })
            })
            .await
    }
}

#[async_trait]
impl BrowserExecutor for ChromeBrowser {
    #[tracing::instrument(skip_all)]
    async fn new_tab(&self, config: &BrowserConfig) -> Result<Arc<dyn TabExecutor>, BrowserError> {
        let browser = self.browser().await?.clone();
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| self.config.user_agent.clone());

        let tab = blocking(move || {
            let tab = browser
                .new_tab()
                .map_err(|e| BrowserError::NewTab(e.to_string()))?;
            tab.set_user_agent(&user_agent, Some("en-US,en;q=0.9"), None)
                .map_err(|e| BrowserError::NewTab(e.to_string()))?;

            Ok(tab)
        })
        .await?;

        Ok(Arc::new(ChromeTab { tab }))
    }
}

struct ChromeTab {
    tab: Arc<Tab>,
}

impl ChromeTab {
    async fn with_tab<F, R>(&self, f: F) -> Result<R, BrowserError>
    where
        F: FnOnce(&Tab) -> Result<R, BrowserError> + Send + 'static,
        R: Send + 'static,
    {
        let tab = self.tab.clone();
        blocking(move || f(&tab)).await
    }
}

#[async_trait]
impl TabExecutor for ChromeTab {
    async fn goto(&self, url: &str, user_agent: Option<&str>) -> Result<(), BrowserError> {
        let url = url.to_string();
        let user_agent = user_agent.map(str::to_string);

        self.with_tab(move |tab| {
            if let Some(user_agent) = user_agent {
                tab.set_user_agent(&user_agent, None, None)
                    .map_err(|e| BrowserError::Navigate(e.to_string()))?;
            }
            tracing::trace!("goto {url}");
            tab.navigate_to(&url)
                .map_err(|e| BrowserError::Navigate(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn wait_for_navigation(&self) -> Result<(), BrowserError> {
        self.with_tab(|tab| {
            tab.wait_until_navigated()
                .map_err(|e| BrowserError::Navigate(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn content(&self) -> Result<String, BrowserError> {
        self.with_tab(|tab| {
            tab.get_content()
                .map_err(|e| BrowserError::Content(e.to_string()))
        })
        .await
    }

    async fn url(&self) -> Result<String, BrowserError> {
        Ok(self.tab.get_url())
    }

    async fn wait_for_element(&self, selector: &str) -> Result<(), BrowserError> {
        let selector = selector.to_string();
        self.with_tab(move |tab| {
            tab.wait_for_element(&selector)
                .map_err(|e| BrowserError::ElementNotFound(format!("{selector}: {e}")))?;
            Ok(())
        })
        .await
    }

    async fn wait_for_element_by_xpath(&self, xpath: &str) -> Result<(), BrowserError> {
        let xpath = xpath.to_string();
        self.with_tab(move |tab| {
            tab.wait_for_xpath(&xpath)
                .map_err(|e| BrowserError::ElementNotFound(format!("{xpath}: {e}")))?;
            Ok(())
        })
        .await
    }

    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let selector = selector.to_string();
        self.with_tab(move |tab| {
            tab.wait_for_element(&selector)
                .and_then(|element| element.click().map(|_| ()))
                .map_err(|e| BrowserError::ElementNotFound(format!("{selector}: {e}")))
        })
        .await
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        let script = script.to_string();
        self.with_tab(move |tab| {
            let object = tab
                .evaluate(&script, true)
                .map_err(|e| BrowserError::Evaluate(e.to_string()))?;
            Ok(object.value.unwrap_or(serde_json::Value::Null))
        })
        .await
    }

    async fn reload(&self, ignore_cache: bool) -> Result<(), BrowserError> {
        self.with_tab(move |tab| {
            tab.reload(ignore_cache, None)
                .map_err(|e| BrowserError::Navigate(e.to_string()))?;
            Ok(())
        })
        .await
    }

    fn close(&self) {
        let tab = self.tab.clone();
        let close = move || {
            if let Err(e) = tab.close(false) {
                tracing::warn!("failed to close tab: {e}");
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => drop(handle.spawn_blocking(close)),
            Err(_) => close(),
        }
    }
}
