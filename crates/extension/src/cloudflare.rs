//! Page fetching through a browser tab for sites behind a Cloudflare challenge.

use serde::{Deserialize, Serialize};

use crate::browser::{Browser, Tab};
use crate::error::Error;
use crate::Result;

const IUAM_MARKER: &str = "/cdn-cgi/images/trace/managed/";

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudflareConfig {
    /// Number of challenge checks before a request gives up.
    pub max_attempts: u32,
}

impl Default for CloudflareConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

fn is_challenge(content: &str) -> bool {
    content.is_empty() || content.contains(IUAM_MARKER)
}

/// A browsing session holding at most one tab.
///
/// The tab is opened by the first request and reused by every later request of
/// the session. It is released by [`Cloudflare::close`], or on drop.
pub struct Cloudflare {
    browser: Browser,
    tab: Option<Tab>,
    max_attempts: u32,
}

impl Cloudflare {
    pub fn new(browser: Browser) -> Self {
        Self::with_config(browser, CloudflareConfig::default())
    }

    pub fn with_config(browser: Browser, config: CloudflareConfig) -> Self {
        Self {
            browser,
            tab: None,
            max_attempts: config.max_attempts.max(1),
        }
    }

    /// Number of challenge checks before giving up.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn tab(&self) -> Option<&Tab> {
        self.tab.as_ref()
    }

    pub fn get(&mut self, url: &str) -> CloudflareRequest<'_> {
        CloudflareRequest {
            session: self,
            url: url.to_string(),
            wait_for_xpath: None,
            wait_for_element: None,
        }
    }

    /// Shorthand for `get(url).send()`.
    pub async fn text(&mut self, url: &str) -> Result<String> {
        self.get(url).send().await
    }

    async fn tab_or_open(&mut self) -> Result<&Tab> {
        let tab = match self.tab.take() {
            Some(tab) => tab,
            None => self.browser.new_tab().await?,
        };

        Ok(self.tab.insert(tab))
    }

    /// Releases the tab. Closing a session that never opened one is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match self.tab.take() {
            Some(tab) => tab.close(),
            None => Ok(()),
        }
    }
}

impl Drop for Cloudflare {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("failed to release cloudflare tab: {e}");
            e.release();
        }
    }
}

pub struct CloudflareRequest<'a> {
    session: &'a mut Cloudflare,
    url: String,
    wait_for_xpath: Option<String>,
    wait_for_element: Option<String>,
}

impl CloudflareRequest<'_> {
    /// Element to wait for while the challenge is shown, as an XPath expression.
    pub fn wait_for_element_by_xpath(mut self, xpath: &str) -> Self {
        self.wait_for_xpath = Some(xpath.to_string());
        self
    }

    /// Element to wait for while the challenge is shown, as a CSS selector.
    pub fn wait_for_element(mut self, selector: &str) -> Self {
        self.wait_for_element = Some(selector.to_string());
        self
    }

    /// Loads the page and returns its content once no challenge is shown.
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    pub async fn send(self) -> Result<String> {
        let max_attempts = self.session.max_attempts;
        let tab = self.session.tab_or_open().await?;

        let navigated = tab.navigate_to(&self.url).await;
        if let Err(e) = tab.wait_for_navigation().await {
            tracing::debug!("navigation wait failed: {e}");
            e.release();
        }
        navigated?;

        let mut content = tab.content().await?;
        let mut attempts = 1;

        while is_challenge(&content) {
            if attempts >= max_attempts {
                return Err(Error::request_error(
                    tab.resource().host(),
                    &self.url,
                    "challenge did not resolve",
                ));
            }
            attempts += 1;

            tracing::debug!(attempts, empty = content.is_empty(), "challenge page, waiting");

            let mut waits = Vec::with_capacity(2);
            if self.wait_for_xpath.is_none() && self.wait_for_element.is_none() {
                waits.push(tab.reload_force().await);
            }
            if let Some(xpath) = &self.wait_for_xpath {
                waits.push(tab.wait_for_element_by_xpath(xpath).await);
            }
            if let Some(element) = &self.wait_for_element {
                waits.push(tab.wait_for_element(element).await);
            }
            for e in waits.into_iter().filter_map(|wait| wait.err()) {
                tracing::debug!("challenge wait failed: {e}");
                e.release();
            }

            content = tab.content().await?;
        }

        Ok(content)
    }
}
