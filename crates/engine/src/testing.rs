//! In-memory executors with canned responses, so tests never touch the network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;
use mado_extension::BrowserConfig;
use mado_types::HttpRequest;

use crate::browser::{BrowserError, BrowserExecutor, TabExecutor};
use crate::error::{Error, Result};
use crate::http::{HttpExecutor, HttpResponseData};

enum Canned {
    Response { status: u16, body: Vec<u8> },
    Failure(String),
}

/// HTTP executor answering from a table keyed by URL.
///
/// A request is looked up by its full URL first, then by the URL without its
/// query string. Anything else fails like an unreachable host.
#[derive(Default)]
pub struct StaticExecutor {
    responses: DashMap<String, Canned>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StaticExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, url: &str, status: u16, body: impl Into<String>) -> Self {
        self.with_bytes(url, status, body.into().into_bytes())
    }

    pub fn with_bytes(self, url: &str, status: u16, body: Vec<u8>) -> Self {
        self.responses
            .insert(url.to_string(), Canned::Response { status, body });
        self
    }

    pub fn with_json(self, url: &str, status: u16, body: serde_json::Value) -> Self {
        self.with_response(url, status, body.to_string())
    }

    /// Requests to `url` fail before any response.
    pub fn with_failure(self, url: &str, message: &str) -> Self {
        self.responses
            .insert(url.to_string(), Canned::Failure(message.to_string()));
        self
    }

    /// Every request executed so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }

    fn lookup(&self, url: &str) -> Option<dashmap::mapref::one::Ref<'_, String, Canned>> {
        self.responses.get(url).or_else(|| {
            let (base, _) = url.split_once('?')?;
            self.responses.get(base)
        })
    }
}

#[async_trait]
impl HttpExecutor for StaticExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponseData> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match self.lookup(&request.url).as_deref() {
            Some(Canned::Response { status, body }) => Ok(HttpResponseData {
                status: *status,
                url: request.url.clone(),
                body: body.clone(),
            }),
            Some(Canned::Failure(message)) => Err(Error::request(&request.url, message)),
            None => Err(Error::request(&request.url, "connection refused")),
        }
    }
}

/// Browser serving canned page contents.
///
/// Each URL maps to a sequence of contents: successive reads of the page
/// return the next entry and the last one repeats, which lets a test show a
/// challenge page first.
#[derive(Default)]
pub struct StaticBrowser {
    pages: Arc<DashMap<String, Vec<String>>>,
    open_tabs: Arc<AtomicUsize>,
    tabs_opened: AtomicUsize,
    failing_waits: bool,
}

impl StaticBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, content: impl Into<String>) -> Self {
        self.with_pages(url, vec![content.into()])
    }

    pub fn with_pages(self, url: &str, contents: Vec<String>) -> Self {
        self.pages.insert(url.to_string(), contents);
        self
    }

    /// Every wait times out, like a real browser left on a challenge page.
    pub fn with_failing_waits(mut self) -> Self {
        self.failing_waits = true;
        self
    }

    /// Tabs currently open.
    pub fn open_tabs(&self) -> usize {
        self.open_tabs.load(Ordering::SeqCst)
    }

    /// Tabs opened since creation.
    pub fn tabs_opened(&self) -> usize {
        self.tabs_opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserExecutor for StaticBrowser {
    async fn new_tab(&self, _config: &BrowserConfig) -> std::result::Result<Arc<dyn TabExecutor>, BrowserError> {
        self.open_tabs.fetch_add(1, Ordering::SeqCst);
        self.tabs_opened.fetch_add(1, Ordering::SeqCst);

        Ok(Arc::new(StaticTab {
            pages: self.pages.clone(),
            open_tabs: self.open_tabs.clone(),
            current: Mutex::new(None),
            failing_waits: self.failing_waits,
        }))
    }
}

struct StaticTab {
    pages: Arc<DashMap<String, Vec<String>>>,
    open_tabs: Arc<AtomicUsize>,
    /// Current URL and how many times its content was read.
    current: Mutex<Option<(String, usize)>>,
    failing_waits: bool,
}

impl StaticTab {
    fn current(&self) -> std::result::Result<std::sync::MutexGuard<'_, Option<(String, usize)>>, BrowserError> {
        self.current
            .lock()
            .map_err(|e| BrowserError::Task(e.to_string()))
    }

    fn wait(&self, target: &str) -> std::result::Result<(), BrowserError> {
        if self.failing_waits {
            return Err(BrowserError::ElementNotFound(format!("timed out waiting for {target}")));
        }
        Ok(())
    }
}

#[async_trait]
impl TabExecutor for StaticTab {
    async fn goto(&self, url: &str, _user_agent: Option<&str>) -> std::result::Result<(), BrowserError> {
        if !self.pages.contains_key(url) {
            return Err(BrowserError::Navigate(format!("no page for {url}")));
        }

        *self.current()? = Some((url.to_string(), 0));
        Ok(())
    }

    async fn wait_for_navigation(&self) -> std::result::Result<(), BrowserError> {
        self.wait("navigation")
    }

    async fn content(&self) -> std::result::Result<String, BrowserError> {
        let mut current = self.current()?;
        let Some((url, reads)) = current.as_mut() else {
            return Ok(String::new());
        };

        let content = self
            .pages
            .get(url.as_str())
            .and_then(|contents| {
                let index = (*reads).min(contents.len().saturating_sub(1));
                contents.get(index).cloned()
            })
            .unwrap_or_default();
        *reads += 1;

        Ok(content)
    }

    async fn url(&self) -> std::result::Result<String, BrowserError> {
        Ok(self
            .current()?
            .as_ref()
            .map(|(url, _)| url.clone())
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn wait_for_element(&self, selector: &str) -> std::result::Result<(), BrowserError> {
        self.wait(selector)
    }

    async fn wait_for_element_by_xpath(&self, xpath: &str) -> std::result::Result<(), BrowserError> {
        self.wait(xpath)
    }

    async fn click(&self, _selector: &str) -> std::result::Result<(), BrowserError> {
        Ok(())
    }

    async fn evaluate(&self, _script: &str) -> std::result::Result<serde_json::Value, BrowserError> {
        Ok(serde_json::Value::Null)
    }

    async fn reload(&self, _ignore_cache: bool) -> std::result::Result<(), BrowserError> {
        Ok(())
    }

    fn close(&self) {
        self.open_tabs.fetch_sub(1, Ordering::SeqCst);
    }
}
