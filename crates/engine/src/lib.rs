//! Host runtime for mado modules.
//!
//! [`EngineHost`] implements the op boundary ([`mado_extension::Host`]) over a
//! resource table. HTTP goes through an [`HttpExecutor`], tabs through an
//! optional [`BrowserExecutor`], and every failure is stored in the table and
//! handed to the module as an error handle.

pub mod browser;
pub mod config;
pub mod error;
pub mod http;
mod state;
#[cfg(feature = "testing")]
pub mod testing;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mado_extension::{BrowserConfig, ErrorJson, Host, ResponseJson, ResultJson, Rid, TabRequest};
use mado_types::{ChapterImageInfo, HttpRequest};

use crate::browser::{BrowserExecutor, ChromeBrowser, TabExecutor};
use crate::config::EngineConfig;
use crate::error::Error;
use crate::http::{HttpExecutor, ReqwestExecutor};
use crate::state::{Entry, ResourceTable, TabEntry};

const HTTP_CLIENT: &str = "http client";
const HTTP_RESPONSE: &str = "http response";
const TAB: &str = "tab";
const CHAPTER_TASK: &str = "chapter task";

pub struct EngineHost {
    table: ResourceTable,
    executor: Arc<dyn HttpExecutor>,
    browser: Option<Arc<dyn BrowserExecutor>>,
}

impl EngineHost {
    /// Host without a browser. Tab ops fail with a `Custom` error.
    pub fn new(executor: Arc<dyn HttpExecutor>) -> Self {
        Self {
            table: ResourceTable::new(),
            executor,
            browser: None,
        }
    }

    pub fn with_browser(mut self, browser: Arc<dyn BrowserExecutor>) -> Self {
        self.browser = Some(browser);
        self
    }

    /// Host backed by reqwest and headless Chrome. The browser starts on the
    /// first tab request.
    pub fn from_config(config: &EngineConfig) -> error::Result<Self> {
        let executor = ReqwestExecutor::from_config(config)?;
        let browser = ChromeBrowser::new(config.clone());

        Ok(Self::new(Arc::new(executor)).with_browser(Arc::new(browser)))
    }

    /// Number of live handles, errors included.
    pub fn resource_count(&self) -> usize {
        self.table.len()
    }

    /// Fetches `request` outside of the op boundary, for image downloads.
    #[tracing::instrument(skip_all, fields(url = %request.url))]
    pub async fn download(&self, request: HttpRequest) -> error::Result<Vec<u8>> {
        let url = request.url.clone();
        let response = self.executor.execute(request).await?;

        if !(200..300).contains(&response.status) {
            return Err(Error::request(
                url,
                format!("download failed with status {}", response.status),
            ));
        }

        Ok(response.body)
    }

    /// Stores `error` and returns its handle.
    fn store_error(&self, error: Error) -> ErrorJson {
        let kind = error.kind();
        tracing::debug!(%kind, "{error}");
        let rid = self.table.push(Entry::Error(Arc::new(error)));

        ErrorJson::Resource { rid, kind }
    }

    fn result<T>(&self, result: error::Result<T>) -> ResultJson<T> {
        match result {
            Ok(value) => ResultJson::Ok(value),
            Err(error) => ResultJson::Err(self.store_error(error)),
        }
    }

    fn tab_executor(&self, rid: Rid) -> error::Result<Arc<dyn TabExecutor>> {
        Ok(self.table.tab(rid)?.tab.clone())
    }

    fn render_error(&self, error: &ErrorJson, debug: bool) -> String {
        match error {
            ErrorJson::Custom { message } => message.clone(),
            ErrorJson::Resource { rid, .. } => {
                let rendered = match self.table.error(*rid) {
                    Ok(error) => error,
                    Err(missing) => Arc::new(missing),
                };

                if debug {
                    format!("{rendered:?}")
                } else {
                    rendered.to_string()
                }
            }
        }
    }
}

#[async_trait]
impl Host for EngineHost {
    #[tracing::instrument(skip_all)]
    fn http_client_new(&self) -> Rid {
        self.table.push(Entry::HttpClient(self.executor.clone()))
    }

    fn http_client_clone(&self, rid: Rid) -> ResultJson<Rid> {
        self.result(self.table.clone_handle(rid, HTTP_CLIENT))
    }

    fn http_client_close(&self, rid: Rid) -> ResultJson<()> {
        self.result(self.table.close(rid, HTTP_CLIENT))
    }

    #[tracing::instrument(skip_all, fields(client = rid, url = %request.url))]
    async fn http_client_get(&self, rid: Rid, request: HttpRequest) -> ResultJson<ResponseJson> {
        let executor = match self.table.http_client(rid) {
            Ok(executor) => executor,
            Err(e) => return ResultJson::Err(self.store_error(e)),
        };

        let result = executor.execute(request).await.map(|response| {
            let status = response.status;
            let url = response.url.clone();
            let rid = self.table.push(Entry::Response(Arc::new(response)));

            ResponseJson { status, url, rid }
        });

        self.result(result)
    }

    async fn http_response_text(&self, rid: Rid) -> ResultJson<String> {
        self.result(self.table.response(rid).and_then(|response| response.text()))
    }

    fn http_response_clone(&self, rid: Rid) -> ResultJson<Rid> {
        self.result(self.table.clone_handle(rid, HTTP_RESPONSE))
    }

    fn http_response_close(&self, rid: Rid) -> ResultJson<()> {
        self.result(self.table.close(rid, HTTP_RESPONSE))
    }

    fn error_request_error(&self, url: &str, message: &str) -> ErrorJson {
        self.store_error(Error::request(url, message))
    }

    fn error_unexpected_error(&self, url: &str, message: &str) -> ErrorJson {
        self.store_error(Error::unexpected(url, message))
    }

    fn error_invalid_url(&self, url: &str) -> ErrorJson {
        self.store_error(Error::InvalidUrl {
            url: url.to_string(),
        })
    }

    fn error_to_string(&self, error: &ErrorJson) -> String {
        self.render_error(error, false)
    }

    fn error_to_debug(&self, error: &ErrorJson) -> String {
        self.render_error(error, true)
    }

    fn error_close(&self, error: &ErrorJson) -> ResultJson<()> {
        match error {
            ErrorJson::Custom { .. } => ResultJson::Ok(()),
            ErrorJson::Resource { rid, .. } => self.result(self.table.close(*rid, "error")),
        }
    }

    #[tracing::instrument(skip_all)]
    async fn browser_new_tab(&self, config: BrowserConfig) -> ResultJson<Rid> {
        let Some(browser) = self.browser.clone() else {
            return ResultJson::Err(
                self.store_error(Error::External("no browser configured".to_string())),
            );
        };

        let result = browser
            .new_tab(&config)
            .await
            .map(|tab| self.table.push(Entry::Tab(Arc::new(TabEntry { tab }))))
            .map_err(Error::from);

        self.result(result)
    }

    fn tab_clone(&self, rid: Rid) -> ResultJson<Rid> {
        self.result(self.table.clone_handle(rid, TAB))
    }

    fn tab_close(&self, rid: Rid) -> ResultJson<()> {
        self.result(self.table.close(rid, TAB))
    }

    #[tracing::instrument(skip_all, fields(tab = rid, url = %request.url))]
    async fn tab_goto(&self, rid: Rid, request: TabRequest) -> ResultJson<()> {
        let result = match self.tab_executor(rid) {
            Ok(tab) => tab
                .goto(&request.url, request.user_agent.as_deref())
                .await
                .map_err(Error::from),
            Err(e) => Err(e),
        };
        self.result(result)
    }

    async fn tab_wait_for_navigation(&self, rid: Rid) -> ResultJson<()> {
        let result = match self.tab_executor(rid) {
            Ok(tab) => tab.wait_for_navigation().await.map_err(Error::from),
            Err(e) => Err(e),
        };
        self.result(result)
    }

    async fn tab_content(&self, rid: Rid) -> ResultJson<String> {
        let result = match self.tab_executor(rid) {
            Ok(tab) => tab.content().await.map_err(Error::from),
            Err(e) => Err(e),
        };
        self.result(result)
    }

    async fn tab_url(&self, rid: Rid) -> ResultJson<String> {
        let result = match self.tab_executor(rid) {
            Ok(tab) => tab.url().await.map_err(Error::from),
            Err(e) => Err(e),
        };
        self.result(result)
    }

    async fn tab_wait_for_element(&self, rid: Rid, selector: String) -> ResultJson<()> {
        let result = match self.tab_executor(rid) {
            Ok(tab) => tab.wait_for_element(&selector).await.map_err(Error::from),
            Err(e) => Err(e),
        };
        self.result(result)
    }

    async fn tab_wait_for_element_by_xpath(&self, rid: Rid, xpath: String) -> ResultJson<()> {
        let result = match self.tab_executor(rid) {
            Ok(tab) => tab
                .wait_for_element_by_xpath(&xpath)
                .await
                .map_err(Error::from),
            Err(e) => Err(e),
        };
        self.result(result)
    }

    async fn tab_click(&self, rid: Rid, selector: String) -> ResultJson<()> {
        let result = match self.tab_executor(rid) {
            Ok(tab) => tab.click(&selector).await.map_err(Error::from),
            Err(e) => Err(e),
        };
        self.result(result)
    }

    async fn tab_evaluate(&self, rid: Rid, script: String) -> ResultJson<serde_json::Value> {
        let result = match self.tab_executor(rid) {
            Ok(tab) => tab.evaluate(&script).await.map_err(Error::from),
            Err(e) => Err(e),
        };
        self.result(result)
    }

    async fn tab_reload(&self, rid: Rid) -> ResultJson<()> {
        let result = match self.tab_executor(rid) {
            Ok(tab) => tab.reload(false).await.map_err(Error::from),
            Err(e) => Err(e),
        };
        self.result(result)
    }

    async fn tab_reload_force(&self, rid: Rid) -> ResultJson<()> {
        let result = match self.tab_executor(rid) {
            Ok(tab) => tab.reload(true).await.map_err(Error::from),
            Err(e) => Err(e),
        };
        self.result(result)
    }

    fn chapter_task_new(&self) -> ResultJson<Rid> {
        ResultJson::Ok(self.table.push(Entry::ChapterTask(Arc::new(Mutex::new(Vec::new())))))
    }

    fn chapter_task_add(&self, rid: Rid, image: ChapterImageInfo) -> ResultJson<()> {
        let result = self.table.chapter_task(rid).map(|task| {
            task.lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(image);
        });
        self.result(result)
    }

    fn chapter_task_to_array(&self, rid: Rid) -> ResultJson<Vec<ChapterImageInfo>> {
        let result = self.table.chapter_task(rid).map(|task| {
            task.lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone()
        });
        self.result(result)
    }

    fn chapter_task_clone(&self, rid: Rid) -> ResultJson<Rid> {
        self.result(self.table.clone_handle(rid, CHAPTER_TASK))
    }

    fn chapter_task_close(&self, rid: Rid) -> ResultJson<()> {
        self.result(self.table.close(rid, CHAPTER_TASK))
    }
}
