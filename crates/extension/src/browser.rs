use std::sync::Arc;

use crate::ops::{BrowserConfig, Host, TabRequest};
use crate::resource::{Resource, TAB};
use crate::Result;

/// Entry point to the host browser. Cheap to clone; tabs are the resources.
#[derive(Clone)]
pub struct Browser {
    host: Arc<dyn Host>,
    config: BrowserConfig,
}

impl Browser {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self::with_config(host, BrowserConfig::default())
    }

    pub fn with_config(host: Arc<dyn Host>, config: BrowserConfig) -> Self {
        Self { host, config }
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    #[tracing::instrument(skip_all)]
    pub async fn new_tab(&self) -> Result<Tab> {
        let rid = self
            .host
            .browser_new_tab(self.config.clone())
            .await
            .bind(&self.host)?;

        Ok(Tab {
            resource: Resource::new(self.host.clone(), rid, &TAB),
            user_agent: self.config.user_agent.clone(),
        })
    }
}

impl std::fmt::Debug for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Browser")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A browser tab living in the host.
#[derive(Debug)]
pub struct Tab {
    resource: Resource,
    user_agent: Option<String>,
}

impl Tab {
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    fn host(&self) -> &Arc<dyn Host> {
        self.resource.host()
    }

    #[tracing::instrument(skip(self), fields(tab = self.resource.rid()))]
    pub async fn navigate_to(&self, url: &str) -> Result<()> {
        let request = TabRequest {
            url: url.to_string(),
            user_agent: self.user_agent.clone(),
        };

        self.host()
            .tab_goto(self.resource.rid(), request)
            .await
            .bind(self.host())
    }

    pub async fn wait_for_navigation(&self) -> Result<()> {
        self.host()
            .tab_wait_for_navigation(self.resource.rid())
            .await
            .bind(self.host())
    }

    /// Current document as HTML.
    pub async fn content(&self) -> Result<String> {
        self.host()
            .tab_content(self.resource.rid())
            .await
            .bind(self.host())
    }

    pub async fn url(&self) -> Result<String> {
        self.host()
            .tab_url(self.resource.rid())
            .await
            .bind(self.host())
    }

    pub async fn wait_for_element(&self, selector: &str) -> Result<()> {
        self.host()
            .tab_wait_for_element(self.resource.rid(), selector.to_string())
            .await
            .bind(self.host())
    }

    pub async fn wait_for_element_by_xpath(&self, xpath: &str) -> Result<()> {
        self.host()
            .tab_wait_for_element_by_xpath(self.resource.rid(), xpath.to_string())
            .await
            .bind(self.host())
    }

    pub async fn click(&self, selector: &str) -> Result<()> {
        self.host()
            .tab_click(self.resource.rid(), selector.to_string())
            .await
            .bind(self.host())
    }

    pub async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        self.host()
            .tab_evaluate(self.resource.rid(), script.to_string())
            .await
            .bind(self.host())
    }

    pub async fn reload(&self) -> Result<()> {
        self.host()
            .tab_reload(self.resource.rid())
            .await
            .bind(self.host())
    }

    /// Reloads ignoring the cache.
    pub async fn reload_force(&self) -> Result<()> {
        self.host()
            .tab_reload_force(self.resource.rid())
            .await
            .bind(self.host())
    }

    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            resource: self.resource.try_clone()?,
            user_agent: self.user_agent.clone(),
        })
    }

    pub fn close(&self) -> Result<()> {
        self.resource.close()
    }
}
