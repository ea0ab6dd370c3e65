pub mod chapter;
pub mod config;
pub mod download;
pub mod info;
pub mod modules;

use std::sync::Arc;

use eyre::{Result, WrapErr};
use mado_engine::EngineHost;
use mado_extension::{Browser, BrowserConfig, Host, ModuleMap, ResultModule};
use uuid::Uuid;

use crate::config::Config;

pub use config::handle_config_command;

/// Engine host and every bundled module registered against it.
pub struct Context {
    pub host: Arc<EngineHost>,
    pub modules: ModuleMap,
}

impl Context {
    pub fn new(config: &Config) -> Result<Self> {
        let engine = config.engine.clone().with_env();
        let host = Arc::new(EngineHost::from_config(&engine)?);
        let modules = build_modules(host.clone(), config)?;

        Ok(Self { host, modules })
    }

    /// Module named by `uuid`, or the one whose domain matches `url`.
    pub fn resolve(&self, uuid: Option<Uuid>, url: &str) -> Result<&ResultModule> {
        match uuid {
            Some(uuid) => self
                .modules
                .get_by_uuid(uuid)
                .ok_or_else(|| eyre::eyre!("no module with id {uuid}")),
            None => self
                .modules
                .get_by_url(url)
                .ok_or_else(|| eyre::eyre!("no module handles {url}, pass --module")),
        }
    }

    pub async fn close(mut self) {
        self.modules.close_all().await;
        tracing::debug!(resources = self.host.resource_count(), "host resources left");
    }
}

pub fn build_modules(host: Arc<dyn Host>, config: &Config) -> Result<ModuleMap> {
    let browser = Browser::with_config(
        host.clone(),
        BrowserConfig {
            user_agent: Some(config.engine.user_agent.clone()),
        },
    );

    let mut modules = ModuleMap::new();
    modules.extend(mado_mangadex::init_mado_module(host.clone())?)?;
    modules.extend(mado_manganato::init_mado_module(host)?)?;
    modules.extend(mado_mangashiro::init_mado_module(browser.clone(), config.cloudflare)?)?;
    modules
        .extend(mado_reaperscans::init_mado_module(browser, config.cloudflare)?)
        .wrap_err("failed to register modules")?;

    tracing::debug!(modules = modules.len(), "registered modules");
    Ok(modules)
}

#[cfg(test)]
mod tests {
    use mado_engine::testing::StaticExecutor;

    use super::*;

    #[test]
    fn test_every_module_registers() {
        let host: Arc<dyn Host> = Arc::new(EngineHost::new(Arc::new(StaticExecutor::new())));
        let modules = build_modules(host, &Config::default()).unwrap();

        assert_eq!(modules.len(), 8);
        assert_eq!(
            modules
                .get_by_url("https://mangadex.org/title/a96676e5-8ae2-425e-b549-7f15dd34a6d8")
                .map(|module| module.uuid()),
            Some(mado_mangadex::UUID)
        );
        assert_eq!(
            modules
                .get_by_url("https://asurascans.com/manga/omniscient-reader/")
                .map(|module| module.uuid()),
            Some(mado_mangashiro::ASURASCANS)
        );
        assert_eq!(
            modules
                .get_by_url("https://reaperscans.com/comics/1-x")
                .map(|module| module.name()),
            Some("ReaperScans")
        );
    }
}
