use std::collections::HashMap;

use url::Url;
use uuid::Uuid;

use crate::module::ResultModule;

#[derive(Debug, thiserror::Error)]
pub enum ModuleMapError {
    #[error("module {uuid} is already registered as {existing}")]
    DuplicateUuid { uuid: Uuid, existing: String },

    #[error("module {name} has an invalid domain {domain}: {source}")]
    InvalidDomain {
        name: String,
        domain: String,
        source: url::ParseError,
    },
}

/// Origin of a URL, used as the lookup key for modules.
fn origin_key(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Ordered collection of modules, addressable by uuid and by domain.
#[derive(Debug, Default)]
pub struct ModuleMap {
    modules: Vec<ResultModule>,
    uuids: HashMap<Uuid, usize>,
    domains: HashMap<String, usize>,
}

impl ModuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `module`. A rejected module leaves the map untouched.
    pub fn push(&mut self, module: ResultModule) -> Result<(), ModuleMapError> {
        if let Some(&index) = self.uuids.get(&module.uuid()) {
            return Err(ModuleMapError::DuplicateUuid {
                uuid: module.uuid(),
                existing: self.modules[index].name().to_string(),
            });
        }

        let domain = Url::parse(module.domain()).map_err(|source| ModuleMapError::InvalidDomain {
            name: module.name().to_string(),
            domain: module.domain().to_string(),
            source,
        })?;

        let index = self.modules.len();
        self.uuids.insert(module.uuid(), index);
        self.domains.entry(origin_key(&domain)).or_insert(index);

        tracing::debug!(uuid = %module.uuid(), name = module.name(), "registered module");
        self.modules.push(module);

        Ok(())
    }

    pub fn extend(
        &mut self,
        modules: impl IntoIterator<Item = ResultModule>,
    ) -> Result<(), ModuleMapError> {
        for module in modules {
            self.push(module)?;
        }
        Ok(())
    }

    pub fn get_by_uuid(&self, uuid: Uuid) -> Option<&ResultModule> {
        self.uuids.get(&uuid).map(|&index| &self.modules[index])
    }

    /// Module serving the origin of `url`. Path, query and credentials are
    /// ignored.
    pub fn get_by_url(&self, url: &str) -> Option<&ResultModule> {
        let url = Url::parse(url).ok()?;
        self.domains
            .get(&origin_key(&url))
            .map(|&index| &self.modules[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultModule> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Closes every module in registration order, then empties the map.
    /// Failures are logged and do not stop the remaining closes.
    pub async fn close_all(&mut self) {
        for module in self.modules.drain(..) {
            if let Err(e) = module.close().await {
                tracing::warn!(module = module.name(), "failed to close module: {e}");
                e.release();
            }
        }

        self.uuids.clear();
        self.domains.clear();
    }
}
