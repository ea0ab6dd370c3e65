use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use mado_types::{ChapterImageInfo, HttpRequest, MangaAndChapters};
use uuid::Uuid;

use crate::http::HttpClient;
use crate::ops::Host;
use crate::result::{ResultExt, catch_and_return};
use crate::task::ChapterTask;
use crate::Result;

/// A site module.
///
/// Bodies return `eyre::Result` so any failure can be raised with `?`; callers
/// go through [`ResultModule`], which turns every outcome into a [`Result`].
#[async_trait]
pub trait Module: Send + Sync {
    /// Stable identifier of the module. Never changes between releases.
    fn uuid(&self) -> Uuid;

    /// Human readable name.
    fn name(&self) -> &str;

    /// Origin the module serves, e.g. `https://mangadex.org`.
    fn domain(&self) -> &str;

    fn client(&self) -> &HttpClient;

    /// Fetches a manga and its chapter list. `id` is a URL or a site id.
    async fn get_info(&self, id: &str) -> eyre::Result<MangaAndChapters>;

    /// Pushes every image of the chapter `id` into `task`, in reading order.
    async fn get_chapter_image(&self, id: &str, task: &mut dyn ChapterTask) -> eyre::Result<()>;

    /// Request that downloads one image produced by `get_chapter_image`.
    async fn download_image(&self, image: &ChapterImageInfo) -> eyre::Result<HttpRequest>;

    fn close(&self) -> eyre::Result<()> {
        self.client().close().throw()
    }
}

/// Boundary decorator over a [`Module`].
///
/// Every operation resolves to `Ok` or `Err`. Errors raised by the module keep
/// their record, foreign failures and panics become `Custom` errors.
#[derive(Clone)]
pub struct ResultModule {
    inner: Arc<dyn Module>,
}

impl ResultModule {
    pub fn new(inner: Arc<dyn Module>) -> Self {
        Self { inner }
    }

    pub fn module(&self) -> &Arc<dyn Module> {
        &self.inner
    }

    pub fn uuid(&self) -> Uuid {
        self.inner.uuid()
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn domain(&self) -> &str {
        self.inner.domain()
    }

    fn host(&self) -> &Arc<dyn Host> {
        self.inner.client().host()
    }

    #[tracing::instrument(skip(self), fields(module = self.inner.name()))]
    pub async fn get_info(&self, id: &str) -> Result<MangaAndChapters> {
        catch_and_return(self.host(), self.inner.get_info(id)).await
    }

    #[tracing::instrument(skip(self, task), fields(module = self.inner.name()))]
    pub async fn get_chapter_image(&self, id: &str, task: &mut dyn ChapterTask) -> Result<()> {
        catch_and_return(self.host(), self.inner.get_chapter_image(id, task)).await
    }

    #[tracing::instrument(skip_all, fields(module = self.inner.name(), image = %image.id))]
    pub async fn download_image(&self, image: &ChapterImageInfo) -> Result<HttpRequest> {
        catch_and_return(self.host(), self.inner.download_image(image)).await
    }

    pub async fn close(&self) -> Result<()> {
        catch_and_return(self.host(), async { self.inner.close() }).await
    }
}

impl fmt::Debug for ResultModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultModule")
            .field("uuid", &self.inner.uuid())
            .field("name", &self.inner.name())
            .field("domain", &self.inner.domain())
            .finish()
    }
}

/// Serves another module under a second identity.
///
/// The wrapper owns a clone of the inner module's client. Data operations are
/// forwarded untouched and `close` releases only the wrapper's own client, so
/// the inner module stays usable.
pub struct ModuleWrapper {
    uuid: Uuid,
    name: String,
    domain: String,
    client: HttpClient,
    inner: Arc<dyn Module>,
}

impl ModuleWrapper {
    pub fn new(
        uuid: Uuid,
        name: impl Into<String>,
        domain: impl Into<String>,
        inner: Arc<dyn Module>,
    ) -> Result<Self> {
        let client = inner.client().try_clone()?;

        Ok(Self {
            uuid,
            name: name.into(),
            domain: domain.into(),
            client,
            inner,
        })
    }

    pub fn inner(&self) -> &Arc<dyn Module> {
        &self.inner
    }
}

#[async_trait]
impl Module for ModuleWrapper {
    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> &str {
        &self.domain
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    async fn get_info(&self, id: &str) -> eyre::Result<MangaAndChapters> {
        self.inner.get_info(id).await
    }

    async fn get_chapter_image(&self, id: &str, task: &mut dyn ChapterTask) -> eyre::Result<()> {
        self.inner.get_chapter_image(id, task).await
    }

    async fn download_image(&self, image: &ChapterImageInfo) -> eyre::Result<HttpRequest> {
        self.inner.download_image(image).await
    }

    fn close(&self) -> eyre::Result<()> {
        self.client.close().throw()
    }
}
