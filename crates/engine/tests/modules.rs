//! Module boundary: ResultModule, ModuleWrapper and ModuleMap.

use std::sync::Arc;

use async_trait::async_trait;
use mado_engine::EngineHost;
use mado_engine::testing::StaticExecutor;
use mado_extension::types::{ChapterImageInfo, HttpRequest, Manga, MangaAndChapters};
use mado_extension::{
    ChapterTask, Error, ErrorKind, Host, HttpClient, Module, ModuleMap, ModuleMapError,
    ModuleWrapper, ResultExt, ResultModule,
};
use uuid::Uuid;

const PAGE: &str = "https://example.com/manga/1";

enum Failure {
    None,
    Message,
    Record,
    Panic,
}

struct FakeModule {
    uuid: Uuid,
    client: HttpClient,
    failure: Failure,
}

impl FakeModule {
    fn new(host: Arc<dyn Host>, failure: Failure) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            client: HttpClient::new(host),
            failure,
        }
    }

    fn fail(&self) -> eyre::Result<()> {
        match self.failure {
            Failure::None => Ok(()),
            Failure::Message => Err(eyre::eyre!("selector matched nothing")),
            Failure::Record => Err(Error::invalid_url(self.client.host(), "https://google.com")).throw(),
            Failure::Panic => panic!("index out of bounds"),
        }
    }
}

#[async_trait]
impl Module for FakeModule {
    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn name(&self) -> &str {
        "Fake"
    }

    fn domain(&self) -> &str {
        "https://example.com"
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    async fn get_info(&self, id: &str) -> eyre::Result<MangaAndChapters> {
        self.fail()?;
        let response = self.client.get(HttpRequest::get(id)).await.throw()?;
        let title = response.text().await.throw()?;
        response.close().throw()?;

        Ok(MangaAndChapters {
            manga: Manga {
                id: id.to_string(),
                title,
                ..Default::default()
            },
            chapters: vec![],
        })
    }

    async fn get_chapter_image(&self, id: &str, task: &mut dyn ChapterTask) -> eyre::Result<()> {
        task.push(ChapterImageInfo {
            id: format!("{id}/1.png"),
            extension: "png".to_string(),
            name: None,
        });
        self.fail()
    }

    async fn download_image(&self, image: &ChapterImageInfo) -> eyre::Result<HttpRequest> {
        self.fail()?;
        Ok(HttpRequest::get(image.id.clone()))
    }
}

fn engine() -> (Arc<EngineHost>, Arc<dyn Host>) {
    let executor = StaticExecutor::new().with_response(PAGE, 200, "One Piece");
    let engine = Arc::new(EngineHost::new(Arc::new(executor)));
    let host: Arc<dyn Host> = engine.clone();
    (engine, host)
}

#[tokio::test]
async fn test_result_module_forwards_success() {
    let (_engine, host) = engine();
    let module = ResultModule::new(Arc::new(FakeModule::new(host, Failure::None)));

    let info = module.get_info(PAGE).await.unwrap();
    assert_eq!(info.manga.title, "One Piece");

    let mut images = Vec::new();
    module.get_chapter_image(PAGE, &mut images).await.unwrap();
    assert_eq!(images.len(), 1);

    let request = module.download_image(&images[0]).await.unwrap();
    assert_eq!(request.url, format!("{PAGE}/1.png"));
}

#[tokio::test]
async fn test_result_module_never_throws() {
    let cases = [
        (Failure::Message, ErrorKind::Custom, "selector matched nothing"),
        (Failure::Record, ErrorKind::InvalidUrl, "https://google.com is invalid"),
        (Failure::Panic, ErrorKind::Custom, "module panicked: index out of bounds"),
    ];

    for (failure, kind, message) in cases {
        let (_engine, host) = engine();
        let module = ResultModule::new(Arc::new(FakeModule::new(host, failure)));

        let error = module.get_info(PAGE).await.unwrap_err();
        assert_eq!(error.kind(), kind);
        assert_eq!(error.to_string(), message);

        let image = ChapterImageInfo {
            id: PAGE.to_string(),
            extension: "png".to_string(),
            name: None,
        };
        assert_eq!(module.download_image(&image).await.unwrap_err().kind(), kind);
    }
}

#[tokio::test]
async fn test_failed_chapter_keeps_partial_pushes() {
    let (_engine, host) = engine();
    let module = ResultModule::new(Arc::new(FakeModule::new(host, Failure::Message)));

    let mut images = Vec::new();
    let result = module.get_chapter_image(PAGE, &mut images).await;

    assert!(result.is_error());
    assert_eq!(images.len(), 1);
}

#[tokio::test]
async fn test_closing_wrapper_keeps_inner_client_usable() {
    let (engine, host) = engine();
    let inner: Arc<dyn Module> = Arc::new(FakeModule::new(host, Failure::None));
    let wrapper_uuid = Uuid::new_v4();

    let wrapper = ModuleWrapper::new(wrapper_uuid, "Alias", "https://alias.example.com", inner.clone())
        .unwrap();
    assert_ne!(wrapper.client().resource().rid(), inner.client().resource().rid());
    assert_eq!(engine.resource_count(), 2);

    let wrapper = ResultModule::new(Arc::new(wrapper));
    assert_eq!(wrapper.uuid(), wrapper_uuid);
    assert_eq!(wrapper.get_info(PAGE).await.unwrap().manga.title, "One Piece");

    wrapper.close().await.unwrap();
    assert_eq!(engine.resource_count(), 1);

    let inner = ResultModule::new(inner);
    assert_eq!(inner.get_info(PAGE).await.unwrap().manga.title, "One Piece");
    inner.close().await.unwrap();
    assert_eq!(engine.resource_count(), 0);
}

#[tokio::test]
async fn test_module_close_twice_is_an_error() {
    let (_engine, host) = engine();
    let module = ResultModule::new(Arc::new(FakeModule::new(host, Failure::None)));

    module.close().await.unwrap();
    let error = module.close().await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::ResourceError);
}

#[tokio::test]
async fn test_module_map_lookup_and_duplicates() {
    let (engine, host) = engine();
    let first: Arc<dyn Module> = Arc::new(FakeModule::new(host.clone(), Failure::None));
    let uuid = first.uuid();

    let mut map = ModuleMap::new();
    map.push(ResultModule::new(first.clone())).unwrap();

    let alias = ModuleWrapper::new(Uuid::new_v4(), "Alias", "https://alias.example.com", first.clone())
        .unwrap();
    map.push(ResultModule::new(Arc::new(alias))).unwrap();

    let duplicate = ModuleWrapper::new(uuid, "Duplicate", "https://dup.example.com", first).unwrap();
    let error = map.push(ResultModule::new(Arc::new(duplicate))).unwrap_err();
    assert!(matches!(error, ModuleMapError::DuplicateUuid { .. }));

    assert_eq!(map.len(), 2);
    assert_eq!(map.get_by_uuid(uuid).unwrap().name(), "Fake");
    assert_eq!(
        map.get_by_url("https://alias.example.com/manga/1?x=1")
            .unwrap()
            .name(),
        "Alias"
    );
    assert_eq!(map.get_by_url("https://example.com/other").unwrap().uuid(), uuid);
    assert!(map.get_by_url("https://unknown.example.com").is_none());
    assert!(map.get_by_url("not a url").is_none());

    map.close_all().await;
    assert!(map.is_empty());
    // the duplicate wrapper's own client was never registered
    assert_eq!(engine.resource_count(), 1);
}
