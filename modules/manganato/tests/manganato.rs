//! Manganato family against canned pages.

use std::sync::Arc;

use mado_engine::EngineHost;
use mado_engine::testing::StaticExecutor;
use mado_extension::types::ChapterImageInfo;
use mado_extension::{ErrorKind, Host, ModuleMap};
use mado_manganato::{MANGANATO, MANGANATO_ALIAS, init_mado_module};

const MANGA_URL: &str = "https://chapmanganato.com/manga-aa951409";
const CHAPTER_URL: &str = "https://chapmanganato.com/manga-aa951409/chapter-1";

const MANGA_PAGE: &str = r#"
<html><body>
  <div class="panel-story-info">
    <span class="info-image"><img src="https://avt.mkklcdnv6temp.com/cover.jpg"></span>
    <div class="story-info-right">
      <h1>Solo Leveling</h1>
      <table class="variations-tableInfo"><tbody>
        <tr><td class="table-label">Author(s) :</td><td class="table-value"><a href="/a/1">Chugong</a> - <a href="/a/2">Dubu</a></td></tr>
        <tr><td class="table-label">Status :</td><td class="table-value">Completed</td></tr>
        <tr><td class="table-label">Genres :</td><td class="table-value"><a href="/g/1">Action</a> - <a href="/g/2">Fantasy</a></td></tr>
      </tbody></table>
    </div>
    <div class="panel-story-info-description"><h3>Description :</h3>
      10 years ago, after the Gate opened.
    </div>
  </div>
  <ul class="row-content-chapter">
    <li><a class="chapter-name" href="https://chapmanganato.com/manga-aa951409/chapter-2">Vol.1 Chapter 2: Awakening</a></li>
    <li><a class="chapter-name" href="https://chapmanganato.com/manga-aa951409/chapter-1">Chapter 1</a></li>
  </ul>
</body></html>
"#;

const CHAPTER_PAGE: &str = r#"
<html><body>
  <div class="container-chapter-reader">
    <img src="https://v1.mkklcdnv6.com/img/1.jpg" title="page 1">
    <img src="https://v1.mkklcdnv6.com/img/2.png" title="page 2">
    <img src="https://ads.example.com/banner.gif">
  </div>
</body></html>
"#;

const NOT_FOUND_PAGE: &str = r#"
<html><body><div class="panel-not-found"><p>404 - PAGE NOT FOUND</p></div></body></html>
"#;

fn modules(executor: StaticExecutor) -> ModuleMap {
    let host: Arc<dyn Host> = Arc::new(EngineHost::new(Arc::new(executor)));

    let mut map = ModuleMap::new();
    map.extend(init_mado_module(host).unwrap()).unwrap();
    map
}

#[tokio::test]
async fn test_registers_every_site() {
    let map = modules(StaticExecutor::new());

    assert_eq!(map.len(), 5);
    assert_eq!(map.iter().next().unwrap().uuid(), MANGANATO_ALIAS);
    assert_eq!(map.get_by_url(MANGA_URL).unwrap().uuid(), MANGANATO);
    assert_eq!(
        map.get_by_url("https://manganato.com/manga-aa951409")
            .unwrap()
            .uuid(),
        MANGANATO_ALIAS
    );
    assert_eq!(
        map.get_by_url("https://m.mangabat.com/read-ab123").unwrap().name(),
        "MangaBat"
    );
}

#[tokio::test]
async fn test_get_info() {
    let map = modules(StaticExecutor::new().with_response(MANGA_URL, 200, MANGA_PAGE));
    let module = map.get_by_url(MANGA_URL).unwrap();

    let info = module.get_info(MANGA_URL).await.unwrap();

    assert_eq!(info.manga.title, "Solo Leveling");
    assert_eq!(info.manga.authors, vec!["Chugong", "Dubu"]);
    assert_eq!(info.manga.artists, info.manga.authors);
    assert_eq!(info.manga.genres, vec!["Action", "Fantasy"]);
    assert_eq!(
        info.manga.summary.as_deref(),
        Some("10 years ago, after the Gate opened.")
    );
    assert_eq!(
        info.manga.cover_link.as_deref(),
        Some("https://avt.mkklcdnv6temp.com/cover.jpg")
    );

    assert_eq!(info.chapters.len(), 2);
    assert_eq!(info.chapters[0].volume.as_deref(), Some("1"));
    assert_eq!(info.chapters[0].chapter.as_deref(), Some("2"));
    assert_eq!(info.chapters[0].title.as_deref(), Some("Awakening"));
    assert_eq!(info.chapters[1].id, CHAPTER_URL);
}

#[tokio::test]
async fn test_alias_forwards_to_reader() {
    let map = modules(StaticExecutor::new().with_response(MANGA_URL, 200, MANGA_PAGE));
    let alias = map.get_by_uuid(MANGANATO_ALIAS).unwrap();

    let info = alias.get_info(MANGA_URL).await.unwrap();
    assert_eq!(info.manga.title, "Solo Leveling");

    alias.close().await.unwrap();
    let reader = map.get_by_uuid(MANGANATO).unwrap();
    assert!(reader.get_info(MANGA_URL).await.is_ok());
}

#[tokio::test]
async fn test_chapter_images_and_referer() {
    let map = modules(StaticExecutor::new().with_response(CHAPTER_URL, 200, CHAPTER_PAGE));
    let module = map.get_by_uuid(MANGANATO).unwrap();

    let mut images: Vec<ChapterImageInfo> = Vec::new();
    module.get_chapter_image(CHAPTER_URL, &mut images).await.unwrap();

    assert_eq!(images.len(), 2);
    assert_eq!(images[0].extension, "jpg");
    assert_eq!(images[1].extension, "png");

    let request = module.download_image(&images[0]).await.unwrap();
    assert_eq!(request.url, "https://v1.mkklcdnv6.com/img/1.jpg");
    assert_eq!(
        request.header.unwrap().get("Referer").map(String::as_str),
        Some("https://chapmanganato.com")
    );
}

#[tokio::test]
async fn test_not_found_page() {
    let map = modules(
        StaticExecutor::new()
            .with_response(MANGA_URL, 200, NOT_FOUND_PAGE)
            .with_response(CHAPTER_URL, 200, NOT_FOUND_PAGE),
    );
    let module = map.get_by_uuid(MANGANATO).unwrap();

    let error = module.get_info(MANGA_URL).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::RequestError);
    assert_eq!(
        error.to_string(),
        format!("Request error from {MANGA_URL}: 404 PAGE NOT FOUND")
    );

    let mut images: Vec<ChapterImageInfo> = Vec::new();
    let error = module.get_chapter_image(CHAPTER_URL, &mut images).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::RequestError);
    assert!(images.is_empty());
}
