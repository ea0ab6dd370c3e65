//! Offline scenarios against canned API responses.

use std::sync::Arc;

use mado_engine::EngineHost;
use mado_engine::testing::StaticExecutor;
use mado_extension::types::ChapterImageInfo;
use mado_extension::{ErrorKind, Host, ResultModule};
use mado_mangadex::{API_URL, COVER_URL, init_mado_module};
use serde_json::json;

const MANGA_ID: &str = "a96676e5-8ae2-425e-b549-7f15dd34a6d8";
const MISSING_ID: &str = "00000000-0000-0000-0000-000000000000";
const CHAPTER_ID: &str = "5ef1c9e0-1f3b-4c44-9a2a-3c5f8f0b7d11";

fn manga_json() -> serde_json::Value {
    json!({
        "result": "ok",
        "data": {
            "id": MANGA_ID,
            "attributes": {
                "title": { "en": "Komi Can't Communicate" },
                "description": { "en": "Komi has a hard time talking." },
                "tags": [
                    { "attributes": { "name": { "en": "Romance" } } },
                    { "attributes": { "name": { "en": "Comedy" } } }
                ],
                "contentRating": "safe",
                "publicationDemographic": "shounen"
            },
            "relationships": [
                { "type": "author", "attributes": { "name": "Oda Tomohito" } },
                { "type": "artist", "attributes": { "name": "Oda Tomohito" } },
                { "type": "cover_art", "attributes": { "fileName": "cover.jpg" } }
            ]
        }
    })
}

fn feed_json() -> serde_json::Value {
    json!({
        "result": "ok",
        "data": [
            {
                "id": CHAPTER_ID,
                "attributes": { "title": "", "volume": "1", "chapter": "1", "translatedLanguage": "en" },
                "relationships": [
                    { "type": "scanlation_group", "attributes": { "name": "Team A" } }
                ]
            },
            {
                "id": "7c0b5b8e-2222-4d1e-8e4f-0a1b2c3d4e5f",
                "attributes": { "title": "Second", "volume": "1", "chapter": "2", "translatedLanguage": "en" }
            }
        ],
        "limit": 500,
        "offset": 0,
        "total": 2
    })
}

fn not_found_json(id: &str) -> serde_json::Value {
    json!({
        "result": "error",
        "errors": [
            { "status": 404, "title": "Not found", "detail": format!("Manga with id {id} not found") }
        ]
    })
}

fn setup(executor: StaticExecutor) -> (Arc<StaticExecutor>, ResultModule) {
    let executor = Arc::new(executor);
    let host: Arc<dyn Host> = Arc::new(EngineHost::new(executor.clone()));
    let module = init_mado_module(host).unwrap().remove(0);
    (executor, module)
}

#[tokio::test]
async fn test_get_info_from_title_url() {
    let executor = StaticExecutor::new()
        .with_json(&format!("{API_URL}/manga/{MANGA_ID}"), 200, manga_json())
        .with_json(&format!("{API_URL}/manga/{MANGA_ID}/feed"), 200, feed_json());
    let (_executor, module) = setup(executor);

    let info = module
        .get_info(&format!("https://mangadex.org/title/{MANGA_ID}/komi-san"))
        .await
        .unwrap();

    assert_eq!(info.manga.id, MANGA_ID);
    assert_eq!(info.manga.title, "Komi Can't Communicate");
    assert_eq!(info.manga.genres, vec!["Romance", "Comedy", "safe", "shounen"]);
    assert_eq!(
        info.manga.cover_link.as_deref(),
        Some(format!("{COVER_URL}/{MANGA_ID}/cover.jpg").as_str())
    );

    assert!(!info.chapters.is_empty());
    let first = &info.chapters[0];
    assert_eq!(first.id, CHAPTER_ID);
    assert_eq!(first.id.len(), 36);
    assert_eq!(first.title, None);
    assert_eq!(first.scanlator, vec!["Team A"]);
}

#[tokio::test]
async fn test_missing_manga_is_unexpected_error() {
    let executor = StaticExecutor::new().with_json(
        &format!("{API_URL}/manga/{MISSING_ID}"),
        404,
        not_found_json(MISSING_ID),
    );
    let (_executor, module) = setup(executor);

    let error = module.get_info(MISSING_ID).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::UnexpectedError);
    assert!(
        error
            .to_string()
            .ends_with(&format!("Manga with id {MISSING_ID} not found"))
    );
}

#[tokio::test]
async fn test_invalid_id_fails_before_any_request() {
    let (executor, module) = setup(StaticExecutor::new());

    let error = module
        .get_info("https://mangadex.org/title/komi-san")
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::InvalidUrl);
    assert_eq!(error.to_string(), "https://mangadex.org/title/komi-san is invalid");
    assert_eq!(executor.request_count(), 0);
}

#[tokio::test]
async fn test_chapter_images() {
    let executor = StaticExecutor::new().with_json(
        &format!("{API_URL}/at-home/server/{CHAPTER_ID}"),
        200,
        json!({
            "result": "ok",
            "baseUrl": "https://uploads.mangadex.org",
            "chapter": { "hash": "abc", "data": ["1.png", "2.jpg"] }
        }),
    );
    let (_executor, module) = setup(executor);

    let mut images: Vec<ChapterImageInfo> = Vec::new();
    module.get_chapter_image(CHAPTER_ID, &mut images).await.unwrap();

    assert_eq!(images.len(), 2);
    assert_eq!(images[0].id, "https://uploads.mangadex.org/data/abc/1.png");
    assert_eq!(images[1].extension, "jpg");

    let request = module.download_image(&images[0]).await.unwrap();
    assert_eq!(request.url, images[0].id);
    assert!(request.header.is_none());
}

#[tokio::test]
async fn test_missing_chapter_pushes_nothing() {
    let executor = StaticExecutor::new().with_json(
        &format!("{API_URL}/at-home/server/{MISSING_ID}"),
        404,
        not_found_json(MISSING_ID),
    );
    let (_executor, module) = setup(executor);

    let mut images: Vec<ChapterImageInfo> = Vec::new();
    let result = module.get_chapter_image(MISSING_ID, &mut images).await;

    assert!(result.is_err());
    assert!(images.is_empty());
}

#[tokio::test]
async fn test_feed_is_paginated() {
    let mut first_page = feed_json();
    first_page["limit"] = json!(1);
    first_page["total"] = json!(2);
    first_page["data"].as_array_mut().unwrap().truncate(1);

    let mut second_page = feed_json();
    second_page["limit"] = json!(1);
    second_page["offset"] = json!(1);
    second_page["total"] = json!(2);
    second_page["data"].as_array_mut().unwrap().remove(0);

    let feed_url = |offset: usize| {
        format!(
            "{API_URL}/manga/{MANGA_ID}/feed?includes[]=author&includes[]=artist&includes[]=cover_art\
             &offset={offset}&limit=500\
             &contentRating[]=safe&contentRating[]=suggestive\
             &contentRating[]=erotica&contentRating[]=pornographic\
             &includes[]=scanlation_group&order[volume]=asc&order[chapter]=asc\
             &translatedLanguage[]=en"
        )
    };

    let executor = StaticExecutor::new()
        .with_json(&format!("{API_URL}/manga/{MANGA_ID}"), 200, manga_json())
        .with_json(&feed_url(0), 200, first_page)
        .with_json(&feed_url(1), 200, second_page);
    let (executor, module) = setup(executor);

    let info = module.get_info(MANGA_ID).await.unwrap();

    assert_eq!(info.chapters.len(), 2);
    assert_eq!(info.chapters[1].title.as_deref(), Some("Second"));
    assert_eq!(executor.request_count(), 3);
}
