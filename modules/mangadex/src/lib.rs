//! MangaDex, read through its public JSON API.

use std::collections::BTreeMap;

use mado_extension::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const UUID: Uuid = Uuid::from_u128(0x07bd7f6b_12a1_48f1_9873_f175d4f76c9a);
pub const NAME: &str = "MangaDex";
pub const DOMAIN: &str = "https://mangadex.org";

pub const API_URL: &str = "https://api.mangadex.org";
pub const COVER_URL: &str = "https://uploads.mangadex.org/covers";
const API_PARAMS: &str = "includes[]=author&includes[]=artist&includes[]=cover_art";
const FEED_LIMIT: usize = 500;

static REGEX_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("valid id pattern")
});

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Deserialize)]
struct Relationship {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    attributes: Option<RelationshipAttributes>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RelationshipAttributes {
    name: Option<String>,
    file_name: Option<String>,
}

#[derive(Deserialize)]
struct MangaResponse {
    data: MangaData,
}

#[derive(Deserialize)]
struct MangaData {
    attributes: MangaAttributes,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MangaAttributes {
    #[serde(default)]
    title: Value,
    #[serde(default)]
    description: Value,
    #[serde(default)]
    tags: Vec<Tag>,
    content_rating: Option<String>,
    publication_demographic: Option<String>,
}

#[derive(Deserialize)]
struct Tag {
    attributes: TagAttributes,
}

#[derive(Deserialize)]
struct TagAttributes {
    #[serde(default)]
    name: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct FeedResponse {
    data: Vec<FeedChapter>,
    limit: usize,
    total: usize,
}

#[derive(Deserialize)]
struct FeedChapter {
    id: String,
    attributes: ChapterAttributes,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChapterAttributes {
    title: Option<String>,
    volume: Option<String>,
    chapter: Option<String>,
    #[serde(default)]
    translated_language: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtHomeResponse {
    base_url: String,
    chapter: AtHomeChapter,
}

#[derive(Deserialize)]
struct AtHomeChapter {
    hash: String,
    data: Vec<String>,
}

/// Localized string: English, then Japanese, then whatever comes first.
fn localized(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => ["en", "ja"]
            .iter()
            .find_map(|lang| map.get(*lang))
            .or_else(|| map.values().next())
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::Array(values) => values.first().and_then(localized),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn related<'a>(relationships: &'a [Relationship], kind: &'a str) -> impl Iterator<Item = &'a RelationshipAttributes> {
    relationships
        .iter()
        .filter(move |it| it.kind == kind)
        .filter_map(|it| it.attributes.as_ref())
}

fn related_names(relationships: &[Relationship], kind: &str) -> Vec<String> {
    related(relationships, kind)
        .filter_map(|it| it.name.clone())
        .collect()
}

pub struct MangaDex {
    client: HttpClient,
}

impl MangaDex {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            client: HttpClient::new(host),
        }
    }

    fn host(&self) -> &Arc<dyn Host> {
        self.client.host()
    }

    /// Fetches `url` and decodes it, turning an API error payload into an
    /// `UnexpectedError` carrying every error detail.
    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> eyre::Result<T> {
        let response = self.client.get(HttpRequest::get(url)).await.throw()?;
        let json = response.json::<Value>().await;
        response.close().throw()?;
        let json = json.throw()?;

        if json.get("result").and_then(Value::as_str) == Some("error") {
            let errors: Vec<ApiError> = json
                .get("errors")
                .cloned()
                .map(serde_json::from_value::<Vec<ApiError>>)
                .transpose()
                .unwrap_or_default()
                .unwrap_or_default();
            let message = errors
                .into_iter()
                .filter_map(|it| it.detail)
                .collect::<Vec<_>>()
                .join(",");

            return Err(Error::unexpected_error(self.host(), url, &message)).throw();
        }

        serde_json::from_value(json)
            .map_err(|e| Error::unexpected_error(self.host(), url, &format!("unexpected shape: {e}")))
            .throw()
    }

    async fn get_manga_info(&self, id: &str) -> eyre::Result<Manga> {
        let url = format!("{API_URL}/manga/{id}?{API_PARAMS}");
        let response: MangaResponse = self.fetch(&url).await?;
        let data = response.data;
        let attributes = data.attributes;

        let mut genres = attributes
            .tags
            .into_iter()
            .filter_map(|tag| tag.attributes.name.get("en").cloned())
            .collect::<Vec<_>>();
        genres.extend(attributes.content_rating);
        genres.extend(attributes.publication_demographic);

        let cover_link = related(&data.relationships, "cover_art")
            .find_map(|it| it.file_name.as_deref())
            .map(|file_name| format!("{COVER_URL}/{id}/{file_name}"));

        Ok(Manga {
            id: id.to_string(),
            title: localized(&attributes.title).unwrap_or_default(),
            types: MangaType::Series,
            authors: related_names(&data.relationships, "author"),
            artists: related_names(&data.relationships, "artist"),
            genres,
            summary: localized(&attributes.description),
            cover_link,
        })
    }

    async fn get_chapter_info(&self, id: &str) -> eyre::Result<Vec<Chapter>> {
        let mut chapters = Vec::new();
        let mut offset = 0;

        loop {
            let url = format!(
                "{API_URL}/manga/{id}/feed?{API_PARAMS}&offset={offset}&limit={FEED_LIMIT}\
                 &contentRating[]=safe&contentRating[]=suggestive\
                 &contentRating[]=erotica&contentRating[]=pornographic\
                 &includes[]=scanlation_group&order[volume]=asc&order[chapter]=asc\
                 &translatedLanguage[]=en"
            );
            let feed: FeedResponse = self.fetch(&url).await?;
            let page_len = feed.data.len();

            chapters.extend(feed.data.into_iter().map(|it| Chapter {
                scanlator: related_names(&it.relationships, "scanlation_group"),
                id: it.id,
                title: it.attributes.title.filter(|t| !t.is_empty()),
                volume: it.attributes.volume,
                chapter: it.attributes.chapter,
                language: it.attributes.translated_language,
            }));

            offset += feed.limit.max(page_len);
            tracing::debug!(offset, total = feed.total, "fetched chapter feed page");

            if page_len == 0 || offset >= feed.total {
                break;
            }
        }

        Ok(chapters)
    }
}

#[async_trait]
impl Module for MangaDex {
    fn uuid(&self) -> Uuid {
        UUID
    }

    fn name(&self) -> &str {
        NAME
    }

    fn domain(&self) -> &str {
        DOMAIN
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    async fn get_info(&self, id: &str) -> eyre::Result<MangaAndChapters> {
        let Some(manga_id) = REGEX_ID.find(id).map(|m| m.as_str().to_string()) else {
            return Err(Error::invalid_url(self.host(), id)).throw();
        };

        let manga = self.get_manga_info(&manga_id).await?;
        let chapters = self.get_chapter_info(&manga_id).await?;

        Ok(MangaAndChapters { manga, chapters })
    }

    async fn get_chapter_image(&self, id: &str, task: &mut dyn ChapterTask) -> eyre::Result<()> {
        let url = format!("{API_URL}/at-home/server/{id}");
        let response: AtHomeResponse = self.fetch(&url).await?;
        let base_url = response.base_url.trim_end_matches('/');

        for file in response.chapter.data {
            let id = format!("{base_url}/data/{}/{file}", response.chapter.hash);
            task.push(ChapterImageInfo {
                extension: url_extension(&id).unwrap_or_else(|| "png".to_string()),
                id,
                name: None,
            });
        }

        Ok(())
    }

    async fn download_image(&self, image: &ChapterImageInfo) -> eyre::Result<HttpRequest> {
        Ok(HttpRequest::get(image.id.clone()))
    }
}

pub fn init_module(host: Arc<dyn Host>) -> mado_extension::Result<Vec<Arc<dyn Module>>> {
    Ok(vec![Arc::new(MangaDex::new(host))])
}

pub fn init_mado_module(host: Arc<dyn Host>) -> mado_extension::Result<Vec<ResultModule>> {
    Ok(init_module(host)?.into_iter().map(ResultModule::new).collect())
}
