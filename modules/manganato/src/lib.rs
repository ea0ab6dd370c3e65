//! Manganato and the sites sharing its page layout.

use mado_extension::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

pub const MANGANATO: Uuid = Uuid::from_u128(0xfa8bb4d1_ceea_4c8f_a0e9_8c00755f95d4);
pub const MANGANATO_ALIAS: Uuid = Uuid::from_u128(0xd690b8c3_03bb_4129_b245_48aadae9eba9);
pub const MANGAKAKALOT: Uuid = Uuid::from_u128(0x74674292_e13c_4966_99b8_c5e4efd4b583);
pub const MANGAKAKALOTS: Uuid = Uuid::from_u128(0xed4175a3_90e7_4aed_be4b_4f622f3767c6);
pub const MANGABAT: Uuid = Uuid::from_u128(0x2234588a_bb54_4fc6_a279_c7811f2a9733);

const NOT_FOUND: &str = "404 - PAGE NOT FOUND";

/// `Vol.1 Chapter 2.5: Title`, volume and title optional.
static NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:Vol\.(?P<vol>\d+)\s+)?Chapter\s+(?P<ch>[+-]?\d+(?:\.\d+)?)(?:\s*:\s*(?P<title>.*))?")
        .expect("valid chapter name pattern")
});

/// Reader layouts, tried in order until one yields images.
const IMAGE_QUERIES: [(&str, &str); 4] = [
    ("div#vungdoc > img[title]", "src"),
    ("div.vung_doc > img[title]", "src"),
    ("div.container-chapter-reader > img[title]", "src"),
    ("div#vungdoc > img[title]", "data-src"),
];

pub struct Manganato {
    uuid: Uuid,
    name: String,
    domain: String,
    client: HttpClient,
}

impl Manganato {
    pub fn new(host: Arc<dyn Host>, uuid: Uuid, name: &str, domain: &str) -> Self {
        Self {
            uuid,
            name: name.to_string(),
            domain: domain.to_string(),
            client: HttpClient::new(host),
        }
    }

    async fn fetch_document(&self, url: &str) -> eyre::Result<Html> {
        let response = self.client.get(HttpRequest::get(url)).await.throw()?;
        let text = response.text().await;
        response.close().throw()?;

        let doc = Html::parse_document(&text.throw()?);
        self.check_not_found(url, &doc)?;

        Ok(doc)
    }

    fn check_not_found(&self, url: &str, doc: &Html) -> eyre::Result<()> {
        let missing = select_text(doc, "p")?
            .iter()
            .any(|text| text.contains(NOT_FOUND));

        if missing {
            return Err(Error::request_error(self.client.host(), url, "404 PAGE NOT FOUND")).throw();
        }
        Ok(())
    }

    fn parse_info(&self, url: &str, doc: &Html) -> eyre::Result<Manga> {
        let authors = table_links(doc, "Author(s)")?;

        Ok(Manga {
            id: url.to_string(),
            title: select_first_text(doc, "h1")?,
            types: MangaType::Series,
            artists: authors.clone(),
            authors,
            genres: table_links(doc, "Genres")?,
            summary: select(doc, "div.panel-story-info-description")?
                .into_iter()
                .next()
                .and_then(last_text),
            cover_link: select_first_attr_opt(doc, "span.info-image img", "src")?,
        })
    }
}

/// Link texts in the value cell of the info table row labelled `label`.
fn table_links(doc: &Html, label: &str) -> eyre::Result<Vec<String>> {
    let cell = parse_selector("td")?;
    let link = parse_selector("a")?;

    for row in select(doc, "table tr")? {
        let mut cells = row.select(&cell);
        let Some(head) = cells.next() else { continue };

        if element_text(head).contains(label) {
            return Ok(cells
                .next()
                .map(|value| value.select(&link).map(element_text).collect())
                .unwrap_or_default());
        }
    }

    Ok(vec![])
}

fn last_text(element: ElementRef<'_>) -> Option<String> {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .last()
        .map(str::to_string)
}

fn parse_chapter(base_url: &str, link: ElementRef<'_>) -> Option<Chapter> {
    let href = link.attr("href")?;
    let name = element_text(link);

    let mut chapter = Chapter {
        id: make_absolute_url(href, base_url),
        title: Some(name.clone()),
        language: "en".to_string(),
        ..Default::default()
    };

    if let Some(captures) = NAME_REGEX.captures(&name) {
        chapter.volume = captures.name("vol").map(|m| m.as_str().to_string());
        chapter.chapter = captures.name("ch").map(|m| m.as_str().to_string());
        chapter.title = captures
            .name("title")
            .map(|m| m.as_str().trim().to_string())
            .filter(|title| !title.is_empty());
    }

    Some(chapter)
}

#[async_trait]
impl Module for Manganato {
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
        let doc = self.fetch_document(id).await?;
        let manga = self.parse_info(id, &doc)?;

        let chapters = select(&doc, "ul.row-content-chapter > li > a.chapter-name")?
            .into_iter()
            .filter_map(|link| parse_chapter(id, link))
            .collect::<Vec<_>>();
        tracing::debug!(chapters = chapters.len(), "parsed chapter list");

        Ok(MangaAndChapters { manga, chapters })
    }

    async fn get_chapter_image(&self, id: &str, task: &mut dyn ChapterTask) -> eyre::Result<()> {
        let doc = self.fetch_document(id).await?;

        for (query, attr) in IMAGE_QUERIES {
            let images = select_attr(&doc, query, attr)?;
            if images.is_empty() {
                continue;
            }

            for image in images {
                let image = make_absolute_url(&image, id);
                task.push(ChapterImageInfo {
                    extension: url_extension(&image).unwrap_or_else(|| "jpg".to_string()),
                    id: image,
                    name: None,
                });
            }
            break;
        }

        Ok(())
    }

    async fn download_image(&self, image: &ChapterImageInfo) -> eyre::Result<HttpRequest> {
        Ok(HttpRequest::get(image.id.clone()).header("Referer", self.domain.clone()))
    }
}

/// Every Manganato family module. The `manganato.com` entry is an alias of
/// the `chapmanganato.com` reader sharing its parser.
pub fn init_module(host: Arc<dyn Host>) -> mado_extension::Result<Vec<Arc<dyn Module>>> {
    let reader: Arc<dyn Module> = Arc::new(Manganato::new(
        host.clone(),
        MANGANATO,
        "Manganato",
        "https://chapmanganato.com",
    ));
    let alias = ModuleWrapper::new(
        MANGANATO_ALIAS,
        "Manganato",
        "https://manganato.com",
        reader.clone(),
    )?;

    Ok(vec![
        Arc::new(alias),
        reader,
        Arc::new(Manganato::new(
            host.clone(),
            MANGAKAKALOT,
            "MangaKakalot",
            "https://mangakakalot.com",
        )),
        Arc::new(Manganato::new(
            host.clone(),
            MANGAKAKALOTS,
            "MangaKakalots",
            "https://mangakakalots.com",
        )),
        Arc::new(Manganato::new(host, MANGABAT, "MangaBat", "https://m.mangabat.com")),
    ])
}

pub fn init_mado_module(host: Arc<dyn Host>) -> mado_extension::Result<Vec<ResultModule>> {
    Ok(init_module(host)?.into_iter().map(ResultModule::new).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str) -> Chapter {
        let html = format!(r#"<a href="/chapter-1">{name}</a>"#);
        let doc = Html::parse_fragment(&html);
        let link = select_first(&doc, "a").unwrap();
        parse_chapter("https://chapmanganato.com/manga-aa", link).unwrap()
    }

    #[test]
    fn test_chapter_name_with_volume_and_title() {
        let chapter = parse("Vol.3 Chapter 21.5: The Return");
        assert_eq!(chapter.volume.as_deref(), Some("3"));
        assert_eq!(chapter.chapter.as_deref(), Some("21.5"));
        assert_eq!(chapter.title.as_deref(), Some("The Return"));
        assert_eq!(chapter.id, "https://chapmanganato.com/chapter-1");
    }

    #[test]
    fn test_chapter_name_without_pattern_keeps_text() {
        let chapter = parse("Oneshot");
        assert_eq!(chapter.chapter, None);
        assert_eq!(chapter.title.as_deref(), Some("Oneshot"));
    }

    #[test]
    fn test_chapter_name_without_title() {
        let chapter = parse("Chapter 7");
        assert_eq!(chapter.volume, None);
        assert_eq!(chapter.chapter.as_deref(), Some("7"));
        assert_eq!(chapter.title, None);
    }
}
