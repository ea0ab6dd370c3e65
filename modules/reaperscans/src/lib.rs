//! ReaperScans. The series page paginates its chapter list and every page
//! sits behind a Cloudflare challenge.

use mado_extension::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

pub const UUID: Uuid = Uuid::from_u128(0xbe1e2e81_5e6a_45fc_a843_ebc600245a27);
pub const NAME: &str = "ReaperScans";
pub const DOMAIN: &str = "https://reaperscans.com";

const CHAPTER_XPATH: &str = r#"//div[contains(@class, "mt-6")]//ul[@role="list"]//a | //div//div[contains(text(), "404")]"#;
const CHAPTER_QUERY: &str = r#"div.mt-6 ul[role="list"] a"#;
const READER_SELECTOR: &str = "p.py-4";

static CHAPTER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Chapter (?P<ch>[+-]?\d+(?:\.\d+)?)").expect("valid chapter pattern"));

pub struct ReaperScans {
    client: HttpClient,
    browser: Browser,
    cloudflare: CloudflareConfig,
}

/// What one page of the series view holds.
struct SeriesPage {
    manga: Manga,
    chapters: Vec<Chapter>,
    pages: usize,
}

impl ReaperScans {
    pub fn new(browser: Browser, cloudflare: CloudflareConfig) -> Self {
        Self {
            client: HttpClient::new(browser.host().clone()),
            browser,
            cloudflare,
        }
    }

    fn host(&self) -> &Arc<dyn Host> {
        self.client.host()
    }

    fn check_not_found(&self, url: &str, doc: &Html) -> eyre::Result<()> {
        let missing = select(doc, "div")?.into_iter().any(|div| {
            div.children()
                .filter_map(|node| node.value().as_text())
                .any(|text| text.contains("404"))
        });

        if missing {
            return Err(Error::request_error(self.host(), url, "404 PAGE NOT FOUND")).throw();
        }
        Ok(())
    }

    fn parse_series(&self, url: &str, content: &str) -> eyre::Result<SeriesPage> {
        let doc = Html::parse_document(content);
        self.check_not_found(url, &doc)?;

        let manga = Manga {
            id: url.to_string(),
            title: select_first_text(&doc, "div.container h1")?,
            types: MangaType::Series,
            summary: select_text(&doc, r#"section div[aria-label="card"] p"#)?
                .into_iter()
                .next(),
            cover_link: select_first_attr_opt(&doc, "div.overflow-hidden > img", "src")?,
            ..Default::default()
        };

        let chapters = select(&doc, CHAPTER_QUERY)?
            .into_iter()
            .filter_map(|link| parse_chapter(url, link))
            .collect();

        // The bar ends with a "next" button, so the last page is the one before it.
        let pages = select(&doc, "span.z-0 > span")?
            .into_iter()
            .rev()
            .nth(1)
            .and_then(|span| span.text().collect::<String>().trim().parse().ok())
            .unwrap_or(1);

        Ok(SeriesPage {
            manga,
            chapters,
            pages,
        })
    }

    fn parse_images(&self, url: &str, content: &str) -> eyre::Result<Vec<ChapterImageInfo>> {
        let doc = Html::parse_document(content);
        self.check_not_found(url, &doc)?;

        Ok(select_attr(&doc, "img.max-w-full", "src")?
            .into_iter()
            .map(|image| {
                let image = make_absolute_url(image.trim(), url);
                ChapterImageInfo {
                    extension: url_extension(&image).unwrap_or_else(|| "jpg".to_string()),
                    id: image,
                    name: None,
                }
            })
            .collect())
    }

    async fn get_info_in(&self, session: &mut Cloudflare, url: &str) -> eyre::Result<MangaAndChapters> {
        let content = session
            .get(url)
            .wait_for_element_by_xpath(CHAPTER_XPATH)
            .send()
            .await
            .throw()?;
        let SeriesPage {
            manga,
            mut chapters,
            pages,
        } = self.parse_series(url, &content)?;
        tracing::debug!(pages, "parsed first series page");

        let base = url.split_once('?').map_or(url, |(base, _)| base);
        for page in 2..=pages {
            let page_url = format!("{base}?page={page}");
            let content = session
                .get(&page_url)
                .wait_for_element_by_xpath(CHAPTER_XPATH)
                .send()
                .await
                .throw()?;
            chapters.extend(self.parse_series(&page_url, &content)?.chapters);
        }

        chapters.reverse();
        Ok(MangaAndChapters { manga, chapters })
    }
}

fn parse_chapter(base_url: &str, link: ElementRef<'_>) -> Option<Chapter> {
    let href = link.attr("href")?;
    let paragraph = parse_selector("p").ok()?;
    let name = link.select(&paragraph).next().map(element_text)?;

    let mut chapter = Chapter {
        id: make_absolute_url(href, base_url),
        language: "en".to_string(),
        ..Default::default()
    };
    match CHAPTER_REGEX.captures(&name).and_then(|c| c.name("ch")) {
        Some(number) => chapter.chapter = Some(number.as_str().to_string()),
        None => chapter.title = Some(name),
    }

    Some(chapter)
}

#[async_trait]
impl Module for ReaperScans {
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
        let mut session = Cloudflare::with_config(self.browser.clone(), self.cloudflare);
        let info = self.get_info_in(&mut session, id).await;
        let closed = session.close();

        let info = info?;
        closed.throw()?;
        Ok(info)
    }

    async fn get_chapter_image(&self, id: &str, task: &mut dyn ChapterTask) -> eyre::Result<()> {
        let mut session = Cloudflare::with_config(self.browser.clone(), self.cloudflare);
        let content = session.get(id).wait_for_element(READER_SELECTOR).send().await;
        let closed = session.close();

        let content = content.throw()?;
        closed.throw()?;
        for image in self.parse_images(id, &content)? {
            task.push(image);
        }

        Ok(())
    }

    async fn download_image(&self, image: &ChapterImageInfo) -> eyre::Result<HttpRequest> {
        Ok(HttpRequest::get(image.id.clone()).header("Referer", DOMAIN))
    }
}

pub fn init_module(
    browser: Browser,
    cloudflare: CloudflareConfig,
) -> mado_extension::Result<Vec<Arc<dyn Module>>> {
    Ok(vec![Arc::new(ReaperScans::new(browser, cloudflare))])
}

pub fn init_mado_module(
    browser: Browser,
    cloudflare: CloudflareConfig,
) -> mado_extension::Result<Vec<ResultModule>> {
    Ok(init_module(browser, cloudflare)?
        .into_iter()
        .map(ResultModule::new)
        .collect())
}
