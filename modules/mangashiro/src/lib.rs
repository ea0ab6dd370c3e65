//! Sites built on the MangaShiro WordPress theme. Pages sit behind a
//! Cloudflare challenge, so every page is loaded in a browser tab.

use mado_extension::prelude::*;
use scraper::Html;

pub const ASURASCANS: Uuid = Uuid::from_u128(0x7fa94290_99b7_4bbc_8413_f2d364294224);

const TITLE_XPATH: &str = r#"//h1[contains(@class, "entry-title")] | //div[contains(@class, "notf")]"#;
const READER_XPATH: &str = r#"//*[@id="readerarea"]//img | //div[contains(@class, "notf")]"#;

const IMAGE_QUERIES: [(&str, &str); 2] = [("#readerarea p > img", "src"), ("#readerarea img", "src")];

pub struct MangaShiro {
    uuid: Uuid,
    name: String,
    domain: String,
    reverse_chapter: bool,
    client: HttpClient,
    browser: Browser,
    cloudflare: CloudflareConfig,
}

impl MangaShiro {
    pub fn new(browser: Browser, uuid: Uuid, name: &str, domain: &str) -> Self {
        Self {
            uuid,
            name: name.to_string(),
            domain: domain.to_string(),
            reverse_chapter: false,
            client: HttpClient::new(browser.host().clone()),
            browser,
            cloudflare: CloudflareConfig::default(),
        }
    }

    /// Lists chapters oldest first on sites that show the newest first.
    pub fn reverse_chapter(mut self, reverse: bool) -> Self {
        self.reverse_chapter = reverse;
        self
    }

    pub fn cloudflare(mut self, config: CloudflareConfig) -> Self {
        self.cloudflare = config;
        self
    }

    fn host(&self) -> &Arc<dyn Host> {
        self.client.host()
    }

    /// Loads `url` in a fresh session, released before returning.
    async fn fetch_page(&self, url: &str, xpath: &str) -> eyre::Result<String> {
        let mut session = Cloudflare::with_config(self.browser.clone(), self.cloudflare);
        let content = session.get(url).wait_for_element_by_xpath(xpath).send().await;
        let closed = session.close();

        let content = content.throw()?;
        closed.throw()?;
        Ok(content)
    }

    fn check_not_found(&self, url: &str, doc: &Html) -> eyre::Result<()> {
        let missing = select_text(doc, "title")?
            .iter()
            .any(|title| title.contains("Page Not Found"));

        if missing {
            return Err(Error::request_error(self.host(), url, "404 PAGE NOT FOUND")).throw();
        }
        Ok(())
    }

    fn parse_info(&self, url: &str, content: &str) -> eyre::Result<MangaAndChapters> {
        let doc = Html::parse_document(content);
        self.check_not_found(url, &doc)?;

        let manga = Manga {
            id: url.to_string(),
            title: select_first_text(&doc, "h1.entry-title")?,
            types: MangaType::Series,
            genres: select_text(&doc, ".mgen a")?,
            summary: select_text(&doc, "div[itemprop=description] p")?
                .into_iter()
                .reduce(|acc, line| format!("{acc}\n{line}")),
            cover_link: select_first_attr_opt(&doc, ".thumb img", "src")?,
            ..Default::default()
        };

        let title = parse_selector("span.chapternum")?;
        let mut chapters = select(&doc, "#chapterlist .eph-num > a")?
            .into_iter()
            .filter_map(|link| {
                let href = link.attr("href")?;
                Some(Chapter {
                    id: make_absolute_url(href, url),
                    title: link.select(&title).next().map(element_text),
                    language: "en".to_string(),
                    ..Default::default()
                })
            })
            .collect::<Vec<_>>();

        if self.reverse_chapter {
            chapters.reverse();
        }
        tracing::debug!(chapters = chapters.len(), "parsed chapter list");

        Ok(MangaAndChapters { manga, chapters })
    }

    fn parse_images(&self, url: &str, content: &str) -> eyre::Result<Vec<ChapterImageInfo>> {
        let doc = Html::parse_document(content);
        self.check_not_found(url, &doc)?;

        for (query, attr) in IMAGE_QUERIES {
            let images = select_attr(&doc, query, attr)?;
            if images.is_empty() {
                continue;
            }

            return Ok(images
                .into_iter()
                .map(|image| {
                    let image = make_absolute_url(image.trim(), url);
                    ChapterImageInfo {
                        extension: url_extension(&image).unwrap_or_else(|| "jpg".to_string()),
                        id: image,
                        name: None,
                    }
                })
                .collect());
        }

        Ok(vec![])
    }
}

#[async_trait]
impl Module for MangaShiro {
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
        let content = self.fetch_page(id, TITLE_XPATH).await?;
        self.parse_info(id, &content)
    }

    async fn get_chapter_image(&self, id: &str, task: &mut dyn ChapterTask) -> eyre::Result<()> {
        let content = self.fetch_page(id, READER_XPATH).await?;
        for image in self.parse_images(id, &content)? {
            task.push(image);
        }

        Ok(())
    }

    async fn download_image(&self, image: &ChapterImageInfo) -> eyre::Result<HttpRequest> {
        Ok(HttpRequest::get(image.id.clone()).header("Referer", self.domain.clone()))
    }
}

pub fn init_module(
    browser: Browser,
    cloudflare: CloudflareConfig,
) -> mado_extension::Result<Vec<Arc<dyn Module>>> {
    Ok(vec![Arc::new(
        MangaShiro::new(browser, ASURASCANS, "Asurascans", "https://asurascans.com")
            .reverse_chapter(true)
            .cloudflare(cloudflare),
    )])
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
