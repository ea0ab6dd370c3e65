//! Plain data records shared by the host, the module SDK and every site module.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MangaType {
    #[default]
    Series,
    Anthology,
}

/// Manga metadata as reported by a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manga {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub types: MangaType,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub summary: Option<String>,
    pub cover_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Identifier passed back to `get_chapter_image`. Usually the chapter URL.
    pub id: String,
    pub title: Option<String>,
    pub volume: Option<String>,
    pub chapter: Option<String>,
    pub language: String,
    #[serde(default)]
    pub scanlator: Vec<String>,
}

impl fmt::Display for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(volume) = &self.volume {
            parts.push(format!("Vol. {volume}"));
        }
        if let Some(chapter) = &self.chapter {
            parts.push(format!("Chapter {chapter}"));
        }
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            parts.push(title.to_string());
        }

        if parts.is_empty() {
            f.write_str(&self.id)
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MangaAndChapters {
    pub manga: Manga,
    pub chapters: Vec<Chapter>,
}

/// One image of a chapter, as pushed into a chapter task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterImageInfo {
    pub id: String,
    pub extension: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Request descriptor used both for `HttpClient::get` and as the result of
/// `download_image`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<BTreeMap<String, String>>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            header: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.header
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_display_prefers_parsed_fields() {
        let chapter = Chapter {
            id: "https://example.com/ch-1".to_string(),
            title: Some("The Beginning".to_string()),
            volume: Some("1".to_string()),
            chapter: Some("1.5".to_string()),
            language: "en".to_string(),
            scanlator: vec![],
        };
        assert_eq!(chapter.to_string(), "Vol. 1 Chapter 1.5 The Beginning");

        let bare = Chapter {
            id: "https://example.com/ch-2".to_string(),
            ..Default::default()
        };
        assert_eq!(bare.to_string(), "https://example.com/ch-2");
    }

    #[test]
    fn test_request_header_is_omitted_when_empty() {
        let json = serde_json::to_string(&HttpRequest::get("https://example.com")).unwrap();
        assert_eq!(json, r#"{"url":"https://example.com"}"#);

        let request = HttpRequest::get("https://example.com").header("Referer", "https://a.b");
        assert_eq!(
            request.header.unwrap().get("Referer").map(String::as_str),
            Some("https://a.b")
        );
    }
}
