pub use std::sync::Arc;

pub use async_trait::async_trait;
pub use eyre::{OptionExt, WrapErr, eyre};
pub use uuid::Uuid;

pub use crate::common::net::{make_absolute_url, url_extension};
pub use crate::common::scraping::*;
pub use crate::types::{Chapter, ChapterImageInfo, HttpRequest, Manga, MangaAndChapters, MangaType};
pub use crate::{
    Browser, ChapterTask, Cloudflare, CloudflareConfig, Error, Host, HttpClient, HttpResponse, Module,
    ModuleWrapper, ResultExt, ResultModule,
};
