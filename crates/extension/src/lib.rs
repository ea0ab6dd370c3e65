//! Module-side SDK.
//!
//! Site modules talk to the host runtime only through [`Host`]. Everything the
//! host owns is reached through a [`Resource`] handle, and every host call
//! comes back as a [`Result`] whose error side is an [`Error`] record.

pub mod browser;
pub mod cloudflare;
pub mod common;
pub mod error;
pub mod http;
pub mod module;
pub mod ops;
pub mod prelude;
pub mod registry;
pub mod resource;
pub mod result;
pub mod task;

pub use browser::{Browser, Tab};
pub use cloudflare::{Cloudflare, CloudflareConfig, CloudflareRequest};
pub use error::{Error, Result};
pub use http::{HttpClient, HttpResponse};
pub use module::{Module, ModuleWrapper, ResultModule};
pub use ops::{BrowserConfig, ErrorJson, ErrorKind, Host, ResponseJson, ResultJson, Rid, TabRequest};
pub use registry::{ModuleMap, ModuleMapError};
pub use resource::{Resource, ResourceFamily};
pub use result::{ResultExt, catch_and_return};
pub use task::{ChapterTask, HostChapterTask};

pub use mado_types as types;
