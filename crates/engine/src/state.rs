use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use mado_extension::Rid;
use mado_types::ChapterImageInfo;

use crate::browser::TabExecutor;
use crate::error::{Error, Result};
use crate::http::{HttpExecutor, HttpResponseData};

/// Objects owned by the host. Every handle holds one strong count.
#[derive(Clone)]
pub enum Entry {
    HttpClient(Arc<dyn HttpExecutor>),
    Response(Arc<HttpResponseData>),
    Tab(Arc<TabEntry>),
    ChapterTask(Arc<Mutex<Vec<ChapterImageInfo>>>),
    Error(Arc<Error>),
}

impl Entry {
    fn family(&self) -> &'static str {
        match self {
            Self::HttpClient(_) => "http client",
            Self::Response(_) => "http response",
            Self::Tab(_) => "tab",
            Self::ChapterTask(_) => "chapter task",
            Self::Error(_) => "error",
        }
    }
}

/// Tab shared between handles, closed in the browser when the last handle
/// goes away.
pub struct TabEntry {
    pub tab: Arc<dyn TabExecutor>,
}

impl Drop for TabEntry {
    fn drop(&mut self) {
        tracing::trace!("closing browser tab");
        self.tab.close();
    }
}

pub struct ResourceTable {
    entries: DashMap<Rid, Entry>,
    next_rid: AtomicU32,
}

impl Default for ResourceTable {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! typed_get {
    ($name:ident, $variant:ident, $ty:ty, $family:literal) => {
        pub fn $name(&self, rid: Rid) -> Result<$ty> {
            match self.entries.get(&rid).map(|entry| entry.value().clone()) {
                Some(Entry::$variant(value)) => Ok(value),
                Some(other) => Err(Error::resource(
                    rid,
                    format!("expected {}, found {}", $family, other.family()),
                )),
                None => Err(Error::resource(rid, concat!($family, " not found"))),
            }
        }
    };
}

impl ResourceTable {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_rid: AtomicU32::new(1),
        }
    }

    pub fn push(&self, entry: Entry) -> Rid {
        let rid = self.next_rid.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(rid, family = entry.family(), "resource added");
        self.entries.insert(rid, entry);
        rid
    }

    typed_get!(http_client, HttpClient, Arc<dyn HttpExecutor>, "http client");
    typed_get!(response, Response, Arc<HttpResponseData>, "http response");
    typed_get!(tab, Tab, Arc<TabEntry>, "tab");
    typed_get!(chapter_task, ChapterTask, Arc<Mutex<Vec<ChapterImageInfo>>>, "chapter task");
    typed_get!(error, Error, Arc<Error>, "error");

    /// Adds a second handle to the object behind `rid`. `family` must match
    /// the entry's family.
    pub fn clone_handle(&self, rid: Rid, family: &str) -> Result<Rid> {
        let entry = self.checked(rid, family)?;
        Ok(self.push(entry))
    }

    /// Drops the handle `rid`. The object goes away with its last handle.
    pub fn close(&self, rid: Rid, family: &str) -> Result<()> {
        self.checked(rid, family)?;
        match self.entries.remove(&rid) {
            Some(_) => {
                tracing::trace!(rid, family, "resource closed");
                Ok(())
            }
            None => Err(Error::resource(rid, format!("{family} not found"))),
        }
    }

    fn checked(&self, rid: Rid, family: &str) -> Result<Entry> {
        match self.entries.get(&rid).map(|entry| entry.value().clone()) {
            Some(entry) if entry.family() == family => Ok(entry),
            Some(entry) => Err(Error::resource(
                rid,
                format!("expected {family}, found {}", entry.family()),
            )),
            None => Err(Error::resource(rid, format!("{family} not found"))),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
