use std::sync::Arc;

use mado_types::ChapterImageInfo;

use crate::ops::Host;
use crate::resource::{CHAPTER_TASK, Resource};
use crate::error::Error;
use crate::Result;

/// Sink for the images of a chapter, in reading order.
pub trait ChapterTask: Send {
    fn push(&mut self, image: ChapterImageInfo);
}

impl ChapterTask for Vec<ChapterImageInfo> {
    fn push(&mut self, image: ChapterImageInfo) {
        Vec::push(self, image);
    }
}

/// Chapter task accumulated inside the host.
///
/// [`ChapterTask::push`] cannot fail, so a push the host rejects is kept as
/// [`HostChapterTask::failure`] instead. Only the first rejection is kept;
/// later ones are logged and released. Use [`HostChapterTask::try_push`] to
/// see every failure.
#[derive(Debug)]
pub struct HostChapterTask {
    resource: Resource,
    failure: Option<Error>,
}

impl HostChapterTask {
    pub fn new(host: Arc<dyn Host>) -> Result<Self> {
        let rid = host.chapter_task_new().bind(&host)?;
        Ok(Self {
            resource: Resource::new(host, rid, &CHAPTER_TASK),
            failure: None,
        })
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn try_push(&self, image: ChapterImageInfo) -> Result<()> {
        let host = self.resource.host();
        host.chapter_task_add(self.resource.rid(), image).bind(host)
    }

    /// Everything pushed so far, through any handle to this task.
    pub fn to_array(&self) -> Result<Vec<ChapterImageInfo>> {
        let host = self.resource.host();
        host.chapter_task_to_array(self.resource.rid()).bind(host)
    }

    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            resource: self.resource.try_clone()?,
            failure: None,
        })
    }

    /// First push the host rejected, if any.
    pub fn failure(&self) -> Option<&Error> {
        self.failure.as_ref()
    }

    /// Hands the first rejected push over to the caller, who then owns its
    /// record.
    pub fn take_failure(&mut self) -> Option<Error> {
        self.failure.take()
    }

    /// Closes the task. A kept push failure is released with it.
    pub fn close(&mut self) -> Result<()> {
        if let Some(failure) = self.failure.take() {
            failure.release();
        }
        self.resource.close()
    }
}

impl ChapterTask for HostChapterTask {
    fn push(&mut self, image: ChapterImageInfo) {
        if let Err(e) = self.try_push(image) {
            tracing::warn!(task = self.resource.rid(), "failed to push chapter image: {e}");
            match self.failure {
                Some(_) => e.release(),
                None => self.failure = Some(e),
            }
        }
    }
}
