use std::fmt;
use std::sync::Arc;

use crate::Result;
use crate::ops::{Host, ResultJson, Rid};

/// Capability table of one resource family: which host ops clone and close
/// handles of that family.
pub struct ResourceFamily {
    pub name: &'static str,
    pub clone: fn(&dyn Host, Rid) -> ResultJson<Rid>,
    pub close: fn(&dyn Host, Rid) -> ResultJson<()>,
}

impl fmt::Debug for ResourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

pub static HTTP_CLIENT: ResourceFamily = ResourceFamily {
    name: "http_client",
    clone: |host, rid| host.http_client_clone(rid),
    close: |host, rid| host.http_client_close(rid),
};

pub static HTTP_RESPONSE: ResourceFamily = ResourceFamily {
    name: "http_response",
    clone: |host, rid| host.http_response_clone(rid),
    close: |host, rid| host.http_response_close(rid),
};

pub static TAB: ResourceFamily = ResourceFamily {
    name: "tab",
    clone: |host, rid| host.tab_clone(rid),
    close: |host, rid| host.tab_close(rid),
};

pub static CHAPTER_TASK: ResourceFamily = ResourceFamily {
    name: "chapter_task",
    clone: |host, rid| host.chapter_task_clone(rid),
    close: |host, rid| host.chapter_task_close(rid),
};

/// A handle to a host-owned object.
///
/// The host keeps a strong count per object. [`Resource::try_clone`] adds a new
/// handle to the same object and [`Resource::close`] drops this handle only; the
/// two must be closed independently. Nothing is tracked here: using a handle
/// after it was closed is answered by the host with a `ResourceError`.
pub struct Resource {
    rid: Rid,
    family: &'static ResourceFamily,
    host: Arc<dyn Host>,
}

impl Resource {
    pub fn new(host: Arc<dyn Host>, rid: Rid, family: &'static ResourceFamily) -> Self {
        Self { rid, family, host }
    }

    pub fn rid(&self) -> Rid {
        self.rid
    }

    pub fn family(&self) -> &'static ResourceFamily {
        self.family
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    #[tracing::instrument(skip(self), fields(family = self.family.name, rid = self.rid))]
    pub fn try_clone(&self) -> Result<Self> {
        let rid = (self.family.clone)(self.host.as_ref(), self.rid).bind(&self.host)?;
        tracing::trace!(clone = rid, "cloned resource");

        Ok(Self::new(self.host.clone(), rid, self.family))
    }

    #[tracing::instrument(skip(self), fields(family = self.family.name, rid = self.rid))]
    pub fn close(&self) -> Result<()> {
        (self.family.close)(self.host.as_ref(), self.rid).bind(&self.host)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("rid", &self.rid)
            .field("family", &self.family)
            .finish()
    }
}
