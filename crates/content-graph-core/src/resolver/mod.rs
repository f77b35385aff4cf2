//! Entity resolution over a [`RecordStore`] for one request.

mod credits;
mod hierarchy;
mod media;
mod metadata;
mod sets;

use serde::{Deserialize, Serialize};

use crate::context::RequestContext;
use crate::model::{ObjectKind, ResolvedObject};
use crate::record::Record;
use crate::store::RecordStore;
use crate::GraphError;

pub use credits::{dedup_credits, PersonWithCredits};
pub use hierarchy::{TaxonomyField, TaxonomyListing};
pub use sets::SetQuery;

/// Identifies a root object by uid or, failing that, external id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct ObjectLookup {
    pub uid: Option<String>,
    pub external_id: Option<String>,
}

impl ObjectLookup {
    #[must_use]
    pub fn uid(uid: impl Into<String>) -> Self {
        Self { uid: Some(uid.into()), external_id: None }
    }

    #[must_use]
    pub fn external_id(external_id: impl Into<String>) -> Self {
        Self { uid: None, external_id: Some(external_id.into()) }
    }

    /// The uid if present, else the external id.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.uid.as_deref().or(self.external_id.as_deref())
    }
}

/// Borrowed store plus request context. Cheap to build; one per request.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    store: &'a RecordStore,
    ctx: &'a RequestContext,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(store: &'a RecordStore, ctx: &'a RequestContext) -> Self {
        Self { store, ctx }
    }

    #[must_use]
    pub fn store(&self) -> &'a RecordStore {
        self.store
    }

    #[must_use]
    pub fn context(&self) -> &'a RequestContext {
        self.ctx
    }

    /// Resolve a media-collection record according to its discriminator.
    ///
    /// `Ok(None)` means the object is out of budget or not visible to the request.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownKind`] when the discriminator names no known kind.
    pub fn resolve_media(
        &self,
        record: &'a Record,
        depth: usize,
    ) -> Result<Option<ResolvedObject>, GraphError> {
        let Some(kind) = record.object_kind() else {
            return Err(GraphError::UnknownKind {
                record_id: record.id.clone(),
                discriminator: record.discriminator().unwrap_or_default().to_string(),
            });
        };
        let resolved = match kind {
            ObjectKind::Movie => self.movie(record, depth).map(ResolvedObject::Movie),
            ObjectKind::Episode => self.episode(record, depth).map(ResolvedObject::Episode),
            ObjectKind::Season => self.season(record, depth).map(ResolvedObject::Season),
            ObjectKind::Brand => self.brand(record, depth).map(ResolvedObject::Brand),
            ObjectKind::LiveStream => {
                self.live_stream(record, depth).map(ResolvedObject::LiveStream)
            }
            ObjectKind::Article => self.article(record, depth).map(ResolvedObject::Article),
            ObjectKind::Set => {
                let target = self.store.resolve_set_reference(&record.id).unwrap_or(record);
                self.set(target, depth).map(ResolvedObject::Set)
            }
            other => {
                return Err(GraphError::Query(format!(
                    "{} records cannot be resolved as media",
                    other.as_str()
                )))
            }
        };
        Ok(resolved)
    }

    /// Like [`Resolver::resolve_media`] for list contexts: errors are logged and skipped.
    #[must_use]
    pub fn resolve_media_lossy(&self, record: &'a Record, depth: usize) -> Option<ResolvedObject> {
        match self.resolve_media(record, depth) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::warn!(
                    record_id = %record.id,
                    error = %err,
                    "skipping unresolvable media record"
                );
                None
            }
        }
    }

    fn lookup_media(&self, lookup: &ObjectLookup) -> Option<&'a Record> {
        self.store.media_by_lookup(lookup.uid.as_deref(), lookup.external_id.as_deref())
    }

    /// Root lookup of a media object of `kind`. A record of another kind is not a match.
    #[must_use]
    pub fn get_media(&self, kind: ObjectKind, lookup: &ObjectLookup) -> Option<ResolvedObject> {
        let record = self.lookup_media(lookup)?;
        if record.object_kind() != Some(kind) {
            return None;
        }
        self.resolve_media_lossy(record, 0)
    }

    /// Every visible root object of `kind`, in store order.
    #[must_use]
    pub fn list_by_kind(&self, kind: ObjectKind) -> Vec<ResolvedObject> {
        match kind {
            ObjectKind::Article => {
                self.list_articles().into_iter().map(ResolvedObject::Article).collect()
            }
            ObjectKind::Set => self
                .store
                .sets
                .iter()
                .filter_map(|set| self.set(set, 0))
                .map(ResolvedObject::Set)
                .collect(),
            _ => self
                .store
                .media_objects
                .iter()
                .filter(|record| record.object_kind() == Some(kind))
                .filter_map(|record| self.resolve_media_lossy(record, 0))
                .collect(),
        }
    }
}
