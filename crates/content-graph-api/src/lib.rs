use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use content_graph_core::model::{
    Article, Brand, CallToAction, Genre, Person, Season, SkylarkSet, Tag,
};
use content_graph_core::resolver::{
    ObjectLookup, PersonWithCredits, SetQuery, TaxonomyField, TaxonomyListing,
};
use content_graph_core::{
    ObjectKind, RecordStore, RequestContext, ResolvedObject, Resolver, SearchResults,
    DEFAULT_SEARCH_LIMIT,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const API_CONTRACT_VERSION: &str = "api.v1";

/// Envelope for list entry points. Lists are never paginated.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListResponse<T> {
    pub objects: Vec<T>,
    pub count: usize,
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
}

impl<T> ListResponse<T> {
    #[must_use]
    pub fn new(objects: Vec<T>) -> Self {
        let count = objects.len();
        Self { objects, count, has_next_page: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub api_contract_version: String,
    pub snapshot_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub loaded_at: OffsetDateTime,
    pub collections: BTreeMap<String, usize>,
}

/// Read-only entry points over one loaded snapshot. Clones share the store.
#[derive(Debug, Clone)]
pub struct ContentGraphApi {
    store: Arc<RecordStore>,
    loaded_at: OffsetDateTime,
}

impl ContentGraphApi {
    /// Load a snapshot export from disk.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or is not a valid snapshot.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        let store = RecordStore::from_json_bytes(&bytes)
            .with_context(|| format!("failed to load snapshot {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            snapshot_id = store.snapshot_id(),
            media_objects = store.media_objects.len(),
            sets = store.sets.len(),
            people = store.people.len(),
            articles = store.articles.len(),
            "snapshot loaded"
        );
        Ok(Self::from_store(store))
    }

    #[must_use]
    pub fn from_store(store: RecordStore) -> Self {
        Self::from_shared(Arc::new(store))
    }

    #[must_use]
    pub fn from_shared(store: Arc<RecordStore>) -> Self {
        Self { store, loaded_at: OffsetDateTime::now_utc() }
    }

    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    #[must_use]
    pub fn resolver<'a>(&'a self, ctx: &'a RequestContext) -> Resolver<'a> {
        Resolver::new(&self.store, ctx)
    }

    #[must_use]
    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            api_contract_version: API_CONTRACT_VERSION.to_string(),
            snapshot_id: self.store.snapshot_id().to_string(),
            loaded_at: self.loaded_at,
            collections: self
                .store
                .collection_counts()
                .into_iter()
                .map(|(name, count)| (name.to_string(), count))
                .collect(),
        }
    }

    /// Root lookup of any object kind that has a root entry point.
    ///
    /// # Errors
    /// Returns an error for kinds that are only reachable through a parent object.
    pub fn get_object(
        &self,
        ctx: &RequestContext,
        kind: ObjectKind,
        lookup: &ObjectLookup,
    ) -> Result<Option<ResolvedObject>> {
        let resolver = self.resolver(ctx);
        let key = lookup.key();
        let found = match kind {
            kind if kind.is_media() => resolver.get_media(kind, lookup),
            ObjectKind::Article => resolver
                .get_article(lookup.uid.as_deref(), lookup.external_id.as_deref())
                .map(ResolvedObject::Article),
            ObjectKind::Set => key
                .and_then(|id| resolver.get_set(id, SetQuery::default()))
                .map(ResolvedObject::Set),
            ObjectKind::Person => {
                key.and_then(|id| resolver.get_person(id)).map(ResolvedObject::Person)
            }
            ObjectKind::Genre => {
                key.and_then(|id| resolver.get_genre(id)).map(ResolvedObject::Genre)
            }
            ObjectKind::Tag => key.and_then(|id| resolver.get_tag(id)).map(ResolvedObject::Tag),
            ObjectKind::CallToAction => {
                key.and_then(|id| resolver.get_call_to_action(id)).map(ResolvedObject::CallToAction)
            }
            other => return Err(anyhow!("{} objects have no root lookup", other.as_str())),
        };
        Ok(found)
    }

    #[must_use]
    pub fn get_article(&self, ctx: &RequestContext, lookup: &ObjectLookup) -> Option<Article> {
        self.resolver(ctx).get_article(lookup.uid.as_deref(), lookup.external_id.as_deref())
    }

    #[must_use]
    pub fn get_person(&self, ctx: &RequestContext, id: &str) -> Option<Person> {
        self.resolver(ctx).get_person(id)
    }

    #[must_use]
    pub fn get_call_to_action(&self, ctx: &RequestContext, id: &str) -> Option<CallToAction> {
        self.resolver(ctx).get_call_to_action(id)
    }

    #[must_use]
    pub fn get_genre(&self, ctx: &RequestContext, id: &str) -> Option<Genre> {
        self.resolver(ctx).get_genre(id)
    }

    #[must_use]
    pub fn get_tag(&self, ctx: &RequestContext, id: &str) -> Option<Tag> {
        self.resolver(ctx).get_tag(id)
    }

    #[must_use]
    pub fn list_by_kind(
        &self,
        ctx: &RequestContext,
        kind: ObjectKind,
    ) -> ListResponse<ResolvedObject> {
        ListResponse::new(self.resolver(ctx).list_by_kind(kind))
    }

    #[must_use]
    pub fn list_genres(&self, ctx: &RequestContext) -> ListResponse<Genre> {
        ListResponse::new(self.resolver(ctx).list_genres())
    }

    #[must_use]
    pub fn list_articles(&self, ctx: &RequestContext) -> ListResponse<Article> {
        ListResponse::new(self.resolver(ctx).list_articles())
    }

    /// A genre or tag plus the objects of `kind` linked to it.
    #[must_use]
    pub fn list_by_metadata(
        &self,
        ctx: &RequestContext,
        field: TaxonomyField,
        id: &str,
        kind: ObjectKind,
    ) -> Option<TaxonomyListing> {
        self.resolver(ctx).list_by_taxonomy(field, id, kind)
    }

    #[must_use]
    pub fn get_set(&self, ctx: &RequestContext, id: &str, query: SetQuery) -> Option<SkylarkSet> {
        self.resolver(ctx).get_set(id, query)
    }

    #[must_use]
    pub fn search(
        &self,
        ctx: &RequestContext,
        query: &str,
        limit: Option<usize>,
    ) -> SearchResults {
        self.resolver(ctx).search(query, limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
    }

    #[must_use]
    pub fn season_with_episodes(
        &self,
        ctx: &RequestContext,
        lookup: &ObjectLookup,
    ) -> Option<Season> {
        self.resolver(ctx).season_with_episodes(lookup)
    }

    #[must_use]
    pub fn brand_with_seasons(
        &self,
        ctx: &RequestContext,
        lookup: &ObjectLookup,
    ) -> Option<Brand> {
        self.resolver(ctx).brand_with_seasons(lookup)
    }

    #[must_use]
    pub fn person_credits(
        &self,
        ctx: &RequestContext,
        person_id: &str,
    ) -> Option<PersonWithCredits> {
        self.resolver(ctx).person_credits(person_id)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use content_graph_core::RequestedDimensions;
    use serde_json::json;

    use super::*;

    fn fixture_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/catalog.json")
    }

    fn fixture_api() -> Result<ContentGraphApi> {
        ContentGraphApi::open(&fixture_path())
    }

    #[test]
    fn open_reports_snapshot_fingerprint_and_counts() -> Result<()> {
        let api = fixture_api()?;
        let info = api.info();
        assert_eq!(info.api_contract_version, API_CONTRACT_VERSION);
        assert!(info.snapshot_id.starts_with("sha256:"));
        assert_eq!(info.snapshot_id.len(), "sha256:".len() + 64);
        assert_eq!(info.collections.get("media_objects"), Some(&13));
        assert_eq!(info.collections.get("sets"), Some(&9));

        let reopened = fixture_api()?;
        assert_eq!(reopened.info().snapshot_id, info.snapshot_id);
        Ok(())
    }

    #[test]
    fn open_fails_for_missing_or_invalid_files() {
        let missing = ContentGraphApi::open(Path::new("/nonexistent/catalog.json"));
        let Err(err) = missing else {
            panic!("missing snapshot should fail");
        };
        assert!(err.to_string().contains("failed to read snapshot"));

        let path = std::env::temp_dir()
            .join(format!("content-graph-invalid-{}.json", std::process::id()));
        std::fs::write(&path, b"{ nope").unwrap_or_else(|err| panic!("write temp file: {err}"));
        let invalid = ContentGraphApi::open(&path);
        let _ = std::fs::remove_file(&path);
        assert!(invalid.is_err());
    }

    #[test]
    fn get_object_routes_every_root_kind() -> Result<()> {
        let api = fixture_api()?;
        let ctx = RequestContext::new();

        let movie = api.get_object(&ctx, ObjectKind::Movie, &ObjectLookup::uid("m1"))?;
        assert_eq!(movie.as_ref().and_then(ResolvedObject::uid), Some("m1"));
        let set =
            api.get_object(&ctx, ObjectKind::Set, &ObjectLookup::external_id("rail-sci-fi"))?;
        assert_eq!(set.as_ref().and_then(ResolvedObject::uid), Some("set-scifi"));
        let person = api.get_object(&ctx, ObjectKind::Person, &ObjectLookup::uid("p2"))?;
        assert_eq!(person.map(|object| object.kind()), Some(ObjectKind::Person));
        assert!(api.get_object(&ctx, ObjectKind::Movie, &ObjectLookup::uid("nope"))?.is_none());
        assert!(api.get_object(&ctx, ObjectKind::Credit, &ObjectLookup::uid("c1")).is_err());
        Ok(())
    }

    #[test]
    fn list_responses_carry_count_and_no_next_page() -> Result<()> {
        let api = fixture_api()?;
        let ctx = RequestContext::new();
        let movies = api.list_by_kind(&ctx, ObjectKind::Movie);
        assert_eq!(movies.count, 3);

        let value = serde_json::to_value(api.list_genres(&ctx))?;
        assert_eq!(value["count"], json!(2));
        assert_eq!(value["hasNextPage"], json!(false));
        assert_eq!(value["objects"][0]["__typename"], json!("Genre"));
        assert_eq!(api.list_articles(&ctx).count, 1);
        Ok(())
    }

    #[test]
    fn request_context_flows_into_every_entry_point() -> Result<()> {
        let api = fixture_api()?;
        let ctx = RequestContext::from_headers([
            ("X-Language", "pt-PT"),
            ("x-sl-dimension-customer-types", "premium"),
        ]);

        let movie = api.get_object(&ctx, ObjectKind::Movie, &ObjectLookup::uid("m1"))?;
        let value = serde_json::to_value(movie)?;
        assert_eq!(value["title"], json!("Viagem Estelar"));
        assert_eq!(value["availability"]["objects"][0]["uid"], json!("av-premium"));

        let standard =
            RequestContext::new().with_dimensions(RequestedDimensions::new("standard", "", ""));
        let hidden = api.get_object(&standard, ObjectKind::Movie, &ObjectLookup::uid("m1"))?;
        assert!(hidden.is_none());
        let listing =
            api.list_by_metadata(&standard, TaxonomyField::Genre, "g1", ObjectKind::Movie);
        assert_eq!(listing.map(|listing| listing.content.count), Some(1));
        Ok(())
    }

    #[test]
    fn supplementary_entry_points_resolve_fixture_objects() -> Result<()> {
        let api = fixture_api()?;
        let ctx = RequestContext::new();

        let search = api.search(&ctx, "spider-man", None);
        assert_eq!(search.total_count, 2);
        assert_eq!(api.search(&ctx, "spider-man", Some(1)).objects.len(), 1);

        let season = api.season_with_episodes(&ctx, &ObjectLookup::uid("s1"));
        let episodes = season.and_then(|season| season.episodes);
        assert_eq!(episodes.map(|episodes| episodes.objects.len()), Some(3));
        let brand = api.brand_with_seasons(&ctx, &ObjectLookup::uid("b1"));
        let seasons = brand.and_then(|brand| brand.seasons);
        assert_eq!(seasons.map(|seasons| seasons.objects.len()), Some(2));
        let credits = api.person_credits(&ctx, "p1");
        assert_eq!(credits.map(|person| person.credits.objects.len()), Some(2));
        assert!(api.get_set(&ctx, "combined", SetQuery::default()).is_some());
        Ok(())
    }
}
