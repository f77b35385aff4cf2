use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::context::DimensionAxis;
use crate::model::ObjectKind;
use crate::record::Record;
use crate::GraphError;

/// Ordered records plus an id index. Duplicate ids keep the first occurrence, matching a
/// linear scan.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl Collection {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            index.entry(record.id.clone()).or_insert(position);
        }
        Self { records, index }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.index.get(id).and_then(|position| self.records.get(*position))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Translation tables, one per translatable collection.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TranslationTable {
    MediaObjects,
    Articles,
    Genres,
    Themes,
    People,
    Roles,
    CallToActions,
}

#[derive(Debug, Clone, Default)]
pub struct Dimensions {
    pub customer_types: Collection,
    pub device_types: Collection,
    pub regions: Collection,
}

#[derive(Debug, Clone, Default)]
pub struct Translations {
    pub media_objects: Collection,
    pub articles: Collection,
    pub genres: Collection,
    pub themes: Collection,
    pub people: Collection,
    pub roles: Collection,
    pub call_to_actions: Collection,
}

/// The whole catalogue. Built once, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    pub media_objects: Collection,
    pub people: Collection,
    pub credits: Collection,
    pub roles: Collection,
    pub genres: Collection,
    pub themes: Collection,
    pub tags: Collection,
    pub ratings: Collection,
    pub images: Collection,
    pub sets: Collection,
    pub sets_metadata: Collection,
    pub availability: Collection,
    pub audience_segments: Collection,
    pub dimensions: Dimensions,
    pub languages: Collection,
    pub translations: Translations,
    pub call_to_actions: Collection,
    pub articles: Collection,
    snapshot_id: String,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    id: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawDimensions {
    customer_types: Vec<RawRecord>,
    device_types: Vec<RawRecord>,
    regions: Vec<RawRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTranslations {
    media_objects: Vec<RawRecord>,
    articles: Vec<RawRecord>,
    genres: Vec<RawRecord>,
    themes: Vec<RawRecord>,
    people: Vec<RawRecord>,
    roles: Vec<RawRecord>,
    call_to_actions: Vec<RawRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSnapshot {
    media_objects: Vec<RawRecord>,
    people: Vec<RawRecord>,
    credits: Vec<RawRecord>,
    roles: Vec<RawRecord>,
    genres: Vec<RawRecord>,
    themes: Vec<RawRecord>,
    tags: Vec<RawRecord>,
    ratings: Vec<RawRecord>,
    images: Vec<RawRecord>,
    sets: Vec<RawRecord>,
    sets_metadata: Vec<RawRecord>,
    availability: Vec<RawRecord>,
    audience_segments: Vec<RawRecord>,
    dimensions: RawDimensions,
    languages: Vec<RawRecord>,
    translations: RawTranslations,
    call_to_actions: Vec<RawRecord>,
    articles: Vec<RawRecord>,
}

fn collection(raw: Vec<RawRecord>) -> Collection {
    Collection::new(
        raw.into_iter().map(|record| Record::from_json_fields(record.id, &record.fields)).collect(),
    )
}

impl RecordStore {
    /// Parse a snapshot export, bare or wrapped in `{"airtable_data": ...}`.
    ///
    /// # Errors
    /// Returns [`GraphError::Snapshot`] when the bytes are not valid JSON or a record lacks
    /// a string `id`.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, GraphError> {
        let mut document: Value = serde_json::from_slice(bytes)
            .map_err(|err| GraphError::Snapshot(format!("invalid snapshot JSON: {err}")))?;
        if let Some(inner) = document.get_mut("airtable_data") {
            document = inner.take();
        }
        let raw = RawSnapshot::deserialize(document)
            .map_err(|err| GraphError::Snapshot(format!("invalid snapshot layout: {err}")))?;

        let mut store = Self::from_raw(raw);
        store.snapshot_id = format!("sha256:{}", hex::encode(Sha256::digest(bytes)));
        Ok(store)
    }

    /// Convenience for already-parsed JSON; the fingerprint covers its compact encoding.
    ///
    /// # Errors
    /// Same as [`RecordStore::from_json_bytes`].
    pub fn from_json_value(value: &Value) -> Result<Self, GraphError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|err| GraphError::Snapshot(format!("failed to encode snapshot: {err}")))?;
        Self::from_json_bytes(&bytes)
    }

    fn from_raw(raw: RawSnapshot) -> Self {
        Self {
            media_objects: collection(raw.media_objects),
            people: collection(raw.people),
            credits: collection(raw.credits),
            roles: collection(raw.roles),
            genres: collection(raw.genres),
            themes: collection(raw.themes),
            tags: collection(raw.tags),
            ratings: collection(raw.ratings),
            images: collection(raw.images),
            sets: collection(raw.sets),
            sets_metadata: collection(raw.sets_metadata),
            availability: collection(raw.availability),
            audience_segments: collection(raw.audience_segments),
            dimensions: Dimensions {
                customer_types: collection(raw.dimensions.customer_types),
                device_types: collection(raw.dimensions.device_types),
                regions: collection(raw.dimensions.regions),
            },
            languages: collection(raw.languages),
            translations: Translations {
                media_objects: collection(raw.translations.media_objects),
                articles: collection(raw.translations.articles),
                genres: collection(raw.translations.genres),
                themes: collection(raw.translations.themes),
                people: collection(raw.translations.people),
                roles: collection(raw.translations.roles),
                call_to_actions: collection(raw.translations.call_to_actions),
            },
            call_to_actions: collection(raw.call_to_actions),
            articles: collection(raw.articles),
            snapshot_id: String::new(),
        }
    }

    /// `sha256:<hex>` fingerprint of the loaded snapshot bytes.
    #[must_use]
    pub fn snapshot_id(&self) -> &str {
        &self.snapshot_id
    }

    #[must_use]
    pub fn translations(&self, table: TranslationTable) -> &Collection {
        match table {
            TranslationTable::MediaObjects => &self.translations.media_objects,
            TranslationTable::Articles => &self.translations.articles,
            TranslationTable::Genres => &self.translations.genres,
            TranslationTable::Themes => &self.translations.themes,
            TranslationTable::People => &self.translations.people,
            TranslationTable::Roles => &self.translations.roles,
            TranslationTable::CallToActions => &self.translations.call_to_actions,
        }
    }

    #[must_use]
    pub fn dimension(&self, axis: DimensionAxis) -> &Collection {
        match axis {
            DimensionAxis::CustomerTypes => &self.dimensions.customer_types,
            DimensionAxis::DeviceTypes => &self.dimensions.device_types,
            DimensionAxis::Regions => &self.dimensions.regions,
        }
    }

    /// Media object by record id or legacy `Airtable ID`.
    #[must_use]
    pub fn media_by_uid(&self, uid: &str) -> Option<&Record> {
        self.media_objects.get(uid).or_else(|| {
            self.media_objects.iter().find(|record| record.text("Airtable ID") == Some(uid))
        })
    }

    /// Media object by uid, else by external id (record id, legacy id or `external_id`).
    #[must_use]
    pub fn media_by_lookup(&self, uid: Option<&str>, external_id: Option<&str>) -> Option<&Record> {
        if let Some(uid) = uid {
            return self.media_by_uid(uid);
        }
        let external_id = external_id?;
        self.media_by_uid(external_id).or_else(|| {
            self.media_objects.iter().find(|record| record.text("external_id") == Some(external_id))
        })
    }

    /// Set by id, `external_id` or `slug`; first in `sets`, then media objects typed as sets.
    #[must_use]
    pub fn set_by_id(&self, id: &str) -> Option<&Record> {
        let matches = |record: &&Record| {
            record.id == id
                || record.text("external_id") == Some(id)
                || record.text("slug") == Some(id)
        };
        self.sets.iter().find(matches).or_else(|| {
            self.media_objects
                .iter()
                .filter(|record| record.object_kind() == Some(ObjectKind::Set))
                .find(matches)
        })
    }

    /// Follow a set reference media object through `skylarkset_external_id` to the real set.
    #[must_use]
    pub fn resolve_set_reference(&self, reference_id: &str) -> Option<&Record> {
        let reference = self.media_objects.get(reference_id)?;
        let target = reference.non_empty_text("skylarkset_external_id")?;
        self.sets.iter().find(|set| set.text("external_id") == Some(target))
    }

    /// Media objects of `kind` whose `field` relationship contains `id`.
    pub fn media_linked_to<'a>(
        &'a self,
        kind: ObjectKind,
        field: &'a str,
        id: &'a str,
    ) -> impl Iterator<Item = &'a Record> + 'a {
        self.media_objects.iter().filter(move |record| {
            record.object_kind() == Some(kind) && record.ids(field).contains(&id)
        })
    }

    /// Collection sizes in a stable order, for load logging and `cg info`.
    #[must_use]
    pub fn collection_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("media_objects", self.media_objects.len()),
            ("articles", self.articles.len()),
            ("people", self.people.len()),
            ("credits", self.credits.len()),
            ("roles", self.roles.len()),
            ("genres", self.genres.len()),
            ("themes", self.themes.len()),
            ("tags", self.tags.len()),
            ("ratings", self.ratings.len()),
            ("images", self.images.len()),
            ("sets", self.sets.len()),
            ("sets_metadata", self.sets_metadata.len()),
            ("availability", self.availability.len()),
            ("audience_segments", self.audience_segments.len()),
            ("languages", self.languages.len()),
            ("call_to_actions", self.call_to_actions.len()),
        ]
    }
}
