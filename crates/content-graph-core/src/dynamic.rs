//! Rule-based set membership.
//!
//! A set may carry a JSON document describing which media objects belong to it:
//!
//! ```json
//! {
//!   "dynamic_content_types": ["Movie"],
//!   "dynamic_content_rules": [[
//!     { "object_types": ["Movie"], "uid": null, "relationship_name": null },
//!     { "object_types": ["Genre"], "uid": ["g1"], "relationship_name": "genres" }
//!   ]]
//! }
//! ```
//!
//! Each inner list is a rule group. A group starts from every media object of the declared
//! content types and narrows it rule by rule; the groups are then unioned.

use std::collections::HashSet;

use serde::Deserialize;

use crate::model::ObjectKind;
use crate::record::Record;
use crate::store::RecordStore;

/// Fields a set may store its rule document in.
pub const DYNAMIC_CONTENT_FIELDS: [&str; 2] = ["dynamic_content", "Dynamic Content"];

/// Rule ids are strings, but exports occasionally carry bare numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RuleId {
    Text(String),
    Number(serde_json::Number),
}

impl RuleId {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UidSpec {
    One(RuleId),
    Many(Vec<RuleId>),
}

#[derive(Debug, Deserialize)]
struct RawRule {
    #[serde(default)]
    object_types: Option<Vec<String>>,
    #[serde(default)]
    uid: Option<UidSpec>,
    #[serde(default)]
    relationship_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDynamicContent {
    dynamic_content_types: Vec<String>,
    dynamic_content_rules: Vec<Vec<RawRule>>,
}

/// One narrowing step of a rule group.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RuleFilter {
    /// Restates the content type; candidates already satisfy it.
    BaseType,
    /// Candidate credits intersect `targets`, or exist at all when `targets` is empty.
    Credits { targets: Vec<String> },
    /// Some credit of the candidate lists a target person, or exists when `targets` is empty.
    People { targets: Vec<String> },
    /// Some related object of the candidate is one of `targets` (any, when `targets` is
    /// empty) and has one of `object_types` (any, when `object_types` is empty).
    Direct { relationship: String, object_types: Vec<String>, targets: Vec<String> },
}

impl RuleFilter {
    fn from_raw(raw: RawRule) -> Self {
        let targets = match raw.uid {
            None => Vec::new(),
            Some(UidSpec::One(uid)) => vec![uid.into_string()],
            Some(UidSpec::Many(uids)) => uids.into_iter().map(RuleId::into_string).collect(),
        };
        let object_types = raw.object_types.unwrap_or_default();
        let relationship = match raw.relationship_name {
            Some(name) if !name.is_empty() => name,
            _ => return Self::BaseType,
        };
        let declares = |kind: &str| object_types.iter().any(|declared| declared == kind);
        if relationship == "credits" && declares("Credit") {
            Self::Credits { targets }
        } else if relationship == "people" && declares("Person") {
            Self::People { targets }
        } else {
            Self::Direct { relationship, object_types, targets }
        }
    }

    #[must_use]
    pub fn matches(&self, store: &RecordStore, candidate: &Record) -> bool {
        match self {
            Self::BaseType => true,
            Self::Credits { targets } => {
                let credits = candidate.ids("credits");
                !credits.is_empty()
                    && (targets.is_empty() || credits.iter().any(|id| contains(targets, id)))
            }
            Self::People { targets } => candidate.ids("credits").iter().any(|credit_id| {
                store.credits.get(credit_id).is_some_and(|credit| {
                    targets.is_empty()
                        || credit.ids("person").iter().any(|id| contains(targets, id))
                })
            }),
            Self::Direct { relationship, object_types, targets } => {
                candidate.ids(relationship).iter().any(|id| {
                    (targets.is_empty() || contains(targets, id))
                        && (object_types.is_empty() || related_has_type(store, id, object_types))
                })
            }
        }
    }
}

fn contains(targets: &[String], id: &str) -> bool {
    targets.iter().any(|target| target == id)
}

/// Media records are typed by their discriminator, everything else by the collection
/// holding it.
fn related_has_type(store: &RecordStore, id: &str, object_types: &[String]) -> bool {
    if let Some(media) = store.media_objects.get(id) {
        return object_types.iter().any(|kind| media.is_type(kind));
    }
    let Some(kind) = collection_kind(store, id) else {
        return false;
    };
    object_types.iter().any(|declared| names_kind(declared, kind))
}

fn collection_kind(store: &RecordStore, id: &str) -> Option<ObjectKind> {
    [
        (&store.people, ObjectKind::Person),
        (&store.credits, ObjectKind::Credit),
        (&store.roles, ObjectKind::Role),
        (&store.genres, ObjectKind::Genre),
        (&store.themes, ObjectKind::Theme),
        (&store.tags, ObjectKind::Tag),
        (&store.ratings, ObjectKind::Rating),
        (&store.images, ObjectKind::Image),
        (&store.articles, ObjectKind::Article),
        (&store.call_to_actions, ObjectKind::CallToAction),
        (&store.sets, ObjectKind::Set),
    ]
    .into_iter()
    .find_map(|(collection, kind)| collection.get(id).map(|_| kind))
}

/// `Tag` and `SkylarkTag` both name [`ObjectKind::Tag`].
fn names_kind(declared: &str, kind: ObjectKind) -> bool {
    let unprefixed = |name: &'static str| name.strip_prefix("Skylark").unwrap_or(name);
    let declared = declared.strip_prefix("Skylark").unwrap_or(declared);
    declared.eq_ignore_ascii_case(unprefixed(kind.as_str()))
}

/// Parsed rule document.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DynamicContent {
    pub content_types: Vec<String>,
    pub rule_groups: Vec<Vec<RuleFilter>>,
}

impl DynamicContent {
    /// # Errors
    /// Returns the JSON error when the document is malformed or lacks either list.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let parsed: RawDynamicContent = serde_json::from_str(raw)?;
        Ok(Self {
            content_types: parsed.dynamic_content_types,
            rule_groups: parsed
                .dynamic_content_rules
                .into_iter()
                .map(|group| group.into_iter().map(RuleFilter::from_raw).collect())
                .collect(),
        })
    }

    /// Evaluate every group and union the results, first-seen order, no duplicates.
    #[must_use]
    pub fn evaluate<'a>(&self, store: &'a RecordStore) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        let mut members = Vec::new();
        for group in &self.rule_groups {
            for id in self.evaluate_group(store, group) {
                if seen.insert(id) {
                    members.push(id);
                }
            }
        }
        members
    }

    fn evaluate_group<'a>(&self, store: &'a RecordStore, group: &[RuleFilter]) -> Vec<&'a str> {
        let candidates: Vec<&Record> = store
            .media_objects
            .iter()
            .filter(|record| self.content_types.iter().any(|kind| record.is_type(kind)))
            .collect();
        group
            .iter()
            .fold(candidates, |remaining, rule| {
                remaining.into_iter().filter(|record| rule.matches(store, record)).collect()
            })
            .into_iter()
            .map(|record| record.id.as_str())
            .collect()
    }
}

/// The rule document stored on a set, if any.
#[must_use]
pub fn dynamic_source(set: &Record) -> Option<&str> {
    DYNAMIC_CONTENT_FIELDS.iter().find_map(|field| set.non_empty_text(field))
}

#[must_use]
pub fn has_dynamic_content(set: &Record) -> bool {
    dynamic_source(set).is_some()
}

/// Members computed from the set's rule document. A malformed document yields no members.
#[must_use]
pub fn dynamic_members<'a>(store: &'a RecordStore, set: &Record) -> Vec<&'a str> {
    let Some(source) = dynamic_source(set) else {
        return Vec::new();
    };
    match DynamicContent::parse(source) {
        Ok(content) => content.evaluate(store),
        Err(err) => {
            tracing::warn!(set_id = %set.id, error = %err, "ignoring malformed dynamic content");
            Vec::new()
        }
    }
}
