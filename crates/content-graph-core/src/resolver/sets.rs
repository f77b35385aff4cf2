use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::dynamic::{dynamic_members, has_dynamic_content};
use crate::expand::{within_budget, RelationshipCost, MAX_DEPTH};
use crate::model::{Connection, ObjectKind, ResolvedObject, SetContent, SkylarkSet};
use crate::record::Record;

use super::Resolver;

/// Language whose set-metadata row is overlaid onto the base set.
const SET_METADATA_LANGUAGE: &str = "en-GB";

/// Options for a root set lookup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub struct SetQuery {
    /// Resolve set-reference media objects to the set they point at.
    pub follow_references: bool,
    pub depth: usize,
}

impl Default for SetQuery {
    fn default() -> Self {
        Self { follow_references: true, depth: 0 }
    }
}

impl<'a> Resolver<'a> {
    /// Ordered member ids of a set: its `content` list, else the concatenated membership of
    /// the sets it lists, else its dynamic rules. Nested lookups spend depth, so cyclic set
    /// graphs end in empty memberships.
    #[must_use]
    pub fn set_membership(&self, set: &'a Record, depth: usize) -> Vec<&'a str> {
        if depth >= MAX_DEPTH {
            tracing::trace!(set_id = %set.id, depth, "set membership beyond depth budget");
            return Vec::new();
        }
        if let Some(content) = set.string_list("content") {
            return content.iter().map(String::as_str).collect();
        }
        if let Some(children) = set.string_list("sets") {
            return children
                .iter()
                .filter_map(|child_id| self.store.set_by_id(child_id))
                .flat_map(|child| self.set_membership(child, depth + 1))
                .collect();
        }
        dynamic_members(self.store, set)
    }

    /// The `en-GB` metadata row of a set, if one exists.
    fn set_metadata(&self, set_id: &str) -> Option<&'a Record> {
        let language = self.store.languages.iter().find(|language| {
            let code = language.text("code");
            code.is_some_and(|code| code.eq_ignore_ascii_case(SET_METADATA_LANGUAGE))
        })?;
        self.store.sets_metadata.iter().find(|metadata| {
            metadata.ids("set").contains(&set_id)
                && metadata.ids("language").contains(&language.id.as_str())
        })
    }

    fn with_metadata(&self, set: &'a Record) -> Cow<'a, Record> {
        match self.set_metadata(&set.id) {
            Some(metadata) => {
                let mut merged = set.clone();
                merged.fields.extend(metadata.fields.clone());
                Cow::Owned(merged)
            }
            None => Cow::Borrowed(set),
        }
    }

    /// One membership id as set content: a set reference, a set, or any media object.
    fn set_member(&self, id: &str, depth: usize) -> Option<ResolvedObject> {
        if let Some(record) = self.store.media_objects.get(id) {
            if record.object_kind() == Some(ObjectKind::Set) {
                let target = self.store.resolve_set_reference(id).unwrap_or(record);
                return self.set(target, depth).map(ResolvedObject::Set);
            }
            return self.resolve_media_lossy(record, depth);
        }
        let set = self.store.sets.get(id)?;
        self.set(set, depth).map(ResolvedObject::Set)
    }

    /// Resolve a set at `depth`. Members are resolved one level below; the content connection
    /// is `null` when that level is out of budget.
    #[must_use]
    pub fn set(&self, set: &'a Record, depth: usize) -> Option<SkylarkSet> {
        let fields = self.with_metadata(set);
        if !self.visible(&fields) {
            tracing::debug!(set_id = %set.id, "set hidden by availability");
            return None;
        }

        let content = within_budget(depth, RelationshipCost::Direct).then(|| {
            let dynamic = has_dynamic_content(set);
            self.set_membership(set, depth)
                .into_iter()
                .enumerate()
                .filter_map(|(index, id)| {
                    self.set_member(id, depth + 1).map(|object| SetContent {
                        kind: ObjectKind::SetContent,
                        dynamic,
                        position: index + 1,
                        object,
                    })
                })
                .collect::<Vec<_>>()
        });

        let set_type = fields
            .non_empty_text("set_type")
            .or_else(|| fields.non_empty_text("type"))
            .unwrap_or("RAIL")
            .to_uppercase();
        let title = ["title", "internal_title", "name"]
            .into_iter()
            .find_map(|field| fields.non_empty_text(field))
            .map(str::to_string);

        Some(SkylarkSet {
            kind: ObjectKind::Set,
            uid: set.id.clone(),
            external_id: fields.external_id().to_string(),
            title,
            title_short: fields.text("title_short").map(str::to_string),
            set_type,
            slug: fields.text("slug").map(str::to_string),
            set_type_slug: fields.text("set_type_slug").map(str::to_string),
            internal_title: fields.text("internal_title").map(str::to_string),
            images: self.connection(&fields, "images", depth, |id| self.image(id)),
            content: Connection::wrap(content),
            call_to_actions: self.call_to_action_list(&fields),
        })
    }

    /// Root set lookup by id, external id or slug. With `follow_references`, a set-reference
    /// media object resolves to the set it points at.
    #[must_use]
    pub fn get_set(&self, id: &str, query: SetQuery) -> Option<SkylarkSet> {
        let found = self.store.set_by_id(id);
        let target = match found {
            Some(record) if query.follow_references => {
                self.store.resolve_set_reference(&record.id).or(Some(record))
            }
            Some(record) => Some(record),
            None if query.follow_references => self.store.resolve_set_reference(id),
            None => None,
        }?;
        self.set(target, query.depth)
    }
}
