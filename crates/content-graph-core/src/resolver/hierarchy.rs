use std::cmp::Ordering;

use serde::Serialize;

use crate::model::{Brand, Connection, ObjectKind, ObjectList, ResolvedObject, Season};
use crate::record::Record;

use super::{ObjectLookup, Resolver};

/// Metadata relationship a listing is keyed on.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TaxonomyField {
    Genre,
    Tag,
}

impl TaxonomyField {
    #[must_use]
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Genre => "genres",
            Self::Tag => "tags",
        }
    }
}

/// A genre or tag together with the objects that carry it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaxonomyListing {
    #[serde(flatten)]
    pub taxonomy: ResolvedObject,
    pub content: Connection<ResolvedObject>,
}

/// Missing numbers sort last; equal keys keep their order.
fn by_number(lhs: Option<f64>, rhs: Option<f64>) -> Ordering {
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => lhs.total_cmp(&rhs),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl<'a> Resolver<'a> {
    /// Media objects of `kind` whose `parent` lists `parent_id`, in store order.
    fn children(
        &self,
        parent_id: &'a str,
        kind: ObjectKind,
    ) -> impl Iterator<Item = &'a Record> + 'a {
        self.store.media_linked_to(kind, "parent", parent_id)
    }

    fn season_tree(&self, record: &'a Record, depth: usize) -> Option<Season> {
        let mut season = self.season(record, depth)?;
        let mut episodes: Vec<_> = self
            .children(&record.id, ObjectKind::Episode)
            .filter_map(|episode| self.episode(episode, depth + 1))
            .collect();
        episodes.sort_by(|lhs, rhs| by_number(lhs.episode_number, rhs.episode_number));
        season.episodes = Some(ObjectList::new(episodes));
        Some(season)
    }

    /// A season with its episodes one level down, ordered by episode number.
    #[must_use]
    pub fn season_with_episodes(&self, lookup: &ObjectLookup) -> Option<Season> {
        let record = self.lookup_media(lookup)?;
        if record.object_kind() != Some(ObjectKind::Season) {
            return None;
        }
        self.season_tree(record, 0)
    }

    /// A brand with its seasons (and their episodes), ordered by season number.
    #[must_use]
    pub fn brand_with_seasons(&self, lookup: &ObjectLookup) -> Option<Brand> {
        let record = self.lookup_media(lookup)?;
        if record.object_kind() != Some(ObjectKind::Brand) {
            return None;
        }
        let mut brand = self.brand(record, 0)?;
        let mut seasons: Vec<_> = self
            .children(&record.id, ObjectKind::Season)
            .filter_map(|season| self.season_tree(season, 1))
            .collect();
        seasons.sort_by(|lhs, rhs| by_number(lhs.season_number, rhs.season_number));
        brand.seasons = Some(ObjectList::new(seasons));
        Some(brand)
    }

    /// The genre or tag `id` plus every visible object of `kind` linked to it.
    #[must_use]
    pub fn list_by_taxonomy(
        &self,
        field: TaxonomyField,
        id: &str,
        kind: ObjectKind,
    ) -> Option<TaxonomyListing> {
        let taxonomy = match field {
            TaxonomyField::Genre => ResolvedObject::Genre(self.genre(id)?),
            TaxonomyField::Tag => ResolvedObject::Tag(self.tag(id)?),
        };
        let content = self
            .store
            .media_objects
            .iter()
            .filter(|record| {
                record.object_kind() == Some(kind) && record.ids(field.field_name()).contains(&id)
            })
            .filter_map(|record| self.resolve_media_lossy(record, 0))
            .collect();
        Some(TaxonomyListing { taxonomy, content: Connection::new(content) })
    }
}
