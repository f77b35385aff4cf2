use crate::localization::localize;
use crate::model::{
    Availability, CallToAction, Genre, Image, ObjectKind, Person, Rating, Role, Tag, Theme,
};
use crate::record::{FieldValue, Record};
use crate::store::TranslationTable;

use super::Resolver;

fn owned(record: &Record, field: &str) -> Option<String> {
    record.text(field).map(str::to_string)
}

/// First usable URL of an image: CDN, direct, external, legacy external, then attachment.
fn image_url(record: &Record) -> Option<String> {
    ["cloudinary_url", "url", "external_url", "external_url_old"]
        .into_iter()
        .find_map(|field| record.non_empty_text(field))
        .map(str::to_string)
        .or_else(|| match record.field("image") {
            Some(FieldValue::Attachments(files)) => {
                files.first().and_then(|file| file.url.clone()).filter(|url| !url.is_empty())
            }
            _ => None,
        })
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn image(&self, id: &str) -> Option<Image> {
        let record = self.store.images.get(id)?;
        Some(Image {
            kind: ObjectKind::Image,
            uid: record.id.clone(),
            external_id: record.external_id().to_string(),
            title: record
                .non_empty_text("title")
                .or_else(|| record.non_empty_text("unique-title"))
                .map(str::to_string),
            image_type: record
                .single_text("type")
                .filter(|kind| !kind.is_empty())
                .unwrap_or("IMAGE")
                .to_string(),
            url: image_url(record),
            external_url: record
                .non_empty_text("external_url")
                .or_else(|| record.non_empty_text("external_url_old"))
                .map(str::to_string),
        })
    }

    #[must_use]
    pub fn genre(&self, id: &str) -> Option<Genre> {
        let base = self.store.genres.get(id)?;
        let fields = localize(self.store, TranslationTable::Genres, base, self.ctx);
        Some(Genre {
            kind: ObjectKind::Genre,
            uid: base.id.clone(),
            external_id: fields.external_id().to_string(),
            name: owned(&fields, "name"),
            slug: owned(&fields, "slug"),
        })
    }

    #[must_use]
    pub fn theme(&self, id: &str) -> Option<Theme> {
        let base = self.store.themes.get(id)?;
        let fields = localize(self.store, TranslationTable::Themes, base, self.ctx);
        Some(Theme {
            kind: ObjectKind::Theme,
            uid: base.id.clone(),
            external_id: fields.external_id().to_string(),
            name: owned(&fields, "name"),
        })
    }

    #[must_use]
    pub fn tag(&self, id: &str) -> Option<Tag> {
        let record = self.store.tags.get(id)?;
        Some(Tag {
            kind: ObjectKind::Tag,
            uid: record.id.clone(),
            external_id: record.external_id().to_string(),
            name: owned(record, "name"),
            tag_type: owned(record, "type"),
        })
    }

    #[must_use]
    pub fn rating(&self, id: &str) -> Option<Rating> {
        let record = self.store.ratings.get(id)?;
        Some(Rating {
            kind: ObjectKind::Rating,
            uid: record.id.clone(),
            external_id: record.external_id().to_string(),
            value: owned(record, "value"),
        })
    }

    /// A person at `depth`; their images are one more hop away.
    #[must_use]
    pub fn person(&self, id: &str, depth: usize) -> Option<Person> {
        let base = self.store.people.get(id)?;
        let fields = localize(self.store, TranslationTable::People, base, self.ctx);
        let images = self.connection(&fields, "images", depth, |image_id| self.image(image_id));
        Some(Person {
            kind: ObjectKind::Person,
            uid: base.id.clone(),
            external_id: fields.external_id().to_string(),
            slug: owned(&fields, "slug"),
            name: owned(&fields, "name"),
            abbreviation: owned(&fields, "abbreviation"),
            alias: owned(&fields, "alias"),
            bio_long: owned(&fields, "bio_long"),
            bio_medium: owned(&fields, "bio_medium"),
            bio_short: owned(&fields, "bio_short"),
            genre: owned(&fields, "genre"),
            date_of_birth: owned(&fields, "date_of_birth"),
            name_sort: owned(&fields, "name_sort"),
            place_of_birth: owned(&fields, "place_of_birth"),
            images,
        })
    }

    #[must_use]
    pub fn role(&self, id: &str) -> Option<Role> {
        let base = self.store.roles.get(id)?;
        let fields = localize(self.store, TranslationTable::Roles, base, self.ctx);
        Some(Role {
            kind: ObjectKind::Role,
            uid: base.id.clone(),
            external_id: fields.external_id().to_string(),
            title: owned(&fields, "title"),
            title_sort: owned(&fields, "title_sort"),
            internal_title: owned(&fields, "internal_title"),
        })
    }

    #[must_use]
    pub fn call_to_action(&self, id: &str) -> Option<CallToAction> {
        let base = self.store.call_to_actions.get(id)?;
        let fields = localize(self.store, TranslationTable::CallToActions, base, self.ctx);
        Some(CallToAction {
            kind: ObjectKind::CallToAction,
            uid: base.id.clone(),
            external_id: fields.external_id().to_string(),
            internal_title: owned(&fields, "internal_title"),
            cta_type: owned(&fields, "type"),
            text: owned(&fields, "text"),
            text_short: owned(&fields, "text_short"),
            description: owned(&fields, "description"),
            description_short: owned(&fields, "description_short"),
            url: owned(&fields, "url"),
            url_path: owned(&fields, "url_path"),
        })
    }

    pub(super) fn availability_object(record: &Record) -> Availability {
        Availability {
            kind: ObjectKind::Availability,
            uid: record.id.clone(),
            external_id: record.external_id().to_string(),
            title: owned(record, "title"),
            slug: owned(record, "slug"),
            starts: owned(record, "starts"),
            ends: owned(record, "ends"),
        }
    }

    #[must_use]
    pub fn get_person(&self, id: &str) -> Option<Person> {
        self.person(id, 0)
    }

    #[must_use]
    pub fn get_genre(&self, id: &str) -> Option<Genre> {
        self.genre(id)
    }

    #[must_use]
    pub fn get_tag(&self, id: &str) -> Option<Tag> {
        self.tag(id)
    }

    #[must_use]
    pub fn get_call_to_action(&self, id: &str) -> Option<CallToAction> {
        self.call_to_action(id)
    }

    #[must_use]
    pub fn list_genres(&self) -> Vec<Genre> {
        self.store.genres.iter().filter_map(|record| self.genre(&record.id)).collect()
    }
}
