use std::borrow::Cow;

use crate::availability::is_available;
use crate::expand::{expand_field, RelationshipCost, MAX_DEPTH};
use crate::localization::localize;
use crate::model::{
    Article, Availability, Brand, CallToAction, Connection, Credit, Episode, LiveStream,
    MediaFields, Movie, ObjectKind, ObjectList, Season,
};
use crate::record::Record;
use crate::store::TranslationTable;

use super::credits::dedup_credits;
use super::Resolver;

impl<'a> Resolver<'a> {
    /// Depth guard, localization and the availability gate shared by every media kind.
    ///
    /// Returns the localized record, or `None` when the object is out of budget or not
    /// visible to the request.
    pub(super) fn admit(
        &self,
        record: &'a Record,
        depth: usize,
        table: TranslationTable,
    ) -> Option<Cow<'a, Record>> {
        if depth >= MAX_DEPTH {
            tracing::trace!(record_id = %record.id, depth, "object beyond depth budget");
            return None;
        }
        let fields = localize(self.store, table, record, self.ctx);
        if !self.visible(&fields) {
            tracing::debug!(record_id = %record.id, "object hidden by availability");
            return None;
        }
        Some(fields)
    }

    /// Availability gate; always open when the request names no dimensions.
    pub(super) fn visible(&self, fields: &Record) -> bool {
        !self.ctx.dimensions.any_requested()
            || is_available(self.store, &fields.ids("availability"), self.ctx)
    }

    /// A `Direct` relationship of `fields` as a connection, `None` when cut by the budget.
    pub(super) fn connection<T>(
        &self,
        fields: &Record,
        name: &str,
        depth: usize,
        mut resolve: impl FnMut(&str) -> Option<T>,
    ) -> Option<Connection<T>> {
        let expanded =
            expand_field(fields.field(name), depth, RelationshipCost::Direct, |id, _| resolve(id));
        Connection::wrap(expanded)
    }

    /// Credits owned by an object at `depth`, with repeated people dropped.
    fn credit_connection(&self, fields: &Record, depth: usize) -> Option<Connection<Credit>> {
        let direct = RelationshipCost::Direct;
        let credits =
            expand_field(fields.field("credits"), depth, direct, |id, _| self.credit(id, depth));
        Connection::wrap(credits.map(dedup_credits))
    }

    /// Availability objects linked from `fields`. Only populated when dimensions are requested.
    pub(super) fn availability_list(&self, fields: &Record) -> ObjectList<Availability> {
        if !self.ctx.dimensions.any_requested() {
            return ObjectList::default();
        }
        ObjectList::new(
            fields
                .ids("availability")
                .into_iter()
                .filter_map(|id| self.store.availability.get(id))
                .map(Self::availability_object)
                .collect(),
        )
    }

    pub(super) fn call_to_action_list(&self, fields: &Record) -> ObjectList<CallToAction> {
        ObjectList::new(
            fields
                .ids("call_to_actions")
                .into_iter()
                .filter_map(|id| self.call_to_action(id))
                .collect(),
        )
    }

    fn media_fields(&self, record: &'a Record, fields: &Record, depth: usize) -> MediaFields {
        MediaFields {
            uid: record.id.clone(),
            external_id: fields.external_id().to_string(),
            slug: fields.text("slug").map(str::to_string),
            title: fields.text("title").map(str::to_string),
            title_short: fields.text("title_short").map(str::to_string),
            title_sort: fields.text("title_sort").map(str::to_string),
            synopsis: fields.text("synopsis").map(str::to_string),
            synopsis_short: fields.text("synopsis_short").map(str::to_string),
            release_date: fields.text("release_date").map(str::to_string),
            images: self.connection(fields, "images", depth, |id| self.image(id)),
            genres: self.connection(fields, "genres", depth, |id| self.genre(id)),
            themes: self.connection(fields, "themes", depth, |id| self.theme(id)),
            tags: self.connection(fields, "tags", depth, |id| self.tag(id)),
            ratings: self.connection(fields, "ratings", depth, |id| self.rating(id)),
            credits: self.credit_connection(fields, depth),
            availability: self.availability_list(fields),
            call_to_actions: self.call_to_action_list(fields),
        }
    }

    fn media(&self, record: &'a Record, depth: usize) -> Option<(Cow<'a, Record>, MediaFields)> {
        let fields = self.admit(record, depth, TranslationTable::MediaObjects)?;
        let media = self.media_fields(record, &fields, depth);
        Some((fields, media))
    }

    #[must_use]
    pub fn movie(&self, record: &'a Record, depth: usize) -> Option<Movie> {
        let (fields, media) = self.media(record, depth)?;
        Some(Movie {
            kind: ObjectKind::Movie,
            media,
            budget: fields.number("budget"),
            audience_rating: fields.number("audience_rating"),
        })
    }

    #[must_use]
    pub fn episode(&self, record: &'a Record, depth: usize) -> Option<Episode> {
        let (fields, media) = self.media(record, depth)?;
        Some(Episode {
            kind: ObjectKind::Episode,
            media,
            episode_number: fields.number("episode_number"),
            audience_rating: fields.number("audience_rating"),
        })
    }

    #[must_use]
    pub fn season(&self, record: &'a Record, depth: usize) -> Option<Season> {
        let (fields, media) = self.media(record, depth)?;
        Some(Season {
            kind: ObjectKind::Season,
            media,
            season_number: fields.number("season_number"),
            preferred_image_type: fields.text("preferred_image_type").map(str::to_string),
            episodes: None,
        })
    }

    #[must_use]
    pub fn brand(&self, record: &'a Record, depth: usize) -> Option<Brand> {
        let (_, media) = self.media(record, depth)?;
        Some(Brand { kind: ObjectKind::Brand, media, seasons: None })
    }

    #[must_use]
    pub fn live_stream(&self, record: &'a Record, depth: usize) -> Option<LiveStream> {
        let (_, media) = self.media(record, depth)?;
        Some(LiveStream { kind: ObjectKind::LiveStream, media })
    }

    #[must_use]
    pub fn article(&self, record: &'a Record, depth: usize) -> Option<Article> {
        let fields = self.admit(record, depth, TranslationTable::Articles)?;
        Some(Article {
            kind: ObjectKind::Article,
            uid: record.id.clone(),
            external_id: fields.external_id().to_string(),
            slug: fields.text("slug").map(str::to_string),
            title: fields.text("title").map(str::to_string),
            description: fields.text("description").map(str::to_string),
            body: fields.text("body").map(str::to_string),
            article_type: fields.text("type").map(str::to_string),
            publish_date: fields.text("publish_date").map(str::to_string),
            internal_title: fields.text("internal_title").map(str::to_string),
            images: self.connection(&fields, "images", depth, |id| self.image(id)),
            credits: self.credit_connection(&fields, depth),
            tags: self.connection(&fields, "tags", depth, |id| self.tag(id)),
            availability: self.availability_list(&fields),
        })
    }

    /// Article by record id, else by `external_id`.
    #[must_use]
    pub fn get_article(&self, uid: Option<&str>, external_id: Option<&str>) -> Option<Article> {
        let record = match (uid, external_id) {
            (Some(uid), _) => self.store.articles.get(uid)?,
            (None, Some(external_id)) => self.store.articles.get(external_id).or_else(|| {
                let mut articles = self.store.articles.iter();
                articles.find(|article| article.text("external_id") == Some(external_id))
            })?,
            (None, None) => return None,
        };
        self.article(record, 0)
    }

    #[must_use]
    pub fn list_articles(&self) -> Vec<Article> {
        self.store.articles.iter().filter_map(|record| self.article(record, 0)).collect()
    }
}
