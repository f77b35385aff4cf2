//! Free-text search over media objects, articles and people.
//!
//! Matching compares normalized text, so `spider-man`, `Spider Man` and `spider_man` are the
//! same query. Matched fields come back with the query wrapped in highlight spans.

use regex_lite::Regex;
use serde::Serialize;

use crate::localization::localize;
use crate::model::{ObjectKind, ResolvedObject};
use crate::record::Record;
use crate::resolver::Resolver;
use crate::store::TranslationTable;

pub const DEFAULT_SEARCH_LIMIT: usize = 20;

const HIGHLIGHT_OPEN: &str = r#"<span class="search-highlight">"#;
const HIGHLIGHT_CLOSE: &str = "</span>";

const MEDIA_FIELDS: &[&str] = &["title", "title_short", "synopsis", "synopsis_short"];
const ARTICLE_FIELDS: &[&str] = &["title", "description", "body"];
const PERSON_FIELDS: &[&str] = &["name", "bio_long", "bio_medium", "bio_short"];

/// Lower-case, treat `-` and `_` as spaces, drop punctuation and collapse whitespace.
#[must_use]
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|ch| if ch == '-' || ch == '_' { ' ' } else { ch })
        .filter(|ch| ch.is_alphanumeric() || ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compiled highlight patterns for one query.
#[derive(Debug)]
pub struct Highlighter {
    literal: Option<Regex>,
    terms: Option<Regex>,
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::debug!(pattern, error = %err, "highlight pattern rejected");
            None
        }
    }
}

impl Highlighter {
    #[must_use]
    pub fn new(query: &str) -> Self {
        let literal = query.trim();
        let literal = if literal.is_empty() {
            None
        } else {
            compile(&format!("(?i){}", regex_lite::escape(literal)))
        };

        let normalized = normalize(query);
        let mut terms: Vec<&str> = normalized.split(' ').filter(|term| !term.is_empty()).collect();
        terms.sort_by(|lhs, rhs| rhs.len().cmp(&lhs.len()).then_with(|| lhs.cmp(rhs)));
        terms.dedup();
        let terms = if terms.is_empty() {
            None
        } else {
            let escaped: Vec<String> = terms.iter().map(|term| regex_lite::escape(term)).collect();
            let alternation = escaped.join("|");
            compile(&format!("(?i){alternation}"))
        };
        Self { literal, terms }
    }

    /// `text` with the literal query, or else each query term, wrapped in highlight spans.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        let replacement = format!("{HIGHLIGHT_OPEN}${{0}}{HIGHLIGHT_CLOSE}");
        let regex = match (&self.literal, &self.terms) {
            (Some(literal), _) if literal.is_match(text) => literal,
            (_, Some(terms)) => terms,
            _ => return text.to_string(),
        };
        regex.replace_all(text, replacement.as_str()).into_owned()
    }

    fn apply_to(&self, field: &mut Option<String>) {
        if let Some(text) = field.as_mut() {
            *text = self.apply(text);
        }
    }
}

/// Per-hit metadata emitted as `_context`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchContext {
    pub typename_highlight: ObjectKind,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    #[serde(flatten)]
    pub object: ResolvedObject,
    #[serde(rename = "_context")]
    pub context: SearchContext,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResults {
    pub total_count: usize,
    pub objects: Vec<SearchHit>,
}

fn matches(record: &Record, fields: &[&str], query: &str) -> bool {
    fields.iter().filter_map(|field| record.text(field)).any(|text| normalize(text).contains(query))
}

impl Resolver<'_> {
    fn highlight_hit(object: &mut ResolvedObject, highlighter: &Highlighter) {
        match object {
            ResolvedObject::Article(article) => {
                highlighter.apply_to(&mut article.title);
                highlighter.apply_to(&mut article.description);
                highlighter.apply_to(&mut article.body);
            }
            ResolvedObject::Person(person) => {
                highlighter.apply_to(&mut person.name);
                highlighter.apply_to(&mut person.bio_long);
                highlighter.apply_to(&mut person.bio_medium);
                highlighter.apply_to(&mut person.bio_short);
            }
            other => {
                if let Some(media) = other.media_mut() {
                    highlighter.apply_to(&mut media.title);
                    highlighter.apply_to(&mut media.title_short);
                    highlighter.apply_to(&mut media.synopsis);
                    highlighter.apply_to(&mut media.synopsis_short);
                }
            }
        }
    }

    /// Search localized text fields. Results list media, then articles, then people;
    /// `total_count` counts every visible match before `limit` is applied.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> SearchResults {
        let normalized = normalize(query);
        if normalized.is_empty() {
            return SearchResults { total_count: 0, objects: Vec::new() };
        }
        let store = self.store();
        let ctx = self.context();
        let hit = |table: TranslationTable, fields: &[&str], record: &Record| {
            matches(&localize(store, table, record, ctx), fields, &normalized)
        };
        let searchable = |kind: ObjectKind| kind.is_media() && kind != ObjectKind::Season;

        let media = store
            .media_objects
            .iter()
            .filter(|record| record.object_kind().is_some_and(searchable))
            .filter(|&record| hit(TranslationTable::MediaObjects, MEDIA_FIELDS, record))
            .filter_map(|record| self.resolve_media_lossy(record, 0));
        let articles = store
            .articles
            .iter()
            .filter(|&record| hit(TranslationTable::Articles, ARTICLE_FIELDS, record))
            .filter_map(|record| self.article(record, 0))
            .map(ResolvedObject::Article);
        let people = store
            .people
            .iter()
            .filter(|&record| hit(TranslationTable::People, PERSON_FIELDS, record))
            .filter_map(|record| self.person(&record.id, 0))
            .map(ResolvedObject::Person);

        let found: Vec<ResolvedObject> = media.chain(articles).chain(people).collect();
        let total_count = found.len();
        let highlighter = Highlighter::new(query);
        let objects = found
            .into_iter()
            .take(limit)
            .map(|mut object| {
                Self::highlight_hit(&mut object, &highlighter);
                let context = SearchContext { typename_highlight: object.kind() };
                SearchHit { object, context }
            })
            .collect();
        tracing::debug!(query, total_count, "search finished");
        SearchResults { total_count, objects }
    }
}
