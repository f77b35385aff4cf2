use std::borrow::Cow;

use crate::context::RequestContext;
use crate::record::Record;
use crate::store::{Collection, RecordStore, TranslationTable};

/// Fields a translation may override.
pub const TRANSLATABLE_FIELDS: [&str; 12] = [
    "title",
    "title_short",
    "synopsis",
    "synopsis_short",
    "text",
    "text_short",
    "description",
    "description_short",
    "name",
    "bio_long",
    "bio_medium",
    "bio_short",
];

/// Translation row for `object_id` in `language_code`, compared case-insensitively.
#[must_use]
pub fn find_translation<'a>(
    translations: &'a Collection,
    object_id: &str,
    language_code: &str,
) -> Option<&'a Record> {
    translations.iter().find(|translation| {
        translation.ids("object").contains(&object_id)
            && translation
                .ids("language_code")
                .iter()
                .any(|code| code.eq_ignore_ascii_case(language_code))
    })
}

/// Overlay truthy translated values from the allow-list onto `base`.
#[must_use]
pub fn merge_translation(base: &Record, translation: &Record) -> Record {
    let mut merged = base.clone();
    for name in TRANSLATABLE_FIELDS {
        if let Some(value) = translation.field(name).filter(|value| value.is_truthy()) {
            merged.fields.insert(name.to_string(), value.clone());
        }
    }
    merged
}

/// Localize `record` for the request. The default locale, and records without a translation,
/// come back borrowed and unchanged.
#[must_use]
pub fn localize<'a>(
    store: &RecordStore,
    table: TranslationTable,
    record: &'a Record,
    ctx: &RequestContext,
) -> Cow<'a, Record> {
    if ctx.is_default_language() {
        return Cow::Borrowed(record);
    }
    match find_translation(store.translations(table), &record.id, &ctx.language_code) {
        Some(translation) => Cow::Owned(merge_translation(record, translation)),
        None => Cow::Borrowed(record),
    }
}
