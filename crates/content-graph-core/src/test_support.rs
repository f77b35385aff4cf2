use time::macros::datetime;

use crate::context::RequestContext;
use crate::store::RecordStore;

const FIXTURE: &[u8] = include_bytes!("../../../fixtures/catalog.json");

pub(crate) fn fixture_store() -> RecordStore {
    RecordStore::from_json_bytes(FIXTURE)
        .unwrap_or_else(|err| panic!("fixture catalogue should load: {err}"))
}

/// Default request pinned to Wednesday 2025-06-04 noon UTC.
pub(crate) fn fixture_context() -> RequestContext {
    RequestContext::new().at(datetime!(2025-06-04 12:00 UTC))
}
