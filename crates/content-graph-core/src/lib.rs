//! Depth-bounded resolution of a flat content catalogue into nested, localized,
//! entitlement-filtered result graphs.
//!
//! The [`store::RecordStore`] is built once from a snapshot and is immutable afterwards.
//! Every query runs through a [`resolver::Resolver`] that borrows the store together with
//! a per-request [`context::RequestContext`].

pub mod availability;
pub mod context;
pub mod dynamic;
pub mod expand;
pub mod localization;
pub mod model;
pub mod record;
pub mod resolver;
pub mod search;
pub mod store;

#[cfg(test)]
mod test_support;

pub use context::{RequestContext, RequestedDimensions};
pub use expand::{RelationshipCost, MAX_DEPTH};
pub use model::{Connection, ObjectKind, ObjectList, ResolvedObject};
pub use record::{FieldValue, Record};
pub use resolver::Resolver;
pub use search::{SearchHit, SearchResults, DEFAULT_SEARCH_LIMIT};
pub use store::RecordStore;

/// Locale whose content is stored on the base records.
pub const DEFAULT_LANGUAGE: &str = "en-gb";

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum GraphError {
    #[error("snapshot error: {0}")]
    Snapshot(String),
    #[error("unknown object kind `{discriminator}` on record {record_id}")]
    UnknownKind { record_id: String, discriminator: String },
    #[error("query error: {0}")]
    Query(String),
}
