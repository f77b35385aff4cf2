use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::model::ObjectKind;

/// Field holding the object type discriminator on media records.
pub const OBJECT_TYPE_FIELD: &str = "skylark_object_type";

/// One file attached to a record (image uploads and the like).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: Option<String>,
}

/// A field value after the load-time parse.
///
/// Snapshot fields are untyped JSON; every value is folded into one of these variants once,
/// so the resolver never has to coerce `serde_json::Value` again. Arrays keep only their
/// string elements, except arrays of objects which become [`FieldValue::Attachments`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Flag(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
    Attachments(Vec<Attachment>),
}

impl FieldValue {
    /// Parse one JSON value. `null` and bare objects carry nothing the resolver reads.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null | Value::Object(_) => None,
            Value::Bool(flag) => Some(Self::Flag(*flag)),
            Value::Number(number) => number.as_f64().map(Self::Number),
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Array(items) => {
                if items.iter().any(Value::is_object) {
                    let attachments = items
                        .iter()
                        .filter_map(Value::as_object)
                        .map(|object| Attachment {
                            url: object.get("url").and_then(Value::as_str).map(str::to_string),
                        })
                        .collect();
                    return Some(Self::Attachments(attachments));
                }
                Some(Self::List(
                    items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
                ))
            }
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// A scalar string, or the first element of a list.
    #[must_use]
    pub fn as_single_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::List(items) => items.first().map(String::as_str),
            _ => None,
        }
    }

    /// JavaScript-style truthiness, used when deciding whether a translated value overrides.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Number(number) => *number != 0.0 && !number.is_nan(),
            Self::Text(text) => !text.is_empty(),
            Self::List(_) | Self::Attachments(_) => true,
        }
    }
}

pub type Fields = BTreeMap<String, FieldValue>;

/// Normalize a relationship value into its referenced ids.
///
/// Absent values give no ids, a scalar string is a single id, and a list keeps its order.
#[must_use]
pub fn relationship_ids(value: Option<&FieldValue>) -> Vec<&str> {
    match value {
        Some(FieldValue::Text(id)) => vec![id.as_str()],
        Some(FieldValue::List(ids)) => ids.iter().map(String::as_str).collect(),
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub fields: Fields,
}

impl Record {
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self { id: id.into(), fields }
    }

    #[must_use]
    pub fn from_json_fields(id: impl Into<String>, raw: &Map<String, Value>) -> Self {
        let fields = raw
            .iter()
            .filter_map(|(name, value)| {
                FieldValue::from_json(value).map(|parsed| (name.clone(), parsed))
            })
            .collect();
        Self { id: id.into(), fields }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(FieldValue::as_str)
    }

    /// Like [`Record::text`] but treats the empty string as missing.
    #[must_use]
    pub fn non_empty_text(&self, name: &str) -> Option<&str> {
        self.text(name).filter(|text| !text.is_empty())
    }

    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(FieldValue::as_number)
    }

    #[must_use]
    pub fn string_list(&self, name: &str) -> Option<&[String]> {
        self.field(name).and_then(FieldValue::as_string_list)
    }

    #[must_use]
    pub fn single_text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(FieldValue::as_single_str)
    }

    #[must_use]
    pub fn ids(&self, name: &str) -> Vec<&str> {
        relationship_ids(self.field(name))
    }

    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.field(name), Some(FieldValue::Flag(true)))
    }

    #[must_use]
    pub fn external_id(&self) -> &str {
        self.non_empty_text("external_id").unwrap_or(&self.id)
    }

    #[must_use]
    pub fn discriminator(&self) -> Option<&str> {
        self.text(OBJECT_TYPE_FIELD)
    }

    #[must_use]
    pub fn object_kind(&self) -> Option<ObjectKind> {
        self.discriminator().and_then(ObjectKind::from_discriminator)
    }

    /// Whether this record is of the named type. Known aliases compare by kind; anything
    /// else falls back to an exact discriminator comparison.
    #[must_use]
    pub fn is_type(&self, type_name: &str) -> bool {
        match ObjectKind::from_discriminator(type_name) {
            Some(kind) => self.object_kind() == Some(kind),
            None => self.discriminator() == Some(type_name),
        }
    }
}
