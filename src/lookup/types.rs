//! Data types for the suggestion lookup contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A labeled token, either held in the collection or offered as a suggestion.
///
/// Only `label` is interpreted by the widget; any extra fields a source
/// attaches (descriptions, ids, grouping data) are carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// The display label. Uniqueness within a collection is by label.
    pub label: String,
    /// Arbitrary extra fields supplied by the source or the host.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Tag {
    /// Create a tag with just a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Parameters passed to the lookup on every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupParams {
    /// The text typed so far.
    pub keywords: String,
    /// Opaque grouping value configured on the widget, passed through as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
}

/// A lookup reply.
///
/// Sources may return either a plain array of suggestions or an envelope
/// with a `data` field; both deserialize into this type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LookupReply {
    /// `{ "data": [...] }`
    Envelope { data: Vec<Tag> },
    /// `[...]`
    Items(Vec<Tag>),
}

impl LookupReply {
    /// Unwrap the suggestions, whichever shape was returned.
    pub fn into_items(self) -> Vec<Tag> {
        match self {
            LookupReply::Envelope { data } => data,
            LookupReply::Items(items) => items,
        }
    }
}

impl From<Vec<Tag>> for LookupReply {
    fn from(items: Vec<Tag>) -> Self {
        LookupReply::Items(items)
    }
}
