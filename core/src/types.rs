//! Response shaping types: schema-less records and the paged collection.
//!
//! # Design
//! The marketplace does not publish a stable schema for items or pictures, so
//! `Item` and `Picture` keep whatever fields the server sent in a key-ordered
//! JSON map. `Collection` keeps the raw result objects of one search page and
//! wraps each into an `Item` only while it is iterated.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

macro_rules! record {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Map<String, Value>);

        impl $name {
            pub fn from_map(fields: Map<String, Value>) -> Self {
                Self(fields)
            }

            /// Fails unless `value` is a JSON object.
            pub fn from_value(value: Value) -> Result<Self, ApiError> {
                match value {
                    Value::Object(fields) => Ok(Self(fields)),
                    other => Err(ApiError::DeserializationError(format!(
                        "expected a JSON object for {}, got {other}",
                        stringify!($name)
                    ))),
                }
            }

            pub fn get(&self, key: &str) -> Option<&Value> {
                self.0.get(key)
            }

            pub fn fields(&self) -> &Map<String, Value> {
                &self.0
            }

            pub fn into_fields(self) -> Map<String, Value> {
                self.0
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }
    };
}

record! {
    /// One listing from a search page.
    Item
}

record! {
    /// An uploaded picture as described by the `/pictures` response.
    Picture
}

/// A single page of search results.
///
/// Holds exactly what the server returned for one call; it never fetches
/// further pages. Consuming it yields one `Item` per result in the order the
/// server listed them.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    results: Vec<Map<String, Value>>,
    paging: Value,
}

impl Collection {
    pub fn new(results: Vec<Map<String, Value>>, paging: Value) -> Self {
        Self { results, paging }
    }

    /// Split a decoded search response into `results` and `paging`.
    ///
    /// A body without a `results` array, or with a non-object entry in it, is
    /// returned whole inside `ApiError::UnexpectedResponse`. A missing `paging`
    /// becomes `Value::Null`.
    pub fn from_search(body: Value) -> Result<Self, ApiError> {
        let mut fields = match body {
            Value::Object(fields) => fields,
            other => return Err(ApiError::UnexpectedResponse(other)),
        };
        let paging = fields.remove("paging");
        let results = match fields.remove("results") {
            Some(Value::Array(entries)) if entries.iter().all(Value::is_object) => entries,
            other => {
                restore(&mut fields, paging, other);
                return Err(ApiError::UnexpectedResponse(Value::Object(fields)));
            }
        };
        let results = results
            .into_iter()
            .filter_map(|entry| match entry {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        Ok(Self::new(results, paging.unwrap_or(Value::Null)))
    }

    /// Paging metadata as sent by the server (total, offset, limit, ...).
    pub fn paging(&self) -> &Value {
        &self.paging
    }

    /// Raw result objects, before `Item` wrapping.
    pub fn results(&self) -> &[Map<String, Value>] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Offset of the following page, if paging says there is one.
    ///
    /// Needs numeric `offset`, `limit` and `total` fields; returns `None`
    /// otherwise, or when `limit` is zero.
    pub fn next_offset(&self) -> Option<u64> {
        let field = |name: &str| self.paging.get(name).and_then(Value::as_u64);
        let (offset, limit, total) = (field("offset")?, field("limit")?, field("total")?);
        if limit == 0 {
            return None;
        }
        let next = offset.checked_add(limit)?;
        (next < total).then_some(next)
    }
}

fn restore(fields: &mut Map<String, Value>, paging: Option<Value>, results: Option<Value>) {
    if let Some(paging) = paging {
        fields.insert("paging".to_string(), paging);
    }
    if let Some(results) = results {
        fields.insert("results".to_string(), results);
    }
}

impl IntoIterator for Collection {
    type Item = Item;
    type IntoIter = std::iter::Map<std::vec::IntoIter<Map<String, Value>>, fn(Map<String, Value>) -> Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter().map(Item::from_map as fn(_) -> _)
    }
}
