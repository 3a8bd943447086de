//! Bundle list envelope
//!
//! List endpoints answer with `{total, entry: [...]}`. Entries are kept as
//! raw JSON and decoded on demand; an entry is either `{"resource": {...}}`
//! or the bare resource object.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A list response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub bundle_type: Option<String>,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

/// One undecoded bundle entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundleEntry(Value);

/// Failure to decode the entry at `index`
#[derive(Debug, Error)]
#[error("entry {index}: {source}")]
pub struct EntryDecodeError {
    pub index: usize,
    #[source]
    pub source: serde_json::Error,
}

impl BundleEntry {
    /// Wrap a raw entry
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The resource object, unwrapped from `{"resource": ...}` if wrapped
    pub fn resource(&self) -> &Value {
        match self.0.get("resource") {
            Some(inner) if inner.is_object() => inner,
            _ => &self.0,
        }
    }

    /// Decode the resource into `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(self.resource())
    }
}

impl Bundle {
    /// No matches: no entries, whatever `total` says
    pub fn is_empty(&self) -> bool {
        self.entry.is_empty()
    }

    /// Decode every entry in order; the first failure aborts
    pub fn decode_entries<T: DeserializeOwned>(&self) -> Result<Vec<T>, EntryDecodeError> {
        self.entry
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.decode().map_err(|source| EntryDecodeError { index, source }))
            .collect()
    }
}
