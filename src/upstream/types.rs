//! Catalog wire types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pointer to one upstream item, as listed in the bulk index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogReference {
    pub name: String,
    /// Absolute URL of the item's detail record
    #[serde(rename = "url")]
    pub locator: String,
}

impl CatalogReference {
    pub fn new(name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
        }
    }
}

/// Bulk index response (`GET /pokemon?limit=N`)
#[derive(Debug, Clone, Deserialize)]
pub struct IndexPage {
    pub results: Vec<CatalogReference>,
}

/// Fully decoded upstream item
///
/// The `id` is lifted out of the payload; every other field stays in the
/// attribute bag untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub id: i64,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl DetailRecord {
    pub fn new(id: i64, attributes: Map<String, Value>) -> Self {
        Self { id, attributes }
    }

    /// Build a record from a decoded JSON value
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// The item's `name` attribute, if it is a string
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}
