use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use super::parameter::Parameter;
use crate::error::ParseError;

/// An API operation: one verb under one path.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,

    pub summary: Option<String>,

    pub description: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl Operation {
    /// Decode the operation object found under `path` / `key`.
    pub fn from_value(path: &str, key: &str, value: &serde_json::Value) -> Result<Self, ParseError> {
        Operation::deserialize(value).map_err(|source| ParseError::Malformed {
            context: format!("operation '{key}' under path {path}"),
            source,
        })
    }
}

/// A path item: its keys in document order, values left undecoded.
///
/// A derived map would silently keep only the last of two identical keys, and a
/// verb declared twice under one path must be reported, so entries are
/// collected as a list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathItem {
    pub entries: Vec<(String, serde_json::Value)>,
}

impl<'de> Deserialize<'de> for PathItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PathItemVisitor;

        impl<'de> Visitor<'de> for PathItemVisitor {
            type Value = PathItem;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a path item object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<PathItem, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, serde_json::Value>()? {
                    entries.push((key, value));
                }
                Ok(PathItem { entries })
            }

            fn visit_unit<E>(self) -> Result<PathItem, E>
            where
                E: de::Error,
            {
                Ok(PathItem::default())
            }
        }

        deserializer.deserialize_map(PathItemVisitor)
    }
}
