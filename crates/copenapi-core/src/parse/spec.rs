use indexmap::IndexMap;
use serde::Deserialize;

use super::operation::PathItem;

/// Info object describing the API. Only used for display.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Info {
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
}

/// Tag definition. `name` is checked at load time so a missing one can be
/// reported as a missing field instead of a serde error.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Tag {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Top-level Swagger 2.0 document, restricted to the keys this crate acts on.
///
/// Every field is optional at this layer; required keys are enforced by
/// [`crate::transform::load`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SwaggerSpec {
    pub swagger: Option<String>,

    pub info: Option<Info>,

    pub host: Option<String>,

    #[serde(rename = "basePath")]
    pub base_path: Option<String>,

    pub schemes: Option<Vec<String>>,

    pub tags: Option<Vec<Tag>>,

    /// Paths in document order.
    pub paths: Option<IndexMap<String, PathItem>>,
}
