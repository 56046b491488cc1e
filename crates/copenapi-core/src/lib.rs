pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod parse;
pub mod request;
pub mod resolve;
pub mod transform;
pub mod validate;

use std::path::Path;

pub use error::{ConfigError, ErrorKind, MatchTier, ParseError, RequestError, ResolveError};
pub use model::*;

/// Load an API definition from JSON text.
pub fn load_from_str(input: &str) -> Result<ApiDefinition, ParseError> {
    let spec = parse::from_json(input)?;
    transform::load(&spec)
}

/// Load an API definition from YAML text.
pub fn load_from_yaml_str(input: &str) -> Result<ApiDefinition, ParseError> {
    let spec = parse::from_yaml(input)?;
    transform::load(&spec)
}

/// Load an API definition from a file. `.yaml` and `.yml` files are read as
/// YAML, anything else as JSON.
pub fn load_from_file(path: &Path) -> Result<ApiDefinition, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    if is_yaml {
        load_from_yaml_str(&content)
    } else {
        load_from_str(&content)
    }
}
