pub mod operation;
pub mod parameter;
pub mod spec;

use crate::error::ParseError;
use spec::SwaggerSpec;

/// Parse a Swagger document from YAML.
pub fn from_yaml(input: &str) -> Result<SwaggerSpec, ParseError> {
    let spec: SwaggerSpec = serde_yaml_ng::from_str(input)?;
    check_version(&spec);
    Ok(spec)
}

/// Parse a Swagger document from JSON.
pub fn from_json(input: &str) -> Result<SwaggerSpec, ParseError> {
    let spec: SwaggerSpec = serde_json::from_str(input)?;
    check_version(&spec);
    Ok(spec)
}

// Documents without a `swagger` key, or with another version, are still loaded.
fn check_version(spec: &SwaggerSpec) {
    match spec.swagger.as_deref() {
        Some(version) if !version.starts_with("2.") => {
            log::warn!("swagger version {version} is not 2.x, loading anyway");
        }
        _ => {}
    }
}
