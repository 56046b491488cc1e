use serde::Deserialize;

/// A parameter as written in the document.
///
/// `name` and `in` are required, but are kept optional here so the loader can
/// report which one is missing.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Parameter {
    pub name: Option<String>,

    #[serde(rename = "in")]
    pub location: Option<String>,

    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(rename = "type")]
    pub param_type: Option<String>,

    #[serde(rename = "enum")]
    pub options: Option<Vec<serde_json::Value>>,
}

impl Parameter {
    /// Enumerated values rendered as strings. Non-string scalars keep their JSON
    /// text, so `[1, 2]` yields `"1"` and `"2"`.
    pub fn option_strings(&self) -> Vec<String> {
        self.options
            .iter()
            .flatten()
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}
