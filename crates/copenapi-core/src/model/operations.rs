use std::fmt;
use std::str::FromStr;

/// HTTP method. The declaration order is the order verbs are listed in help
/// output and the index into an endpoint's method table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Number of verbs an endpoint can carry.
    pub const COUNT: usize = 5;

    pub const ALL: [HttpMethod; HttpMethod::COUNT] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no supported HTTP method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported HTTP method: {}", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamType {
    Integer,
    Number,
    String,
    Boolean,
    Array,
    File,
    /// No `type` was declared.
    #[default]
    Invalid,
}

impl ParamType {
    /// Map a Swagger `type` keyword, case-insensitively.
    pub fn from_keyword(keyword: &str) -> Option<ParamType> {
        let ty = match keyword.to_ascii_lowercase().as_str() {
            "integer" => ParamType::Integer,
            "number" => ParamType::Number,
            "string" => ParamType::String,
            "boolean" => ParamType::Boolean,
            "array" => ParamType::Array,
            "file" => ParamType::File,
            _ => return None,
        };
        Some(ty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::String => "string",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::File => "file",
            ParamType::Invalid => "untyped",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter is carried. Only `Path` and `Query` affect the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    FormData,
    Body,
    Other(String),
}

impl ParameterLocation {
    pub fn from_keyword(keyword: &str) -> ParameterLocation {
        match keyword {
            "path" => ParameterLocation::Path,
            "query" => ParameterLocation::Query,
            "header" => ParameterLocation::Header,
            "formData" => ParameterLocation::FormData,
            "body" => ParameterLocation::Body,
            other => ParameterLocation::Other(other.to_string()),
        }
    }
}

/// A parameter declared by the spec for one method.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub param_type: ParamType,
    /// Allowed values, in declaration order. Empty when the spec declares none.
    pub options: Vec<String>,
    pub description: Option<String>,
}

impl Parameter {
    pub fn is_path(&self) -> bool {
        self.location == ParameterLocation::Path
    }

    pub fn is_query(&self) -> bool {
        self.location == ParameterLocation::Query
    }
}

/// One verb on one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub verb: HttpMethod,
    pub summary: String,
    pub description: String,
    pub operation_id: Option<String>,
    pub parameters: Vec<Parameter>,
}

impl Method {
    pub fn path_params(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.is_path())
    }

    pub fn query_params(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.is_query())
    }

    /// Required parameters in declaration order.
    pub fn required_params(&self) -> Vec<&Parameter> {
        self.parameters.iter().filter(|p| p.required).collect()
    }

    pub fn find_param(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}
