use std::fmt;

use thiserror::Error;

use crate::model::{HttpMethod, ParamType};

/// Coarse classification shared by every error the library reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed document or a missing required field.
    SpecFormat,
    /// Unrecognized parameter `type` keyword.
    UnknownType,
    /// The same verb declared twice under one path.
    DuplicateVerb,
    /// Module, command, endpoint, or verb does not exist.
    NotFound,
    /// A command token matched several endpoints at the same tier.
    Ambiguous,
    /// A required parameter has no usable value.
    MissingRequiredParameter,
    /// A bound value does not fit the declared parameter type.
    InvalidValue,
    /// The configuration store could not be read.
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::SpecFormat => "spec format error",
            ErrorKind::UnknownType => "unknown type",
            ErrorKind::DuplicateVerb => "duplicate verb",
            ErrorKind::NotFound => "not found",
            ErrorKind::Ambiguous => "ambiguous",
            ErrorKind::MissingRequiredParameter => "missing required parameter",
            ErrorKind::InvalidValue => "invalid value",
            ErrorKind::Config => "config error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("malformed {context}: {source}")]
    Malformed {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("type {type_name} is not a valid parameter type (parameter '{parameter}')")]
    UnknownType { parameter: String, type_name: String },

    #[error("method {verb} already exists for path {path}")]
    DuplicateVerb { path: String, verb: HttpMethod },
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Json(err)
    }
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::UnknownType { .. } => ErrorKind::UnknownType,
            ParseError::DuplicateVerb { .. } => ErrorKind::DuplicateVerb,
            _ => ErrorKind::SpecFormat,
        }
    }
}

/// The resolution stage at which a command token matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Token equals the endpoint name.
    Exact,
    /// Token is a suffix of the endpoint name starting at a `/` boundary.
    PathSegment,
    /// Token is a suffix of the endpoint name.
    Partial,
    /// Token equals an operationId.
    OperationId,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchTier::Exact => "exact",
            MatchTier::PathSegment => "path segment",
            MatchTier::Partial => "partial",
            MatchTier::OperationId => "operationId",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("module '{0}' not found")]
    ModuleNotFound(String),

    #[error("command '{command}' not found in module '{module}'")]
    CommandNotFound { module: String, command: String },

    #[error("no endpoint matches path '{0}'")]
    EndpointNotFound(String),

    #[error(
        "{} commands match '{command}' by {tier} match, please specify command",
        .candidates.len()
    )]
    Ambiguous {
        command: String,
        tier: MatchTier,
        candidates: Vec<String>,
    },

    #[error("{verb} method not found for command: {command}")]
    MethodNotFound { command: String, verb: HttpMethod },

    #[error(
        "multiple methods found for command {command} ({}), specify one with -X",
        join_methods(.available)
    )]
    MultipleMethods {
        command: String,
        available: Vec<HttpMethod>,
    },
}

fn join_methods(methods: &[HttpMethod]) -> String {
    methods
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::Ambiguous { .. } | ResolveError::MultipleMethods { .. } => {
                ErrorKind::Ambiguous
            }
            _ => ErrorKind::NotFound,
        }
    }
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("please provide required param --{0}")]
    MissingRequiredParameter(String),

    #[error("value required for param --{0}")]
    EmptyValue(String),

    #[error("invalid value '{value}' for {param_type} param --{name}")]
    InvalidValue {
        name: String,
        value: String,
        param_type: ParamType,
    },
}

impl RequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::MissingRequiredParameter(_) | RequestError::EmptyValue(_) => {
                ErrorKind::MissingRequiredParameter
            }
            RequestError::InvalidValue { .. } => ErrorKind::InvalidValue,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("config key {section}.{key} must be a scalar value")]
    NonScalar { section: String, key: String },
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Config
    }
}
