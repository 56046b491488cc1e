//! Request construction: path substitution, query string, and URL assembly.
//!
//! Values are percent-encoded; only RFC 3986 unreserved characters pass
//! through. Parameter names are emitted as declared.

use std::fmt;

use log::{debug, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::RequestError;
use crate::model::{ApiDefinition, Endpoint, HttpMethod, Method, Parameter};
use crate::validate::{check_param, in_options};

const VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// User-supplied parameter values, in the order given. Lookups ignore case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundParams {
    entries: Vec<(String, String)>,
}

impl BoundParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing an earlier value for the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Bind `name` unless it is already bound.
    pub fn insert_if_absent(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if !self.contains(&name) {
            self.entries.push((name, value.into()));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for BoundParams {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut params = BoundParams::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// How the transport authenticates.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    None,
    Basic {
        user: String,
        password: String,
    },
    /// Credentials are looked up in the user's netrc file by the transport.
    Netrc,
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::None => f.write_str("None"),
            AuthMode::Basic { user, .. } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("password", &"***")
                .finish(),
            AuthMode::Netrc => f.write_str("Netrc"),
        }
    }
}

/// Caller-supplied settings that do not come from the spec.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Replaces `scheme://host` when set.
    pub base_url: Option<String>,
    pub headers: Vec<(String, String)>,
    pub auth: AuthMode,
    pub insecure: bool,
    pub verbose: bool,
}

/// Everything the transport needs to perform one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub auth: AuthMode,
    pub insecure: bool,
    pub verbose: bool,
}

pub fn build_request(
    api: &ApiDefinition,
    endpoint: &Endpoint,
    method: &Method,
    bound: &BoundParams,
    options: &RequestOptions,
) -> Result<RequestDescriptor, RequestError> {
    let path = substitute_path(endpoint, method, bound)?;
    let query = build_query(method, bound)?;
    let url = assemble_url(api, options.base_url.as_deref(), &path, &query);
    debug!("{} {url}", method.verb);

    Ok(RequestDescriptor {
        method: method.verb,
        url,
        headers: options.headers.clone(),
        auth: options.auth.clone(),
        insecure: options.insecure,
        verbose: options.verbose,
    })
}

/// Replace each `{name}` placeholder in the endpoint's actual name with its
/// bound value.
pub fn substitute_path(
    endpoint: &Endpoint,
    method: &Method,
    bound: &BoundParams,
) -> Result<String, RequestError> {
    let mut path = endpoint.actual_name.clone();
    for param in method.path_params() {
        let Some(value) = bound_value(param, bound)? else {
            continue;
        };
        let placeholder = format!("{{{}}}", param.name);
        path = path.replace(&placeholder, &encode(value));
    }
    // Undeclared or unbound placeholders must not reach the wire.
    if let Some(name) = first_placeholder(&path) {
        return Err(RequestError::MissingRequiredParameter(name.to_string()));
    }
    Ok(path)
}

fn first_placeholder(path: &str) -> Option<&str> {
    let start = path.find('{')? + 1;
    let len = path[start..].find('}')?;
    Some(&path[start..start + len])
}

/// `name=value` pairs for the bound query parameters, in declaration order.
pub fn build_query(method: &Method, bound: &BoundParams) -> Result<String, RequestError> {
    let mut pairs = Vec::new();
    for param in method.query_params() {
        if let Some(value) = bound_value(param, bound)? {
            pairs.push(format!("{}={}", param.name, encode(value)));
        }
    }
    Ok(pairs.join("&"))
}

pub fn assemble_url(api: &ApiDefinition, base_url: Option<&str>, path: &str, query: &str) -> String {
    let mut url = match base_url {
        Some(base) => format!("{}{path}", base.trim_end_matches('/')),
        None => format!("{}://{}{path}", api.scheme(), api.host),
    };
    if !query.is_empty() {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// The usable value bound to `param`, `None` when it should be left out.
fn bound_value<'b>(param: &Parameter, bound: &'b BoundParams) -> Result<Option<&'b str>, RequestError> {
    let value = match bound.get(&param.name) {
        None if param.required => {
            return Err(RequestError::MissingRequiredParameter(param.name.clone()));
        }
        None => return Ok(None),
        Some("") if param.required => return Err(RequestError::EmptyValue(param.name.clone())),
        Some("") => return Ok(None),
        Some(value) => value,
    };

    if !check_param(param, value) {
        return Err(RequestError::InvalidValue {
            name: param.name.clone(),
            value: value.to_string(),
            param_type: param.param_type,
        });
    }
    if !in_options(param, value) {
        warn!(
            "value '{value}' for --{} is not one of [{}]",
            param.name,
            param.options.join(", ")
        );
    }
    Ok(Some(value))
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, VALUE).to_string()
}
