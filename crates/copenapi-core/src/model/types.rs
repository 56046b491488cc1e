use crate::error::ResolveError;
use crate::transform::path_template;

use super::operations::{HttpMethod, Method};

/// The loaded API definition. Built once by [`crate::load_from_str`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ApiDefinition {
    pub host: String,
    pub base_path: String,
    pub has_secure_scheme: bool,
    pub modules: Vec<Module>,
    /// Set when the spec declares no tags and a single default module was synthesized.
    pub no_modules: bool,
}

impl ApiDefinition {
    /// Case-insensitive lookup by module name.
    pub fn find_module(&self, name: &str) -> Option<&Module> {
        self.modules
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.modules.iter().flat_map(|m| m.endpoints.iter())
    }

    /// Find the endpoint serving a concrete request path such as `/v1/pets/42`.
    /// Literal endpoints are tried before templated ones; among templated
    /// endpoints the first declared wins.
    pub fn find_endpoint(&self, path: &str) -> Option<&Endpoint> {
        self.endpoints()
            .find(|e| e.name.eq_ignore_ascii_case(path))
            .or_else(|| self.endpoints().find(|e| e.match_path(path).is_some()))
    }

    pub fn find_method(&self, path: &str, verb: HttpMethod) -> Result<&Method, ResolveError> {
        let endpoint = self
            .find_endpoint(path)
            .ok_or_else(|| ResolveError::EndpointNotFound(path.to_string()))?;
        endpoint.method(verb).ok_or_else(|| ResolveError::MethodNotFound {
            command: path.to_string(),
            verb,
        })
    }

    /// Scheme used when no base URL override is given.
    pub fn scheme(&self) -> &'static str {
        if self.has_secure_scheme { "https" } else { "http" }
    }
}

/// A tag: a named group of endpoints.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub description: String,
    pub endpoints: Vec<Endpoint>,
}

/// One entry under `paths`.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Base path plus the declared path, e.g. `/v1/pets/{id}`.
    pub actual_name: String,
    /// `actual_name` with each path placeholder replaced by `*`.
    pub name: String,
    /// Last segment of the declared path.
    pub command_name: String,
    pub has_path_substitutions: bool,
    pub(crate) methods: [Option<Method>; HttpMethod::COUNT],
}

impl Endpoint {
    pub fn new(actual_name: String, command_name: String) -> Self {
        Self {
            name: actual_name.clone(),
            actual_name,
            command_name,
            has_path_substitutions: false,
            methods: Default::default(),
        }
    }

    pub fn method(&self, verb: HttpMethod) -> Option<&Method> {
        self.methods[verb.index()].as_ref()
    }

    /// Methods in verb order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter().flatten()
    }

    pub fn verbs(&self) -> Vec<HttpMethod> {
        self.methods().map(|m| m.verb).collect()
    }

    /// Whether the command name is a bare placeholder such as `{id}`.
    pub fn is_parameter_terminal(&self) -> bool {
        self.command_name.starts_with('{')
    }

    /// Match a concrete path against this endpoint. On success returns the
    /// placeholder values keyed by placeholder name, in path order.
    pub fn match_path(&self, path: &str) -> Option<Vec<(String, String)>> {
        if self.name.eq_ignore_ascii_case(path) {
            return Some(Vec::new());
        }
        if !self.has_path_substitutions {
            return None;
        }
        path_template::capture(&self.actual_name, &self.name, path)
    }
}
