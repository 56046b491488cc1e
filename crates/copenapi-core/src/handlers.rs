//! Server-side dispatch: implementations registered per module are mapped
//! onto the endpoints and verbs the spec declares.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::error::ResolveError;
use crate::model::{ApiDefinition, Endpoint, HttpMethod, Module};

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Takes the request JSON and returns the response JSON.
pub type Handler = Arc<dyn Fn(&str) -> Result<String, HandlerError> + Send + Sync>;

/// Implementations for one endpoint, at most one per verb.
#[derive(Clone)]
pub struct EndpointImpl {
    /// The endpoint path, either templated (`/v1/pets/{id}`) or wildcarded (`/v1/pets/*`).
    pub endpoint: String,
    handlers: [Option<Handler>; HttpMethod::COUNT],
}

impl EndpointImpl {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            handlers: Default::default(),
        }
    }

    pub fn with<F>(mut self, verb: HttpMethod, handler: F) -> Self
    where
        F: Fn(&str) -> Result<String, HandlerError> + Send + Sync + 'static,
    {
        self.handlers[verb.index()] = Some(Arc::new(handler));
        self
    }

    pub fn handler(&self, verb: HttpMethod) -> Option<&Handler> {
        self.handlers[verb.index()].as_ref()
    }
}

impl fmt::Debug for EndpointImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verbs: Vec<HttpMethod> = HttpMethod::ALL
            .into_iter()
            .filter(|v| self.handler(*v).is_some())
            .collect();
        f.debug_struct("EndpointImpl")
            .field("endpoint", &self.endpoint)
            .field("verbs", &verbs)
            .finish()
    }
}

/// Implementations offered for one module.
#[derive(Debug, Clone)]
pub struct ModuleRegistration {
    pub module: String,
    pub endpoints: Vec<EndpointImpl>,
}

/// Handlers keyed by endpoint and verb.
#[derive(Clone, Default)]
pub struct HandlerMap {
    handlers: IndexMap<(String, HttpMethod), Handler>,
}

impl HandlerMap {
    /// Map `registrations` onto `api`. Anything that does not line up with the
    /// spec is skipped with a warning.
    pub fn build(api: &ApiDefinition, registrations: &[ModuleRegistration]) -> Self {
        let mut map = HandlerMap::default();
        for registration in registrations {
            let Some(module) = api.find_module(&registration.module) else {
                warn!("no api spec for module {}", registration.module);
                continue;
            };
            for imp in &registration.endpoints {
                map.map_endpoint(module, imp);
            }
        }
        map
    }

    fn map_endpoint(&mut self, module: &Module, imp: &EndpointImpl) {
        let Some(endpoint) = find_in_module(module, &imp.endpoint) else {
            warn!("no api spec for {} in module {}", imp.endpoint, module.name);
            return;
        };

        for verb in HttpMethod::ALL {
            match (endpoint.method(verb), imp.handler(verb)) {
                (None, None) => {}
                (Some(_), None) => warn!("no {verb} impl for defined {}", endpoint.name),
                (None, Some(_)) => warn!("no {verb} definition for impl {}", imp.endpoint),
                (Some(_), Some(handler)) => {
                    debug!("mapping {verb} implementation for {}", endpoint.name);
                    self.handlers
                        .insert((endpoint.actual_name.clone(), verb), Arc::clone(handler));
                }
            }
        }
    }

    /// Find the handler serving `verb` on the concrete request `path`.
    pub fn find_handler(
        &self,
        api: &ApiDefinition,
        path: &str,
        verb: HttpMethod,
    ) -> Result<&Handler, ResolveError> {
        let endpoint = api
            .find_endpoint(path)
            .ok_or_else(|| ResolveError::EndpointNotFound(path.to_string()))?;
        self.handlers
            .get(&(endpoint.actual_name.clone(), verb))
            .ok_or_else(|| ResolveError::MethodNotFound {
                command: path.to_string(),
                verb,
            })
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.handlers.keys()).finish()
    }
}

fn find_in_module<'a>(module: &'a Module, path: &str) -> Option<&'a Endpoint> {
    module
        .endpoints
        .iter()
        .find(|e| e.actual_name.eq_ignore_ascii_case(path) || e.name.eq_ignore_ascii_case(path))
        .or_else(|| module.endpoints.iter().find(|e| e.match_path(path).is_some()))
}
