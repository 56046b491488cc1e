//! Mapping of a user-typed module and command onto an endpoint and a verb.
//!
//! Commands are matched against each endpoint's wildcard name in tiers. The
//! first tier that produces candidates decides the result:
//!
//! 1. exact: the whole name, or the name relative to the base path
//! 2. path segment: a suffix of the name that starts right after a `/`
//! 3. partial: any suffix of the name
//! 4. operationId: an operation under a `{placeholder}` endpoint
//!
//! Matching is case-insensitive except for operationIds.

use log::debug;

use crate::error::{MatchTier, ResolveError};
use crate::model::{ApiDefinition, Endpoint, HttpMethod, Method, Module};

/// The outcome of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub module: &'a Module,
    pub endpoint: &'a Endpoint,
    pub tier: MatchTier,
    /// The token that was resolved.
    pub command: String,
    /// Set when the endpoint was found through an operationId, which pins the verb.
    pub operation: Option<&'a Method>,
}

impl<'a> Resolution<'a> {
    /// Pick the verb to call. See [`select_method`].
    pub fn method(&self, requested: Option<HttpMethod>) -> Result<&'a Method, ResolveError> {
        select_method(self, requested)
    }
}

/// Case-insensitive module lookup.
pub fn find_module<'a>(api: &'a ApiDefinition, name: &str) -> Result<&'a Module, ResolveError> {
    api.find_module(name)
        .ok_or_else(|| ResolveError::ModuleNotFound(name.to_string()))
}

/// Resolve `command` within `module`.
pub fn resolve<'a>(
    api: &'a ApiDefinition,
    module: &str,
    command: &str,
) -> Result<Resolution<'a>, ResolveError> {
    let module = find_module(api, module)?;
    resolve_in_module(api, module, command)
}

pub fn resolve_in_module<'a>(
    api: &'a ApiDefinition,
    module: &'a Module,
    command: &str,
) -> Result<Resolution<'a>, ResolveError> {
    if command.trim().is_empty() {
        return Err(ResolveError::CommandNotFound {
            module: module.name.clone(),
            command: command.to_string(),
        });
    }

    let found = |endpoint: &'a Endpoint,
                 tier: MatchTier,
                 operation: Option<&'a Method>|
     -> Result<Resolution<'a>, ResolveError> {
        debug!(
            "command '{command}' resolved to {} by {tier} match",
            endpoint.actual_name
        );
        Ok(Resolution {
            module,
            endpoint,
            tier,
            command: command.to_string(),
            operation,
        })
    };

    if let Some(endpoint) = module
        .endpoints
        .iter()
        .find(|e| is_exact(&api.base_path, &e.name, command))
    {
        return found(endpoint, MatchTier::Exact, None);
    }

    for (tier, matcher) in [
        (MatchTier::PathSegment, ends_at_segment as fn(&str, &str) -> bool),
        (MatchTier::Partial, ends_with_ignore_case),
    ] {
        let candidates: Vec<&Endpoint> = module
            .endpoints
            .iter()
            .filter(|e| matcher(&e.name, command))
            .collect();
        match candidates.as_slice() {
            [] => debug!("no {tier} match for '{command}'"),
            [endpoint] => return found(*endpoint, tier, None),
            _ => {
                return Err(ResolveError::Ambiguous {
                    command: command.to_string(),
                    tier,
                    candidates: candidates.iter().map(|e| e.actual_name.clone()).collect(),
                });
            }
        }
    }

    module
        .endpoints
        .iter()
        .filter(|e| e.is_parameter_terminal())
        .find_map(|e| {
            e.methods()
                .find(|m| m.operation_id.as_deref() == Some(command))
                .map(|m| (e, m))
        })
        .map_or_else(
            || {
                Err(ResolveError::CommandNotFound {
                    module: module.name.clone(),
                    command: command.to_string(),
                })
            },
            |(endpoint, method)| found(endpoint, MatchTier::OperationId, Some(method)),
        )
}

/// Resolve a concrete request path such as `/v1/pets/42` across all modules.
/// Returns the placeholder values captured from the path.
///
/// An endpoint without placeholders matching the path wins over a templated
/// one, so `/pets/mine` is not shadowed by an earlier `/pets/{id}`. Among
/// templated endpoints the first declared wins.
pub fn resolve_path<'a>(
    api: &'a ApiDefinition,
    path: &str,
) -> Result<(Resolution<'a>, Vec<(String, String)>), ResolveError> {
    let endpoints = || {
        api.modules
            .iter()
            .flat_map(|m| m.endpoints.iter().map(move |e| (m, e)))
    };
    let found = endpoints()
        .find(|(_, e)| e.name.eq_ignore_ascii_case(path))
        .map(|(m, e)| (m, e, Vec::new()))
        .or_else(|| {
            endpoints().find_map(|(m, e)| e.match_path(path).map(|captures| (m, e, captures)))
        });

    let Some((module, endpoint, captures)) = found else {
        return Err(ResolveError::EndpointNotFound(path.to_string()));
    };
    debug!("path {path} resolved to {}", endpoint.actual_name);
    let resolution = Resolution {
        module,
        endpoint,
        tier: MatchTier::Exact,
        command: path.to_string(),
        operation: None,
    };
    Ok((resolution, captures))
}

/// Choose the verb for a resolved endpoint.
///
/// An explicit verb must exist on the endpoint. Without one, GET is preferred,
/// then the only declared verb. Several verbs without GET is an error.
pub fn select_method<'a>(
    resolution: &Resolution<'a>,
    requested: Option<HttpMethod>,
) -> Result<&'a Method, ResolveError> {
    let endpoint = resolution.endpoint;
    let not_found = |verb| ResolveError::MethodNotFound {
        command: resolution.command.clone(),
        verb,
    };

    if let Some(method) = resolution.operation {
        return match requested {
            Some(verb) if verb != method.verb => Err(not_found(verb)),
            _ => Ok(method),
        };
    }

    if let Some(verb) = requested {
        return endpoint.method(verb).ok_or_else(|| not_found(verb));
    }
    if let Some(get) = endpoint.method(HttpMethod::Get) {
        return Ok(get);
    }

    let mut methods = endpoint.methods();
    match (methods.next(), methods.next()) {
        (Some(only), None) => Ok(only),
        (None, _) => Err(not_found(HttpMethod::Get)),
        (Some(_), Some(_)) => Err(ResolveError::MultipleMethods {
            command: resolution.command.clone(),
            available: endpoint.verbs(),
        }),
    }
}

/// Endpoints whose name ends with `command`, for help output.
pub fn matching_endpoints<'a>(module: &'a Module, command: &str) -> Vec<&'a Endpoint> {
    module
        .endpoints
        .iter()
        .filter(|e| ends_with_ignore_case(&e.name, command))
        .collect()
}

fn is_exact(base_path: &str, name: &str, command: &str) -> bool {
    if name.eq_ignore_ascii_case(command) {
        return true;
    }
    let base = base_path.trim_end_matches('/');
    let relative = match name.get(..base.len()) {
        Some(prefix) if !base.is_empty() && prefix.eq_ignore_ascii_case(base) => &name[base.len()..],
        _ => name,
    };
    relative.eq_ignore_ascii_case(command)
        || relative
            .strip_prefix('/')
            .is_some_and(|r| r.eq_ignore_ascii_case(command))
}

fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    name.len()
        .checked_sub(suffix.len())
        .and_then(|start| name.get(start..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

/// Suffix match aligned on a segment boundary.
fn ends_at_segment(name: &str, suffix: &str) -> bool {
    if !ends_with_ignore_case(name, suffix) {
        return false;
    }
    suffix.starts_with('/') || name[..name.len() - suffix.len()].ends_with('/')
}
