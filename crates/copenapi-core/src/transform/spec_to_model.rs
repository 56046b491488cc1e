use log::{debug, warn};
use serde::Deserialize;

use crate::error::ParseError;
use crate::model::{
    ApiDefinition, Endpoint, HttpMethod, Method, Module, ParamType, Parameter, ParameterLocation,
};
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::Parameter as RawParameter;
use crate::parse::spec::SwaggerSpec;

use super::path_template::wildcard_name;

/// Path item key holding parameters shared by every verb of the path.
const SHARED_PARAMETERS: &str = "parameters";

/// Description given to the module synthesized for documents without tags.
pub const DEFAULT_MODULE_DESCRIPTION: &str = "default module";

/// Turn a parsed document into the API model.
///
/// Fails on the first structural error; no partial model is returned.
pub fn load(spec: &SwaggerSpec) -> Result<ApiDefinition, ParseError> {
    let has_secure_scheme = secure_scheme(spec.schemes.as_deref());
    let host = required(&spec.host, "host")?;
    let base_path = required(&spec.base_path, "basePath")?;

    let (mut modules, no_modules) = match load_modules(spec)? {
        Some(modules) => (modules, false),
        None => (vec![default_module(&base_path)], true),
    };

    let paths = spec
        .paths
        .as_ref()
        .ok_or_else(|| ParseError::MissingField("paths".to_string()))?;

    for (key, item) in paths {
        let (endpoint, tag) = load_endpoint(&base_path, key, item)?;
        let index = owning_module(&modules, tag.as_deref(), key, no_modules);
        debug!(
            "endpoint {} registered under module {}",
            endpoint.actual_name, modules[index].name
        );
        modules[index].endpoints.push(endpoint);
    }

    Ok(ApiDefinition {
        host,
        base_path,
        has_secure_scheme,
        modules,
        no_modules,
    })
}

fn required(value: &Option<String>, field: &str) -> Result<String, ParseError> {
    value
        .clone()
        .ok_or_else(|| ParseError::MissingField(field.to_string()))
}

/// An absent `schemes` key means https.
fn secure_scheme(schemes: Option<&[String]>) -> bool {
    match schemes {
        None => true,
        Some(schemes) => schemes.iter().any(|s| s.eq_ignore_ascii_case("https")),
    }
}

/// Modules from `tags`, in declaration order. `None` when the document has no
/// tags, including an empty `tags` array.
fn load_modules(spec: &SwaggerSpec) -> Result<Option<Vec<Module>>, ParseError> {
    let tags = match spec.tags.as_deref() {
        None | Some([]) => return Ok(None),
        Some(tags) => tags,
    };

    let mut modules: Vec<Module> = Vec::with_capacity(tags.len());
    for tag in tags {
        let name = tag
            .name
            .clone()
            .ok_or_else(|| ParseError::MissingField("tag name".to_string()))?;
        if modules.iter().any(|m| m.name.eq_ignore_ascii_case(&name)) {
            warn!("tag {name} declared more than once, ignoring repeat");
            continue;
        }
        modules.push(Module {
            name,
            description: tag.description.clone().unwrap_or_default(),
            endpoints: Vec::new(),
        });
    }
    Ok(Some(modules))
}

fn default_module(base_path: &str) -> Module {
    Module {
        name: base_path.to_string(),
        description: DEFAULT_MODULE_DESCRIPTION.to_string(),
        endpoints: Vec::new(),
    }
}

fn join_base_path(base_path: &str, key: &str) -> String {
    let base = base_path.trim_end_matches('/');
    if key.starts_with('/') {
        format!("{base}{key}")
    } else {
        format!("{base}/{key}")
    }
}

/// Build the endpoint for one `paths` entry. Also returns the first tag of
/// the first verb, which decides the owning module.
fn load_endpoint(
    base_path: &str,
    key: &str,
    item: &PathItem,
) -> Result<(Endpoint, Option<String>), ParseError> {
    let command_name = key.rsplit('/').next().unwrap_or(key).to_string();
    let mut endpoint = Endpoint::new(join_base_path(base_path, key), command_name);
    let mut tag = None;
    let mut first = true;
    let shared = shared_parameters(key, item)?;

    for (verb_key, value) in &item.entries {
        if verb_key == SHARED_PARAMETERS {
            continue;
        }
        let verb: HttpMethod = match verb_key.parse() {
            Ok(verb) => verb,
            Err(_) => {
                warn!("skipping unsupported key '{verb_key}' under path {key}");
                continue;
            }
        };
        if endpoint.method(verb).is_some() {
            return Err(ParseError::DuplicateVerb {
                path: key.to_string(),
                verb,
            });
        }

        let operation = Operation::from_value(key, verb_key, value)?;
        let method = load_method(verb, &operation, &shared)?;

        if first {
            first = false;
            apply_wildcards(&mut endpoint, &method);
            tag = first_tag(&operation, key);
        }
        endpoint.methods[verb.index()] = Some(method);
    }

    Ok((endpoint, tag))
}

fn apply_wildcards(endpoint: &mut Endpoint, method: &Method) {
    let (name, missing) = wildcard_name(
        &endpoint.actual_name,
        method.path_params().map(|p| p.name.as_str()),
    );
    for param in missing {
        warn!(
            "path parameter '{param}' has no placeholder in {}",
            endpoint.actual_name
        );
    }
    endpoint.has_path_substitutions = name != endpoint.actual_name;
    endpoint.name = name;
}

fn first_tag(operation: &Operation, path: &str) -> Option<String> {
    if operation.tags.len() > 1 {
        warn!("path {path} has more than one tag, using the first");
    }
    operation.tags.first().cloned()
}

fn owning_module(modules: &[Module], tag: Option<&str>, path: &str, no_modules: bool) -> usize {
    if no_modules {
        return 0;
    }
    match tag {
        Some(tag) => modules
            .iter()
            .position(|m| m.name.eq_ignore_ascii_case(tag))
            .unwrap_or_else(|| {
                warn!(
                    "path {path} is tagged {tag}, which is not a declared tag, using module {}",
                    modules[0].name
                );
                0
            }),
        None => {
            warn!("path {path} has no tag, using module {}", modules[0].name);
            0
        }
    }
}

/// Parameters declared on the path item itself, shared by every verb.
fn shared_parameters(key: &str, item: &PathItem) -> Result<Vec<Parameter>, ParseError> {
    let Some((_, value)) = item.entries.iter().find(|(k, _)| k == SHARED_PARAMETERS) else {
        return Ok(Vec::new());
    };
    let raw = Vec::<RawParameter>::deserialize(value).map_err(|source| ParseError::Malformed {
        context: format!("parameters under path {key}"),
        source,
    })?;
    raw.iter().map(load_parameter).collect()
}

/// An operation parameter replaces a shared one with the same name and location.
fn load_method(
    verb: HttpMethod,
    operation: &Operation,
    shared: &[Parameter],
) -> Result<Method, ParseError> {
    let mut parameters = shared.to_vec();
    for raw in &operation.parameters {
        let param = load_parameter(raw)?;
        match parameters
            .iter_mut()
            .find(|p| p.location == param.location && p.name.eq_ignore_ascii_case(&param.name))
        {
            Some(existing) => *existing = param,
            None => parameters.push(param),
        }
    }

    Ok(Method {
        verb,
        summary: operation.summary.clone().unwrap_or_default(),
        description: operation.description.clone().unwrap_or_default(),
        operation_id: operation.operation_id.clone(),
        parameters,
    })
}

fn load_parameter(raw: &RawParameter) -> Result<Parameter, ParseError> {
    let name = raw
        .name
        .clone()
        .ok_or_else(|| ParseError::MissingField("parameter name".to_string()))?;
    let location = raw
        .location
        .as_deref()
        .ok_or_else(|| ParseError::MissingField(format!("in (parameter '{name}')")))?;

    let param_type = match raw.param_type.as_deref() {
        None => ParamType::Invalid,
        Some(keyword) => {
            ParamType::from_keyword(keyword).ok_or_else(|| ParseError::UnknownType {
                parameter: name.clone(),
                type_name: keyword.to_string(),
            })?
        }
    };

    Ok(Parameter {
        location: ParameterLocation::from_keyword(location),
        required: raw.required,
        param_type,
        options: raw.option_strings(),
        description: raw.description.clone(),
        name,
    })
}
