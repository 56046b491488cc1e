//! Help text for modules, commands, and the loaded API.

use copenapi_core::config::{CONFIG_FILE_NAME, example_config_content};
use copenapi_core::resolve::matching_endpoints;
use copenapi_core::{ApiDefinition, Endpoint, Method, Module};

/// The module listing shown when no module is given.
pub fn render_modules(api: &ApiDefinition) -> String {
    let mut out = String::from("The following modules are supported.\n");
    for module in &api.modules {
        let line = format!(" {:<15} : {}", module.name, module.description);
        push_line(&mut out, &line);
    }
    out.push_str("To get help on a module, do <module> --help.\n");
    out.push_str("To get help on a module's command, do <module> <command> --help.\n");
    out
}

pub fn render_module_not_found(api: &ApiDefinition, name: &str) -> String {
    format!(
        "Module {name} not found. Check your api spec\n\n{}",
        render_modules(api)
    )
}

/// One line per endpoint and verb.
pub fn render_module_commands(module: &Module) -> String {
    let mut out = format!("Commands under module {} :\n", module.name);
    for endpoint in &module.endpoints {
        for method in endpoint.methods() {
            let line = format!("{:<15} {}", display_name(endpoint, method), method.summary);
            push_line(&mut out, &line);
        }
    }
    out.push_str(&format!(
        "\nTo get help on a command, do {} <command> --help.\n",
        module.name
    ));
    out
}

/// Placeholder command names say little, so the operationId is shown instead.
fn display_name<'a>(endpoint: &'a Endpoint, method: &'a Method) -> &'a str {
    match &method.operation_id {
        Some(id) if endpoint.is_parameter_terminal() => id,
        _ => &endpoint.command_name,
    }
}

/// Full documentation of every endpoint whose name ends with `command`, or
/// `None` when nothing matches.
pub fn render_command_help(module: &Module, command: &str) -> Option<String> {
    let endpoints = matching_endpoints(module, command);
    if endpoints.is_empty() {
        return None;
    }
    let blocks: Vec<String> = endpoints.into_iter().map(render_endpoint).collect();
    Some(blocks.join("\n"))
}

fn render_endpoint(endpoint: &Endpoint) -> String {
    let mut out = format!("Name : {}\n", endpoint.name);
    for method in endpoint.methods() {
        out.push('\n');
        let verb = method.verb.as_str().to_ascii_lowercase();
        push_line(&mut out, &format!("Method: {verb}"));
        push_line(&mut out, &format!("Summary : {}", method.summary));
        push_line(&mut out, &format!("Description : {}", method.description));
        if method.parameters.is_empty() {
            out.push_str("Params : None\n");
        }
        for (n, param) in method.parameters.iter().enumerate() {
            let presence = if param.required { "Required" } else { "Optional" };
            push_line(&mut out, &format!("Param{} : {} - {presence}", n + 1, param.name));
            if !param.options.is_empty() {
                push_line(&mut out, &format!("Values: [{}]", param.options.join(", ")));
            }
        }
    }
    out
}

/// Every module with its endpoints. Templated endpoints list both their
/// declared and their wildcard form.
pub fn render_api_def(api: &ApiDefinition) -> String {
    let mut out = String::new();
    for module in &api.modules {
        push_line(&mut out, &format!("Module = {}", module.name));
        for endpoint in &module.endpoints {
            if endpoint.has_path_substitutions {
                push_line(&mut out, &format!("\tEndPoint Actual = {}", endpoint.actual_name));
                push_line(&mut out, &format!("\tEndPoint Registered = {}", endpoint.name));
            } else {
                push_line(&mut out, &format!("\tEndPoint = {}", endpoint.name));
            }
        }
    }
    out
}

/// Append `line` without trailing padding, then a newline.
fn push_line(out: &mut String, line: &str) {
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Printed when neither the command line nor a config file names a spec.
pub fn render_missing_spec() -> String {
    format!(
        "Please specify an api spec using one or more of the following:\n\
         1. adding a file named {CONFIG_FILE_NAME} in your home or current directory\n\
         2. specify the rest api spec file in command line using --apispec\n\
         \n\
         {CONFIG_FILE_NAME} is a YAML file like the following:\n\
         {}\n\
         Search is done in the following order and stops on first find.\n\
         --apispec\n\
         {CONFIG_FILE_NAME} in current working directory\n\
         {CONFIG_FILE_NAME} in user's home directory\n",
        example_config_content()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use copenapi_core::load_from_str;

    const SPEC: &str = r#"{
        "host": "petstore.example.com",
        "basePath": "/v1",
        "tags": [
            {"name": "pets", "description": "Everything about pets"},
            {"name": "store"}
        ],
        "paths": {
            "/pets": {
                "get": {"tags": ["pets"], "summary": "List pets", "parameters": [
                    {"name": "status", "in": "query", "type": "string",
                     "enum": ["available", "sold"]},
                    {"name": "limit", "in": "query", "type": "integer"}
                ]},
                "post": {"tags": ["pets"], "summary": "Add a pet"}
            },
            "/pets/{id}": {
                "get": {"tags": ["pets"], "operationId": "getPetById", "summary": "Find pet by id",
                        "description": "Returns a single pet",
                        "parameters": [{"name": "id", "in": "path", "required": true, "type": "integer"}]},
                "delete": {"tags": ["pets"], "summary": "Delete a pet",
                           "parameters": [{"name": "id", "in": "path", "required": true, "type": "integer"}]}
            },
            "/carpets": {"get": {"tags": ["pets"], "summary": "List carpets"}},
            "/store/inventory": {"get": {"tags": ["store"], "summary": "Inventory"}}
        }
    }"#;

    #[test]
    fn test_render_modules() {
        let api = load_from_str(SPEC).unwrap();
        insta::assert_snapshot!(render_modules(&api), @r"
        The following modules are supported.
         pets            : Everything about pets
         store           :
        To get help on a module, do <module> --help.
        To get help on a module's command, do <module> <command> --help.
        ");
    }

    #[test]
    fn test_render_module_not_found() {
        let api = load_from_str(SPEC).unwrap();
        let out = render_module_not_found(&api, "vets");
        assert!(out.starts_with("Module vets not found. Check your api spec\n\n"));
        assert!(out.ends_with(&render_modules(&api)));
    }

    #[test]
    fn test_render_module_commands() {
        let api = load_from_str(SPEC).unwrap();
        let pets = api.find_module("pets").unwrap();
        insta::assert_snapshot!(render_module_commands(pets), @r"
        Commands under module pets :
        pets            List pets
        pets            Add a pet
        getPetById      Find pet by id
        {id}            Delete a pet
        carpets         List carpets

        To get help on a command, do pets <command> --help.
        ");
    }

    #[test]
    fn test_render_command_help() {
        let api = load_from_str(SPEC).unwrap();
        let pets = api.find_module("pets").unwrap();
        insta::assert_snapshot!(render_command_help(pets, "*").unwrap(), @r"
        Name : /v1/pets/*

        Method: get
        Summary : Find pet by id
        Description : Returns a single pet
        Param1 : id - Required

        Method: delete
        Summary : Delete a pet
        Description :
        Param1 : id - Required
        ");
    }

    #[test]
    fn test_render_command_help_lists_every_suffix_match() {
        let api = load_from_str(SPEC).unwrap();
        let pets = api.find_module("pets").unwrap();
        let out = render_command_help(pets, "PETS").unwrap();
        insta::assert_snapshot!(out, @r"
        Name : /v1/pets

        Method: get
        Summary : List pets
        Description :
        Param1 : status - Optional
        Values: [available, sold]
        Param2 : limit - Optional

        Method: post
        Summary : Add a pet
        Description :
        Params : None

        Name : /v1/carpets

        Method: get
        Summary : List carpets
        Description :
        Params : None
        ");
        assert!(render_command_help(pets, "dogs").is_none());
    }

    #[test]
    fn test_render_api_def() {
        let api = load_from_str(SPEC).unwrap();
        assert_eq!(
            render_api_def(&api),
            "Module = pets\n\
             \tEndPoint = /v1/pets\n\
             \tEndPoint Actual = /v1/pets/{id}\n\
             \tEndPoint Registered = /v1/pets/*\n\
             \tEndPoint = /v1/carpets\n\
             Module = store\n\
             \tEndPoint = /v1/store/inventory\n"
        );
    }

    #[test]
    fn test_render_missing_spec() {
        let out = render_missing_spec();
        assert!(out.contains("--apispec\n.copenapi in current working directory\n"));
        assert!(out.contains("apispec: /path/to/swagger.json"));
    }
}
