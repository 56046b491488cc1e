//! From tokenized arguments to help output or one HTTP call.

use std::io::Write;

use anyhow::Result;
use copenapi_core::request::{AuthMode, BoundParams, RequestOptions, build_request};
use copenapi_core::resolve::{Resolution, resolve_in_module, resolve_path};
use copenapi_core::{ApiDefinition, HttpMethod, ResolveError};

use crate::help;
use crate::invocation::{self, InvocationError};
use crate::transport::{self, Transport};

/// How the user asked to authenticate. The password prompt is deferred
/// until a request is actually sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Login {
    #[default]
    None,
    Netrc,
    /// `user` or `user:password`.
    User(String),
}

/// Settings gathered from global options and the config file.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub base_url: Option<String>,
    pub headers: Vec<(String, String)>,
    pub login: Login,
    pub insecure: bool,
    pub verbose: bool,
    pub verb: Option<HttpMethod>,
    pub help: bool,
}

pub struct App<'a> {
    pub api: &'a ApiDefinition,
    pub settings: &'a Settings,
    pub transport: &'a dyn Transport,
    pub prompt: &'a dyn Fn() -> std::io::Result<String>,
}

impl App<'_> {
    pub fn run<S: AsRef<str>>(&self, args: &[S], out: &mut dyn Write) -> Result<()> {
        let inv = invocation::parse(args)?;
        let help = inv.help || self.settings.help;
        let verb = inv.verb.or(self.settings.verb);
        let api = self.api;

        let Some(module_name) = inv.module.as_deref() else {
            write!(out, "{}", help::render_modules(api))?;
            return Ok(());
        };

        if module_name.starts_with('/') && api.find_module(module_name).is_none() {
            if let Some(extra) = inv.command {
                return Err(InvocationError::UnexpectedArgument(extra).into());
            }
            let (found, captures) = resolve_path(api, module_name)?;
            if help {
                if let Some(text) = help::render_command_help(found.module, &found.endpoint.name) {
                    write!(out, "{text}")?;
                }
                return Ok(());
            }
            let mut params = inv.params;
            for (name, value) in captures {
                params.insert_if_absent(name, value);
            }
            return self.call(&found, verb, &params, out);
        }

        let Some(module) = api.find_module(module_name) else {
            write!(out, "{}", help::render_module_not_found(api, module_name))?;
            return Err(ResolveError::ModuleNotFound(module_name.to_string()).into());
        };

        let Some(command) = inv.command.as_deref() else {
            write!(out, "{}", help::render_module_commands(module))?;
            return Ok(());
        };

        if help {
            return match help::render_command_help(module, command) {
                Some(text) => {
                    write!(out, "{text}")?;
                    Ok(())
                }
                None => {
                    write!(out, "{}", help::render_module_commands(module))?;
                    Err(ResolveError::CommandNotFound {
                        module: module.name.clone(),
                        command: command.to_string(),
                    }
                    .into())
                }
            };
        }

        let found = match resolve_in_module(api, module, command) {
            Ok(found) => found,
            Err(err) => {
                match &err {
                    ResolveError::CommandNotFound { .. } => {
                        write!(out, "{}", help::render_module_commands(module))?;
                    }
                    ResolveError::Ambiguous { candidates, .. } => {
                        for candidate in candidates {
                            writeln!(out, "{candidate}")?;
                        }
                    }
                    _ => {}
                }
                return Err(err.into());
            }
        };
        self.call(&found, verb, &inv.params, out)
    }

    fn call(
        &self,
        found: &Resolution<'_>,
        verb: Option<HttpMethod>,
        params: &BoundParams,
        out: &mut dyn Write,
    ) -> Result<()> {
        let method = found.method(verb)?;
        let options = RequestOptions {
            base_url: self.settings.base_url.clone(),
            headers: self.settings.headers.clone(),
            auth: self.auth()?,
            insecure: self.settings.insecure,
            verbose: self.settings.verbose,
        };
        let request = build_request(self.api, found.endpoint, method, params, &options)?;
        transport::execute(self.transport, &request, out)?;
        Ok(())
    }

    fn auth(&self) -> Result<AuthMode> {
        let auth = match &self.settings.login {
            Login::None => AuthMode::None,
            Login::Netrc => AuthMode::Netrc,
            Login::User(spec) => match spec.split_once(':') {
                Some((user, password)) => AuthMode::Basic {
                    user: user.to_string(),
                    password: password.to_string(),
                },
                None => AuthMode::Basic {
                    user: spec.clone(),
                    password: (self.prompt)()?,
                },
            },
        };
        Ok(auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use copenapi_core::load_from_str;
    use copenapi_core::request::RequestDescriptor;

    use crate::transport::{ExecError, Response};

    const SPEC: &str = r#"{
        "host": "petstore.example.com",
        "basePath": "/v1",
        "tags": [{"name": "pets", "description": "Pets"}, {"name": "store"}],
        "paths": {
            "/pets": {
                "get": {"tags": ["pets"], "summary": "List pets", "parameters": [
                    {"name": "status", "in": "query", "type": "string"},
                    {"name": "limit", "in": "query", "type": "integer"}]},
                "post": {"tags": ["pets"], "summary": "Add a pet"}
            },
            "/pets/{id}": {
                "get": {"tags": ["pets"], "operationId": "getPetById",
                        "parameters": [{"name": "id", "in": "path", "required": true, "type": "integer"}]},
                "delete": {"tags": ["pets"], "operationId": "deletePet",
                        "parameters": [{"name": "id", "in": "path", "required": true, "type": "integer"}]}
            },
            "/v1/addr": {"get": {"tags": ["store"]}},
            "/v2/addr": {"get": {"tags": ["store"]}}
        }
    }"#;

    #[derive(Default)]
    struct Recorder {
        requests: RefCell<Vec<RequestDescriptor>>,
    }

    impl Transport for Recorder {
        fn perform(&self, request: &RequestDescriptor) -> Result<Response, ExecError> {
            self.requests.borrow_mut().push(request.clone());
            Ok(Response {
                status: 200,
                body: "ok".to_string(),
            })
        }
    }

    fn no_prompt() -> std::io::Result<String> {
        panic!("password prompt not expected")
    }

    fn run(
        settings: &Settings,
        args: &[&str],
    ) -> (Result<()>, String, Vec<RequestDescriptor>) {
        let api = load_from_str(SPEC).unwrap();
        let recorder = Recorder::default();
        let app = App {
            api: &api,
            settings,
            transport: &recorder,
            prompt: &no_prompt,
        };
        let mut out = Vec::new();
        let result = app.run(args, &mut out);
        (
            result,
            String::from_utf8(out).unwrap(),
            recorder.requests.into_inner(),
        )
    }

    #[test]
    fn no_arguments_lists_modules() {
        let (result, out, requests) = run(&Settings::default(), &[]);
        result.unwrap();
        assert!(out.starts_with("The following modules are supported.\n"));
        assert!(requests.is_empty());
    }

    #[test]
    fn module_only_lists_commands() {
        let (result, out, _) = run(&Settings::default(), &["pets"]);
        result.unwrap();
        assert!(out.starts_with("Commands under module pets :\n"));
        assert!(out.contains("getPetById"));
    }

    #[test]
    fn unknown_module_shows_listing_and_fails() {
        let (result, out, requests) = run(&Settings::default(), &["vets", "list"]);
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::ModuleNotFound(_))
        ));
        assert!(out.starts_with("Module vets not found."));
        assert!(requests.is_empty());
    }

    #[test]
    fn command_help_does_not_call() {
        let (result, out, requests) = run(&Settings::default(), &["pets", "pets", "--help"]);
        result.unwrap();
        assert!(out.starts_with("Name : /v1/pets\n"));
        assert!(requests.is_empty());

        let settings = Settings {
            help: true,
            ..Settings::default()
        };
        let (result, out, _) = run(&settings, &["pets", "nothing"]);
        assert!(result.is_err());
        assert!(out.starts_with("Commands under module pets :"));
    }

    #[test]
    fn call_builds_url_from_params() {
        let settings = Settings {
            verbose: true,
            headers: vec![("X-Api-Key".to_string(), "k".to_string())],
            ..Settings::default()
        };
        let (result, out, requests) =
            run(&settings, &["pets", "pets", "--limit", "5", "--status", "sold"]);
        result.unwrap();
        assert_eq!(
            out,
            "URL: https://petstore.example.com/v1/pets?status=sold&limit=5\nok\n"
        );
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].headers, settings.headers);
    }

    #[test]
    fn operation_id_and_verb() {
        let settings = Settings {
            base_url: Some("http://localhost:8080".to_string()),
            ..Settings::default()
        };
        let (result, _, requests) = run(&settings, &["pets", "deletePet", "--id", "3"]);
        result.unwrap();
        assert_eq!(requests[0].method, HttpMethod::Delete);
        assert_eq!(requests[0].url, "http://localhost:8080/v1/pets/3");

        let (result, _, requests) = run(&settings, &["pets", "pets", "-X", "post"]);
        result.unwrap();
        assert_eq!(requests[0].method, HttpMethod::Post);
    }

    #[test]
    fn concrete_path_binds_placeholders() {
        let (result, _, requests) = run(&Settings::default(), &["/v1/pets/42"]);
        result.unwrap();
        assert_eq!(requests[0].url, "https://petstore.example.com/v1/pets/42");

        // Explicit flags win over captured values.
        let (result, _, requests) = run(&Settings::default(), &["/v1/pets/42", "--id", "7"]);
        result.unwrap();
        assert_eq!(requests[0].url, "https://petstore.example.com/v1/pets/7");
    }

    #[test]
    fn ambiguity_lists_candidates() {
        let (result, out, requests) = run(&Settings::default(), &["store", "addr"]);
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::Ambiguous { .. })
        ));
        assert_eq!(out, "/v1/v1/addr\n/v1/v2/addr\n");
        assert!(requests.is_empty());
    }

    #[test]
    fn missing_required_param_fails_before_sending() {
        let (result, _, requests) = run(&Settings::default(), &["pets", "getPetById"]);
        assert_eq!(
            result.unwrap_err().to_string(),
            "please provide required param --id"
        );
        assert!(requests.is_empty());
    }

    #[test]
    fn basic_auth_prompts_without_password() {
        let api = load_from_str(SPEC).unwrap();
        let recorder = Recorder::default();
        let settings = Settings {
            login: Login::User("alice".to_string()),
            ..Settings::default()
        };
        let prompt = || Ok("typed".to_string());
        let app = App {
            api: &api,
            settings: &settings,
            transport: &recorder,
            prompt: &prompt,
        };
        app.run(&["pets", "pets"], &mut Vec::new()).unwrap();
        assert_eq!(
            recorder.requests.borrow()[0].auth,
            AuthMode::Basic {
                user: "alice".to_string(),
                password: "typed".to_string()
            }
        );

        let settings = Settings {
            login: Login::User("bob:pw".to_string()),
            ..Settings::default()
        };
        let (result, _, requests) = run(&settings, &["pets", "pets"]);
        result.unwrap();
        assert_eq!(
            requests[0].auth,
            AuthMode::Basic {
                user: "bob".to_string(),
                password: "pw".to_string()
            }
        );
    }
}
