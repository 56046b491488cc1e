//! HTTP transport: performs one request described by a [`RequestDescriptor`].

use std::io::Write;
use std::path::PathBuf;

use copenapi_core::HttpMethod;
use copenapi_core::request::{AuthMode, RequestDescriptor};
use log::debug;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use thiserror::Error;

use crate::netrc::{self, Netrc};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExecError {
    #[error("HTTP request failed")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read response body")]
    ResponseRead(#[source] reqwest::Error),

    #[error("server returned 401, unauthorized, specify credentials with --user or --netrc")]
    Unauthorized,

    #[error("server returned {0}")]
    HttpStatus(u16),

    #[error("invalid request url: {0}")]
    InvalidUrl(String),

    #[error("no netrc entry for host {0}")]
    NetrcEntry(String),

    #[error("failed to read netrc file: {path}")]
    NetrcRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write response")]
    Output(#[source] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

/// One blocking call per request.
pub trait Transport {
    fn perform(&self, request: &RequestDescriptor) -> Result<Response, ExecError>;
}

/// [`Transport`] backed by `reqwest`. Redirects are followed.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    /// Overrides `$HOME/.netrc`.
    pub netrc_path: Option<PathBuf>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self, insecure: bool) -> Result<Client, ExecError> {
        Client::builder()
            .redirect(Policy::limited(10))
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(ExecError::Transport)
    }

    fn netrc_credentials(&self, url: &str) -> Result<(String, String), ExecError> {
        let host = reqwest::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .ok_or_else(|| ExecError::InvalidUrl(url.to_string()))?;
        let path = self
            .netrc_path
            .clone()
            .or_else(netrc::default_path)
            .ok_or_else(|| ExecError::NetrcEntry(host.clone()))?;
        let netrc = Netrc::load(&path).map_err(|source| ExecError::NetrcRead {
            path: path.display().to_string(),
            source,
        })?;
        netrc
            .as_ref()
            .and_then(|n| n.find(&host))
            .map(|c| (c.login.clone(), c.password.clone()))
            .ok_or(ExecError::NetrcEntry(host))
    }
}

fn reqwest_method(verb: HttpMethod) -> reqwest::Method {
    match verb {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Patch => reqwest::Method::PATCH,
    }
}

impl Transport for HttpTransport {
    fn perform(&self, request: &RequestDescriptor) -> Result<Response, ExecError> {
        let client = self.client(request.insecure)?;
        let mut req = client.request(reqwest_method(request.method), &request.url);

        for (name, value) in &request.headers {
            req = req.header(name, value);
        }
        match &request.auth {
            AuthMode::None => {}
            AuthMode::Basic { user, password } => req = req.basic_auth(user, Some(password)),
            AuthMode::Netrc => {
                let (login, password) = self.netrc_credentials(&request.url)?;
                req = req.basic_auth(login, Some(password));
            }
        }

        debug!("{} {}", request.method, request.url);
        let resp = req.send().map_err(ExecError::Transport)?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(ExecError::ResponseRead)?;
        debug!("status {status}, {} bytes", body.len());
        Ok(Response { status, body })
    }
}

/// Perform `request` and write the response body to `out`. Any status but
/// 200 is an error; the body is written first.
pub fn execute(
    transport: &dyn Transport,
    request: &RequestDescriptor,
    out: &mut dyn Write,
) -> Result<(), ExecError> {
    if request.verbose {
        writeln!(out, "URL: {}", request.url).map_err(ExecError::Output)?;
    }
    let response = transport.perform(request)?;
    if !response.body.is_empty() {
        out.write_all(response.body.as_bytes())
            .map_err(ExecError::Output)?;
        if !response.body.ends_with('\n') {
            writeln!(out).map_err(ExecError::Output)?;
        }
    }
    match response.status {
        200 => Ok(()),
        401 => Err(ExecError::Unauthorized),
        status => Err(ExecError::HttpStatus(status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn descriptor(url: String) -> RequestDescriptor {
        RequestDescriptor {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            auth: AuthMode::None,
            insecure: false,
            verbose: false,
        }
    }

    struct Canned {
        response: Response,
        seen: RefCell<Vec<String>>,
    }

    impl Transport for Canned {
        fn perform(&self, request: &RequestDescriptor) -> Result<Response, ExecError> {
            self.seen.borrow_mut().push(request.url.clone());
            Ok(self.response.clone())
        }
    }

    fn canned(status: u16, body: &str) -> Canned {
        Canned {
            response: Response {
                status,
                body: body.to_string(),
            },
            seen: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn execute_prints_body_and_url() {
        let transport = canned(200, r#"{"id": 1}"#);
        let mut request = descriptor("http://h/v1/pets/1".to_string());
        request.verbose = true;
        let mut out = Vec::new();
        execute(&transport, &request, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "URL: http://h/v1/pets/1\n{\"id\": 1}\n"
        );
        assert_eq!(*transport.seen.borrow(), vec!["http://h/v1/pets/1"]);
    }

    #[test]
    fn execute_maps_statuses() {
        let mut out = Vec::new();
        let request = descriptor("http://h/x".to_string());

        let err = execute(&canned(401, ""), &request, &mut out).unwrap_err();
        assert!(matches!(err, ExecError::Unauthorized));
        assert!(err.to_string().contains("specify credentials"));

        let err = execute(&canned(404, "not here\n"), &request, &mut out).unwrap_err();
        assert!(matches!(err, ExecError::HttpStatus(404)));
        assert_eq!(String::from_utf8(out).unwrap(), "not here\n");

        // Only 200 counts as success.
        let err = execute(&canned(204, ""), &request, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, ExecError::HttpStatus(204)));
    }

    #[test]
    fn http_transport_sends_headers_and_basic_auth() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/v1/pets")
            .match_query(mockito::Matcher::UrlEncoded(
                "status".into(),
                "sold".into(),
            ))
            .match_header("x-api-key", "secret")
            // alice:s3cret
            .match_header("authorization", "Basic YWxpY2U6czNjcmV0")
            .with_status(200)
            .with_body("[]")
            .create();

        let mut request = descriptor(format!("{}/v1/pets?status=sold", server.url()));
        request.headers = vec![("X-Api-Key".to_string(), "secret".to_string())];
        request.auth = AuthMode::Basic {
            user: "alice".to_string(),
            password: "s3cret".to_string(),
        };

        let response = HttpTransport::new().perform(&request).unwrap();
        mock.assert();
        assert_eq!(response, Response { status: 200, body: "[]".to_string() });
    }

    #[test]
    fn http_transport_uses_verb() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("DELETE", "/v1/pets/3")
            .with_status(404)
            .with_body("gone")
            .create();

        let mut request = descriptor(format!("{}/v1/pets/3", server.url()));
        request.method = HttpMethod::Delete;
        let response = HttpTransport::new().perform(&request).unwrap();
        mock.assert();
        assert_eq!(response.status, 404);
        assert_eq!(response.body, "gone");
    }

    #[test]
    fn http_transport_follows_redirects() {
        let mut server = mockito::Server::new();
        let moved = server
            .mock("GET", "/old")
            .with_status(302)
            .with_header("location", "/new")
            .create();
        let target = server.mock("GET", "/new").with_status(200).with_body("ok").create();

        let response = HttpTransport::new()
            .perform(&descriptor(format!("{}/old", server.url())))
            .unwrap();
        moved.assert();
        target.assert();
        assert_eq!(response.body, "ok");
    }

    #[test]
    fn http_transport_reads_netrc() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/")
            // admin:pw
            .match_header("authorization", "Basic YWRtaW46cHc=")
            .with_status(200)
            .create();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netrc");
        std::fs::write(&path, "machine 127.0.0.1 login admin password pw\n").unwrap();
        let transport = HttpTransport {
            netrc_path: Some(path),
        };

        let mut request = descriptor(format!("{}/", server.url()));
        request.auth = AuthMode::Netrc;
        transport.perform(&request).unwrap();
        mock.assert();
    }

    #[test]
    fn netrc_without_entry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netrc");
        std::fs::write(&path, "machine elsewhere login a password b\n").unwrap();
        let transport = HttpTransport {
            netrc_path: Some(path),
        };
        let mut request = descriptor("http://api.example.com/v1".to_string());
        request.auth = AuthMode::Netrc;
        let err = transport.perform(&request).unwrap_err();
        assert!(matches!(err, ExecError::NetrcEntry(ref host) if host == "api.example.com"));
    }
}
