//! Reader for `~/.netrc` credentials.
//!
//! Supports `machine`, `default`, `login`, `password` and `account` tokens.
//! `macdef` bodies are skipped up to the next blank line.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Netrc {
    machines: Vec<(String, Credentials)>,
    default: Option<Credentials>,
}

#[derive(Default)]
struct Entry {
    login: Option<String>,
    password: Option<String>,
}

impl Entry {
    fn finish(self) -> Credentials {
        Credentials {
            login: self.login.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
        }
    }
}

enum Target {
    Machine(String),
    Default,
}

impl Netrc {
    pub fn parse(input: &str) -> Netrc {
        let mut netrc = Netrc::default();
        let mut current: Option<(Target, Entry)> = None;

        let body = strip_macros(input);
        let mut tokens = body.split_whitespace();
        while let Some(token) = tokens.next() {
            match token {
                "machine" | "default" => {
                    if let Some((target, entry)) = current.take() {
                        netrc.push(target, entry);
                    }
                    let target = if token == "default" {
                        Target::Default
                    } else {
                        match tokens.next() {
                            Some(host) => Target::Machine(host.to_string()),
                            None => break,
                        }
                    };
                    current = Some((target, Entry::default()));
                }
                "login" | "password" | "account" => {
                    let value = tokens.next().map(str::to_string);
                    if let Some((_, entry)) = current.as_mut() {
                        match token {
                            "login" => entry.login = value,
                            "password" => entry.password = value,
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        if let Some((target, entry)) = current {
            netrc.push(target, entry);
        }
        netrc
    }

    fn push(&mut self, target: Target, entry: Entry) {
        match target {
            Target::Machine(host) => self.machines.push((host, entry.finish())),
            Target::Default => self.default = Some(entry.finish()),
        }
    }

    /// Credentials for `host`, falling back to the `default` entry.
    pub fn find(&self, host: &str) -> Option<&Credentials> {
        self.machines
            .iter()
            .find(|(machine, _)| machine.eq_ignore_ascii_case(host))
            .map(|(_, creds)| creds)
            .or(self.default.as_ref())
    }

    /// Read and parse a netrc file. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> std::io::Result<Option<Netrc>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(Netrc::parse(&content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// `$HOME/.netrc`.
pub fn default_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".netrc"))
}

fn strip_macros(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_macro = false;
    for line in input.lines() {
        if in_macro {
            in_macro = !line.trim().is_empty();
            continue;
        }
        if line.split_whitespace().next() == Some("macdef") {
            in_macro = true;
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
