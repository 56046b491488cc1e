//! Tokenizer for `<module> <command> [--name value ...] [-X VERB]`.
//!
//! Anything that is not a flag fills the module, then the command. A flag is
//! `-` or `--` followed by a letter, so negative numbers are read as values.
//! Flags take the next token as their value unless it is itself a flag, in
//! which case the value is empty. `--name=value` binds in one token.

use copenapi_core::request::BoundParams;
use copenapi_core::{HttpMethod, UnknownMethod};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvocationError {
    #[error("unexpected argument '{0}', module and command are already given")]
    UnexpectedArgument(String),

    #[error("{0} requires an HTTP method")]
    MissingVerb(String),

    #[error(transparent)]
    UnknownVerb(#[from] UnknownMethod),
}

/// A tokenized command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub module: Option<String>,
    pub command: Option<String>,
    pub params: BoundParams,
    pub verb: Option<HttpMethod>,
    pub help: bool,
}

enum State {
    Ready,
    /// A parameter flag waiting for its value.
    Flag(String),
    /// `-X` or `--request` waiting for a verb.
    Verb(String),
}

struct ParseContext {
    invocation: Invocation,
    state: State,
}

impl ParseContext {
    fn new() -> Self {
        Self {
            invocation: Invocation::default(),
            state: State::Ready,
        }
    }

    fn token(&mut self, token: &str) -> Result<(), InvocationError> {
        let flag = flag_name(token);
        match std::mem::replace(&mut self.state, State::Ready) {
            State::Verb(verb_flag) => {
                if flag.is_some() {
                    return Err(InvocationError::MissingVerb(verb_flag));
                }
                self.invocation.verb = Some(token.parse()?);
                return Ok(());
            }
            State::Flag(name) => {
                if flag.is_none() {
                    self.invocation.params.insert(name, token);
                    return Ok(());
                }
                self.invocation.params.insert(name, "");
            }
            State::Ready => {}
        }

        match flag {
            Some(name) => self.flag(token, name),
            None => self.positional(token),
        }
    }

    fn flag(&mut self, token: &str, name: &str) -> Result<(), InvocationError> {
        match name {
            "h" | "help" => self.invocation.help = true,
            "X" | "request" => self.state = State::Verb(token.to_string()),
            _ => match name.split_once('=') {
                Some((name, value)) => self.invocation.params.insert(name, value),
                None => self.state = State::Flag(name.to_string()),
            },
        }
        Ok(())
    }

    fn positional(&mut self, token: &str) -> Result<(), InvocationError> {
        let invocation = &mut self.invocation;
        if invocation.module.is_none() {
            invocation.module = Some(token.to_string());
        } else if invocation.command.is_none() {
            invocation.command = Some(token.to_string());
        } else {
            return Err(InvocationError::UnexpectedArgument(token.to_string()));
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Invocation, InvocationError> {
        match std::mem::replace(&mut self.state, State::Ready) {
            State::Ready => {}
            State::Flag(name) => self.invocation.params.insert(name, ""),
            State::Verb(flag) => return Err(InvocationError::MissingVerb(flag)),
        }
        Ok(self.invocation)
    }
}

/// Strip the dashes off a flag token, or `None` when the token is a value.
fn flag_name(token: &str) -> Option<&str> {
    let name = token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))?;
    name.starts_with(|c: char| c.is_ascii_alphabetic())
        .then_some(name)
}

pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Invocation, InvocationError> {
    let mut ctx = ParseContext::new();
    for arg in args {
        ctx.token(arg.as_ref())?;
    }
    ctx.finish()
}
