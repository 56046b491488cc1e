mod app;
mod help;
mod invocation;
mod netrc;
mod transport;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use copenapi_core::HttpMethod;
use copenapi_core::config::Config;

use crate::app::{App, Login, Settings};
use crate::transport::HttpTransport;

/// Call a REST API described by a Swagger 2.0 spec.
///
/// Global options go before the module. Everything from the module on is
/// `<module> <command> [--param value ...] [-X VERB] [--help]`, or a
/// concrete path such as `/v1/pets/42` in place of module and command.
#[derive(Parser)]
#[command(name = "copenapi", version, disable_help_flag = true)]
struct Cli {
    /// Path to the API spec (JSON, or YAML by extension)
    #[arg(short, long)]
    apispec: Option<PathBuf>,

    /// Replaces the scheme and host of the spec
    #[arg(short, long)]
    baseurl: Option<String>,

    /// Basic auth as user[:password]; prompts for the password if omitted
    #[arg(short, long)]
    user: Option<String>,

    /// Read credentials for the request host from ~/.netrc
    #[arg(short, long)]
    netrc: bool,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Debug logging and print the request URL
    #[arg(short, long)]
    verbose: bool,

    /// Help on modules and commands
    #[arg(short, long)]
    help: bool,

    /// HTTP method to use when a command has several
    #[arg(short = 'X', long = "request", value_name = "VERB")]
    request: Option<HttpMethod>,

    /// Print every module and endpoint of the spec
    #[arg(long)]
    inspect: bool,

    /// Generate shell completions
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    args: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "copenapi", &mut io::stdout());
        return Ok(());
    }

    if cli.help && cli.args.is_empty() {
        Cli::command().print_long_help()?;
        return Ok(());
    }

    let config = Config::discover()
        .context("failed to read .copenapi")?
        .unwrap_or_default();

    let Some(spec_path) = cli
        .apispec
        .clone()
        .or_else(|| config.default_value("apispec").map(PathBuf::from))
    else {
        eprint!("{}", help::render_missing_spec());
        anyhow::bail!("no api spec given");
    };
    let api = copenapi_core::load_from_file(&spec_path)
        .with_context(|| format!("failed to load api spec {}", spec_path.display()))?;

    if cli.inspect {
        print!("{}", help::render_api_def(&api));
        return Ok(());
    }

    let login = match (&cli.user, cli.netrc) {
        (_, true) => Login::Netrc,
        (Some(user), false) => Login::User(user.clone()),
        (None, false) => Login::None,
    };
    let settings = Settings {
        base_url: cli
            .baseurl
            .clone()
            .or_else(|| config.default_value("baseurl").map(str::to_string)),
        headers: config
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        login,
        insecure: cli.insecure || config.default_bool("insecure").unwrap_or(false),
        verbose: cli.verbose,
        verb: cli.request,
        help: cli.help,
    };

    let transport = HttpTransport::new();
    let app = App {
        api: &api,
        settings: &settings,
        transport: &transport,
        prompt: &read_password,
    };
    let stdout = io::stdout();
    app.run(&cli.args, &mut stdout.lock())
}

fn read_password() -> io::Result<String> {
    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
