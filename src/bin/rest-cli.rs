use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use rest_tools::{BasicAuth, ClientError, Endpoint, Method, RestApi, RestClient};
use serde_json::{Value, json};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "rest-cli",
    version,
    about = "Small async CLI for JSON REST services"
)]
struct Cli {
    /// Base URL every path is resolved against.
    #[arg(long, env = "REST_BASE_URL")]
    base_url: String,

    /// Username for HTTP basic authentication.
    #[arg(long, env = "REST_USERNAME", requires = "password")]
    username: Option<String>,

    /// Password for HTTP basic authentication.
    #[arg(long, env = "REST_PASSWORD", requires = "username", hide_env_values = true)]
    password: Option<String>,

    /// Extra or overriding request header in form key=value. Repeat as needed.
    #[arg(long = "header", value_name = "KEY=VALUE", value_parser = parse_header)]
    header: Vec<(String, String)>,

    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,

    /// Increase log verbosity (-v logs requests as curl commands).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a GET to a path relative to the base URL.
    Get {
        /// Request path (for example: users/42).
        path: String,
    },
    /// POST a JSON body to a path relative to the base URL.
    Post {
        /// Request path (for example: users).
        path: String,

        #[command(flatten)]
        body: BodyInput,
    },
    /// Upload a local file as multipart/form-data.
    Upload {
        /// File to upload.
        file: PathBuf,

        /// Destination path relative to the base URL.
        destination: String,
    },
}

#[derive(Debug, Args)]
struct BodyInput {
    /// JSON request body literal.
    #[arg(long, conflicts_with = "body_file")]
    body_json: Option<String>,

    /// Path to a file containing a JSON request body.
    #[arg(long, value_name = "PATH", conflicts_with = "body_json")]
    body_file: Option<PathBuf>,
}

impl BodyInput {
    /// JSON payload for `post`; `{}` when neither flag is given.
    fn payload(&self) -> Result<Value> {
        if let Some(raw) = &self.body_json {
            return serde_json::from_str(raw).context("--body-json is not valid JSON");
        }
        let Some(path) = &self.body_file else {
            return Ok(json!({}));
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("'{}' does not contain valid JSON", path.display()))
    }
}

/// Endpoint built from a command-line path, answering with any JSON value.
struct PathEndpoint {
    method: Method,
    parent_path: String,
}

impl PathEndpoint {
    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            parent_path: path.to_owned(),
        }
    }
}

impl RestApi for PathEndpoint {
    fn path_components(&self) -> &[String] {
        &[]
    }

    fn parent_path(&self) -> &str {
        &self.parent_path
    }
}

impl Endpoint for PathEndpoint {
    type In = Value;
    type Out = Value;

    fn method(&self) -> Method {
        self.method
    }

    fn decode(&self, data: &[u8]) -> Result<Value, ClientError> {
        Ok(decode_lenient(data))
    }
}

/// Entry point for the async CLI.
///
/// Parses command-line arguments, builds the client, dispatches the
/// subcommand and prints JSON output.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut client = RestClient::new(&cli.base_url)
        .with_context(|| format!("failed to create client with base URL '{}'", cli.base_url))?
        .with_headers(cli.header.iter().cloned());

    if let (Some(username), Some(password)) = (&cli.username, &cli.password) {
        let auth = BasicAuth::new(username, password);
        debug!(username = auth.username(), "using basic authentication");
        client = client.with_basic_auth(auth);
    }

    let output = match &cli.command {
        Command::Get { path } => client
            .dispatch(&PathEndpoint::new(Method::Get, path), &Value::Null)
            .await
            .with_context(|| format!("GET '{path}' failed"))?,
        Command::Post { path, body } => {
            let payload = body.payload().context("failed to read request body")?;
            client
                .dispatch(&PathEndpoint::new(Method::Post, path), &payload)
                .await
                .with_context(|| format!("POST '{path}' failed"))?
        }
        Command::Upload { file, destination } => {
            let data = client
                .upload_file(file, destination)
                .await
                .with_context(|| {
                    format!("upload of '{}' to '{destination}' failed", file.display())
                })?;
            decode_lenient(&data)
        }
    };

    print_json(&output, cli.compact).context("failed to print JSON output")?;
    Ok(())
}

/// Installs a stderr subscriber; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "warn,rest_tools=debug",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Splits one `--header` argument at its first `=`.
fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, _)) if name.trim().is_empty() => {
            Err(format!("empty header name in '{raw}'"))
        }
        Some((name, value)) => Ok((name.trim().to_owned(), value.to_owned())),
        None => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Empty bodies become `null`, non-JSON bodies a JSON string.
fn decode_lenient(data: &[u8]) -> Value {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(data)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(data).into_owned()))
}

/// Prints a JSON value either compact or pretty-formatted.
fn print_json(value: &Value, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .context("failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}
