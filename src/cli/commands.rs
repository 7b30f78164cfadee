use crate::binder::RawRequest;
use crate::dispatcher::{handler_fn, DispatchOutcome, Dispatcher, Endpoint};
use crate::echo::echo_handler;
use crate::logging::{init_logging_with_config, LogConfig};
use crate::response::BufferedSink;
use crate::runtime_config::RuntimeConfig;
use crate::schema::{lint_endpoints, load_endpoints, parse_endpoints, EndpointDef};
use crate::validator::print_issues;
use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use http::Method;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Command-line interface for brrtbind
#[derive(Parser, Debug)]
#[command(name = "brrtbind")]
#[command(about = "Request binding toolkit", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check an endpoint file for problems
    Lint {
        /// Endpoint file (YAML or JSON)
        #[arg(short, long)]
        schema: PathBuf,
    },
    /// List the endpoints of a file in match order
    Routes {
        /// Endpoint file (YAML or JSON)
        #[arg(short, long)]
        schema: PathBuf,
    },
    /// Dispatch one request against echo handlers and print the response
    Bind {
        /// Endpoint file (YAML or JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Request method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request target, path plus optional query string
        #[arg(short, long)]
        url: String,

        /// Request header as `name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// File whose contents are sent as the request body
        #[arg(short, long)]
        body: Option<PathBuf>,

        /// Shorthand for `-H 'content-type: <VALUE>'`
        #[arg(long)]
        content_type: Option<String>,
    },
}

/// Parse arguments, set up logging and run the command against stdout.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging_with_config(&LogConfig::from_env())?;
    let stdout = std::io::stdout();
    execute(&cli, &mut stdout.lock())
}

/// Run `cli`, writing command output to `out`.
pub fn execute(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Lint { schema } => lint(schema, out),
        Commands::Routes { schema } => routes(schema, out),
        Commands::Bind {
            schema,
            method,
            url,
            headers,
            body,
            content_type,
        } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .map_err(|_| anyhow!("invalid method `{method}`"))?;
            let mut raw = RawRequest::new(method, url);
            for header in headers {
                let (name, value) = parse_header_arg(header)?;
                raw = raw.with_header(name, value);
            }
            if let Some(ct) = content_type {
                raw = raw.with_header("content-type", ct.as_str());
            }
            if let Some(path) = body {
                let payload = std::fs::read(path)
                    .with_context(|| format!("failed to read body file {}", path.display()))?;
                raw = raw.with_body(payload);
            }
            bind(schema, &raw, out)
        }
    }
}

fn lint(schema: &Path, out: &mut dyn Write) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(schema)
        .with_context(|| format!("failed to read endpoint file {}", schema.display()))?;
    let endpoints = parse_endpoints(&content)
        .with_context(|| format!("failed to parse endpoint file {}", schema.display()))?;
    let issues = lint_endpoints(&endpoints);
    if issues.is_empty() {
        writeln!(out, "✅ {} endpoint(s), no issues", endpoints.len())?;
        return Ok(());
    }
    print_issues(&issues);
    Err(anyhow!("{} issue(s) found in {}", issues.len(), schema.display()))
}

fn routes(schema: &Path, out: &mut dyn Write) -> anyhow::Result<()> {
    for def in load_endpoints(schema)? {
        writeln!(
            out,
            "{:<7} {:<40} {}",
            def.method.to_ascii_uppercase(),
            def.path,
            def.name
        )?;
    }
    Ok(())
}

fn bind(schema: &Path, raw: &RawRequest, out: &mut dyn Write) -> anyhow::Result<()> {
    let endpoints = load_endpoints(schema)?;
    let dispatcher = echo_dispatcher(&endpoints, RuntimeConfig::from_env())?;

    let mut sink = BufferedSink::new();
    let outcome = dispatcher.dispatch(raw, &mut sink)?;
    if outcome == DispatchOutcome::Aborted {
        return Err(anyhow!("request was aborted"));
    }

    writeln!(out, "HTTP {}", sink.status.unwrap_or_default())?;
    for (name, value) in &sink.headers {
        writeln!(out, "{name}: {value}")?;
    }
    writeln!(out)?;
    match sink.body_json() {
        Some(json) => writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?,
        None => writeln!(out, "{}", sink.body_text().unwrap_or_default())?,
    }
    Ok(())
}

/// Build a dispatcher serving every definition with the echo handler.
pub fn echo_dispatcher(
    endpoints: &[EndpointDef],
    config: RuntimeConfig,
) -> anyhow::Result<Dispatcher> {
    let mut dispatcher = Dispatcher::with_config(config);
    for def in endpoints {
        let method = def
            .http_method()
            .ok_or_else(|| anyhow!("endpoint `{}` has unknown method `{}`", def.name, def.method))?;
        let template = def
            .path_template()
            .with_context(|| format!("endpoint `{}`", def.name))?;
        dispatcher.register(
            Endpoint::new(
                def.name.clone(),
                template,
                def.schema.clone(),
                handler_fn(echo_handler),
            )
            .with_method(method),
        );
    }
    Ok(dispatcher)
}

/// Split a `name: value` header argument.
pub fn parse_header_arg(arg: &str) -> anyhow::Result<(&str, &str)> {
    let (name, value) = arg
        .split_once(':')
        .ok_or_else(|| anyhow!("header `{arg}` must look like `name: value`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("header `{arg}` has an empty name"));
    }
    Ok((name, value.trim()))
}
