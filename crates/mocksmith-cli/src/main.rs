mod commands;
mod config;
mod logging;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use mocksmith_core::{Error as CoreError, Locale};
use mocksmith_introspect::global;
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "mocksmith", version, about = "Template-driven mock data generator")]
struct Cli {
    /// TOML config file; defaults to ./mocksmith.toml when present.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Log filter such as `debug` or `mocksmith_generate=trace`; overrides RUST_LOG.
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a JSON template.
    Render(RenderArgs),
    /// Generate instances of a type from a JSON type catalog.
    Introspect(IntrospectArgs),
    /// List the available placeholder names.
    Placeholders,
    /// Print the JSON schema of the config file.
    Schema,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Number of documents; more than one are written as a JSON array.
    #[arg(long)]
    count: Option<usize>,
    /// Base seed; each document derives its own seed from it.
    #[arg(long)]
    seed: Option<u64>,
    /// Locale such as `en_US` or `zh_CN`.
    #[arg(long)]
    locale: Option<Locale>,
    /// Pretty-print the output.
    #[arg(long, default_value_t = false)]
    pretty: bool,
    /// Output file; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Template file.
    template: PathBuf,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct IntrospectArgs {
    /// Type catalog file (JSON array of type definitions).
    catalog: PathBuf,
    /// Target type, e.g. `User` or `Page<User>`.
    #[arg(long = "type", value_name = "TYPE")]
    type_name: String,
    /// Print the derived template instead of generated instances.
    #[arg(long, default_value_t = false)]
    template_only: bool,
    #[arg(long)]
    max_depth: Option<usize>,
    #[arg(long)]
    max_collection_size: Option<usize>,
    #[arg(long)]
    max_string_length: Option<usize>,
    #[arg(long, default_value_t = false)]
    include_private: bool,
    #[arg(long, default_value_t = false)]
    include_static: bool,
    #[arg(long, default_value_t = false)]
    include_transient: bool,
    #[command(flatten)]
    output: OutputArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logging::init_logging(cli.log_level.as_deref(), cli.log_json) {
        eprintln!("mocksmith: {err}");
        return ExitCode::FAILURE;
    }
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(event = "command_failed", error = %err);
            eprintln!("mocksmith: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let file = config::load_config(cli.config.as_deref())?;
    let mocker = global();
    match cli.command {
        Command::Render(args) => commands::run_render(args, &file, mocker),
        Command::Introspect(args) => commands::run_introspect(args, &file, mocker),
        Command::Placeholders => commands::run_placeholders(mocker),
        Command::Schema => commands::run_schema(),
    }
}
