#![forbid(unsafe_code)]

mod cmd;
mod grass;
mod output;

use basin_core::ErrorCode;
use basin_core::config::{BasinConfig, load_config};
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "basin: drainage basins from linked stream networks",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty, text, or json.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Emit JSON output (alias for `--format json`).
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file (default: $BASIN_CONFIG, ./basin.toml, then the user config dir).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags and environment.
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Extract the drainage basin of a stream segment",
        long_about = "Find every segment draining through --cat and write the matching \
                      sub-basin polygons and stream segments to new maps with v.extract.",
        after_help = "EXAMPLES:\n    # Basin of segment 42\n    basin extract --input-streams streams --input-basins subbasins \\\n        --cat 42 --output-basin basin_42 --output-streams streams_42\n\n    # Show the v.extract calls without running them\n    basin extract --input-streams streams --cat 42 --output-streams s42 --dry-run"
    )]
    Extract(cmd::extract::ExtractArgs),

    #[command(
        about = "List the segments upstream of a segment",
        long_about = "Print the ids of the segment and every segment draining into it.",
        after_help = "EXAMPLES:\n    # From an exported attribute table\n    basin upstream --table streams.txt --cat 42\n\n    # Emit machine-readable output\n    basin upstream --input-streams streams --cat 42 --json"
    )]
    Upstream(cmd::upstream::UpstreamArgs),

    #[command(
        about = "Summarize and validate a stream network",
        long_about = "Report segment, outlet, headwater and confluence counts and fail if \
                      the downstream links contain a loop.",
        after_help = "EXAMPLES:\n    # Check a GRASS stream map\n    basin check --input-streams streams\n\n    # Check a clipped network\n    basin check --table clipped.json --dangling outlet"
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    basin completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("BASIN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "basin=debug,info"
        } else {
            "basin=info,warn"
        })
    });

    let format = env::var("BASIN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr; stdout carries command output.
    let layer = fmt::layer().with_writer(std::io::stderr);
    match format.as_str() {
        "json" => {
            registry.with(layer.json().with_ansi(false)).init();
        }
        _ => {
            registry.with(layer.compact()).init();
        }
    }
}

fn load_effective_config(cli: &Cli, output: OutputMode) -> anyhow::Result<BasinConfig> {
    let cwd = env::current_dir()?;
    match load_config(cli.config.as_deref(), &cwd) {
        Ok((config, source)) => {
            debug!(?source, "loaded config");
            Ok(config)
        }
        Err(e) => {
            let err = CliError::coded(ErrorCode::ConfigParseError, format!("{e:#}"));
            render_error(output, &err)?;
            Err(e)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = cli.output_mode();

    if let Commands::Completions(args) = &cli.command {
        return cmd::completions::run_completions(args.shell, &mut Cli::command());
    }

    let config = load_effective_config(&cli, output)?;

    match &cli.command {
        Commands::Extract(args) => cmd::extract::run_extract(args, &config, output),
        Commands::Upstream(args) => cmd::upstream::run_upstream(args, &config, output),
        Commands::Check(args) => cmd::check::run_check(args, &config, output),
        Commands::Completions(_) => Ok(()),
    }
}
