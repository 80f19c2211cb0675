pub mod check;
pub mod completions;
pub mod extract;
pub mod upstream;

use std::path::PathBuf;

use basin_core::ErrorCode;
use basin_core::config::BasinConfig;
use basin_core::network::{DanglingPolicy, Network};
use basin_core::table::{AttributeSource, TableFile};
use clap::{Args, ValueEnum};
use tracing::info;

use crate::grass::GrassDbSelect;
use crate::output::{CliError, OutputMode, render_error};

/// `--dangling` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DanglingArg {
    /// Fail when a downstream id names no segment.
    Reject,
    /// Treat such references as outlets (clipped networks).
    Outlet,
}

impl From<DanglingArg> for DanglingPolicy {
    fn from(arg: DanglingArg) -> Self {
        match arg {
            DanglingArg::Reject => Self::Reject,
            DanglingArg::Outlet => Self::Outlet,
        }
    }
}

/// How to read the stream attribute table and index it.
#[derive(Args, Debug, Clone, Default)]
pub struct NetworkArgs {
    /// Read attributes from an exported table (`.json`, or delimited text
    /// with a header row) instead of `v.db.select`.
    #[arg(long, value_name = "FILE")]
    pub table: Option<PathBuf>,

    /// Column separator for delimited tables.
    #[arg(long, value_name = "CHAR")]
    pub separator: Option<char>,

    /// Downstream ids that match no segment: reject, or treat as outlets.
    #[arg(long, value_enum)]
    pub dangling: Option<DanglingArg>,
}

/// Render `error` and fail the command with its message.
pub fn fail<T>(output: OutputMode, error: &CliError) -> anyhow::Result<T> {
    render_error(output, error)?;
    anyhow::bail!("{}", error.message)
}

/// Load the stream attributes and build the network index.
///
/// `map` is the GRASS stream map, used when no `--table` is given.
pub fn load_network(
    map: Option<&str>,
    args: &NetworkArgs,
    config: &BasinConfig,
    output: OutputMode,
) -> anyhow::Result<Network> {
    let mut options = config.network.options();
    if let Some(dangling) = args.dangling {
        options.dangling = dangling.into();
    }
    let columns = config.network.columns();
    let separator = args.separator.unwrap_or(config.network.separator);

    let source: Box<dyn AttributeSource> = match (&args.table, map) {
        (Some(path), _) => Box::new(TableFile::new(path, separator)),
        (None, Some(map)) => Box::new(GrassDbSelect {
            map: map.to_string(),
            prefix: config.extract.grass_prefix.clone(),
        }),
        (None, None) => {
            return fail(
                output,
                &CliError::coded(
                    ErrorCode::TableParseError,
                    "no stream attributes: pass --table or --input-streams",
                ),
            );
        }
    };

    let links = match source.load_links(&columns) {
        Ok(links) => links,
        Err(e) => {
            return fail(
                output,
                &CliError::coded(ErrorCode::TableParseError, format!("{e:#}")),
            );
        }
    };

    match Network::build(links, &options) {
        Ok(network) => {
            info!(segments = network.len(), "indexed stream network");
            Ok(network)
        }
        Err(e) => fail(output, &CliError::from(&e)),
    }
}
