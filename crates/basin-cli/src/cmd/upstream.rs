//! `basin upstream`: list the segments draining through one segment.

use basin_core::config::BasinConfig;
use basin_core::network::SegmentId;
use basin_core::upstream_closure;
use clap::Args;
use serde::Serialize;

use super::{NetworkArgs, fail, load_network};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `basin upstream`.
#[derive(Args, Debug)]
pub struct UpstreamArgs {
    /// Segment category the basin drains through.
    #[arg(long)]
    pub cat: SegmentId,

    /// GRASS stream map to read attributes from.
    #[arg(long, alias = "input_streams", value_name = "MAP")]
    pub input_streams: Option<String>,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Debug, Serialize)]
struct UpstreamReport {
    root: SegmentId,
    count: usize,
    levels: usize,
    segments: Vec<SegmentId>,
    cats: String,
}

pub fn run_upstream(
    args: &UpstreamArgs,
    config: &BasinConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let network = load_network(args.input_streams.as_deref(), &args.network, config, output)?;

    let basin = match upstream_closure(&network, args.cat) {
        Ok(basin) => basin,
        Err(e) => return fail(output, &CliError::from(&e)),
    };

    let report = UpstreamReport {
        root: basin.root,
        count: basin.len(),
        levels: basin.levels,
        segments: basin.iter().collect(),
        cats: basin.cats_csv(),
    };

    render_mode(
        output,
        &report,
        |r, w| writeln!(w, "{}", r.cats),
        |r, w| {
            pretty_section(w, &format!("Basin of segment {}", r.root))?;
            pretty_kv(w, "Segments", r.count.to_string())?;
            pretty_kv(w, "Levels", r.levels.to_string())?;
            pretty_kv(w, "Cats", &r.cats)
        },
    )
}
