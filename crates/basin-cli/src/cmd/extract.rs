//! `basin extract`: carve a drainage basin out of the sub-basin and stream maps.
//!
//! Reads the stream attributes, computes the basin draining through `--cat`,
//! then writes two layers with `v.extract`: the sub-basin polygons of the
//! basin (when `--input-basins` is given) and its stream segments.

use basin_core::config::BasinConfig;
use basin_core::extract::{
    ExtractRequest, ExtractTargets, Extractor, RecordingExtractor, plan_extraction, run_plan,
};
use basin_core::network::SegmentId;
use basin_core::{ErrorCode, upstream_closure};
use clap::Args;
use serde::Serialize;
use tracing::info;

use super::{NetworkArgs, fail, load_network};
use crate::grass::GrassExtractor;
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `basin extract`.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Stream network map (with `cat` and `tostream` attributes).
    #[arg(long, alias = "input_streams", value_name = "MAP")]
    pub input_streams: String,

    /// Sub-basins built alongside the stream network.
    #[arg(long, alias = "input_basins", value_name = "MAP", requires = "output_basin")]
    pub input_basins: Option<String>,

    /// Farthest downstream segment category of the basin.
    #[arg(long)]
    pub cat: SegmentId,

    /// Output map for the drainage basin polygons.
    #[arg(long, alias = "output_basin", value_name = "MAP", requires = "input_basins")]
    pub output_basin: Option<String>,

    /// Output map for the streams within the basin.
    #[arg(long, alias = "output_streams", value_name = "MAP")]
    pub output_streams: String,

    /// Print the `v.extract` calls instead of running them.
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub network: NetworkArgs,
}

impl ExtractArgs {
    fn targets(&self) -> ExtractTargets {
        ExtractTargets {
            input_streams: self.input_streams.clone(),
            output_streams: self.output_streams.clone(),
            basins: self.input_basins.clone().zip(self.output_basin.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ExtractReport {
    root: SegmentId,
    count: usize,
    cats: String,
    dry_run: bool,
    requests: Vec<ExtractRequest>,
}

pub fn run_extract(
    args: &ExtractArgs,
    config: &BasinConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let network = load_network(Some(&args.input_streams), &args.network, config, output)?;

    let basin = match upstream_closure(&network, args.cat) {
        Ok(basin) => basin,
        Err(e) => return fail(output, &CliError::from(&e)),
    };
    info!(root = basin.root, segments = basin.len(), "basin found");

    let plan = plan_extraction(&basin, &args.targets(), &config.extract);

    let mut extractor: Box<dyn Extractor> = if args.dry_run {
        Box::new(RecordingExtractor::default())
    } else {
        Box::new(GrassExtractor {
            prefix: config.extract.grass_prefix.clone(),
        })
    };
    if let Err(e) = run_plan(extractor.as_mut(), &plan) {
        return fail(
            output,
            &CliError::coded(ErrorCode::ExtractFailed, format!("{e:#}")),
        );
    }

    let report = ExtractReport {
        root: basin.root,
        count: basin.len(),
        cats: basin.cats_csv(),
        dry_run: args.dry_run,
        requests: plan,
    };

    render_mode(
        output,
        &report,
        |r, w| {
            for request in &r.requests {
                if r.dry_run {
                    writeln!(w, "{request}")?;
                } else {
                    writeln!(w, "{}", request.output)?;
                }
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, &format!("Basin of segment {}", r.root))?;
            pretty_kv(w, "Segments", r.count.to_string())?;
            pretty_kv(w, "Cats", &r.cats)?;
            let label = if r.dry_run { "Would write" } else { "Wrote" };
            for request in &r.requests {
                pretty_kv(w, label, format!("{} (from {})", request.output, request.input))?;
            }
            Ok(())
        },
    )
}
