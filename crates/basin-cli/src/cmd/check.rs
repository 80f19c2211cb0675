//! `basin check`: summarize a stream network and verify it drains to outlets.

use basin_core::config::BasinConfig;
use basin_core::network::{SegmentId, SegmentLink};
use basin_core::{NetworkError, NetworkStats};
use clap::Args;
use serde::Serialize;

use super::{NetworkArgs, fail, load_network};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `basin check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// GRASS stream map to read attributes from.
    #[arg(long, alias = "input_streams", value_name = "MAP")]
    pub input_streams: Option<String>,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    #[serde(flatten)]
    stats: NetworkStats,
    outlets: Vec<SegmentId>,
    implicit_outlets: Vec<SegmentLink>,
    cycles: Vec<Vec<SegmentId>>,
}

pub fn run_check(args: &CheckArgs, config: &BasinConfig, output: OutputMode) -> anyhow::Result<()> {
    let network = load_network(args.input_streams.as_deref(), &args.network, config, output)?;

    let mut outlets: Vec<SegmentId> = network.outlets().collect();
    outlets.sort_unstable();
    let report = CheckReport {
        stats: NetworkStats::from_network(&network),
        outlets,
        implicit_outlets: network.implicit_outlets().to_vec(),
        cycles: network.find_cycles(),
    };

    render_mode(
        output,
        &report,
        |r, w| {
            writeln!(w, "segments={}", r.stats.segment_count)?;
            writeln!(w, "links={}", r.stats.link_count)?;
            writeln!(w, "outlets={}", r.stats.outlet_count)?;
            writeln!(w, "implicit_outlets={}", r.stats.implicit_outlet_count)?;
            writeln!(w, "headwaters={}", r.stats.headwater_count)?;
            writeln!(w, "confluences={}", r.stats.confluence_count)?;
            writeln!(w, "max_in_degree={}", r.stats.max_in_degree)?;
            writeln!(w, "cycles={}", r.stats.cycle_count)
        },
        |r, w| {
            pretty_section(w, "Stream network")?;
            pretty_kv(w, "Segments", r.stats.segment_count.to_string())?;
            pretty_kv(w, "Links", r.stats.link_count.to_string())?;
            pretty_kv(w, "Outlets", r.stats.outlet_count.to_string())?;
            pretty_kv(w, "Headwaters", r.stats.headwater_count.to_string())?;
            pretty_kv(w, "Confluences", r.stats.confluence_count.to_string())?;
            pretty_kv(w, "Max tributaries", r.stats.max_in_degree.to_string())?;
            for link in &r.implicit_outlets {
                pretty_kv(
                    w,
                    "Implicit outlet",
                    format!("{} (drains into missing {})", link.id, link.downstream),
                )?;
            }
            pretty_kv(
                w,
                "Drains to outlet",
                if r.stats.is_acyclic() { "yes" } else { "no" },
            )
        },
    )?;

    if let Some(segments) = report.cycles.into_iter().next() {
        let err = NetworkError::Cycle { segments };
        return fail(output, &CliError::from(&err));
    }
    Ok(())
}
