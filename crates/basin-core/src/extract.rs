//! Extraction planning: from a [`Basin`] to feature-selection requests.
//!
//! The core never touches geometry. It turns a basin into one or two
//! requests for an [`Extractor`], which materializes the matching features
//! as new vector layers:
//!
//! 1. sub-basin polygons, selected with a `where` predicate on the basin
//!    key column (only when a sub-basin layer is given);
//! 2. stream segments, selected by category list.
//!
//! The GRASS implementation (`v.extract`) lives in the CLI crate;
//! [`RecordingExtractor`] keeps requests in memory for dry runs and tests.

use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::closure::Basin;
use crate::config::ExtractConfig;

/// How features are picked from the input layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Selection {
    /// Comma-separated category ids (`cats=`).
    Cats(String),
    /// SQL predicate on the attribute table (`where=`).
    Where(String),
}

/// One "copy the matching features of `input` into `output`" request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractRequest {
    pub input: String,
    pub output: String,
    pub selection: Selection,
    pub overwrite: bool,
}

impl ExtractRequest {
    /// `key=value` arguments in `v.extract` order.
    #[must_use]
    pub fn grass_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("input={}", self.input),
            format!("output={}", self.output),
        ];
        match &self.selection {
            Selection::Cats(cats) => args.push(format!("cats={cats}")),
            Selection::Where(clause) => args.push(format!("where={clause}")),
        }
        if self.overwrite {
            args.push("--overwrite".to_string());
        }
        args
    }
}

impl fmt::Display for ExtractRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v.extract {}", self.grass_args().join(" "))
    }
}

/// Layer names for one extraction run. Opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractTargets {
    pub input_streams: String,
    pub output_streams: String,
    /// Sub-basin polygons and the layer to write the basin into.
    pub basins: Option<(String, String)>,
}

/// Build the requests that materialize `basin`.
///
/// Sub-basin polygons come first (when configured), then stream segments.
#[must_use]
pub fn plan_extraction(
    basin: &Basin,
    targets: &ExtractTargets,
    config: &ExtractConfig,
) -> Vec<ExtractRequest> {
    let mut plan = Vec::with_capacity(2);

    if let Some((input_basins, output_basin)) = &targets.basins {
        plan.push(ExtractRequest {
            input: input_basins.clone(),
            output: output_basin.clone(),
            selection: Selection::Where(basin.where_clause(&config.basin_key)),
            overwrite: config.overwrite,
        });
    }

    plan.push(ExtractRequest {
        input: targets.input_streams.clone(),
        output: targets.output_streams.clone(),
        selection: Selection::Cats(basin.cats_csv()),
        overwrite: config.overwrite,
    });

    plan
}

/// Materializes an [`ExtractRequest`] as a new layer.
pub trait Extractor {
    /// Run one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer could not be written.
    fn extract(&mut self, request: &ExtractRequest) -> Result<()>;
}

/// Run every request in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the first extractor error, annotated with the output layer.
pub fn run_plan<E: Extractor + ?Sized>(extractor: &mut E, plan: &[ExtractRequest]) -> Result<()> {
    for request in plan {
        extractor
            .extract(request)
            .with_context(|| format!("Failed to extract {}", request.output))?;
        info!(output = %request.output, input = %request.input, "extracted layer");
    }
    Ok(())
}

/// Keeps requests instead of running them.
#[derive(Debug, Default)]
pub struct RecordingExtractor {
    pub requests: Vec<ExtractRequest>,
}

impl Extractor for RecordingExtractor {
    fn extract(&mut self, request: &ExtractRequest) -> Result<()> {
        self.requests.push(request.clone());
        Ok(())
    }
}
