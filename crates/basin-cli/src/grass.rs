//! GRASS GIS collaborators: `v.db.select` for attributes, `v.extract` for
//! materializing the basin layers.
//!
//! Both shell out to the module binaries, so `basin` must run inside a
//! GRASS session (or with `extract.grass_prefix` pointing at the binaries).

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use basin_core::extract::{ExtractRequest, Extractor};
use basin_core::network::SegmentLink;
use basin_core::table::{AttributeSource, ColumnNames, parse_delimited};
use tracing::{debug, instrument};

fn module_command(prefix: Option<&Path>, module: &str) -> Command {
    prefix.map_or_else(
        || Command::new(module),
        |dir| Command::new(dir.join(module)),
    )
}

/// `v.db.select` arguments reading the id and downstream columns of `map`.
pub fn db_select_args(map: &str, columns: &ColumnNames) -> Vec<String> {
    vec![
        format!("map={map}"),
        format!("columns={},{}", columns.id, columns.downstream),
        "separator=pipe".to_string(),
    ]
}

/// Attribute table of a GRASS vector map, read through `v.db.select`.
#[derive(Debug, Clone)]
pub struct GrassDbSelect {
    pub map: String,
    pub prefix: Option<PathBuf>,
}

impl AttributeSource for GrassDbSelect {
    #[instrument(skip(self, columns), fields(map = %self.map))]
    fn load_links(&self, columns: &ColumnNames) -> Result<Vec<SegmentLink>> {
        let output = module_command(self.prefix.as_deref(), "v.db.select")
            .args(db_select_args(&self.map, columns))
            .output()
            .context("Failed to run v.db.select")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("v.db.select map={} failed: {}", self.map, stderr.trim());
        }

        let text = String::from_utf8(output.stdout).context("Invalid UTF-8 from v.db.select")?;
        let links = parse_delimited(&text, '|', columns)
            .with_context(|| format!("Failed to parse attributes of {}", self.map))?;
        debug!(rows = links.len(), "loaded stream attributes");
        Ok(links)
    }
}

/// Runs [`ExtractRequest`]s through `v.extract`.
#[derive(Debug, Clone, Default)]
pub struct GrassExtractor {
    pub prefix: Option<PathBuf>,
}

impl Extractor for GrassExtractor {
    #[instrument(skip(self, request), fields(output = %request.output))]
    fn extract(&mut self, request: &ExtractRequest) -> Result<()> {
        let output = module_command(self.prefix.as_deref(), "v.extract")
            .args(request.grass_args())
            .output()
            .context("Failed to run v.extract")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "v.extract output={} failed: {}",
                request.output,
                stderr.trim()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_select_reads_configured_columns() {
        let columns = ColumnNames {
            id: "rnum".to_string(),
            downstream: "tostream".to_string(),
        };
        assert_eq!(
            db_select_args("streams", &columns),
            vec!["map=streams", "columns=rnum,tostream", "separator=pipe"]
        );
    }

    #[test]
    fn missing_binary_is_an_error() {
        let source = GrassDbSelect {
            map: "streams".to_string(),
            prefix: Some(PathBuf::from("/nonexistent/grass/bin")),
        };
        let err = source.load_links(&ColumnNames::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to run v.db.select"));
    }
}
