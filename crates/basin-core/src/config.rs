use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::network::{DEFAULT_OUTLET, DanglingPolicy, NetworkOptions, SegmentId};
use crate::table::ColumnNames;

/// Project config file looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "basin.toml";

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "BASIN_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasinConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_id_column")]
    pub id_column: String,
    #[serde(default = "default_downstream_column")]
    pub downstream_column: String,
    #[serde(default = "default_outlet")]
    pub outlet: SegmentId,
    #[serde(default)]
    pub dangling: DanglingPolicy,
    #[serde(default = "default_separator")]
    pub separator: char,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            id_column: default_id_column(),
            downstream_column: default_downstream_column(),
            outlet: default_outlet(),
            dangling: DanglingPolicy::default(),
            separator: default_separator(),
        }
    }
}

impl NetworkConfig {
    #[must_use]
    pub const fn options(&self) -> NetworkOptions {
        NetworkOptions {
            outlet: self.outlet,
            dangling: self.dangling,
        }
    }

    #[must_use]
    pub fn columns(&self) -> ColumnNames {
        ColumnNames {
            id: self.id_column.clone(),
            downstream: self.downstream_column.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Sub-basin attribute column holding the stream segment id.
    #[serde(default = "default_id_column")]
    pub basin_key: String,
    #[serde(default = "default_true")]
    pub overwrite: bool,
    /// Directory holding the GRASS module binaries; `PATH` when unset.
    #[serde(default)]
    pub grass_prefix: Option<PathBuf>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            basin_key: default_id_column(),
            overwrite: default_true(),
            grass_prefix: None,
        }
    }
}

/// Where the effective config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Env(PathBuf),
    Project(PathBuf),
    User(PathBuf),
    Defaults,
}

impl ConfigSource {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Env(p) | Self::Project(p) | Self::User(p) => {
                Some(p.as_path())
            }
            Self::Defaults => None,
        }
    }
}

/// Pick the config file, first match wins: explicit path, `BASIN_CONFIG`,
/// `./basin.toml`, `<config_dir>/basin/config.toml`.
///
/// Explicit and env paths are returned even when missing so that loading
/// reports the typo; the project and user files are optional.
#[must_use]
pub fn resolve_config_source(
    explicit: Option<&Path>,
    env_value: Option<&str>,
    cwd: &Path,
    user_config_dir: Option<&Path>,
) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }
    if let Some(val) = env_value.filter(|v| !v.trim().is_empty()) {
        return ConfigSource::Env(PathBuf::from(val));
    }
    let project = cwd.join(PROJECT_CONFIG_FILE);
    if project.exists() {
        return ConfigSource::Project(project);
    }
    if let Some(dir) = user_config_dir {
        let user = dir.join("basin/config.toml");
        if user.exists() {
            return ConfigSource::User(user);
        }
    }
    ConfigSource::Defaults
}

/// Read and parse one config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML for
/// [`BasinConfig`].
pub fn load_config_file(path: &Path) -> Result<BasinConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<BasinConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load the effective config for a run started in `cwd`.
///
/// # Errors
///
/// Returns an error if the selected config file cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<(BasinConfig, ConfigSource)> {
    let env_value = std::env::var(CONFIG_ENV).ok();
    let user_dir = dirs::config_dir();
    let source = resolve_config_source(explicit, env_value.as_deref(), cwd, user_dir.as_deref());

    let config = match source.path() {
        Some(path) => load_config_file(path)?,
        None => BasinConfig::default(),
    };
    Ok((config, source))
}

const fn default_true() -> bool {
    true
}

fn default_id_column() -> String {
    "cat".to_string()
}

fn default_downstream_column() -> String {
    "tostream".to_string()
}

const fn default_outlet() -> SegmentId {
    DEFAULT_OUTLET
}

const fn default_separator() -> char {
    '|'
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_stream_extract_schema() {
        let config = BasinConfig::default();
        assert_eq!(config.network.id_column, "cat");
        assert_eq!(config.network.downstream_column, "tostream");
        assert_eq!(config.network.outlet, 0);
        assert_eq!(config.network.dangling, DanglingPolicy::Reject);
        assert_eq!(config.network.separator, '|');
        assert_eq!(config.extract.basin_key, "cat");
        assert!(config.extract.overwrite);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: BasinConfig = toml::from_str(
            r#"
            [network]
            dangling = "outlet"

            [extract]
            basin_key = "rnum"
            "#,
        )
        .unwrap();
        assert_eq!(config.network.dangling, DanglingPolicy::Outlet);
        assert_eq!(config.network.id_column, "cat");
        assert_eq!(config.extract.basin_key, "rnum");
        assert!(config.extract.overwrite);
        assert_eq!(config.network.options().dangling, DanglingPolicy::Outlet);
    }

    #[test]
    fn unknown_dangling_value_rejected() {
        let result = toml::from_str::<BasinConfig>("[network]\ndangling = \"ignore\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn explicit_path_wins() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "").unwrap();
        let source = resolve_config_source(
            Some(Path::new("/tmp/other.toml")),
            Some("/tmp/env.toml"),
            dir.path(),
            None,
        );
        assert_eq!(source, ConfigSource::Explicit(PathBuf::from("/tmp/other.toml")));
    }

    #[test]
    fn env_beats_project_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "").unwrap();
        let source = resolve_config_source(None, Some("/tmp/env.toml"), dir.path(), None);
        assert_eq!(source, ConfigSource::Env(PathBuf::from("/tmp/env.toml")));
    }

    #[test]
    fn project_then_user_then_defaults() {
        let cwd = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();

        assert_eq!(
            resolve_config_source(None, None, cwd.path(), Some(user.path())),
            ConfigSource::Defaults
        );

        std::fs::create_dir_all(user.path().join("basin")).unwrap();
        std::fs::write(user.path().join("basin/config.toml"), "").unwrap();
        assert_eq!(
            resolve_config_source(None, Some("  "), cwd.path(), Some(user.path())),
            ConfigSource::User(user.path().join("basin/config.toml"))
        );

        std::fs::write(cwd.path().join(PROJECT_CONFIG_FILE), "").unwrap();
        assert_eq!(
            resolve_config_source(None, None, cwd.path(), Some(user.path())),
            ConfigSource::Project(cwd.path().join(PROJECT_CONFIG_FILE))
        );
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("basin.toml");
        std::fs::write(&path, "[network\n").unwrap();
        let err = load_config_file(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"));
    }

    #[test]
    fn load_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("basin.toml");
        std::fs::write(&path, "[network]\noutlet = 9999\nseparator = \",\"\n").unwrap();
        let config = load_config_file(&path).unwrap();
        assert_eq!(config.network.outlet, 9999);
        assert_eq!(config.network.separator, ',');
    }
}
