//! How `basin` writes reports and failures.
//!
//! Reports go to stdout as a framed summary for a terminal, one
//! `key: value` per line for GRASS scripts, or JSON. Failures go to stderr
//! in the same mode, tagged with the `E####` code from [`ErrorCode`].
//!
//! The mode comes from `--format` (or its hidden `--json` alias), then the
//! `FORMAT` environment variable, then whether stdout is a terminal.

use basin_core::{ErrorCode, NetworkError};
use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Width of the rule drawn under pretty headings.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a heading with a rule beneath it.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    writeln!(w, "{}", "-".repeat(PRETTY_RULE_WIDTH))
}

/// Write one aligned `label: value` row.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    let label = format!("{key}:");
    writeln!(w, "{label:<18} {}", value.as_ref())
}

/// How a report is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Headed summary for a terminal.
    Pretty,
    /// Plain lines for scripts and pipes.
    Text,
    /// JSON for other tools.
    Json,
}

impl OutputMode {
    /// Parse a `FORMAT` value, ignoring case. Unknown values give `None`.
    fn from_env_value(value: &str) -> Option<Self> {
        Self::from_str(value.trim(), true).ok()
    }
}

/// Everything the output mode can be chosen from.
#[derive(Debug, Clone, Copy)]
struct ModeSources<'a> {
    format: Option<OutputMode>,
    json_alias: bool,
    env: Option<&'a str>,
    stdout_is_tty: bool,
}

impl ModeSources<'_> {
    fn pick(self) -> OutputMode {
        if let Some(mode) = self.format {
            return mode;
        }
        if self.json_alias {
            return OutputMode::Json;
        }
        if let Some(mode) = self.env.and_then(OutputMode::from_env_value) {
            return mode;
        }
        if self.stdout_is_tty {
            OutputMode::Pretty
        } else {
            OutputMode::Text
        }
    }
}

/// Choose the output mode for this run from flags, `FORMAT` and stdout.
pub fn resolve_output_mode(format: Option<OutputMode>, json_alias: bool) -> OutputMode {
    let env = std::env::var("FORMAT").ok();
    ModeSources {
        format,
        json_alias,
        env: env.as_deref(),
        stdout_is_tty: io::stdout().is_terminal(),
    }
    .pick()
}

/// Write `report` to stdout, as JSON or through the text or pretty writer.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    report: &T,
    text: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, report)?;
            writeln!(out)?;
        }
        OutputMode::Text => text(report, &mut out)?,
        OutputMode::Pretty => pretty(report, &mut out)?,
    }
    Ok(())
}

/// A failure as shown to the user.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    /// `E####` code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl CliError {
    /// A failure tagged with `code` and its hint.
    pub fn coded(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_code: Some(code.code().to_string()),
            hint: code.hint().map(ToString::to_string),
        }
    }
}

impl From<&NetworkError> for CliError {
    fn from(err: &NetworkError) -> Self {
        Self::coded(err.code(), err.to_string())
    }
}

fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        let wrapped = serde_json::json!({ "error": error });
        serde_json::to_writer_pretty(&mut *out, &wrapped)?;
        writeln!(out)?;
        return Ok(());
    }
    let tag = error
        .error_code
        .as_deref()
        .map(|c| format!("[{c}]"))
        .unwrap_or_default();
    writeln!(out, "error{tag}: {}", error.message)?;
    if let Some(hint) = &error.hint {
        writeln!(out, "  hint: {hint}")?;
    }
    Ok(())
}

/// Write `error` to stderr in `mode`.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    write_error(&mut io::stderr().lock(), mode, error)
}
