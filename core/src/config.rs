//! Indentation policy options.
//!
//! All options default to the values an editor ships with, so partial
//! config documents deserialize cleanly. Keys are camelCase in both the
//! JSON and TOML forms.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// How blank lines are rewritten when pasted text is reformatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyLineFormatting {
    /// Blank lines stay empty.
    #[default]
    None,
    /// Blank lines receive the surrounding block indent.
    Indent,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndentConfig {
    /// Text emitted per indent level, a tab or a run of spaces.
    pub indent_string: String,
    /// Line terminator used when rewriting text.
    pub eol_marker: String,
    /// Align call arguments on continuation lines to the column of the
    /// first argument instead of indenting one unit.
    pub align_to_first_method_call_argument: bool,
    /// Same as above for indexer arguments.
    pub align_to_first_indexer_argument: bool,
    /// Chained braceless `if`/`else` share one indent level.
    pub align_embedded_if_statements: bool,
    /// Stacked braceless `using` statements share one indent level.
    pub align_embedded_using_statements: bool,
    /// Comments already at the first column are left there.
    pub keep_comments_at_first_column: bool,
    /// Blank lines carry the block indent instead of being empty.
    pub indent_blank_lines: bool,
    pub empty_line_formatting: EmptyLineFormatting,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            indent_string: "\t".into(),
            eol_marker: "\n".into(),
            align_to_first_method_call_argument: false,
            align_to_first_indexer_argument: false,
            align_embedded_if_statements: true,
            align_embedded_using_statements: true,
            keep_comments_at_first_column: true,
            indent_blank_lines: false,
            empty_line_formatting: EmptyLineFormatting::None,
        }
    }
}

impl IndentConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parse indentation config from JSON")
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parse indentation config from TOML")
    }

    /// Read a config file, dispatching on the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("toml") => Self::from_toml_str(&text),
            other => bail!("unsupported config format: {:?}", other),
        }
    }
}
