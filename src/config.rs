//! Harness configuration.
//!
//! Every field has a default, so an absent or partial `syntax-golden.toml`
//! is valid and running without any configuration reproduces the
//! self-running harness behaviour.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{HarnessError, HarnessResult};

/// How source and reference files are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadMode {
    /// Read the whole file, line breaks included.
    #[default]
    Verbatim,
    /// Concatenate lines without separators and stop at the first empty
    /// line. Compatible with line-oriented hosts, but drops line breaks and
    /// truncates files at their first blank line.
    LegacyLines,
}

/// Configuration for a harness run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory (or single file) to scan.
    pub root: String,
    /// Suffix of source files, without the dot.
    pub source_extension: String,
    /// Suffix of recorded baselines.
    pub reference_extension: String,
    /// Suffix of artifacts written on mismatch.
    pub actual_extension: String,
    /// Spaces per indentation level in canonical output.
    pub indent_width: usize,
    pub read_mode: ReadMode,
    /// Remove a file's previous actual artifact before comparing it.
    pub clean_stale_actuals: bool,
    /// Directories nested deeper than this are not entered.
    pub max_depth: usize,
    /// Skip directories already visited under another path.
    pub detect_cycles: bool,
    /// TOML file listing known and pending mismatches.
    pub expected_failures: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            root: "tests".to_string(),
            source_extension: "js".to_string(),
            reference_extension: "tree".to_string(),
            actual_extension: "actual".to_string(),
            indent_width: 4,
            read_mode: ReadMode::default(),
            clean_stale_actuals: true,
            max_depth: 64,
            detect_cycles: true,
            expected_failures: None,
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> HarnessResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| HarnessError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content).map_err(|message| HarnessError::Config {
            path: path.display().to_string(),
            message,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Source, reference and actual files must not share an extension.
    pub fn validate(&self) -> Result<(), String> {
        check_extensions(
            &self.source_extension,
            &self.reference_extension,
            &self.actual_extension,
        )
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_source_extension(mut self, extension: impl Into<String>) -> Self {
        self.source_extension = extension.into();
        self
    }

    pub fn with_read_mode(mut self, mode: ReadMode) -> Self {
        self.read_mode = mode;
        self
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn with_clean_stale_actuals(mut self, clean: bool) -> Self {
        self.clean_stale_actuals = clean;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Fails when two of the three artifact extensions are equal.
pub(crate) fn check_extensions(source: &str, reference: &str, actual: &str) -> Result<(), String> {
    let pairs = [
        ("source_extension", source, "reference_extension", reference),
        ("source_extension", source, "actual_extension", actual),
        ("reference_extension", reference, "actual_extension", actual),
    ];
    for (left_name, left, right_name, right) in pairs {
        if left == right {
            return Err(format!(
                "{} and {} are both `{}`",
                left_name, right_name, left
            ));
        }
    }
    Ok(())
}
