//! Expected mismatch tracking via TOML file, and the run verdict.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::comparator::RunReport;
use crate::errors::{HarnessError, HarnessResult};
use crate::smoke::SmokeOutcome;

/// Loaded expected mismatches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedMismatches {
    /// Known mismatches (won't fix soon).
    #[serde(default)]
    pub known: Vec<MismatchEntry>,
    /// Pending mismatches (awaiting a parser fix).
    #[serde(default)]
    pub pending: Vec<MismatchEntry>,
    /// Scanned root that entry paths are relative to. Without one, entries
    /// only match the scanned path exactly.
    #[serde(skip)]
    pub root: Option<String>,
}

/// A single expected mismatch entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MismatchEntry {
    /// Source file, relative to the scanned root or exactly as scanned.
    pub source: String,
    /// Human-readable reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Date added (YYYY-MM-DD).
    #[serde(default)]
    pub added: Option<String>,
    /// Related issue URL.
    #[serde(default)]
    pub issue: Option<String>,
}

impl MismatchEntry {
    fn matches(&self, path: &str, root: Option<&str>) -> bool {
        let path = normalize(path);
        let source = normalize(&self.source);
        if path == source {
            return true;
        }
        root.and_then(|root| relative_to(&path, &normalize(root)))
            .map_or(false, |relative| relative == source)
    }
}

fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").map(str::to_string).unwrap_or(path)
}

fn relative_to<'p>(path: &'p str, root: &str) -> Option<&'p str> {
    let root = root.trim_end_matches('/');
    if root.is_empty() || root == "." {
        return Some(path);
    }
    path.strip_prefix(root)?.strip_prefix('/')
}

/// How a mismatch is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchState {
    /// Known limitation.
    Known,
    /// Awaiting fix, not blocking.
    Pending,
    /// Not listed - the mismatch is a regression.
    Regression,
}

impl ExpectedMismatches {
    /// Load from a TOML file. A missing file yields an empty list.
    pub fn load(path: &Path) -> HarnessResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| HarnessError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| HarnessError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Resolve entries against `root` from now on.
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Classify a mismatching source file.
    pub fn classify(&self, path: &str) -> MismatchState {
        let root = self.root.as_deref();
        if self.known.iter().any(|entry| entry.matches(path, root)) {
            return MismatchState::Known;
        }
        if self.pending.iter().any(|entry| entry.matches(path, root)) {
            return MismatchState::Pending;
        }
        MismatchState::Regression
    }

    /// Count total expected mismatches.
    pub fn count(&self) -> usize {
        self.known.len() + self.pending.len()
    }

    /// Get the entry for a source file (if expected).
    pub fn get_entry(&self, path: &str) -> Option<&MismatchEntry> {
        self.known
            .iter()
            .chain(self.pending.iter())
            .find(|entry| entry.matches(path, self.root.as_deref()))
    }
}

/// Overall result of a harness invocation, folded into an exit code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    /// Smoke assertions executed.
    pub smoke_assertions: usize,
    pub smoke_failed: bool,
    pub examined: usize,
    pub passed: usize,
    pub created: usize,
    pub skipped: usize,
    /// Mismatches listed as known or pending.
    pub expected_mismatches: usize,
    /// Mismatches nobody expected.
    pub regressions: usize,
    /// The run aborted on a parse or I/O error.
    pub fatal: bool,
}

impl Verdict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the exit code (0 = pass, 1 = smoke failure or regressions,
    /// 2 = aborted run).
    pub fn exit_code(&self) -> i32 {
        if self.fatal {
            2
        } else if self.smoke_failed || self.regressions > 0 {
            1
        } else {
            0
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code() == 0
    }

    pub fn record_smoke(&mut self, outcome: &SmokeOutcome) {
        self.smoke_assertions = outcome.total;
        self.smoke_failed = !outcome.passed();
    }

    pub fn record_run(&mut self, report: &RunReport, expected: &ExpectedMismatches) {
        self.examined = report.examined;
        self.passed = report.passed;
        self.created = report.created;
        self.skipped = report.skipped;
        for path in report.mismatched_paths() {
            match expected.classify(path) {
                MismatchState::Known | MismatchState::Pending => self.expected_mismatches += 1,
                MismatchState::Regression => self.regressions += 1,
            }
        }
    }

    pub fn record_fatal(&mut self) {
        self.fatal = true;
    }
}
