//! Snapshot comparison against recorded baselines.
//!
//! Every source file is parsed, the result is rendered canonically and
//! compared with the reference artifact next to the source. A missing
//! baseline is created on the spot. A differing one is left untouched and
//! the fresh rendering goes to an actual artifact for review.
//!
//! Files are processed strictly one after the other. Parse failures and
//! write failures abort the run; unreadable sources are skipped.

use std::io;

use tracing::{debug, info, warn};

use crate::canonical::{canonicalize, strip_line_breaks};
use crate::config::{check_extensions, HarnessConfig, ReadMode};
use crate::errors::{HarnessError, HarnessResult};
use crate::host::{FileAccess, OpenMode, SourceParser};

/// Options for a comparison run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparatorOptions {
    pub source_extension: String,
    pub reference_extension: String,
    pub actual_extension: String,
    pub indent_width: usize,
    pub read_mode: ReadMode,
    pub clean_stale_actuals: bool,
}

impl Default for ComparatorOptions {
    fn default() -> Self {
        Self::from(&HarnessConfig::default())
    }
}

impl From<&HarnessConfig> for ComparatorOptions {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            source_extension: config.source_extension.clone(),
            reference_extension: config.reference_extension.clone(),
            actual_extension: config.actual_extension.clone(),
            indent_width: config.indent_width,
            read_mode: config.read_mode,
            clean_stale_actuals: config.clean_stale_actuals,
        }
    }
}

impl ComparatorOptions {
    /// Refuse options where source, reference and actual artifacts would
    /// share a path.
    pub fn validate(&self) -> HarnessResult<()> {
        check_extensions(
            &self.source_extension,
            &self.reference_extension,
            &self.actual_extension,
        )
        .map_err(|message| HarnessError::Config {
            path: "comparator options".to_string(),
            message,
        })
    }
}

/// What happened to one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Matches its baseline.
    Passed,
    /// Differs from its baseline; the fresh rendering was written to
    /// `actual_path`.
    Mismatched { actual_path: String },
    /// Had no baseline; one was written to `reference_path`.
    Created { reference_path: String },
    /// Empty or unreadable, not compared.
    Skipped,
}

/// A source file and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: String,
    pub outcome: FileOutcome,
}

/// Counts and per-file outcomes of a run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Files handed to the comparator, skipped ones included.
    pub examined: usize,
    pub passed: usize,
    pub mismatched: usize,
    pub created: usize,
    pub skipped: usize,
    pub records: Vec<FileRecord>,
}

impl RunReport {
    /// Add one file's outcome.
    pub fn record(&mut self, path: &str, outcome: FileOutcome) -> &FileRecord {
        self.examined += 1;
        match &outcome {
            FileOutcome::Passed => self.passed += 1,
            FileOutcome::Mismatched { .. } => self.mismatched += 1,
            FileOutcome::Created { .. } => self.created += 1,
            FileOutcome::Skipped => self.skipped += 1,
        }
        self.records.push(FileRecord {
            path: path.to_string(),
            outcome,
        });
        &self.records[self.records.len() - 1]
    }

    /// Source paths that mismatched, in processing order.
    pub fn mismatched_paths(&self) -> impl Iterator<Item = &str> {
        self.records.iter().filter_map(|record| match record.outcome {
            FileOutcome::Mismatched { .. } => Some(record.path.as_str()),
            _ => None,
        })
    }
}

/// Path of the artifact paired with `source`: the source suffix replaced by
/// `extension`, same directory.
pub fn artifact_path(source: &str, source_extension: &str, extension: &str) -> String {
    let suffix = format!(".{}", source_extension);
    let base = source.strip_suffix(&suffix).unwrap_or(source);
    format!("{}.{}", base, extension)
}

/// Compares parse results of source files with their baselines.
pub struct SnapshotComparator<'a, P> {
    fs: &'a dyn FileAccess,
    parser: &'a P,
    options: ComparatorOptions,
}

impl<'a, P: SourceParser> SnapshotComparator<'a, P> {
    pub fn new(fs: &'a dyn FileAccess, parser: &'a P, options: ComparatorOptions) -> Self {
        Self {
            fs,
            parser,
            options,
        }
    }

    pub fn options(&self) -> &ComparatorOptions {
        &self.options
    }

    /// Compare every file, in order.
    pub fn run_all(&self, files: &[String]) -> HarnessResult<RunReport> {
        self.run_all_with(files, |_| {})
    }

    /// Compare every file, in order, calling `on_file` as soon as each one
    /// is done.
    pub fn run_all_with<F>(&self, files: &[String], mut on_file: F) -> HarnessResult<RunReport>
    where
        F: FnMut(&FileRecord),
    {
        let mut report = RunReport::default();
        for path in files {
            let outcome = self.compare_file(path)?;
            on_file(report.record(path, outcome));
        }
        info!(
            examined = report.examined,
            passed = report.passed,
            mismatched = report.mismatched,
            created = report.created,
            skipped = report.skipped,
            "comparison finished"
        );
        Ok(report)
    }

    /// Process a single source file.
    pub fn compare_file(&self, path: &str) -> HarnessResult<FileOutcome> {
        let options = &self.options;
        options.validate()?;
        let reference_path =
            artifact_path(path, &options.source_extension, &options.reference_extension);
        let actual_path = artifact_path(path, &options.source_extension, &options.actual_extension);

        if options.clean_stale_actuals && self.fs.exists(&actual_path) {
            self.fs
                .remove_file(&actual_path)
                .map_err(|e| HarnessError::io(&actual_path, e))?;
            debug!(path = %actual_path, "removed stale actual artifact");
        }

        let content = self.read_source(path);
        if content.is_empty() {
            warn!(path = %path, "source is empty or unreadable, skipping");
            return Ok(FileOutcome::Skipped);
        }

        let tree = self
            .parser
            .parse(&content)
            .map_err(|failure| HarnessError::Parse {
                path: path.to_string(),
                failure,
            })?;
        let rendered =
            canonicalize(&tree, options.indent_width).map_err(|source| HarnessError::Serialize {
                path: path.to_string(),
                source,
            })?;
        let current = strip_line_breaks(&rendered);

        let baseline = self
            .read_reference(&reference_path)?
            .map(|text| strip_line_breaks(&text))
            .filter(|text| !text.is_empty());

        match baseline {
            None => {
                self.write_artifact(&reference_path, &rendered)?;
                info!(path = %path, reference = %reference_path, "created new baseline");
                Ok(FileOutcome::Created { reference_path })
            }
            Some(expected) if expected == current => {
                debug!(path = %path, "matches baseline");
                Ok(FileOutcome::Passed)
            }
            Some(_) => {
                self.write_artifact(&actual_path, &rendered)?;
                warn!(path = %path, actual = %actual_path, "parse result differs from baseline");
                Ok(FileOutcome::Mismatched { actual_path })
            }
        }
    }

    /// Source text, or an empty string when the file is missing or cannot
    /// be read.
    fn read_source(&self, path: &str) -> String {
        if !self.fs.exists(path) {
            return String::new();
        }
        match self.read_text(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path, error = %e, "failed to read source");
                String::new()
            }
        }
    }

    /// Reference text, `None` when no reference file exists.
    fn read_reference(&self, path: &str) -> HarnessResult<Option<String>> {
        if !self.fs.exists(path) {
            return Ok(None);
        }
        self.read_text(path)
            .map(Some)
            .map_err(|e| HarnessError::io(path, e))
    }

    fn read_text(&self, path: &str) -> io::Result<String> {
        let mut handle = self.fs.open(path, OpenMode::Read)?;
        let text = match self.options.read_mode {
            ReadMode::Verbatim => handle.read_to_string()?,
            ReadMode::LegacyLines => {
                let mut text = String::new();
                loop {
                    let line = handle.read_line()?;
                    if line.is_empty() {
                        break;
                    }
                    text.push_str(&line);
                }
                text
            }
        };
        handle.close()?;
        Ok(text)
    }

    fn write_artifact(&self, path: &str, rendered: &str) -> HarnessResult<()> {
        let write = || -> io::Result<()> {
            let mut handle = self.fs.open(path, OpenMode::Write)?;
            handle.write_line(rendered)?;
            handle.close()
        };
        write().map_err(|e| HarnessError::io(path, e))
    }
}
