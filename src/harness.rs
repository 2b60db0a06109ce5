//! A complete harness run: smoke suite, scan, comparison, summary.

use tracing::{error, info};

use crate::comparator::{ComparatorOptions, RunReport, SnapshotComparator};
use crate::config::HarnessConfig;
use crate::errors::HarnessResult;
use crate::failures::{ExpectedMismatches, Verdict};
use crate::host::{FileAccess, ProcessAdapter, SourceParser};
use crate::report::Reporter;
use crate::scanner::{scan, ScanOptions};
use crate::smoke::run_smoke_suite;

/// Name printed in the banner unless overridden.
pub const DEFAULT_SUITE_NAME: &str = "syntax-golden";

/// Wires the host adapters to the scanner and comparator.
pub struct Harness<'a, P: ?Sized, R> {
    name: String,
    config: HarnessConfig,
    expected: ExpectedMismatches,
    skip_smoke: bool,
    fs: &'a dyn FileAccess,
    process: &'a P,
    parser: &'a R,
}

impl<'a, P, R> Harness<'a, P, R>
where
    P: ProcessAdapter + ?Sized,
    R: SourceParser,
{
    pub fn new(fs: &'a dyn FileAccess, process: &'a P, parser: &'a R) -> Self {
        Self {
            name: DEFAULT_SUITE_NAME.to_string(),
            config: HarnessConfig::default(),
            expected: ExpectedMismatches::default(),
            skip_smoke: false,
            fs,
            process,
            parser,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_config(mut self, config: HarnessConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_expected_mismatches(mut self, expected: ExpectedMismatches) -> Self {
        self.expected = expected;
        self
    }

    pub fn with_skip_smoke(mut self, skip_smoke: bool) -> Self {
        self.skip_smoke = skip_smoke;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run everything and fold the outcome into a [`Verdict`].
    ///
    /// Expected mismatches without a root of their own are resolved
    /// against the configured root.
    ///
    /// A smoke failure is reported but does not stop the comparison. A
    /// fatal error during scanning or comparison ends the run; files
    /// already processed have been reported by then.
    pub fn run(&self) -> Verdict {
        let reporter = Reporter::new(self.process);
        let mut verdict = Verdict::new();

        reporter.banner(&self.name);

        if !self.skip_smoke {
            let smoke = run_smoke_suite(self.fs, self.process, self.parser);
            reporter.smoke(&smoke);
            verdict.record_smoke(&smoke);
        }

        let mut expected = self.expected.clone();
        expected
            .root
            .get_or_insert_with(|| self.config.root.clone());

        match self.compare(&reporter) {
            Ok(report) => {
                reporter.summary(&report, &expected);
                verdict.record_run(&report, &expected);
            }
            Err(err) => {
                error!(error = %err, "harness run aborted");
                reporter.fatal(&err);
                verdict.record_fatal();
            }
        }

        info!(exit_code = verdict.exit_code(), "harness finished");
        verdict
    }

    fn compare(&self, reporter: &Reporter<'_, P>) -> HarnessResult<RunReport> {
        let options = ComparatorOptions::from(&self.config);
        options.validate()?;

        let files = scan(self.fs, &self.config.root, &ScanOptions::from(&self.config))?;
        info!(root = %self.config.root, count = files.len(), "discovered source files");

        let comparator = SnapshotComparator::new(self.fs, self.parser, options);
        comparator.run_all_with(&files, |record| reporter.record(record))
    }
}
