//! Progress and summary output.

use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::comparator::{FileOutcome, FileRecord, RunReport};
use crate::errors::HarnessError;
use crate::failures::{ExpectedMismatches, MismatchState};
use crate::host::ProcessAdapter;
use crate::smoke::SmokeOutcome;

/// One progress line for a processed file.
pub fn format_record(record: &FileRecord) -> String {
    match &record.outcome {
        FileOutcome::Passed => format!("PASS {}", record.path),
        FileOutcome::Mismatched { actual_path } => {
            format!("MISMATCH {}, see {}", record.path, actual_path)
        }
        FileOutcome::Created { reference_path } => {
            format!("NEW baseline {} for {}", reference_path, record.path)
        }
        FileOutcome::Skipped => format!("SKIP {} (empty or unreadable)", record.path),
    }
}

/// Summary of a comparison run.
///
/// Mismatched files are listed in a table, each classified against the
/// expected mismatches. The first column is padded by display width so
/// wide characters in paths keep the second column aligned.
pub fn format_summary(report: &RunReport, expected: &ExpectedMismatches) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "Examined {} files: {} passed, {} mismatched, {} created, {} skipped",
        report.examined, report.passed, report.mismatched, report.created, report.skipped
    )
    .unwrap();

    let rows: Vec<(&str, MismatchState)> = report
        .mismatched_paths()
        .map(|path| (path, expected.classify(path)))
        .collect();
    if rows.is_empty() {
        return output;
    }

    let width = rows
        .iter()
        .map(|(path, _)| UnicodeWidthStr::width(*path))
        .max()
        .unwrap_or(0);

    let mut regressions = 0;
    writeln!(output).unwrap();
    for &(path, state) in &rows {
        if state == MismatchState::Regression {
            regressions += 1;
        }
        let padding = " ".repeat(width - UnicodeWidthStr::width(path));
        writeln!(
            output,
            "  {}{}  {}",
            path,
            padding,
            describe_state(path, state, expected)
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    let status = if regressions > 0 { "FAIL" } else { "PASS" };
    writeln!(
        output,
        "{}: {} expected, {} regressions",
        status,
        rows.len() - regressions,
        regressions
    )
    .unwrap();

    output
}

fn describe_state(path: &str, state: MismatchState, expected: &ExpectedMismatches) -> String {
    let label = match state {
        MismatchState::Known => "known",
        MismatchState::Pending => "pending",
        MismatchState::Regression => return "regression".to_string(),
    };
    match expected.get_entry(path).and_then(|entry| entry.reason.as_deref()) {
        Some(reason) => format!("{} ({})", label, reason),
        None => label.to_string(),
    }
}

/// Prints harness output through the host's print capability.
pub struct Reporter<'a, P: ?Sized> {
    process: &'a P,
}

impl<'a, P: ProcessAdapter + ?Sized> Reporter<'a, P> {
    pub fn new(process: &'a P) -> Self {
        Self { process }
    }

    pub fn banner(&self, name: &str) {
        self.process
            .print(&[&"Running unit tests for", &format!("{}...", name)]);
    }

    /// Failure message and trace, if any, then the number of assertions run.
    pub fn smoke(&self, outcome: &SmokeOutcome) {
        match &outcome.failure {
            None => self.process.print_line(&format!(
                "No failure. Total tests: {} tests.",
                outcome.total
            )),
            Some(failure) => {
                self.process.print_line(&failure.to_string());
                for label in &failure.trace {
                    self.process.print(&[&"  passed:", label]);
                }
                self.process
                    .print_line(&format!("Total tests: {} tests.", outcome.total));
            }
        }
    }

    pub fn record(&self, record: &FileRecord) {
        self.process.print_line(&format_record(record));
    }

    pub fn summary(&self, report: &RunReport, expected: &ExpectedMismatches) {
        self.print_block(&format_summary(report, expected));
    }

    pub fn fatal(&self, error: &HarnessError) {
        self.process.print(&[&"ABORTED:", error]);
    }

    fn print_block(&self, text: &str) {
        for line in text.lines() {
            self.process.print_line(line);
        }
    }
}
