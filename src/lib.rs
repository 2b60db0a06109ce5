//! Golden-file snapshot testing for parsers.
//!
//! Source files are discovered under a root directory, parsed, and the
//! parse result is rendered to canonical JSON. Each rendering is compared
//! with a baseline stored next to its source file. Missing baselines are
//! recorded on the first run and differing ones produce an `actual`
//! artifact for review.
//!
//! ## Overview
//!
//! The harness never reaches for the host directly. File access, process
//! control and the parser are traits ([`FileAccess`], [`ProcessAdapter`],
//! [`SourceParser`]) handed to a [`Harness`], so the same run can go
//! against the real machine or against in-memory fakes.
//!
//! ## Modules
//!
//! - [`host`] - Host adapter traits and their std and in-memory versions
//! - [`scanner`] - Recursive source file discovery
//! - [`canonical`] - Deterministic JSON rendering of parse results
//! - [`comparator`] - Baseline comparison and artifact writing
//! - [`smoke`] - Capability presence checks run before the comparison
//! - [`report`] - Progress lines and run summaries
//! - [`config`] - TOML configuration
//! - [`failures`] - Expected mismatches and the run verdict
//! - [`harness`] - A complete run wiring all of the above
//! - [`errors`] - Error types

pub mod canonical;
pub mod comparator;
pub mod config;
pub mod errors;
pub mod failures;
pub mod harness;
pub mod host;
pub mod report;
pub mod scanner;
pub mod smoke;

pub use canonical::{canonicalize, strip_line_breaks};
pub use comparator::{
    artifact_path, ComparatorOptions, FileOutcome, FileRecord, RunReport, SnapshotComparator,
};
pub use config::{HarnessConfig, ReadMode};
pub use errors::{HarnessError, HarnessResult};
pub use failures::{ExpectedMismatches, MismatchEntry, MismatchState, Verdict};
pub use harness::Harness;
pub use host::{
    CapabilitySurface, CapturedProcess, FileAccess, FileHandle, MemoryFileSystem, OpenMode,
    ParseFailure, ProcessAdapter, SourceParser, SourcePosition, StdFileSystem, StdProcess,
};
pub use report::{format_record, format_summary, Reporter};
pub use scanner::{scan, ScanOptions};
pub use smoke::{run_smoke_suite, AssertionFailure, Assertions, SmokeOutcome};

#[cfg(test)]
mod tests;
