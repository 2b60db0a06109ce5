//! Capability smoke checks.
//!
//! Before any snapshot is compared, each host surface is checked for the
//! capabilities the harness calls. The first missing capability stops the
//! suite.

use thiserror::Error;
use tracing::debug;

use crate::host::CapabilitySurface;

pub const FILE_SYSTEM_SURFACE: &str = "fs";
pub const FILE_SYSTEM_CAPABILITIES: &[&str] = &[
    "exists",
    "isDirectory",
    "isFile",
    "makeDirectory",
    "list",
    "open",
    "workingDirectory",
];

pub const PROCESS_SURFACE: &str = "system";
pub const PROCESS_CAPABILITIES: &[&str] = &["execute", "exit", "print"];

pub const PARSER_SURFACE: &str = "Reflect";
pub const PARSER_CAPABILITIES: &[&str] = &["parse"];

/// A failed smoke assertion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Test FAILS: {label}")]
pub struct AssertionFailure {
    /// The assertion that failed.
    pub label: String,
    /// Assertions that passed before it, oldest first.
    pub trace: Vec<String>,
    /// Assertions executed, the failing one included.
    pub total: usize,
}

/// Counts executed assertions and stops at the first false one.
#[derive(Debug, Default)]
pub struct Assertions {
    total: usize,
    trail: Vec<String>,
}

impl Assertions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of assertions executed so far.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn check(&mut self, passed: bool, label: impl Into<String>) -> Result<(), AssertionFailure> {
        let label = label.into();
        self.total += 1;
        if !passed {
            return Err(AssertionFailure {
                label,
                trace: self.trail.clone(),
                total: self.total,
            });
        }
        debug!(assertion = %label, "smoke assertion passed");
        self.trail.push(label);
        Ok(())
    }
}

/// Result of a smoke run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeOutcome {
    /// Assertions executed.
    pub total: usize,
    pub failure: Option<AssertionFailure>,
}

impl SmokeOutcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Assert that `surface` is exposed as `expected_name` and provides every
/// capability in `required`.
pub fn check_surface<S: CapabilitySurface + ?Sized>(
    assertions: &mut Assertions,
    surface: &S,
    expected_name: &str,
    required: &[&str],
) -> Result<(), AssertionFailure> {
    assertions.check(
        surface.surface_name() == expected_name,
        format!("{} is exposed", expected_name),
    )?;
    for capability in required {
        assertions.check(
            surface.has_capability(capability),
            format!("{}.{} is exposed", expected_name, capability),
        )?;
    }
    Ok(())
}

/// Check the file system, process and parser surfaces, in that order.
pub fn run_smoke_suite<F, P, R>(fs: &F, process: &P, parser: &R) -> SmokeOutcome
where
    F: CapabilitySurface + ?Sized,
    P: CapabilitySurface + ?Sized,
    R: CapabilitySurface + ?Sized,
{
    let mut assertions = Assertions::new();
    let failure = run_checks(&mut assertions, fs, process, parser).err();
    SmokeOutcome {
        total: assertions.total(),
        failure,
    }
}

fn run_checks<F, P, R>(
    assertions: &mut Assertions,
    fs: &F,
    process: &P,
    parser: &R,
) -> Result<(), AssertionFailure>
where
    F: CapabilitySurface + ?Sized,
    P: CapabilitySurface + ?Sized,
    R: CapabilitySurface + ?Sized,
{
    check_surface(assertions, fs, FILE_SYSTEM_SURFACE, FILE_SYSTEM_CAPABILITIES)?;
    check_surface(assertions, process, PROCESS_SURFACE, PROCESS_CAPABILITIES)?;
    check_surface(assertions, parser, PARSER_SURFACE, PARSER_CAPABILITIES)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CapturedProcess, MemoryFileSystem};

    struct FakeParser {
        capabilities: Vec<&'static str>,
    }

    impl CapabilitySurface for FakeParser {
        fn surface_name(&self) -> &str {
            "Reflect"
        }

        fn capabilities(&self) -> &[&'static str] {
            &self.capabilities
        }
    }

    fn parser() -> FakeParser {
        FakeParser {
            capabilities: vec!["parse"],
        }
    }

    #[test]
    fn test_all_surfaces_present() {
        let outcome = run_smoke_suite(&MemoryFileSystem::new(), &CapturedProcess::new(), &parser());

        assert!(outcome.passed());
        // 1 + 7 file system, 1 + 3 process, 1 + 1 parser.
        assert_eq!(outcome.total, 14);
    }

    #[test]
    fn test_missing_capability_stops_suite() {
        let fs = MemoryFileSystem::new().without_capability("list");
        let outcome = run_smoke_suite(&fs, &CapturedProcess::new(), &parser());

        let failure = outcome.failure.expect("suite should fail");
        assert_eq!(failure.label, "fs.list is exposed");
        // fs, exists, isDirectory, isFile, makeDirectory passed before list.
        assert_eq!(failure.trace.len(), 5);
        assert_eq!(failure.total, 6);
        // Nothing after the failing assertion ran.
        assert_eq!(outcome.total, 6);
    }

    #[test]
    fn test_missing_parser_capability_is_last() {
        let parser = FakeParser {
            capabilities: vec![],
        };
        let outcome = run_smoke_suite(&MemoryFileSystem::new(), &CapturedProcess::new(), &parser);

        let failure = outcome.failure.unwrap();
        assert_eq!(failure.label, "Reflect.parse is exposed");
        assert_eq!(outcome.total, 14);
    }

    #[test]
    fn test_wrong_surface_name() {
        let fs = MemoryFileSystem::new().with_surface_name("files");
        let outcome = run_smoke_suite(&fs, &CapturedProcess::new(), &parser());

        let failure = outcome.failure.unwrap();
        assert_eq!(failure.to_string(), "Test FAILS: fs is exposed");
        assert!(failure.trace.is_empty());
        assert_eq!(outcome.total, 1);
    }

    #[test]
    fn test_assertions_count_every_check() {
        let mut assertions = Assertions::new();
        assertions.check(true, "first").unwrap();
        assertions.check(true, "second").unwrap();
        let failure = assertions.check(false, "third").unwrap_err();

        assert_eq!(assertions.total(), 3);
        assert_eq!(failure.trace, vec!["first", "second"]);
    }
}
