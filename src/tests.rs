use crate::{
    CapabilitySurface, CapturedProcess, ExpectedMismatches, FileAccess, Harness, HarnessConfig,
    MemoryFileSystem, MismatchEntry, ParseFailure, SourceParser, StdFileSystem,
};
use serde_json::Value;
use std::fs;

/// Treats every source file as a JSON document.
struct JsonParser;

impl CapabilitySurface for JsonParser {
    fn surface_name(&self) -> &str {
        "Reflect"
    }

    fn capabilities(&self) -> &[&'static str] {
        &["parse"]
    }
}

impl SourceParser for JsonParser {
    type Output = Value;

    fn parse(&self, source: &str) -> Result<Value, ParseFailure> {
        serde_json::from_str(source).map_err(|e| ParseFailure::new(e.to_string()))
    }
}

fn fixture_fs() -> MemoryFileSystem {
    MemoryFileSystem::new()
        .with_file("t/a.js", r#"{"b": 1, "a": [true]}"#)
        .with_file("t/sub/c.js", "[1, 2]")
        .with_file("t/notes.txt", "not a source")
}

fn config() -> HarnessConfig {
    HarnessConfig::default().with_root("t")
}

#[test]
fn test_first_run_records_baselines() {
    let fs = fixture_fs();
    let process = CapturedProcess::new();

    let verdict = Harness::new(&fs, &process, &JsonParser)
        .with_config(config())
        .run();

    assert_eq!(verdict.exit_code(), 0);
    assert_eq!(verdict.created, 2);
    insta::assert_snapshot!(process.output(), @r#"
    Running unit tests for syntax-golden...
    No failure. Total tests: 14 tests.
    NEW baseline t/a.tree for t/a.js
    NEW baseline t/sub/c.tree for t/sub/c.js
    Examined 2 files: 0 passed, 0 mismatched, 2 created, 0 skipped
    "#);
    insta::assert_snapshot!(fs.read("t/a.tree").unwrap().trim_end(), @r#"
    {
        "a": [
            true
        ],
        "b": 1
    }
    "#);
    assert!(!fs.exists("t/notes.tree"));
}

#[test]
fn test_second_run_passes_everything() {
    let fs = fixture_fs();

    Harness::new(&fs, &CapturedProcess::new(), &JsonParser)
        .with_config(config())
        .run();

    let process = CapturedProcess::new();
    let verdict = Harness::new(&fs, &process, &JsonParser)
        .with_config(config())
        .with_skip_smoke(true)
        .run();

    assert!(verdict.success());
    assert_eq!(verdict.passed, 2);
    assert_eq!(verdict.created, 0);
    assert_eq!(
        process.lines(),
        vec![
            "Running unit tests for syntax-golden...",
            "PASS t/a.js",
            "PASS t/sub/c.js",
            "Examined 2 files: 2 passed, 0 mismatched, 0 created, 0 skipped",
        ]
    );
}

#[test]
fn test_unexpected_mismatch_fails_run() {
    let fs = fixture_fs().with_file("t/sub/c.tree", "[\n    1\n]\n");
    let process = CapturedProcess::new();

    let verdict = Harness::new(&fs, &process, &JsonParser)
        .with_config(config())
        .with_skip_smoke(true)
        .run();

    assert_eq!(verdict.regressions, 1);
    assert_eq!(verdict.exit_code(), 1);
    assert!(process
        .lines()
        .contains(&"MISMATCH t/sub/c.js, see t/sub/c.actual".to_string()));
    assert_eq!(
        fs.read("t/sub/c.actual").as_deref(),
        Some("[\n    1,\n    2\n]\n")
    );
}

#[test]
fn test_expected_mismatch_does_not_fail_run() {
    let fs = fixture_fs().with_file("t/sub/c.tree", "[\n    1\n]\n");
    let expected = ExpectedMismatches {
        known: vec![],
        pending: vec![MismatchEntry {
            source: "sub/c.js".to_string(),
            reason: Some("array printing".to_string()),
            added: None,
            issue: None,
        }],
        root: None,
    };
    let process = CapturedProcess::new();

    let verdict = Harness::new(&fs, &process, &JsonParser)
        .with_config(config())
        .with_expected_mismatches(expected)
        .with_skip_smoke(true)
        .run();

    assert_eq!(verdict.expected_mismatches, 1);
    assert_eq!(verdict.exit_code(), 0);
    assert!(process
        .lines()
        .contains(&"  t/sub/c.js  pending (array printing)".to_string()));
}

#[test]
fn test_entry_for_root_level_file_does_not_cover_nested_namesake() {
    let fs = fixture_fs().with_file("t/sub/c.tree", "[\n    1\n]\n");
    let expected = ExpectedMismatches {
        known: vec![MismatchEntry {
            source: "c.js".to_string(),
            reason: None,
            added: None,
            issue: None,
        }],
        pending: vec![],
        root: None,
    };
    let process = CapturedProcess::new();

    let verdict = Harness::new(&fs, &process, &JsonParser)
        .with_config(config())
        .with_expected_mismatches(expected)
        .with_skip_smoke(true)
        .run();

    assert_eq!(verdict.regressions, 1);
    assert_eq!(verdict.exit_code(), 1);
    assert!(process
        .lines()
        .contains(&"  t/sub/c.js  regression".to_string()));
}

#[test]
fn test_smoke_failure_still_compares() {
    let fs = fixture_fs().without_capability("workingDirectory");
    let process = CapturedProcess::new();

    let verdict = Harness::new(&fs, &process, &JsonParser)
        .with_config(config())
        .run();

    assert!(verdict.smoke_failed);
    assert_eq!(verdict.smoke_assertions, 8);
    assert_eq!(verdict.created, 2);
    assert_eq!(verdict.exit_code(), 1);
    assert_eq!(process.lines()[1], "Test FAILS: fs.workingDirectory is exposed");
}

#[test]
fn test_parse_failure_aborts_with_fatal_code() {
    let fs = MemoryFileSystem::new()
        .with_file("t/a.js", "{}")
        .with_file("t/broken.js", "{\"open\": ")
        .with_file("t/z.js", "{}");
    let process = CapturedProcess::new();

    let verdict = Harness::new(&fs, &process, &JsonParser)
        .with_config(config())
        .with_skip_smoke(true)
        .run();

    assert!(verdict.fatal);
    assert_eq!(verdict.exit_code(), 2);
    let lines = process.lines();
    assert_eq!(lines[1], "NEW baseline t/a.tree for t/a.js");
    assert!(lines[2].starts_with("ABORTED: parse error in t/broken.js"));
    assert_eq!(lines.len(), 3);
    assert!(!fs.exists("t/z.tree"));
}

#[test]
fn test_missing_root_examines_nothing() {
    let fs = MemoryFileSystem::new();
    let process = CapturedProcess::new();

    let verdict = Harness::new(&fs, &process, &JsonParser)
        .with_config(config())
        .with_skip_smoke(true)
        .run();

    assert!(verdict.success());
    assert_eq!(verdict.examined, 0);
}

#[test]
fn test_extension_collision_aborts_before_touching_files() {
    let fs = fixture_fs().with_file("t/a.tree", "{}");
    let process = CapturedProcess::new();
    let config = HarnessConfig {
        actual_extension: "tree".to_string(),
        ..config()
    };

    let verdict = Harness::new(&fs, &process, &JsonParser)
        .with_config(config)
        .with_skip_smoke(true)
        .run();

    assert_eq!(verdict.exit_code(), 2);
    assert_eq!(verdict.examined, 0);
    assert_eq!(
        process.lines()[1],
        "ABORTED: failed to load config: comparator options: reference_extension and actual_extension are both `tree`"
    );
    assert_eq!(fs.read("t/a.tree").as_deref(), Some("{}"));
    assert!(fs.exists("t/a.js"));
    assert!(!fs.exists("t/sub/c.tree"));
}

#[test]
fn test_real_file_system_round() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("cases");
    fs::create_dir_all(root.join("nested")).unwrap();
    fs::write(root.join("one.js"), "{\"x\": \"y\"}").unwrap();
    fs::write(root.join("nested").join("two.js"), "[null]").unwrap();
    fs::write(root.join("nested").join("empty.js"), "").unwrap();
    fs::write(root.join("readme.md"), "# cases").unwrap();

    let config = HarnessConfig::default().with_root(root.to_string_lossy().into_owned());
    let std_fs = StdFileSystem::new();

    let first = Harness::new(&std_fs, &CapturedProcess::new(), &JsonParser)
        .with_config(config.clone())
        .run();
    assert_eq!(first.exit_code(), 0);
    assert_eq!(first.examined, 3);
    assert_eq!(first.created, 2);
    assert_eq!(first.skipped, 1);
    assert!(root.join("one.tree").exists());
    assert!(root.join("nested").join("two.tree").exists());
    assert!(!root.join("nested").join("empty.tree").exists());

    // Line endings of a baseline never matter.
    let baseline = fs::read_to_string(root.join("one.tree")).unwrap();
    fs::write(root.join("one.tree"), baseline.replace('\n', "\r\n")).unwrap();

    let second = Harness::new(&std_fs, &CapturedProcess::new(), &JsonParser)
        .with_config(config.clone())
        .run();
    assert_eq!(second.exit_code(), 0);
    assert_eq!(second.passed, 2);

    // Break a baseline, then restore it: the actual artifact comes and goes.
    fs::write(root.join("one.tree"), "{\"x\": \"z\"}").unwrap();
    let third = Harness::new(&std_fs, &CapturedProcess::new(), &JsonParser)
        .with_config(config.clone())
        .run();
    assert_eq!(third.regressions, 1);
    assert!(root.join("one.actual").exists());

    fs::write(root.join("one.tree"), baseline).unwrap();
    let fourth = Harness::new(&std_fs, &CapturedProcess::new(), &JsonParser)
        .with_config(config)
        .run();
    assert_eq!(fourth.passed, 2);
    assert!(!root.join("one.actual").exists());
}
