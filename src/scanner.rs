//! Source file discovery.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::HarnessConfig;
use crate::errors::{HarnessError, HarnessResult};
use crate::host::FileAccess;

/// Options controlling a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Suffix of source files, without the dot.
    pub source_extension: String,
    /// Directories nested deeper than this below the root are skipped.
    pub max_depth: usize,
    /// Skip directories whose canonical path was already visited.
    pub detect_cycles: bool,
}

impl ScanOptions {
    pub fn new(source_extension: impl Into<String>) -> Self {
        Self {
            source_extension: source_extension.into(),
            max_depth: 64,
            detect_cycles: true,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_cycle_detection(mut self, detect_cycles: bool) -> Self {
        self.detect_cycles = detect_cycles;
        self
    }
}

impl From<&HarnessConfig> for ScanOptions {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            source_extension: config.source_extension.clone(),
            max_depth: config.max_depth,
            detect_cycles: config.detect_cycles,
        }
    }
}

/// Check whether the last path component ends in `.<extension>`.
pub fn has_source_extension(path: &str, extension: &str) -> bool {
    let name = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path);
    let suffix = format!(".{}", extension);
    name.len() > suffix.len() && name.ends_with(&suffix)
}

/// Join a directory and an entry name with the host separator.
pub fn join_path(dir: &str, separator: &str, entry: &str) -> String {
    if dir.ends_with(separator) {
        format!("{}{}", dir, entry)
    } else {
        format!("{}{}{}", dir, separator, entry)
    }
}

/// Collect every source file at or below `path`.
///
/// A matching file yields itself. A directory is listed in host order and
/// each entry is scanned in turn, results concatenated depth-first. Anything
/// else (missing paths, files with another suffix) yields nothing.
pub fn scan(fs: &dyn FileAccess, path: &str, options: &ScanOptions) -> HarnessResult<Vec<String>> {
    let mut files = Vec::new();
    let mut visited = HashSet::new();
    scan_recursive(fs, path, options, 0, &mut visited, &mut files)?;
    debug!(root = %path, count = files.len(), "scan finished");
    Ok(files)
}

fn scan_recursive(
    fs: &dyn FileAccess,
    path: &str,
    options: &ScanOptions,
    depth: usize,
    visited: &mut HashSet<String>,
    files: &mut Vec<String>,
) -> HarnessResult<()> {
    if !fs.exists(path) {
        return Ok(());
    }

    if fs.is_file(path).map_err(|e| HarnessError::io(path, e))? {
        if has_source_extension(path, &options.source_extension) {
            files.push(path.to_string());
        }
        return Ok(());
    }

    if !fs.is_directory(path).map_err(|e| HarnessError::io(path, e))? {
        return Ok(());
    }

    if depth > options.max_depth {
        warn!(path = %path, max_depth = options.max_depth, "directory too deep, skipping");
        return Ok(());
    }

    if options.detect_cycles {
        let canonical = fs
            .canonical_path(path)
            .map_err(|e| HarnessError::io(path, e))?;
        if !visited.insert(canonical) {
            warn!(path = %path, "directory already visited, skipping");
            return Ok(());
        }
    }

    let separator = fs.path_separator().to_string();
    let entries = fs.list(path).map_err(|e| HarnessError::io(path, e))?;
    for entry in entries {
        let child = join_path(path, &separator, &entry);
        scan_recursive(fs, &child, options, depth + 1, visited, files)?;
    }

    Ok(())
}
