//! Host capabilities consumed by the harness.
//!
//! The file system, the process environment and the parser are all
//! collaborators with fixed contracts. Each one is a trait so a run can be
//! driven against the real machine or against in-memory fakes.

mod fs;
mod memory;
mod parse;
mod process;

pub use fs::{FileAccess, FileHandle, OpenMode, StdFileSystem, STD_FILE_SYSTEM_CAPABILITIES};
pub use memory::MemoryFileSystem;
pub use parse::{ParseFailure, SourceParser, SourcePosition};
pub use process::{CapturedProcess, ProcessAdapter, StdProcess, STD_PROCESS_CAPABILITIES};

/// A named set of callable capabilities exposed by a host adapter.
///
/// The smoke suite inspects surfaces at runtime, so adapters that only
/// partially implement a host (or fakes that hide a capability on purpose)
/// can be detected before any real work starts.
pub trait CapabilitySurface {
    /// Name the surface is exposed under (`fs`, `system`, `Reflect`).
    fn surface_name(&self) -> &str;

    /// Names of the capabilities this surface provides.
    fn capabilities(&self) -> &[&'static str];

    fn has_capability(&self, name: &str) -> bool {
        self.capabilities().iter().any(|capability| *capability == name)
    }
}
