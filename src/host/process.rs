//! Process adapter.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::process::Command;
use std::thread;
use std::time::Duration;

use super::CapabilitySurface;

/// Capabilities exposed by [`StdProcess`] and [`CapturedProcess`].
pub const STD_PROCESS_CAPABILITIES: &[&str] = &["args", "execute", "exit", "print", "sleep"];

/// Process-level operations: running commands, exiting, printing.
pub trait ProcessAdapter: CapabilitySurface {
    /// Run a command through the platform shell and return its exit code.
    fn execute(&self, command: &str) -> io::Result<i32>;

    fn exit(&self, code: i32) -> !;

    /// Print the values joined by a single space. One call is one line.
    fn print(&self, values: &[&dyn fmt::Display]);

    /// Block for the given number of seconds. Non-positive values return
    /// immediately.
    fn sleep(&self, seconds: f64);

    fn args(&self) -> Vec<String>;

    fn print_line(&self, line: &str) {
        self.print(&[&line]);
    }
}

fn join_values(values: &[&dyn fmt::Display]) -> String {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn sleep_duration(seconds: f64) -> Option<Duration> {
    if seconds.is_finite() && seconds > 0.0 {
        Some(Duration::from_secs_f64(seconds))
    } else {
        None
    }
}

/// [`ProcessAdapter`] for the running process, printing to stdout.
#[derive(Debug, Clone, Default)]
pub struct StdProcess {
    args: Vec<String>,
}

impl StdProcess {
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::args().collect())
    }
}

impl CapabilitySurface for StdProcess {
    fn surface_name(&self) -> &str {
        "system"
    }

    fn capabilities(&self) -> &[&'static str] {
        STD_PROCESS_CAPABILITIES
    }
}

impl ProcessAdapter for StdProcess {
    fn execute(&self, command: &str) -> io::Result<i32> {
        #[cfg(windows)]
        let status = Command::new("cmd").args(["/C", command]).status()?;
        #[cfg(not(windows))]
        let status = Command::new("sh").args(["-c", command]).status()?;
        Ok(status.code().unwrap_or(-1))
    }

    fn exit(&self, code: i32) -> ! {
        let _ = io::stdout().flush();
        std::process::exit(code)
    }

    fn print(&self, values: &[&dyn fmt::Display]) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        // A closed stdout is not worth aborting a run for.
        let _ = writeln!(out, "{}", join_values(values));
    }

    fn sleep(&self, seconds: f64) {
        if let Some(duration) = sleep_duration(seconds) {
            thread::sleep(duration);
        }
    }

    fn args(&self) -> Vec<String> {
        self.args.clone()
    }
}

/// [`ProcessAdapter`] that records everything instead of touching the
/// process. `exit` panics, which lets tests observe it.
#[derive(Debug, Default)]
pub struct CapturedProcess {
    lines: RefCell<Vec<String>>,
    commands: RefCell<Vec<String>>,
    args: Vec<String>,
}

impl CapturedProcess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Lines printed so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Printed lines joined with `\n`.
    pub fn output(&self) -> String {
        self.lines.borrow().join("\n")
    }

    /// Commands passed to `execute` so far.
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl CapabilitySurface for CapturedProcess {
    fn surface_name(&self) -> &str {
        "system"
    }

    fn capabilities(&self) -> &[&'static str] {
        STD_PROCESS_CAPABILITIES
    }
}

impl ProcessAdapter for CapturedProcess {
    fn execute(&self, command: &str) -> io::Result<i32> {
        self.commands.borrow_mut().push(command.to_string());
        Ok(0)
    }

    fn exit(&self, code: i32) -> ! {
        panic!("process exit requested with code {}", code)
    }

    fn print(&self, values: &[&dyn fmt::Display]) {
        self.lines.borrow_mut().push(join_values(values));
    }

    fn sleep(&self, _seconds: f64) {}

    fn args(&self) -> Vec<String> {
        self.args.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_joins_with_single_space() {
        let process = CapturedProcess::new();
        process.print(&[&"Total tests:", &3, &"tests."]);
        process.print_line("done");

        assert_eq!(process.lines(), vec!["Total tests: 3 tests.", "done"]);
    }

    #[test]
    fn test_sleep_duration_ignores_non_positive() {
        assert_eq!(sleep_duration(0.0), None);
        assert_eq!(sleep_duration(-1.0), None);
        assert_eq!(sleep_duration(f64::NAN), None);
        assert_eq!(sleep_duration(0.5), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_captured_execute_records_command() {
        let process = CapturedProcess::new();
        assert_eq!(process.execute("echo hi").unwrap(), 0);
        assert_eq!(process.commands(), vec!["echo hi"]);
    }

    #[test]
    #[should_panic(expected = "process exit requested with code 3")]
    fn test_captured_exit_panics() {
        CapturedProcess::new().exit(3);
    }

    #[cfg(unix)]
    #[test]
    fn test_std_execute_reports_exit_code() {
        let process = StdProcess::default();
        assert_eq!(process.execute("exit 4").unwrap(), 4);
    }
}
