//! File access adapter.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::MAIN_SEPARATOR_STR;

use super::CapabilitySurface;

/// Capabilities exposed by [`StdFileSystem`].
pub const STD_FILE_SYSTEM_CAPABILITIES: &[&str] = &[
    "exists",
    "isDirectory",
    "isFile",
    "makeDirectory",
    "list",
    "open",
    "remove",
    "workingDirectory",
    "canonicalPath",
];

/// How a file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    /// Creates the file, truncating any previous content.
    Write,
}

/// An open file.
///
/// Handles are scoped values: dropping one releases it on every exit path.
/// [`FileHandle::close`] exists for callers that want flush errors reported.
pub trait FileHandle {
    /// Read the next line without its terminator.
    ///
    /// Returns an empty string at end of stream, which makes a genuinely
    /// empty line indistinguishable from the end of the file.
    fn read_line(&mut self) -> io::Result<String>;

    /// Read everything that is left, line breaks included.
    fn read_to_string(&mut self) -> io::Result<String>;

    fn write_str(&mut self, text: &str) -> io::Result<()>;

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.write_str(line)?;
        self.write_str("\n")
    }

    /// Release the handle, flushing pending writes.
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// File system operations the harness relies on.
///
/// Paths are plain strings joined with [`FileAccess::path_separator`].
pub trait FileAccess: CapabilitySurface {
    fn exists(&self, path: &str) -> bool;

    /// Fails when the path cannot be inspected.
    fn is_directory(&self, path: &str) -> io::Result<bool>;

    /// Fails when the path cannot be inspected.
    fn is_file(&self, path: &str) -> io::Result<bool>;

    fn make_directory(&self, path: &str) -> io::Result<()>;

    /// Entry names of a directory in the order the host yields them.
    /// `.` and `..` are never included.
    fn list(&self, path: &str) -> io::Result<Vec<String>>;

    fn open(&self, path: &str, mode: OpenMode) -> io::Result<Box<dyn FileHandle + '_>>;

    fn remove_file(&self, path: &str) -> io::Result<()>;

    fn working_directory(&self) -> io::Result<String>;

    fn path_separator(&self) -> &str;

    /// Resolved form of `path`, used to recognise directories reached
    /// twice through links.
    fn canonical_path(&self, path: &str) -> io::Result<String> {
        Ok(path.to_string())
    }
}

/// [`FileAccess`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl StdFileSystem {
    pub fn new() -> Self {
        StdFileSystem
    }
}

impl CapabilitySurface for StdFileSystem {
    fn surface_name(&self) -> &str {
        "fs"
    }

    fn capabilities(&self) -> &[&'static str] {
        STD_FILE_SYSTEM_CAPABILITIES
    }
}

impl FileAccess for StdFileSystem {
    fn exists(&self, path: &str) -> bool {
        fs::metadata(path).is_ok()
    }

    fn is_directory(&self, path: &str) -> io::Result<bool> {
        Ok(fs::metadata(path)?.is_dir())
    }

    fn is_file(&self, path: &str) -> io::Result<bool> {
        Ok(fs::metadata(path)?.is_file())
    }

    fn make_directory(&self, path: &str) -> io::Result<()> {
        fs::create_dir(path)
    }

    fn list(&self, path: &str) -> io::Result<Vec<String>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            entries.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(entries)
    }

    fn open(&self, path: &str, mode: OpenMode) -> io::Result<Box<dyn FileHandle + '_>> {
        let handle = match mode {
            OpenMode::Read => StdHandle::Reader(BufReader::new(File::open(path)?)),
            OpenMode::Write => StdHandle::Writer(BufWriter::new(
                OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)?,
            )),
        };
        Ok(Box::new(handle))
    }

    fn remove_file(&self, path: &str) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn working_directory(&self) -> io::Result<String> {
        Ok(std::env::current_dir()?.to_string_lossy().into_owned())
    }

    fn path_separator(&self) -> &str {
        MAIN_SEPARATOR_STR
    }

    fn canonical_path(&self, path: &str) -> io::Result<String> {
        Ok(fs::canonicalize(path)?.to_string_lossy().into_owned())
    }
}

enum StdHandle {
    Reader(BufReader<File>),
    Writer(BufWriter<File>),
}

fn wrong_mode(expected: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Other,
        format!("handle was not opened for {}", expected),
    )
}

impl FileHandle for StdHandle {
    fn read_line(&mut self) -> io::Result<String> {
        let reader = match self {
            StdHandle::Reader(reader) => reader,
            StdHandle::Writer(_) => return Err(wrong_mode("reading")),
        };
        let mut line = String::new();
        reader.read_line(&mut line)?;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    fn read_to_string(&mut self) -> io::Result<String> {
        match self {
            StdHandle::Reader(reader) => {
                let mut text = String::new();
                reader.read_to_string(&mut text)?;
                Ok(text)
            }
            StdHandle::Writer(_) => Err(wrong_mode("reading")),
        }
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        match self {
            StdHandle::Writer(writer) => writer.write_all(text.as_bytes()),
            StdHandle::Reader(_) => Err(wrong_mode("writing")),
        }
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        match *self {
            StdHandle::Writer(mut writer) => writer.flush(),
            StdHandle::Reader(_) => Ok(()),
        }
    }
}
