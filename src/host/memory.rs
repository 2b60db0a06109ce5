//! In-memory file system.
//!
//! Directory listings come back in insertion order, which makes traversal
//! order deterministic in tests. Links alias one path to another and are
//! followed on every lookup, so link cycles can be modelled without
//! touching a real disk.

use std::cell::RefCell;
use std::io;

use super::fs::{FileAccess, FileHandle, OpenMode};
use super::CapabilitySurface;

const MAX_LINK_HOPS: usize = 32;

/// Capabilities exposed by a default [`MemoryFileSystem`].
const MEMORY_CAPABILITIES: &[&str] = &[
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

#[derive(Debug, Clone)]
enum NodeKind {
    File(String),
    Directory,
    Link(String),
}

#[derive(Debug, Clone)]
struct Node {
    path: String,
    kind: NodeKind,
}

/// [`FileAccess`] over an in-memory tree with `/` separators.
#[derive(Debug)]
pub struct MemoryFileSystem {
    nodes: RefCell<Vec<Node>>,
    surface_name: String,
    capabilities: Vec<&'static str>,
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self {
            nodes: RefCell::new(Vec::new()),
            surface_name: "fs".to_string(),
            capabilities: MEMORY_CAPABILITIES.to_vec(),
        }
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[..index],
        None => "",
    }
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such entry: {}", path))
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory, creating missing parents.
    pub fn with_dir(self, path: &str) -> Self {
        self.insert_dir(&normalize(path));
        self
    }

    /// Add a file with the given content, creating missing parents.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        let path = normalize(path);
        self.insert_dir(parent_of(&path));
        self.put(path, NodeKind::File(content.to_string()));
        self
    }

    /// Make `path` an alias of `target`.
    pub fn with_link(self, path: &str, target: &str) -> Self {
        let path = normalize(path);
        self.insert_dir(parent_of(&path));
        self.put(path, NodeKind::Link(normalize(target)));
        self
    }

    /// Expose the surface under another name.
    pub fn with_surface_name(mut self, name: &str) -> Self {
        self.surface_name = name.to_string();
        self
    }

    /// Hide a capability from the smoke suite.
    pub fn without_capability(mut self, name: &str) -> Self {
        self.capabilities.retain(|capability| *capability != name);
        self
    }

    /// Content of a file, if it exists.
    pub fn read(&self, path: &str) -> Option<String> {
        let path = self.resolve(path);
        self.nodes
            .borrow()
            .iter()
            .find(|node| node.path == path)
            .and_then(|node| match &node.kind {
                NodeKind::File(content) => Some(content.clone()),
                _ => None,
            })
    }

    fn insert_dir(&self, path: &str) {
        if path.is_empty() || self.find_kind(path).is_some() {
            return;
        }
        self.insert_dir(parent_of(path));
        self.put(path.to_string(), NodeKind::Directory);
    }

    fn put(&self, path: String, kind: NodeKind) {
        let mut nodes = self.nodes.borrow_mut();
        match nodes.iter_mut().find(|node| node.path == path) {
            Some(node) => node.kind = kind,
            None => nodes.push(Node { path, kind }),
        }
    }

    fn find_kind(&self, path: &str) -> Option<NodeKind> {
        self.nodes
            .borrow()
            .iter()
            .find(|node| node.path == path)
            .map(|node| node.kind.clone())
    }

    /// Follow links component by component.
    fn resolve(&self, path: &str) -> String {
        let mut resolved = String::new();
        for part in normalize(path).split('/').filter(|part| !part.is_empty()) {
            if !resolved.is_empty() {
                resolved.push('/');
            }
            resolved.push_str(part);

            let mut hops = 0;
            while let Some(NodeKind::Link(target)) = self.find_kind(&resolved) {
                resolved = target;
                hops += 1;
                if hops > MAX_LINK_HOPS {
                    break;
                }
            }
        }
        resolved
    }

    fn lookup(&self, path: &str) -> Option<NodeKind> {
        let resolved = self.resolve(path);
        if resolved.is_empty() {
            return Some(NodeKind::Directory);
        }
        self.find_kind(&resolved)
    }
}

impl CapabilitySurface for MemoryFileSystem {
    fn surface_name(&self) -> &str {
        &self.surface_name
    }

    fn capabilities(&self) -> &[&'static str] {
        &self.capabilities
    }
}

impl FileAccess for MemoryFileSystem {
    fn exists(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    fn is_directory(&self, path: &str) -> io::Result<bool> {
        match self.lookup(path) {
            Some(kind) => Ok(matches!(kind, NodeKind::Directory)),
            None => Err(not_found(path)),
        }
    }

    fn is_file(&self, path: &str) -> io::Result<bool> {
        match self.lookup(path) {
            Some(kind) => Ok(matches!(kind, NodeKind::File(_))),
            None => Err(not_found(path)),
        }
    }

    fn make_directory(&self, path: &str) -> io::Result<()> {
        let path = self.resolve(path);
        if self.find_kind(&path).is_some() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("entry exists: {}", path),
            ));
        }
        if !self.exists(parent_of(&path)) {
            return Err(not_found(parent_of(&path)));
        }
        self.put(path, NodeKind::Directory);
        Ok(())
    }

    fn list(&self, path: &str) -> io::Result<Vec<String>> {
        if !self.is_directory(path)? {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("not a directory: {}", path),
            ));
        }
        let dir = self.resolve(path);
        Ok(self
            .nodes
            .borrow()
            .iter()
            .filter(|node| !node.path.is_empty() && parent_of(&node.path) == dir)
            .map(|node| node.path[node.path.rfind('/').map_or(0, |i| i + 1)..].to_string())
            .collect())
    }

    fn open(&self, path: &str, mode: OpenMode) -> io::Result<Box<dyn FileHandle + '_>> {
        let resolved = self.resolve(path);
        match mode {
            OpenMode::Read => match self.find_kind(&resolved) {
                Some(NodeKind::File(text)) => Ok(Box::new(MemoryReader { text, pos: 0 })),
                Some(_) => Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("not a file: {}", path),
                )),
                None => Err(not_found(path)),
            },
            OpenMode::Write => {
                if matches!(self.find_kind(&resolved), Some(NodeKind::Directory)) {
                    return Err(io::Error::new(
                        io::ErrorKind::Other,
                        format!("is a directory: {}", path),
                    ));
                }
                if !self.exists(parent_of(&resolved)) {
                    return Err(not_found(parent_of(&resolved)));
                }
                self.put(resolved.clone(), NodeKind::File(String::new()));
                Ok(Box::new(MemoryWriter {
                    fs: self,
                    path: resolved,
                    buffer: Some(String::new()),
                }))
            }
        }
    }

    fn remove_file(&self, path: &str) -> io::Result<()> {
        let resolved = self.resolve(path);
        let mut nodes = self.nodes.borrow_mut();
        match nodes.iter().position(|node| node.path == resolved) {
            Some(index) if matches!(nodes[index].kind, NodeKind::File(_)) => {
                nodes.remove(index);
                Ok(())
            }
            Some(_) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("not a file: {}", path),
            )),
            None => Err(not_found(path)),
        }
    }

    fn working_directory(&self) -> io::Result<String> {
        Ok(".".to_string())
    }

    fn path_separator(&self) -> &str {
        "/"
    }

    fn canonical_path(&self, path: &str) -> io::Result<String> {
        if !self.exists(path) {
            return Err(not_found(path));
        }
        Ok(self.resolve(path))
    }
}

struct MemoryReader {
    text: String,
    pos: usize,
}

impl FileHandle for MemoryReader {
    fn read_line(&mut self) -> io::Result<String> {
        let rest = &self.text[self.pos..];
        let (line, consumed) = match rest.find('\n') {
            Some(index) => (&rest[..index], index + 1),
            None => (rest, rest.len()),
        };
        let line = line.strip_suffix('\r').unwrap_or(line).to_string();
        self.pos += consumed;
        Ok(line)
    }

    fn read_to_string(&mut self) -> io::Result<String> {
        let rest = self.text[self.pos..].to_string();
        self.pos = self.text.len();
        Ok(rest)
    }

    fn write_str(&mut self, _text: &str) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Other,
            "handle was not opened for writing",
        ))
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        Ok(())
    }
}

struct MemoryWriter<'a> {
    fs: &'a MemoryFileSystem,
    path: String,
    buffer: Option<String>,
}

impl MemoryWriter<'_> {
    fn commit(&mut self) {
        if let Some(content) = self.buffer.take() {
            self.fs.put(self.path.clone(), NodeKind::File(content));
        }
    }
}

impl FileHandle for MemoryWriter<'_> {
    fn read_line(&mut self) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::Other,
            "handle was not opened for reading",
        ))
    }

    fn read_to_string(&mut self) -> io::Result<String> {
        self.read_line()
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.push_str(text);
        }
        Ok(())
    }

    fn close(mut self: Box<Self>) -> io::Result<()> {
        self.commit();
        Ok(())
    }
}

impl Drop for MemoryWriter<'_> {
    fn drop(&mut self) {
        self.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_keeps_insertion_order() {
        let fs = MemoryFileSystem::new()
            .with_file("root/zeta.js", "z")
            .with_file("root/alpha.js", "a")
            .with_dir("root/sub");

        assert_eq!(
            fs.list("root").unwrap(),
            vec!["zeta.js".to_string(), "alpha.js".to_string(), "sub".to_string()]
        );
    }

    #[test]
    fn test_read_line_sentinel() {
        let fs = MemoryFileSystem::new().with_file("a.js", "one\r\n\ntwo");
        let mut handle = fs.open("a.js", OpenMode::Read).unwrap();

        assert_eq!(handle.read_line().unwrap(), "one");
        // A blank line looks exactly like the end of the stream.
        assert_eq!(handle.read_line().unwrap(), "");
        assert_eq!(handle.read_line().unwrap(), "two");
        assert_eq!(handle.read_line().unwrap(), "");
    }

    #[test]
    fn test_writer_commits_on_drop() {
        let fs = MemoryFileSystem::new().with_dir("out");
        {
            let mut handle = fs.open("out/a.tree", OpenMode::Write).unwrap();
            handle.write_line("{}").unwrap();
        }
        assert_eq!(fs.read("out/a.tree").as_deref(), Some("{}\n"));
    }

    #[test]
    fn test_write_requires_parent() {
        let fs = MemoryFileSystem::new();
        assert!(fs.open("missing/a.tree", OpenMode::Write).is_err());
    }

    #[test]
    fn test_links_resolve() {
        let fs = MemoryFileSystem::new()
            .with_file("root/sub/b.js", "b")
            .with_link("root/sub/again", "root");

        assert!(fs.is_directory("root/sub/again").unwrap());
        assert_eq!(fs.canonical_path("root/sub/again").unwrap(), "root");
        assert_eq!(fs.read("root/sub/again/sub/b.js").as_deref(), Some("b"));
    }

    #[test]
    fn test_remove_file() {
        let fs = MemoryFileSystem::new().with_file("a.actual", "x");
        fs.remove_file("a.actual").unwrap();
        assert!(!fs.exists("a.actual"));
        assert!(fs.remove_file("a.actual").is_err());
    }

    #[test]
    fn test_capabilities_can_be_hidden() {
        let fs = MemoryFileSystem::new().without_capability("list");
        assert!(!fs.has_capability("list"));
        assert!(fs.has_capability("open"));
    }
}
