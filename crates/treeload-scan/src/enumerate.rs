//! Directory enumeration and key derivation.

use std::fs::FileType;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use jwalk::{Parallelism, WalkDir};
use tracing::trace;

use treeload_core::LoadError;

/// Classification of a directory entry. Symbolic links report their target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    /// Sockets, devices, fifos.
    Other,
}

/// One immediate child of an enumerated directory.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Bare file name.
    pub name: CompactString,
    /// Entry kind.
    pub kind: EntryKind,
    /// Location used for loading or recursion.
    pub path: PathBuf,
}

impl DirEntry {
    /// Create a new entry.
    pub fn new(name: impl Into<CompactString>, kind: EntryKind, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind,
            path: path.into(),
        }
    }

    /// Extension of the name, without the dot.
    pub fn extension(&self) -> Option<&str> {
        Path::new(self.name.as_str()).extension()?.to_str()
    }

    /// Tree key for this entry.
    ///
    /// Files lose their final extension (`a.b.json` becomes `a.b`);
    /// directories keep their name verbatim, dots included.
    pub fn key(&self) -> CompactString {
        match self.kind {
            EntryKind::File => Path::new(self.name.as_str())
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(CompactString::from)
                .unwrap_or_else(|| self.name.clone()),
            EntryKind::Directory | EntryKind::Other => self.name.clone(),
        }
    }
}

/// List the immediate children of `dir`, sorted by name.
///
/// Entry paths are rooted at the canonical form of `dir`. Symbolic links are
/// classified by their target; a link whose target cannot be resolved is
/// reported as [`EntryKind::Other`].
pub fn list_directory(dir: &Path) -> Result<Vec<DirEntry>, LoadError> {
    let metadata = std::fs::metadata(dir).map_err(|e| LoadError::io(dir, e))?;
    if !metadata.is_dir() {
        return Err(LoadError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    let dir = dir.canonicalize().map_err(|e| LoadError::io(dir, e))?;

    let walker = WalkDir::new(&dir)
        .parallelism(Parallelism::Serial)
        .skip_hidden(false)
        .follow_links(false)
        .sort(true)
        .min_depth(1)
        .max_depth(1);

    let mut entries = Vec::new();
    for entry_result in walker {
        let entry = entry_result.map_err(|err| walk_error(&dir, err))?;
        let path = entry.path();
        let file_type = entry.file_type();
        let kind = if file_type.is_symlink() {
            match std::fs::metadata(&path) {
                Ok(target) => classify(target.file_type()),
                Err(err) => {
                    trace!(path = %path.display(), error = %err, "unresolvable symlink");
                    EntryKind::Other
                }
            }
        } else {
            classify(file_type)
        };
        let name = entry.file_name().to_string_lossy();
        entries.push(DirEntry::new(name.as_ref(), kind, path));
    }

    Ok(entries)
}

fn classify(file_type: FileType) -> EntryKind {
    if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}

fn walk_error(dir: &Path, err: jwalk::Error) -> LoadError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
    let message = err.to_string();
    match err.into_io_error() {
        Some(source) => LoadError::io(path, source),
        None => LoadError::Io {
            path,
            source: std::io::Error::other(message),
        },
    }
}
