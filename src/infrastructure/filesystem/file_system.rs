use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs as async_fs;
use tracing::debug;

use crate::domain::entities::working_tree::join_relative;

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_directory: bool,
}

impl DirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: false,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
        }
    }
}

/// Workspace file-system capability
#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn exists(&self, path: &Path) -> bool;

    /// Stat the path and report whether it is a directory
    async fn is_dir(&self, path: &Path) -> io::Result<bool>;

    /// Create a directory and any missing parents
    async fn mkdir(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and everything below it
    async fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    async fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// List a directory in a stable order
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;
}

/// FileSystem over the local disk
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn exists(&self, path: &Path) -> bool {
        async_fs::try_exists(path).await.unwrap_or(false)
    }

    async fn is_dir(&self, path: &Path) -> io::Result<bool> {
        Ok(async_fs::metadata(path).await?.is_dir())
    }

    async fn mkdir(&self, path: &Path) -> io::Result<()> {
        async_fs::create_dir_all(path).await
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        async_fs::remove_dir_all(path).await
    }

    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        async_fs::read(path).await
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        async_fs::write(path, contents).await
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut reader = async_fs::read_dir(path).await?;
        let mut entries = Vec::new();

        while let Some(entry) = reader.next_entry().await? {
            let is_directory = entry.file_type().await?.is_dir();
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_directory,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

struct WalkFrame {
    subdirs: VecDeque<String>,
    files: Vec<String>,
}

async fn read_frame(fs: &dyn FileSystem, root: &Path, relative: &str) -> io::Result<WalkFrame> {
    let dir = if relative.is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative)
    };

    let mut frame = WalkFrame {
        subdirs: VecDeque::new(),
        files: Vec::new(),
    };
    for entry in fs.read_dir(&dir).await? {
        let path = join_relative(relative, &entry.name);
        if entry.is_directory {
            frame.subdirs.push_back(path);
        } else {
            frame.files.push(path);
        }
    }
    Ok(frame)
}

/// Enumerate every file below `root` as `/`-separated relative paths
///
/// At each level the subdirectories are walked (in listing order) before the
/// files of that level are emitted.
pub async fn walk_files(fs: &dyn FileSystem, root: &Path) -> io::Result<Vec<String>> {
    let mut files = Vec::new();
    let mut stack = vec![read_frame(fs, root, "").await?];

    loop {
        let next = match stack.last_mut() {
            Some(frame) => frame.subdirs.pop_front(),
            None => break,
        };

        match next {
            Some(subdir) => stack.push(read_frame(fs, root, &subdir).await?),
            None => {
                if let Some(done) = stack.pop() {
                    files.extend(done.files);
                }
            }
        }
    }

    Ok(files)
}

/// Create a directory, ignoring "already exists" and any other failure
pub async fn create_directories(fs: &dyn FileSystem, path: &Path) {
    if let Err(e) = fs.mkdir(path).await {
        debug!("Ignoring mkdir failure for {}: {}", path.display(), e);
    }
}

/// Join a `/`-separated relative path onto a root
///
/// Returns `None` when the path is absolute or any segment would leave `root`
/// (`..`, a root or a drive prefix).
pub fn resolve_in(root: &Path, relative: &str) -> Option<PathBuf> {
    if relative.starts_with('/') || relative.starts_with('\\') {
        return None;
    }

    let mut path = root.to_path_buf();
    for part in relative.split('/').filter(|part| !part.is_empty()) {
        for component in Path::new(part).components() {
            match component {
                Component::Normal(name) => path.push(name),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
    }
    Some(path)
}
