//! Mock services for testing
//!
//! In-memory implementations of the capabilities that dgit's services take as
//! `Arc<dyn Trait>`, with call recording for verification.

#![allow(dead_code)]

use async_trait::async_trait;
use dgit::domain::value_objects::content_source::ContentSource;
use dgit::infrastructure::content_store::{
    AddEntry, AddOptions, ContentStore, ContentStoreFactory, EntryStream, GetOptions, StoreEntry,
    StoreError,
};
use dgit::infrastructure::filesystem::{DirEntry, FileSystem, KeyValueStore};
use dgit::infrastructure::pinning::{PinRequest, PinningCredentials, PinningError, PinningService};
use dgit::infrastructure::vcs::{
    CheckoutOptions, CloneRequest, CommitInfo, LogOptions, VcsError, VersionControl,
};
use dgit::common::result::DgitResult;
use futures::stream::{self, StreamExt};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Dir,
    File(Vec<u8>),
}

/// In-memory file system that counts every call
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    nodes: Mutex<BTreeMap<PathBuf, Node>>,
    calls: AtomicUsize,
}

impl MemoryFileSystem {
    /// Create a file system containing the directory `root`
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let fs = Self::default();
        fs.insert_dirs(root.as_ref());
        fs
    }

    fn insert_dirs(&self, path: &Path) {
        let mut nodes = self.nodes.lock().unwrap();
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of FileSystem calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Seed a file, creating its parent directories
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.insert_dirs(parent);
        }
        self.nodes
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), Node::File(content.as_ref().to_vec()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert_dirs(path.as_ref());
    }

    /// Remove a subtree without counting a call
    pub fn remove_tree(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.nodes
            .lock()
            .unwrap()
            .retain(|candidate, _| !candidate.starts_with(path));
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.nodes.lock().unwrap().get(path.as_ref()) {
            Some(Node::File(content)) => Some(content.clone()),
            _ => None,
        }
    }

    pub fn has_dir(&self, path: impl AsRef<Path>) -> bool {
        matches!(self.nodes.lock().unwrap().get(path.as_ref()), Some(Node::Dir))
    }

    /// Every file below `root`, keyed by `/`-separated relative path
    pub fn files_under(&self, root: impl AsRef<Path>) -> BTreeMap<String, Vec<u8>> {
        let root = root.as_ref();
        self.nodes
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(path, node)| match node {
                Node::File(content) => {
                    let relative = path.strip_prefix(root).ok()?;
                    let key = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect::<Vec<_>>()
                        .join("/");
                    Some((key, content.clone()))
                }
                Node::Dir => None,
            })
            .collect()
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn exists(&self, path: &Path) -> bool {
        self.touch();
        self.nodes.lock().unwrap().contains_key(path)
    }

    async fn is_dir(&self, path: &Path) -> io::Result<bool> {
        self.touch();
        match self.nodes.lock().unwrap().get(path) {
            Some(node) => Ok(*node == Node::Dir),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such path")),
        }
    }

    async fn mkdir(&self, path: &Path) -> io::Result<()> {
        self.touch();
        if let Some(Node::File(_)) = self.nodes.lock().unwrap().get(path) {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, "file exists"));
        }
        self.insert_dirs(path);
        Ok(())
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.touch();
        let mut nodes = self.nodes.lock().unwrap();
        if !nodes.contains_key(path) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such path"));
        }
        nodes.retain(|candidate, _| !candidate.starts_with(path));
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.touch();
        match self.nodes.lock().unwrap().get(path) {
            Some(Node::File(content)) => Ok(content.clone()),
            Some(Node::Dir) => Err(io::Error::new(io::ErrorKind::Other, "is a directory")),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
        }
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.touch();
        let mut nodes = self.nodes.lock().unwrap();
        let parent_is_dir = path
            .parent()
            .map(|parent| nodes.get(parent) == Some(&Node::Dir))
            .unwrap_or(false);
        if !parent_is_dir {
            return Err(io::Error::new(io::ErrorKind::NotFound, "missing parent"));
        }
        nodes.insert(path.to_path_buf(), Node::File(contents.to_vec()));
        Ok(())
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        self.touch();
        let nodes = self.nodes.lock().unwrap();
        if nodes.get(path) != Some(&Node::Dir) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
        }

        let mut entries: Vec<DirEntry> = nodes
            .iter()
            .filter(|(candidate, _)| candidate.parent() == Some(path))
            .filter_map(|(candidate, node)| {
                let name = candidate.file_name()?.to_string_lossy().into_owned();
                Some(match node {
                    Node::Dir => DirEntry::directory(name),
                    Node::File(_) => DirEntry::file(name),
                })
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

/// How a memory store answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Normal,
    /// Every request fails as unreachable
    Failing,
    /// `get` never resolves
    Pending,
}

/// Content-addressed store over a map of cid to files
pub struct MemoryContentStore {
    label: String,
    objects: Mutex<HashMap<String, Vec<(String, Vec<u8>)>>>,
    mode: Mutex<StoreMode>,
    get_calls: AtomicUsize,
    add_calls: AtomicUsize,
}

impl MemoryContentStore {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            objects: Mutex::new(HashMap::new()),
            mode: Mutex::new(StoreMode::Normal),
            get_calls: AtomicUsize::new(0),
            add_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_mode(&self, mode: StoreMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    /// Files stored under `cid`, in submission order
    pub fn object(&self, cid: &str) -> Option<Vec<(String, Vec<u8>)>> {
        self.objects.lock().unwrap().get(cid).cloned()
    }

    /// Make `cid` retrievable with the given files
    pub fn insert(&self, cid: &str, files: Vec<(String, Vec<u8>)>) {
        self.objects.lock().unwrap().insert(cid.to_string(), files);
    }

    fn mode(&self) -> StoreMode {
        *self.mode.lock().unwrap()
    }

    fn unreachable(&self) -> StoreError {
        StoreError::unreachable(&self.label, "connection refused")
    }
}

/// Deterministic identifier of a file set
pub fn content_id(files: &[(String, Vec<u8>)]) -> String {
    let mut sorted: Vec<&(String, Vec<u8>)> = files.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Sha256::new();
    for (path, content) in sorted {
        hasher.update(path.as_bytes());
        hasher.update([0u8]);
        hasher.update(content);
        hasher.update([0u8]);
    }
    let digest = format!("{:x}", hasher.finalize());
    format!("Qm{}", &digest[..44])
}

fn tree_entries(cid: &str, files: &[(String, Vec<u8>)]) -> Vec<StoreEntry> {
    let mut entries = Vec::new();
    let mut seen_dirs: Vec<String> = Vec::new();

    for (path, content) in files {
        let segments: Vec<&str> = path.split('/').collect();
        for depth in 1..segments.len() {
            let dir = segments[..depth].join("/");
            if !seen_dirs.contains(&dir) {
                entries.push(StoreEntry::directory(format!("{}/{}", cid, dir)));
                seen_dirs.push(dir);
            }
        }

        let chunks: Vec<Result<Vec<u8>, StoreError>> =
            content.chunks(3).map(|chunk| Ok(chunk.to_vec())).collect();
        entries.push(StoreEntry::file(
            format!("{}/{}", cid, path),
            stream::iter(chunks).boxed(),
        ));
    }

    entries
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn add(&self, entries: Vec<AddEntry>, _options: &AddOptions) -> Result<String, StoreError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        if self.mode() == StoreMode::Failing {
            return Err(self.unreachable());
        }

        let files: Vec<(String, Vec<u8>)> = entries
            .into_iter()
            .map(|entry| (entry.path, entry.content))
            .collect();
        let cid = content_id(&files);
        self.insert(&cid, files);
        Ok(cid)
    }

    async fn get(&self, cid: &str, _options: &GetOptions) -> Result<EntryStream, StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        match self.mode() {
            StoreMode::Failing => return Err(self.unreachable()),
            StoreMode::Pending => futures::future::pending::<()>().await,
            StoreMode::Normal => {}
        }

        let entries = match self.object(cid) {
            Some(files) => tree_entries(cid, &files),
            None => Vec::new(),
        };
        Ok(stream::iter(entries.into_iter().map(Ok)).boxed())
    }

    async fn check_reachable(&self) -> Result<(), StoreError> {
        match self.mode() {
            StoreMode::Failing => Err(self.unreachable()),
            _ => Ok(()),
        }
    }
}

/// Hands out one MemoryContentStore per source and records connections
#[derive(Default)]
pub struct MemoryStoreFactory {
    stores: Mutex<HashMap<String, Arc<MemoryContentStore>>>,
    connections: Mutex<Vec<String>>,
}

impl MemoryStoreFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store behind `source`, created on first use
    pub fn store(&self, source: &ContentSource) -> Arc<MemoryContentStore> {
        let key = source.to_string();
        self.stores
            .lock()
            .unwrap()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(MemoryContentStore::new(key)))
            .clone()
    }

    /// Sources connected to, in order
    pub fn connections(&self) -> Vec<String> {
        self.connections.lock().unwrap().clone()
    }
}

impl ContentStoreFactory for MemoryStoreFactory {
    fn connect(&self, source: &ContentSource) -> Result<Arc<dyn ContentStore>, StoreError> {
        self.connections.lock().unwrap().push(source.to_string());
        Ok(self.store(source))
    }
}

/// A clone performed by FakeVcs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedClone {
    pub url: String,
    pub dir: PathBuf,
    pub depth: Option<u32>,
    pub single_branch: bool,
    pub token: Option<String>,
}

/// Version control over a MemoryFileSystem
///
/// Cloning a registered URL writes its files into the target directory.
/// Checking out a registered reference writes that reference's files.
pub struct FakeVcs {
    fs: Arc<MemoryFileSystem>,
    remotes: Mutex<HashMap<String, Vec<(String, Vec<u8>)>>>,
    references: Mutex<HashMap<String, Vec<(String, Vec<u8>)>>>,
    history: Mutex<Option<Vec<CommitInfo>>>,
    clones: Mutex<Vec<RecordedClone>>,
}

impl FakeVcs {
    pub fn new(fs: Arc<MemoryFileSystem>) -> Self {
        Self {
            fs,
            remotes: Mutex::new(HashMap::new()),
            references: Mutex::new(HashMap::new()),
            history: Mutex::new(None),
            clones: Mutex::new(Vec::new()),
        }
    }

    /// Register a clonable repository
    pub fn add_remote_repo(&self, url: &str, files: Vec<(&str, &str)>) {
        self.remotes.lock().unwrap().insert(url.to_string(), owned(files));
    }

    /// Register the files a checkout of `reference` produces
    pub fn add_reference(&self, reference: &str, files: Vec<(&str, &str)>) {
        self.references
            .lock()
            .unwrap()
            .insert(reference.to_string(), owned(files));
    }

    pub fn set_history(&self, history: Vec<CommitInfo>) {
        *self.history.lock().unwrap() = Some(history);
    }

    pub fn clones(&self) -> Vec<RecordedClone> {
        self.clones.lock().unwrap().clone()
    }

    fn write_into(&self, dir: &Path, files: &[(String, Vec<u8>)]) {
        self.fs.add_dir(dir);
        for (path, content) in files {
            let target = path
                .split('/')
                .fold(dir.to_path_buf(), |target, part| target.join(part));
            self.fs.add_file(target, content);
        }
    }
}

fn owned(files: Vec<(&str, &str)>) -> Vec<(String, Vec<u8>)> {
    files
        .into_iter()
        .map(|(path, content)| (path.to_string(), content.as_bytes().to_vec()))
        .collect()
}

#[async_trait]
impl VersionControl for FakeVcs {
    async fn clone(&self, dir: &Path, request: &CloneRequest) -> Result<(), VcsError> {
        self.clones.lock().unwrap().push(RecordedClone {
            url: request.url.clone(),
            dir: dir.to_path_buf(),
            depth: request.depth,
            single_branch: request.single_branch,
            token: request.auth.as_ref().map(|auth| auth.token.clone()),
        });

        let files = self.remotes.lock().unwrap().get(&request.url).cloned();
        match files {
            Some(files) => {
                self.write_into(dir, &files);
                Ok(())
            }
            None => Err(VcsError::clone_failed(format!(
                "repository {} not found",
                request.url
            ))),
        }
    }

    async fn checkout(&self, dir: &Path, options: &CheckoutOptions) -> Result<(), VcsError> {
        let files = self
            .references
            .lock()
            .unwrap()
            .get(&options.reference)
            .cloned()
            .ok_or_else(|| VcsError::reference_not_found(&options.reference))?;
        self.write_into(dir, &files);
        Ok(())
    }

    async fn log(&self, _dir: &Path, options: &LogOptions) -> Result<Vec<CommitInfo>, VcsError> {
        let history = self
            .history
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| VcsError::reference_not_found(&options.reference))?;
        Ok(match options.depth {
            Some(depth) => history.into_iter().take(depth).collect(),
            None => history,
        })
    }
}

/// Key/value store kept in memory, in insertion order
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    entries: Mutex<Vec<(String, String)>>,
}

impl MemorySettingsStore {
    pub fn with_entries(entries: Vec<(&str, &str)>) -> Self {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemorySettingsStore {
    fn entries(&self) -> DgitResult<Vec<(String, String)>> {
        Ok(self.entries.lock().unwrap().clone())
    }

    fn get(&self, key: &str) -> DgitResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()))
    }

    fn set(&self, key: &str, value: &str) -> DgitResult<()> {
        let mut entries = self.entries.lock().unwrap();
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
        Ok(())
    }
}

/// Pinning service that keeps the requests it receives
#[derive(Default)]
pub struct RecordingPinningService {
    requests: Mutex<Vec<PinRequest>>,
    fail: bool,
}

impl RecordingPinningService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn requests(&self) -> Vec<PinRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PinningService for RecordingPinningService {
    async fn pin_file_to_ipfs(
        &self,
        _credentials: &PinningCredentials,
        request: PinRequest,
    ) -> Result<String, PinningError> {
        if self.fail {
            return Err(PinningError::request_failed(500, "service unavailable"));
        }
        self.requests.lock().unwrap().push(request);
        Ok("QmRemoteHash".to_string())
    }

    async fn pin_list(&self, _credentials: &PinningCredentials) -> Result<Value, PinningError> {
        let rows: Vec<Value> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| json!({ "metadata": { "name": request.name } }))
            .collect();
        Ok(json!({ "count": rows.len(), "rows": rows }))
    }

    async fn unpin(&self, _credentials: &PinningCredentials, _hash: &str) -> Result<bool, PinningError> {
        Ok(!self.fail)
    }
}
