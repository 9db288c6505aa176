//! Test fixtures for creating test data

#![allow(dead_code)]

use dgit::application::services::quota_guard::QuotaGuard;
use dgit::application::use_cases::content_sync::ContentSyncEngine;
use dgit::domain::value_objects::content_source::{ContentSource, ContentSources, Protocol};
use dgit::infrastructure::vcs::{CommitInfo, Person};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::mock_services::{MemoryFileSystem, MemorySettingsStore, MemoryStoreFactory};

/// Root of the in-memory working tree
pub fn tree_root() -> PathBuf {
    PathBuf::from("/workspaces/notes")
}

/// Manifest text fixtures
pub struct ManifestFixture;

impl ManifestFixture {
    /// Two modules, the second in SSH form
    pub fn two_modules() -> &'static str {
        r#"[submodule "lib"]
	path = lib
	url = https://github.com/example/lib.git
[submodule "tools"]
	path = vendor/tools
	url = git@github.com:example/tools.git
"#
    }

    pub fn single(name: &str, path: &str, url: &str) -> String {
        format!(
            "[submodule \"{}\"]\n\tpath = {}\n\turl = {}\n",
            name, path, url
        )
    }
}

/// Seed a small tree with nested directories
pub fn seed_nested_tree(fs: &MemoryFileSystem, root: &Path) {
    fs.add_file(root.join("README.md"), "# notes\n");
    fs.add_file(root.join("docs").join("guide.md"), "guide body");
    fs.add_file(root.join("docs").join("img").join("logo.svg"), "<svg/>");
    fs.add_file(root.join("src").join("main.sol"), "contract A {}");
}

/// Three distinct sources, in slot order primary, user, public
pub fn test_sources() -> ContentSources {
    ContentSources {
        primary: ContentSource::new("primary.test", 5001, Protocol::Http, "http://primary.test:5001/ipfs/"),
        user: ContentSource::new("user.test", 5001, Protocol::Http, "http://user.test:5001/ipfs/"),
        public: ContentSource::new("public.test", 443, Protocol::Https, "https://public.test/ipfs/"),
    }
}

/// Engine over in-memory collaborators
pub fn engine(
    fs: Arc<MemoryFileSystem>,
    factory: Arc<MemoryStoreFactory>,
    settings: Arc<MemorySettingsStore>,
) -> ContentSyncEngine {
    ContentSyncEngine::new(fs, factory, test_sources(), QuotaGuard::new(settings))
}

pub fn commit(oid: &str, parent: Option<&str>, message: &str, timestamp: i64) -> CommitInfo {
    let person = Person {
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
        timestamp,
    };
    CommitInfo {
        oid: oid.to_string(),
        message: message.to_string(),
        parents: parent.map(|p| vec![p.to_string()]).unwrap_or_default(),
        tree: format!("tree{}", oid),
        author: person.clone(),
        committer: person,
    }
}
