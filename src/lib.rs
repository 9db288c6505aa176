//! # dgit - Git working trees on content-addressed storage
//!
//! `dgit` keeps a local git working tree in sync with two storage models: a
//! git object graph with nested submodules, and a content-addressed store
//! (Kubo-compatible HTTP RPC) that serves whole trees by CID.
//!
//! ## Features
//!
//! - **Submodule resolution**: Parse `.gitmodules` and clone nested repositories depth-first
//! - **Checkout reconciliation**: Remove submodule directories that a checkout dropped
//! - **Export / import**: Store the whole tree as one CID and restore it with gateway fallback
//! - **Pinning**: Upload the tree to a pinning service with commit-history provenance
//! - **Quota guard**: Block clone, resolution and import once local settings exceed a threshold
//!
//! ## Architecture
//!
//! - [`domain`]: Entities and value objects
//! - [`application`]: Services and use cases
//! - [`infrastructure`]: Git engine, content store, pinning client, file system
//! - [`presentation`]: CLI interface
//! - [`common`]: Error handling
//!
//! ## Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dgit::application::services::quota_guard::QuotaGuard;
//! use dgit::application::use_cases::content_sync::ContentSyncEngine;
//! use dgit::domain::value_objects::content_source::ContentSources;
//! use dgit::infrastructure::{IpfsStoreFactory, JsonSettingsStore, LocalFileSystem};
//! use std::path::Path;
//!
//! # async fn example() -> dgit::Result<()> {
//! let quota = QuotaGuard::new(Arc::new(JsonSettingsStore::new(".dgit/settings.json")));
//! let engine = ContentSyncEngine::new(
//!     Arc::new(LocalFileSystem::new()),
//!     Arc::new(IpfsStoreFactory::new()?),
//!     ContentSources::default(),
//!     quota,
//! );
//!
//! let cid = engine.export_primary(Path::new(".")).await?;
//! let outcome = engine.import_all(&cid, false, Path::new("restored")).await?;
//! println!("restored from {} source", outcome.slot);
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use crate::common::error::DgitError;
pub use crate::common::result::DgitResult as Result;
