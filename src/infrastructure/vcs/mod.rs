pub mod git_engine;
pub mod vcs_interface;

pub use git_engine::GitEngine;
pub use vcs_interface::{
    BlobInfo, BranchOptions, CheckoutOptions, CloneRequest, CommitInfo, CommitOptions, GitAuth,
    InitOptions, LogOptions, Person, ReadBlobOptions, RemoteInfo, StatusRow, TransferOptions,
    VcsError, VersionControl,
};
