pub mod checkout;
pub mod clone_repository;
pub mod content_sync;
pub mod pin_workspace;
pub mod resolve_submodules;
