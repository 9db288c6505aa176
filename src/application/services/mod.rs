pub mod manifest_parser;
pub mod quota_guard;
pub mod repository_service;
pub mod settings_service;
