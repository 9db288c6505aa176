pub mod content_source;
pub mod git_url;
