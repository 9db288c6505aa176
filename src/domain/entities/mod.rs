pub mod commit_history;
pub mod dgit_config;
pub mod module_record;
pub mod working_tree;
