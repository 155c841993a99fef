pub mod add;
pub mod common;
pub mod completions;
pub mod config;
pub mod consent;
pub mod delete;
pub mod edit;
pub mod mkdir;
pub mod move_cmd;
pub mod rmdir;
pub mod search;
pub mod sync;
pub mod tree;
