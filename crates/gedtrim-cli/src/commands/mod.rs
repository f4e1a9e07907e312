//! CLI command implementations

pub mod completions;
pub mod filter;
pub mod find;
pub mod info;
