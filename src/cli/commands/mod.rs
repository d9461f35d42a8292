//! CLI command implementations

pub mod completions;
pub mod init;
pub mod part;
pub mod product;
pub mod report;
