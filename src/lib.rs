pub mod config;
pub mod document;
pub mod fence;

pub use config::Config;
pub use document::{preview_empty_code_blocks, remove_empty_code_blocks};
pub use fence::{CollapseReport, collapse_fences, collapse_fences_with_report};
