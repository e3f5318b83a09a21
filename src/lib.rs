//!
//! doctag core: parses documentation-comment blocks out of Java sources and
//! rewrites their tag sets according to a declarative rule file.

pub mod block;
pub mod comment;
pub mod config;
pub mod engine;
pub mod exit_codes;
pub mod file_processor;
pub mod init;
pub mod rule;
pub mod types;
pub mod utils;

pub use block::Block;
pub use comment::{DocComment, TagOccurrence};
pub use engine::{ReplacementEngine, tag_content};
pub use file_processor::{FileOutcome, process_content};
pub use rule::{Location, TagRule, TagRuleSet};
pub use types::{ElementType, InsertPosition, LocationMode, Overwrite, TagKind};
