//! Deciding what a file is before handing it to a parser.

pub(crate) mod file_types;

pub use file_types::{FileType, ValidType};
