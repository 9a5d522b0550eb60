//! PVL (Parameter Value Language) documents for planetary kernel databases.
//!
//! A document is an ordered tree: named objects containing keywords, groups
//! and nested objects; groups containing keywords; keywords carrying one or
//! more string values and optional attached comments.

pub mod document;
pub mod parse;

pub use document::{Document, Group, Keyword, Object};
pub use parse::ParseError;
