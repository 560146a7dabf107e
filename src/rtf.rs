//! Ingestion pipeline for the RTF legacy markup format.
//!
//! The pipeline is a fixed sequence of stages, each consuming the previous
//! stage's output:
//!
//! 1. [`reader`] decodes raw bytes into characters under a switchable legacy
//!    encoding.
//! 2. [`tokenizer`] lexes characters into control words, text runs, group
//!    delimiters, and raw binary payloads, tracking encoding context per
//!    group scope.
//! 3. [`group`] assembles the flat token stream into a tree of
//!    brace-delimited scopes tagged with destinations.
//! 4. [`tables`] resolves the lookup tables (fonts, colors, numbering) in
//!    their own pass over the tree.
//! 5. [`builder`] walks the tree and emits the structured [`Document`].
//!
//! [`parse`] runs all five stages. Malformed input is repaired rather than
//! rejected wherever a reasonable repair exists; the only fatal condition is
//! input that does not open with a group.

pub mod builder;
pub mod destination;
pub mod document;
pub mod encoding;
pub mod error;
pub mod field;
pub mod group;
pub mod reader;
pub mod state;
pub mod tables;
pub mod token;
pub mod tokenizer;

pub use document::Document;
pub use error::{ParseResult, RtfError};

use crate::rtf::builder::build_document;
use crate::rtf::group::build_tree;
use crate::rtf::tables::Tables;
use crate::rtf::tokenizer::Tokenizer;

/// Parse a complete byte stream into a structured document.
pub fn parse(input: &[u8]) -> ParseResult<Document> {
    let root = build_tree(Tokenizer::new(input))?;
    let tables = Tables::resolve(&root);
    Ok(build_document(&root, &tables))
}
