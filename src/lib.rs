//! # docloom
//!
//! An ingestion pipeline for RTF, the brace-structured legacy word-processing
//! format. Raw bytes go in; a structured document of sections, paragraphs,
//! formatted runs, tables, notes, and metadata comes out.
//!
//! ```no_run
//! let bytes = std::fs::read("report.rtf")?;
//! let document = docloom::rtf::parse(&bytes)?;
//! println!("{}", document.body_text());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod rtf;
