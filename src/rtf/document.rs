//! The structured document model the builder emits into.
//!
//! This is the downstream interface of the ingestion pipeline: sections
//! holding paragraphs and tables, paragraphs holding runs/fields/markers,
//! runs holding formatted content, plus note bodies and the resolved lookup
//! tables. Everything is plain serializable data; rendering and layout are
//! someone else's problem.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::rtf::destination::HeaderFooterKind;
use crate::rtf::state::FormattingState;
use crate::rtf::tables::Tables;

/// Page orientation of a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Paragraph alignment (`\ql`, `\qr`, `\qc`, `\qj`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Alignment {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

/// Section-level properties. All distances are twips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionProperties {
    pub page_width: i32,
    pub page_height: i32,
    pub margin_left: i32,
    pub margin_right: i32,
    pub margin_top: i32,
    pub margin_bottom: i32,
    pub orientation: Orientation,
    pub columns: u32,
    /// Whether the section has a distinct first-page header/footer.
    pub title_page: bool,
}

impl Default for SectionProperties {
    fn default() -> Self {
        // US Letter with the format's default margins
        Self {
            page_width: 12240,
            page_height: 15840,
            margin_left: 1800,
            margin_right: 1800,
            margin_top: 1440,
            margin_bottom: 1440,
            orientation: Orientation::Portrait,
            columns: 1,
            title_page: false,
        }
    }
}

/// Paragraph-level properties. Distances are twips.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParagraphProperties {
    pub alignment: Alignment,
    pub indent_left: i32,
    pub indent_right: i32,
    pub indent_first_line: i32,
    pub space_before: i32,
    pub space_after: i32,
    pub line_spacing: i32,
    pub in_table: bool,
    /// Numbering instance reference (`\lsN`), resolved via the list tables.
    pub list_ref: Option<i32>,
    /// List level (`\ilvlN`), meaningful only with `list_ref`.
    pub list_level: u32,
}

/// Break kinds that force a structurally distinct run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BreakKind {
    Line,
    Page,
    Column,
}

/// Placeholder content resolved at render time, not parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Placeholder {
    /// Current date (`\chdate`).
    Date,
    /// Current time (`\chtime`).
    Time,
    /// Current page number (`\chpgn`).
    PageNumber,
    /// Auto-numbered note reference mark (`\chftn`).
    NoteReference,
}

/// Recognized picture payload formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ImageFormat {
    #[default]
    Unknown,
    Png,
    Jpeg,
    Emf,
    Wmf,
    Dib,
}

/// An embedded picture, materialized when its destination group closes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Image {
    pub format: ImageFormat,
    /// Raw dimensions in twips, when declared.
    pub width: Option<i32>,
    pub height: Option<i32>,
    /// Display dimensions in twips, when declared.
    pub goal_width: Option<i32>,
    pub goal_height: Option<i32>,
    pub scale_x: Option<i32>,
    pub scale_y: Option<i32>,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// What a single run carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RunContent {
    Text(String),
    Tab,
    Break(BreakKind),
    Placeholder(Placeholder),
    Image(Image),
}

/// A run: one stretch of content under a single formatting snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    pub formatting: FormattingState,
    pub content: RunContent,
}

/// Classified field instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    Hyperlink { target: String },
    PageNumber,
    NumPages,
    Date,
    Time,
    Reference { bookmark: String },
    Other,
}

/// The four-part field construct: instruction plus last-known result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub kind: FieldKind,
    /// Raw instruction text as it appeared in the field group.
    pub instruction: String,
    /// Runs of the cached field result.
    pub result: Vec<Run>,
}

/// Items appearing in paragraph order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Inline {
    Run(Run),
    Field(Field),
    BookmarkStart(String),
    BookmarkEnd(String),
    /// Reference to a footnote or endnote body by generated id.
    NoteReference(u32),
}

/// One paragraph: properties plus ordered inline content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub properties: ParagraphProperties,
    pub content: Vec<Inline>,
}

impl Paragraph {
    /// Concatenated text of all runs, for assertions and plain-text dumps.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for inline in &self.content {
            match inline {
                Inline::Run(run) => match &run.content {
                    RunContent::Text(t) => out.push_str(t),
                    RunContent::Tab => out.push('\t'),
                    RunContent::Break(_) => out.push('\n'),
                    _ => {}
                },
                Inline::Field(field) => {
                    for run in &field.result {
                        if let RunContent::Text(t) = &run.content {
                            out.push_str(t);
                        }
                    }
                }
                _ => {}
            }
        }
        out
    }
}

/// A table cell: a sequence of paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub paragraphs: Vec<Paragraph>,
    /// Right boundary of the cell in twips (`\cellxN`), when declared.
    pub right_boundary: Option<i32>,
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Row {
    pub cells: Vec<Cell>,
}

/// A row-based table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableBlock {
    pub rows: Vec<Row>,
}

/// Block-level content of a section or header/footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Block {
    Paragraph(Paragraph),
    Table(TableBlock),
}

/// A note body (footnote or endnote), keyed by generated id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: u32,
    pub endnote: bool,
    pub paragraphs: Vec<Paragraph>,
}

/// Header/footer parts of one section, keyed by kind. Re-declaring a part of
/// the same kind replaces the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderFooterSet {
    pub headers: BTreeMap<HeaderFooterKind, Vec<Block>>,
    pub footers: BTreeMap<HeaderFooterKind, Vec<Block>>,
}

/// One section of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Section {
    pub properties: SectionProperties,
    pub parts: HeaderFooterSet,
    pub blocks: Vec<Block>,
}

/// Document metadata captured from the `\info` destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

/// The assembled document: ordered sections, note bodies, resolved tables,
/// and metadata.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    pub sections: Vec<Section>,
    pub notes: Vec<Note>,
    pub metadata: Metadata,
    pub tables: Tables,
}

impl Document {
    /// All paragraph text in document order, separated by newlines. Intended
    /// for tests and the CLI plain-text dump.
    pub fn body_text(&self) -> String {
        let mut out = Vec::new();
        for section in &self.sections {
            for block in &section.blocks {
                match block {
                    Block::Paragraph(p) => out.push(p.text()),
                    Block::Table(t) => {
                        for row in &t.rows {
                            let cells: Vec<String> = row
                                .cells
                                .iter()
                                .map(|c| {
                                    c.paragraphs
                                        .iter()
                                        .map(|p| p.text())
                                        .collect::<Vec<_>>()
                                        .join(" ")
                                })
                                .collect();
                            out.push(cells.join("\t"));
                        }
                    }
                }
            }
        }
        out.join("\n")
    }
}
