//! The conversion pass: group tree in, structured document out.
//!
//! The builder walks the group tree depth-first with two kinds of state that
//! deliberately scope differently:
//!
//! - Formatting snapshots are stacked: entering any group pushes a clone,
//!   leaving pops it, so run formatting set inside `{...}` never leaks out.
//!   `\plain` additionally resets the top snapshot in place, independent of
//!   braces.
//! - Structural accumulators (section properties, paragraph properties, the
//!   paragraph and run under construction) are *not* brace-scoped. They are
//!   flushed or reset only by explicit markers: `\par`, `\sect`, `\pard`,
//!   `\sectd`, and content that forces a structurally distinct unit (breaks,
//!   fields, pictures, bookmark boundaries).
//!
//! Control words dispatch through a table resolved once at startup; anything
//! not in the table is a no-op, never an error. Recognized destinations
//! recurse into a different output container (header/footer parts, note
//! bodies, field parts, picture payloads) by saving and restoring the
//! structural accumulators around the sub-walk.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::rtf::destination::Destination;
use crate::rtf::document::{
    Alignment, Block, BreakKind, Cell, Document, Field, HeaderFooterSet, Image, ImageFormat,
    Inline, Metadata, Note, Orientation, Paragraph, ParagraphProperties, Placeholder, Row, Run,
    RunContent, Section, SectionProperties, TableBlock,
};
use crate::rtf::field::classify_instruction;
use crate::rtf::group::{Group, GroupContent};
use crate::rtf::state::{flag, FormattingState, Underline};
use crate::rtf::tables::Tables;
use crate::rtf::token::Token;

type Handler = for<'a, 'b> fn(&'a mut DocumentBuilder<'b>, Option<i32>);

/// Control-word dispatch table, resolved once.
static HANDLERS: Lazy<HashMap<&'static str, Handler>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, Handler> = HashMap::new();

    // Run formatting; the boolean convention applies throughout
    m.insert("b", |b, v| b.fmt_mut().bold = flag(v));
    m.insert("i", |b, v| b.fmt_mut().italic = flag(v));
    m.insert("strike", |b, v| b.fmt_mut().strike = flag(v));
    m.insert("striked", |b, v| b.fmt_mut().strike = flag(v));
    m.insert("dstrike", |b, v| b.fmt_mut().double_strike = flag(v));
    m.insert("sub", |b, _| b.fmt_mut().subscript = true);
    m.insert("super", |b, _| b.fmt_mut().superscript = true);
    m.insert("nosupersub", |b, _| {
        let f = b.fmt_mut();
        f.subscript = false;
        f.superscript = false;
    });
    m.insert("scaps", |b, v| b.fmt_mut().small_caps = flag(v));
    m.insert("caps", |b, v| b.fmt_mut().all_caps = flag(v));
    m.insert("v", |b, v| b.fmt_mut().hidden = flag(v));
    m.insert("embo", |b, v| b.fmt_mut().emboss = flag(v));
    m.insert("impr", |b, v| b.fmt_mut().imprint = flag(v));
    m.insert("outl", |b, v| b.fmt_mut().outline = flag(v));
    m.insert("shad", |b, v| b.fmt_mut().shadow = flag(v));
    m.insert("ul", |b, v| {
        b.fmt_mut().underline = if flag(v) {
            Underline::Single
        } else {
            Underline::None
        }
    });
    m.insert("ulnone", |b, _| b.fmt_mut().underline = Underline::None);
    m.insert("uldb", |b, _| b.fmt_mut().underline = Underline::Double);
    m.insert("uld", |b, _| b.fmt_mut().underline = Underline::Dotted);
    m.insert("uldash", |b, _| b.fmt_mut().underline = Underline::Dashed);
    m.insert("uldashd", |b, _| b.fmt_mut().underline = Underline::DashDot);
    m.insert("uldashdd", |b, _| b.fmt_mut().underline = Underline::DashDotDot);
    m.insert("ulw", |b, _| b.fmt_mut().underline = Underline::Words);
    m.insert("ulth", |b, _| b.fmt_mut().underline = Underline::Thick);
    m.insert("ulwave", |b, _| b.fmt_mut().underline = Underline::Wave);
    m.insert("ulc", |b, v| {
        b.fmt_mut().underline_color = v.map(|c| c.max(0) as u32)
    });
    m.insert("highlight", |b, v| {
        b.fmt_mut().highlight = v.map(|c| c.max(0) as u32)
    });
    m.insert("f", |b, v| b.fmt_mut().font = v.map(|f| f.max(0) as u32));
    m.insert("fs", |b, v| b.fmt_mut().font_size = v.map(|s| s.max(0) as u32));
    m.insert("cf", |b, v| b.fmt_mut().color = v.map(|c| c.max(0) as u32));
    m.insert("expnd", |b, v| b.fmt_mut().char_spacing = v.unwrap_or(0));
    m.insert("charscalex", |b, v| {
        b.fmt_mut().char_scale = v.unwrap_or(100).max(0) as u32
    });
    m.insert("kerning", |b, v| {
        b.fmt_mut().kerning = v.unwrap_or(0).max(0) as u32
    });
    m.insert("up", |b, v| b.fmt_mut().vertical_offset = v.unwrap_or(6));
    m.insert("dn", |b, v| b.fmt_mut().vertical_offset = -v.unwrap_or(6));
    m.insert("lang", |b, v| b.fmt_mut().language = v.map(|l| l.max(0) as u32));
    m.insert("plain", |b, _| b.fmt_mut().reset_plain());

    // Unicode escapes and their fallback-skip configuration
    m.insert("uc", |b, v| b.fmt().unicode_skip = v.unwrap_or(1).max(0) as u32);
    m.insert("u", |b, v| b.emit_unicode(v));

    // Paragraph properties and markers
    m.insert("par", |b, _| b.end_paragraph());
    m.insert("pard", |b, _| b.para_props = ParagraphProperties::default());
    m.insert("ql", |b, _| b.para_props.alignment = Alignment::Left);
    m.insert("qr", |b, _| b.para_props.alignment = Alignment::Right);
    m.insert("qc", |b, _| b.para_props.alignment = Alignment::Center);
    m.insert("qj", |b, _| b.para_props.alignment = Alignment::Justify);
    m.insert("li", |b, v| b.para_props.indent_left = v.unwrap_or(0));
    m.insert("ri", |b, v| b.para_props.indent_right = v.unwrap_or(0));
    m.insert("fi", |b, v| b.para_props.indent_first_line = v.unwrap_or(0));
    m.insert("sb", |b, v| b.para_props.space_before = v.unwrap_or(0));
    m.insert("sa", |b, v| b.para_props.space_after = v.unwrap_or(0));
    m.insert("sl", |b, v| b.para_props.line_spacing = v.unwrap_or(0));
    m.insert("intbl", |b, _| b.para_props.in_table = true);
    m.insert("ls", |b, v| b.para_props.list_ref = v);
    m.insert("ilvl", |b, v| b.para_props.list_level = v.unwrap_or(0).max(0) as u32);

    // Section properties and markers
    m.insert("sect", |b, _| b.end_section());
    m.insert("sectd", |b, _| b.sect_props = SectionProperties::default());
    m.insert("paperw", |b, v| b.sect_props.page_width = v.unwrap_or(12240));
    m.insert("paperh", |b, v| b.sect_props.page_height = v.unwrap_or(15840));
    m.insert("margl", |b, v| b.sect_props.margin_left = v.unwrap_or(1800));
    m.insert("margr", |b, v| b.sect_props.margin_right = v.unwrap_or(1800));
    m.insert("margt", |b, v| b.sect_props.margin_top = v.unwrap_or(1440));
    m.insert("margb", |b, v| b.sect_props.margin_bottom = v.unwrap_or(1440));
    m.insert("landscape", |b, v| {
        b.sect_props.orientation = if flag(v) {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    });
    m.insert("cols", |b, v| b.sect_props.columns = v.unwrap_or(1).max(1) as u32);
    m.insert("titlepg", |b, v| b.sect_props.title_page = flag(v));

    // Breaks and structurally distinct content
    m.insert("line", |b, _| b.emit_break(BreakKind::Line));
    m.insert("page", |b, _| b.emit_break(BreakKind::Page));
    m.insert("column", |b, _| b.emit_break(BreakKind::Column));
    m.insert("tab", |b, _| b.emit_run(RunContent::Tab));
    m.insert("chdate", |b, _| b.emit_run(RunContent::Placeholder(Placeholder::Date)));
    m.insert("chtime", |b, _| b.emit_run(RunContent::Placeholder(Placeholder::Time)));
    m.insert("chpgn", |b, _| {
        b.emit_run(RunContent::Placeholder(Placeholder::PageNumber))
    });
    m.insert("chftn", |b, _| {
        b.emit_run(RunContent::Placeholder(Placeholder::NoteReference))
    });

    // Table assembly
    m.insert("trowd", |b, _| b.start_row_definition());
    m.insert("cellx", |b, v| {
        if let Some(x) = v {
            b.cell_bounds.push(x);
        }
    });
    m.insert("cell", |b, _| b.end_cell());
    m.insert("row", |b, _| b.end_row());

    m
});

/// Literal characters emitted by symbol control words.
static SYMBOL_WORDS: Lazy<HashMap<&'static str, char>> = Lazy::new(|| {
    HashMap::from([
        ("emdash", '\u{2014}'),
        ("endash", '\u{2013}'),
        ("lquote", '\u{2018}'),
        ("rquote", '\u{2019}'),
        ("ldblquote", '\u{201C}'),
        ("rdblquote", '\u{201D}'),
        ("bullet", '\u{2022}'),
        ("enspace", '\u{2002}'),
        ("emspace", '\u{2003}'),
        ("qmspace", '\u{2005}'),
        ("zwnj", '\u{200C}'),
        ("zwj", '\u{200D}'),
        ("ltrmark", '\u{200E}'),
        ("rtlmark", '\u{200F}'),
    ])
});

/// Walks a group tree and emits the structured document.
pub struct DocumentBuilder<'t> {
    tables: &'t Tables,

    /// Formatting snapshots; the only state scoped to braces.
    fmt_stack: Vec<FormattingState>,

    // Structural accumulators, scoped to explicit markers only
    sect_props: SectionProperties,
    para_props: ParagraphProperties,
    para: Vec<Inline>,
    run_text: String,

    /// Active block sink; swapped out while a destination redirects output.
    blocks: Vec<Block>,
    parts: HeaderFooterSet,
    sections: Vec<Section>,
    notes: Vec<Note>,
    metadata: Metadata,

    // Row-based table assembly
    table: Option<TableBlock>,
    row: Row,
    cell: Cell,
    cell_bounds: Vec<i32>,
}

/// Build the document for a finished group tree and its resolved tables.
pub fn build_document(root: &Group, tables: &Tables) -> Document {
    let mut builder = DocumentBuilder::new(tables);
    builder.walk_children(root);
    builder.finish()
}

impl<'t> DocumentBuilder<'t> {
    pub fn new(tables: &'t Tables) -> Self {
        Self {
            tables,
            fmt_stack: vec![FormattingState::default()],
            sect_props: SectionProperties::default(),
            para_props: ParagraphProperties::default(),
            para: Vec::new(),
            run_text: String::new(),
            blocks: Vec::new(),
            parts: HeaderFooterSet::default(),
            sections: Vec::new(),
            notes: Vec::new(),
            metadata: Metadata::default(),
            table: None,
            row: Row::default(),
            cell: Cell::default(),
            cell_bounds: Vec::new(),
        }
    }

    fn finish(mut self) -> Document {
        // Implicit close-and-flush at end of stream
        self.flush_pending_paragraph();
        self.finalize_table();
        if !self.blocks.is_empty()
            || self.parts != HeaderFooterSet::default()
            || self.sections.is_empty()
        {
            self.push_section();
        }
        Document {
            sections: self.sections,
            notes: self.notes,
            metadata: self.metadata,
            tables: self.tables.clone(),
        }
    }

    // ----- scope state access -----

    /// Top-of-stack formatting, for bookkeeping fields that don't change how
    /// pending text renders.
    fn fmt(&mut self) -> &mut FormattingState {
        self.fmt_stack.last_mut().expect("formatting stack never empties")
    }

    /// Top-of-stack formatting for a visible change: the run accumulated so
    /// far is flushed first so it keeps the properties it was written under.
    fn fmt_mut(&mut self) -> &mut FormattingState {
        self.flush_run();
        self.fmt()
    }

    fn current_fmt(&self) -> &FormattingState {
        self.fmt_stack.last().expect("formatting stack never empties")
    }

    // ----- tree walk -----

    fn walk_children(&mut self, group: &Group) {
        for child in &group.children {
            match child {
                GroupContent::Token(token) => self.handle_token(token),
                GroupContent::Group(sub) => self.handle_group(sub),
            }
        }
    }

    fn handle_token(&mut self, token: &Token) {
        match token {
            Token::ControlWord { name, value, .. } => self.handle_word(name, *value),
            Token::Text(text) => self.emit_text(text),
            // Raw binary outside a picture destination has no body meaning
            Token::Binary(_) => {}
            // Structure was resolved by the group builder
            Token::GroupStart | Token::GroupEnd => {}
        }
    }

    fn handle_word(&mut self, name: &str, value: Option<i32>) {
        if let Some(handler) = HANDLERS.get(name) {
            handler(self, value);
        } else if let Some(&c) = SYMBOL_WORDS.get(name) {
            self.push_char(c);
        }
        // Anything else is an unknown extension: ignored, never an error
    }

    fn handle_group(&mut self, group: &Group) {
        // An ignorable extension naming an unknown destination is retained
        // structurally but contributes nothing
        if group.ignorable {
            if let Some(dest) = &group.destination {
                if !dest.is_recognized() {
                    return;
                }
            } else {
                return;
            }
        }

        match group.destination.clone() {
            // Lookup tables were resolved in their own pass; their content
            // must not leak into the body
            Some(Destination::FontTable)
            | Some(Destination::ColorTable)
            | Some(Destination::StyleSheet)
            | Some(Destination::ListTable)
            | Some(Destination::ListOverrideTable) => {}
            Some(Destination::Info) => self.handle_info(group),
            Some(Destination::Header(kind)) => {
                let blocks = self.build_redirected(group);
                self.parts.headers.insert(kind, blocks);
            }
            Some(Destination::Footer(kind)) => {
                let blocks = self.build_redirected(group);
                self.parts.footers.insert(kind, blocks);
            }
            Some(Destination::Footnote) => self.handle_footnote(group),
            Some(Destination::Field) => self.handle_field(group),
            // Field parts outside a field group have nowhere to go
            Some(Destination::FieldInstruction) | Some(Destination::FieldResult) => {}
            Some(Destination::Picture) => self.handle_picture(group),
            Some(Destination::BookmarkStart) => {
                let name = group.direct_text().trim().to_string();
                if !name.is_empty() {
                    self.flush_run();
                    self.para.push(Inline::BookmarkStart(name));
                }
            }
            Some(Destination::BookmarkEnd) => {
                let name = group.direct_text().trim().to_string();
                if !name.is_empty() {
                    self.flush_run();
                    self.para.push(Inline::BookmarkEnd(name));
                }
            }
            // Plain scope (or a non-ignorable unknown word leading it):
            // formatting changes stay inside the braces
            Some(Destination::Unknown(_)) | None => {
                self.flush_run();
                self.fmt_stack.push(self.current_fmt().clone());
                self.walk_children(group);
                self.flush_run();
                self.fmt_stack.pop();
            }
        }
    }

    // ----- text and runs -----

    /// Append decoded text, honoring the pending Unicode-fallback skip: drop
    /// `min(skip, len)` characters from the front, decrement the counter, and
    /// let the remainder carry into the run. The counter spans token
    /// boundaries within the scope.
    fn emit_text(&mut self, text: &str) {
        let fmt = self.fmt();
        let mut chars = text.chars();
        while fmt.pending_skip > 0 {
            if chars.next().is_none() {
                return;
            }
            fmt.pending_skip -= 1;
        }
        let rest = chars.as_str();
        if !rest.is_empty() {
            self.run_text.push_str(rest);
        }
    }

    /// Append one character that is not subject to the fallback skip.
    fn push_char(&mut self, c: char) {
        self.run_text.push(c);
    }

    /// `\uN`: emit one Unicode scalar and arm the fallback skip so the next
    /// `uc` legacy characters are discarded.
    fn emit_unicode(&mut self, value: Option<i32>) {
        let Some(mut code) = value else { return };
        if code < 0 {
            // Writers encode code points >= 32768 as negative 16-bit values
            code += 65536;
        }
        if let Some(c) = char::from_u32(code as u32) {
            self.push_char(c);
        }
        let fmt = self.fmt();
        fmt.pending_skip = fmt.unicode_skip;
    }

    /// Flush accumulated text into a run under the current formatting.
    fn flush_run(&mut self) {
        if self.run_text.is_empty() {
            return;
        }
        let content = RunContent::Text(std::mem::take(&mut self.run_text));
        let run = Run {
            formatting: self.current_fmt().clone(),
            content,
        };
        self.para.push(Inline::Run(run));
    }

    /// Emit a structurally distinct run (tab, placeholder, image).
    fn emit_run(&mut self, content: RunContent) {
        self.flush_run();
        self.para.push(Inline::Run(Run {
            formatting: self.current_fmt().clone(),
            content,
        }));
    }

    fn emit_break(&mut self, kind: BreakKind) {
        self.emit_run(RunContent::Break(kind));
    }

    // ----- paragraphs, sections, tables -----

    /// Paragraph properties snapshot for a flush. A dangling numbering
    /// reference points at nothing; drop it.
    fn paragraph_properties(&self) -> ParagraphProperties {
        let mut properties = self.para_props.clone();
        if let Some(ls) = properties.list_ref {
            if self.tables.lists.definition_for(ls).is_none() {
                properties.list_ref = None;
            }
        }
        properties
    }

    fn end_paragraph(&mut self) {
        self.flush_run();
        let paragraph = Paragraph {
            properties: self.paragraph_properties(),
            content: std::mem::take(&mut self.para),
        };
        if self.para_props.in_table {
            self.cell.paragraphs.push(paragraph);
        } else {
            self.finalize_table();
            self.blocks.push(Block::Paragraph(paragraph));
        }
    }

    /// Flush a paragraph only if something is pending; used at implicit
    /// close points (end of stream, end of a redirected destination).
    fn flush_pending_paragraph(&mut self) {
        self.flush_run();
        if !self.para.is_empty() {
            self.end_paragraph();
        }
    }

    fn end_section(&mut self) {
        self.flush_pending_paragraph();
        self.finalize_table();
        self.push_section();
    }

    fn push_section(&mut self) {
        self.sections.push(Section {
            properties: self.sect_props.clone(),
            parts: std::mem::take(&mut self.parts),
            blocks: std::mem::take(&mut self.blocks),
        });
    }

    fn start_row_definition(&mut self) {
        self.cell_bounds.clear();
        if self.table.is_none() {
            self.table = Some(TableBlock::default());
        }
    }

    fn end_cell(&mut self) {
        self.flush_run();
        let paragraph = Paragraph {
            properties: self.paragraph_properties(),
            content: std::mem::take(&mut self.para),
        };
        self.cell.paragraphs.push(paragraph);
        let mut cell = std::mem::take(&mut self.cell);
        cell.right_boundary = self.cell_bounds.get(self.row.cells.len()).copied();
        self.row.cells.push(cell);
    }

    fn end_row(&mut self) {
        if self.table.is_none() {
            self.table = Some(TableBlock::default());
        }
        let row = std::mem::take(&mut self.row);
        if !row.cells.is_empty() {
            if let Some(table) = &mut self.table {
                table.rows.push(row);
            }
        }
    }

    /// Close the table under construction, if any, into the block sink.
    fn finalize_table(&mut self) {
        if !self.row.cells.is_empty() {
            self.end_row();
        }
        if let Some(table) = self.table.take() {
            if !table.rows.is_empty() {
                self.blocks.push(Block::Table(table));
            }
        }
        self.cell_bounds.clear();
    }

    // ----- destinations that redirect output -----

    /// Walk a destination group into a fresh block container, saving and
    /// restoring every structural accumulator around it. Formatting still
    /// nests normally: the sub-walk starts from a clone of the current state.
    fn build_redirected(&mut self, group: &Group) -> Vec<Block> {
        let saved_para_props = std::mem::take(&mut self.para_props);
        let saved_para = std::mem::take(&mut self.para);
        let saved_run = std::mem::take(&mut self.run_text);
        let saved_blocks = std::mem::take(&mut self.blocks);
        let saved_table = self.table.take();
        let saved_row = std::mem::take(&mut self.row);
        let saved_cell = std::mem::take(&mut self.cell);
        let saved_bounds = std::mem::take(&mut self.cell_bounds);

        self.fmt_stack.push(self.current_fmt().clone());
        self.walk_children(group);
        self.flush_pending_paragraph();
        self.finalize_table();
        self.fmt_stack.pop();

        let out = std::mem::replace(&mut self.blocks, saved_blocks);
        self.para_props = saved_para_props;
        self.para = saved_para;
        self.run_text = saved_run;
        self.table = saved_table;
        self.row = saved_row;
        self.cell = saved_cell;
        self.cell_bounds = saved_bounds;
        out
    }

    fn handle_info(&mut self, group: &Group) {
        for sub in group.subgroups() {
            let Some((name, _)) = sub.first_word() else { continue };
            let text = sub.direct_text().trim().to_string();
            if text.is_empty() {
                continue;
            }
            match name {
                "title" => self.metadata.title = Some(text),
                "author" => self.metadata.author = Some(text),
                "subject" => self.metadata.subject = Some(text),
                _ => {}
            }
        }
    }

    fn handle_footnote(&mut self, group: &Group) {
        let id = self.notes.len() as u32 + 1;
        self.flush_run();
        self.para.push(Inline::NoteReference(id));

        let endnote = group.children.iter().any(|child| {
            matches!(
                child,
                GroupContent::Token(Token::ControlWord { name, .. }) if name == "ftnalt"
            )
        });

        let blocks = self.build_redirected(group);
        let paragraphs = blocks
            .into_iter()
            .filter_map(|block| match block {
                Block::Paragraph(p) => Some(p),
                Block::Table(_) => None,
            })
            .collect();
        self.notes.push(Note {
            id,
            endnote,
            paragraphs,
        });
    }

    /// Assemble the four-part field construct from the two sibling
    /// destinations under one field group.
    fn handle_field(&mut self, group: &Group) {
        let mut instruction = String::new();
        let mut result = Vec::new();

        for sub in group.subgroups() {
            match sub.destination {
                Some(Destination::FieldInstruction) => {
                    instruction.push_str(&collect_text(sub));
                }
                Some(Destination::FieldResult) => {
                    result = self.build_result_runs(sub);
                }
                _ => {}
            }
        }

        let instruction = instruction.trim().to_string();
        if instruction.is_empty() && result.is_empty() {
            return;
        }
        let field = Field {
            kind: classify_instruction(&instruction),
            instruction,
            result,
        };
        self.flush_run();
        self.para.push(Inline::Field(field));
    }

    fn build_result_runs(&mut self, group: &Group) -> Vec<Run> {
        let blocks = self.build_redirected(group);
        let mut runs = Vec::new();
        for block in blocks {
            if let Block::Paragraph(p) = block {
                for inline in p.content {
                    match inline {
                        Inline::Run(run) => runs.push(run),
                        Inline::Field(field) => runs.extend(field.result),
                        _ => {}
                    }
                }
            }
        }
        runs
    }

    /// Accumulate a picture destination: format and dimension words plus the
    /// hex (or raw binary) payload, materialized when the group closes.
    fn handle_picture(&mut self, group: &Group) {
        let mut image = Image::default();
        let mut hex = String::new();

        for child in &group.children {
            match child {
                GroupContent::Token(Token::ControlWord { name, value, .. }) => {
                    match name.as_str() {
                        "pngblip" => image.format = ImageFormat::Png,
                        "jpegblip" => image.format = ImageFormat::Jpeg,
                        "emfblip" => image.format = ImageFormat::Emf,
                        "wmetafile" | "pmmetafile" => image.format = ImageFormat::Wmf,
                        "dibitmap" | "wbitmap" => image.format = ImageFormat::Dib,
                        "picw" => image.width = *value,
                        "pich" => image.height = *value,
                        "picwgoal" => image.goal_width = *value,
                        "pichgoal" => image.goal_height = *value,
                        "picscalex" => image.scale_x = *value,
                        "picscaley" => image.scale_y = *value,
                        _ => {}
                    }
                }
                GroupContent::Token(Token::Text(text)) => {
                    hex.extend(text.chars().filter(|c| !c.is_whitespace()));
                }
                GroupContent::Token(Token::Binary(bytes)) => {
                    image.data = bytes.clone();
                }
                // Property sub-groups and structural tokens carry no payload
                _ => {}
            }
        }

        if image.data.is_empty() {
            image.data = decode_hex(&hex);
        }
        if image.data.is_empty() {
            return;
        }
        self.emit_run(RunContent::Image(image));
    }
}

/// Concatenate the text content of a subtree, resolving `\uN` escapes and
/// discarding their legacy fallback characters. Used for field instructions,
/// which may nest arbitrarily.
fn collect_text(group: &Group) -> String {
    let mut out = String::new();
    collect_text_into(group, &mut out, 1, 0);
    out
}

fn collect_text_into(group: &Group, out: &mut String, mut skip: u32, mut pending: u32) {
    for child in &group.children {
        match child {
            GroupContent::Token(Token::Text(t)) => {
                let mut chars = t.chars();
                while pending > 0 && chars.next().is_some() {
                    pending -= 1;
                }
                out.push_str(chars.as_str());
            }
            GroupContent::Token(Token::ControlWord { name, value, .. }) => match name.as_str() {
                "uc" => skip = value.unwrap_or(1).max(0) as u32,
                "u" => {
                    if let Some(mut code) = *value {
                        if code < 0 {
                            code += 65536;
                        }
                        if let Some(c) = char::from_u32(code as u32) {
                            out.push(c);
                        }
                    }
                    pending = skip;
                }
                _ => {}
            },
            // The skip configuration and countdown scope with the braces
            GroupContent::Group(sub) => collect_text_into(sub, out, skip, pending),
            _ => {}
        }
    }
}

/// Decode a hex payload, tolerating odd trailing digits.
fn decode_hex(hex: &str) -> Vec<u8> {
    let digits: Vec<u32> = hex.chars().filter_map(|c| c.to_digit(16)).collect();
    digits
        .chunks_exact(2)
        .map(|pair| (pair[0] * 16 + pair[1]) as u8)
        .collect()
}
