//! End-to-end conversion tests for complete RTF documents
//!
//! These tests run the full pipeline (reader, tokenizer, group builder,
//! table resolvers, document builder) over self-contained documents and
//! assert on the structured output. This includes:
//! - Formatting scope and reset semantics
//! - Legacy encodings and the Unicode fallback-skip protocol
//! - Lookup table resolution (fonts, colors, numbering)
//! - Structural destinations (headers, notes, fields, pictures, tables)

use docloom::rtf;
use docloom::rtf::destination::HeaderFooterKind;
use docloom::rtf::document::{Alignment, Block, FieldKind, Inline, Paragraph, RunContent};

fn parse(input: &[u8]) -> rtf::Document {
    rtf::parse(input).expect("document should parse")
}

fn paragraphs(doc: &rtf::Document) -> Vec<&Paragraph> {
    doc.sections
        .iter()
        .flat_map(|s| &s.blocks)
        .filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
        .collect()
}

// ===== Formatting scope =====

#[test]
fn test_group_scoped_formatting_does_not_leak() {
    let doc = parse(b"{\\rtf1 before {\\b\\i inner}after\\par}");
    let para = paragraphs(&doc)[0];
    let runs: Vec<_> = para
        .content
        .iter()
        .filter_map(|i| match i {
            Inline::Run(r) => Some(r),
            _ => None,
        })
        .collect();
    assert_eq!(runs.len(), 3);
    assert!(!runs[0].formatting.bold);
    assert!(runs[1].formatting.bold && runs[1].formatting.italic);
    assert!(!runs[2].formatting.bold && !runs[2].formatting.italic);
    assert_eq!(para.text(), "before innerafter");
}

#[test]
fn test_paragraph_and_section_resets_are_independent() {
    // \pard must leave section properties alone; \sectd must leave
    // paragraph properties alone
    let doc = parse(b"{\\rtf1\\paperw6000\\qc first\\par\\pard second\\par}");
    assert_eq!(doc.sections[0].properties.page_width, 6000);
    let paras = paragraphs(&doc);
    assert_eq!(paras[0].properties.alignment, Alignment::Center);
    assert_eq!(paras[1].properties.alignment, Alignment::Left);

    let doc = parse(b"{\\rtf1\\qc one\\par\\sectd two\\par}");
    let paras = paragraphs(&doc);
    assert_eq!(paras[0].properties.alignment, Alignment::Center);
    assert_eq!(paras[1].properties.alignment, Alignment::Center);
}

#[test]
fn test_boolean_convention() {
    // Absent parameter and parameter 1 both mean "on"; only 0 means "off"
    for input in [
        b"{\\rtf1\\b on\\par}".as_slice(),
        b"{\\rtf1\\b1 on\\par}".as_slice(),
        b"{\\rtf1\\b99 on\\par}".as_slice(),
    ] {
        let doc = parse(input);
        match &paragraphs(&doc)[0].content[0] {
            Inline::Run(r) => assert!(r.formatting.bold, "input: {:?}", input),
            other => panic!("expected run, got {:?}", other),
        }
    }
    let doc = parse(b"{\\rtf1\\b\\b0 off\\par}");
    match &paragraphs(&doc)[0].content[0] {
        Inline::Run(r) => assert!(!r.formatting.bold),
        other => panic!("expected run, got {:?}", other),
    }
}

// ===== Encodings and Unicode =====

#[test]
fn test_codepage_1251_text() {
    // "Привет" in CP1251 hex escapes
    let doc = parse(b"{\\rtf1\\ansi\\ansicpg1251 \\'cf\\'f0\\'e8\\'e2\\'e5\\'f2\\par}");
    assert_eq!(paragraphs(&doc)[0].text(), "\u{41F}\u{440}\u{438}\u{432}\u{435}\u{442}");
}

#[test]
fn test_unicode_escape_with_fallback_discard() {
    // \uc1 (the default) discards exactly one fallback character per \uN
    let doc = parse(b"{\\rtf1 \\u8364?euro\\par}");
    assert_eq!(paragraphs(&doc)[0].text(), "\u{20AC}euro");
}

#[test]
fn test_uc2_discards_two_fallback_chars_across_tokens() {
    let doc = parse(b"{\\rtf1\\uc2\\u8364\\'80? rest\\par}");
    assert_eq!(paragraphs(&doc)[0].text(), "\u{20AC} rest");
}

#[test]
fn test_font_charset_switches_decoding() {
    // Font 1 declares the Cyrillic charset; \f1 text must decode as CP1251
    let doc = parse(
        b"{\\rtf1{\\fonttbl{\\f0\\fswiss Arial;}{\\f1\\fcharset204 Arial CYR;}}\\f1 \\'e4\\'e0\\par}",
    );
    assert_eq!(paragraphs(&doc)[0].text(), "\u{434}\u{430}");
}

// ===== Lookup tables =====

#[test]
fn test_font_table_resolution() {
    let doc = parse(b"{\\rtf1{\\fonttbl{\\f0\\froman Times New Roman;}{\\f2\\fswiss Arial;}}x\\par}");
    let fonts = &doc.tables.fonts;
    assert_eq!(fonts.len(), 2);
    assert_eq!(fonts[&0].name, "Times New Roman");
    assert_eq!(fonts[&2].name, "Arial");
}

#[test]
fn test_color_table_with_auto_entry() {
    // A leading bare ';' is the auto color at index 0; \cf indexes line up
    let doc = parse(
        b"{\\rtf1{\\colortbl;\\red255\\green0\\blue0;\\red0\\green0\\blue255;}\\cf2 blue\\par}",
    );
    assert_eq!(doc.tables.colors.len(), 3);
    assert_eq!(doc.tables.colors[1].red, 255);
    assert_eq!(doc.tables.colors[2].blue, 255);
    match &paragraphs(&doc)[0].content[0] {
        Inline::Run(r) => assert_eq!(r.formatting.color, Some(2)),
        other => panic!("expected run, got {:?}", other),
    }
}

#[test]
fn test_stylesheet_is_skipped() {
    let doc = parse(b"{\\rtf1{\\stylesheet{\\s0 Normal;}{\\s1\\b Heading;}}body\\par}");
    assert_eq!(doc.body_text(), "body");
}

#[test]
fn test_list_tables_bind_paragraph_numbering() {
    let doc = parse(
        b"{\\rtf1{\\*\\listtable{\\list\\listid77{\\listlevel\\levelnfc23\\levelstartat1}}}\
{\\*\\listoverridetable{\\listoverride\\listid77\\ls1}}\
\\ls1\\ilvl0 item\\par}",
    );
    let para = paragraphs(&doc)[0].clone();
    assert_eq!(para.properties.list_ref, Some(1));
    let def = doc
        .tables
        .lists
        .definition_for(1)
        .expect("override 1 resolves to list 77");
    assert_eq!(def.id, 77);
}

// ===== Structural destinations =====

#[test]
fn test_headers_and_footers_attach_to_section() {
    let doc = parse(
        b"{\\rtf1{\\header default head}{\\footerf first foot}body\\par}",
    );
    let parts = &doc.sections[0].parts;
    assert!(parts.headers.contains_key(&HeaderFooterKind::Default));
    assert!(parts.footers.contains_key(&HeaderFooterKind::First));
    match &parts.headers[&HeaderFooterKind::Default][0] {
        Block::Paragraph(p) => assert_eq!(p.text(), "default head"),
        other => panic!("expected paragraph, got {:?}", other),
    }
    assert_eq!(doc.body_text(), "body");
}

#[test]
fn test_footnote_extraction() {
    let doc = parse(b"{\\rtf1 claim\\chftn{\\footnote\\chftn see appendix}\\par}");
    assert_eq!(doc.notes.len(), 1);
    assert_eq!(doc.notes[0].paragraphs[0].text(), "see appendix");
    assert!(!doc.notes[0].endnote);
    assert_eq!(doc.body_text(), "claim");
}

#[test]
fn test_hyperlink_field() {
    let doc = parse(
        b"{\\rtf1{\\field{\\*\\fldinst HYPERLINK \"https://example.org/\"}{\\fldrslt the site}}\\par}",
    );
    let para = paragraphs(&doc)[0];
    let field = para
        .content
        .iter()
        .find_map(|i| match i {
            Inline::Field(f) => Some(f),
            _ => None,
        })
        .expect("field");
    assert_eq!(
        field.kind,
        FieldKind::Hyperlink {
            target: "https://example.org/".to_string()
        }
    );
    assert_eq!(para.text(), "the site");
}

#[test]
fn test_table_with_two_rows() {
    let doc = parse(
        b"{\\rtf1\\trowd\\cellx3000\\cellx6000\
\\intbl r1c1\\cell r1c2\\cell\\row\
\\trowd\\cellx3000\\cellx6000\
\\intbl r2c1\\cell r2c2\\cell\\row\
\\pard done\\par}",
    );
    let table = doc
        .sections
        .iter()
        .flat_map(|s| &s.blocks)
        .find_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
        .expect("table block");
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[1].cells[0].paragraphs[0].text(), "r2c1");
    assert_eq!(table.rows[1].cells[1].right_boundary, Some(6000));
}

#[test]
fn test_document_metadata() {
    let doc = parse(
        b"{\\rtf1{\\info{\\title Quarterly Report}{\\author A. Writer}{\\subject Finance}}x\\par}",
    );
    assert_eq!(doc.metadata.title.as_deref(), Some("Quarterly Report"));
    assert_eq!(doc.metadata.author.as_deref(), Some("A. Writer"));
    assert_eq!(doc.metadata.subject.as_deref(), Some("Finance"));
}

#[test]
fn test_picture_with_binary_payload_containing_brace() {
    // \binN consumes its payload as raw bytes; a '{' inside must not open
    // a group
    let doc = parse(b"{\\rtf1{\\pict\\pngblip\\bin4 \x89{NG}after\\par}");
    assert_eq!(doc.body_text(), "after");
    let image = doc
        .sections
        .iter()
        .flat_map(|s| &s.blocks)
        .filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
        .flat_map(|p| &p.content)
        .find_map(|i| match i {
            Inline::Run(r) => match &r.content {
                RunContent::Image(img) => Some(img),
                _ => None,
            },
            _ => None,
        })
        .expect("image run");
    assert_eq!(image.data, b"\x89{NG".to_vec());
}

#[test]
fn test_special_characters_and_breaks() {
    let doc = parse(b"{\\rtf1 a\\emdash b\\line c\\tab d\\~e\\par}");
    assert_eq!(paragraphs(&doc)[0].text(), "a\u{2014}b\nc\td\u{A0}e");
}

#[test]
fn test_multi_section_document() {
    let doc = parse(b"{\\rtf1\\cols2 two columns\\par\\sect\\sectd one column\\par}");
    assert_eq!(doc.sections.len(), 2);
    assert_eq!(doc.sections[0].properties.columns, 2);
    assert_eq!(doc.sections[1].properties.columns, 1);
}
