//! Malformed-input recovery tests
//!
//! The pipeline's contract is containment: unknown control words and
//! destinations are no-ops, structural damage is repaired in place, and the
//! only fatal condition is input that does not open with a group. These
//! tests feed in progressively broken documents and assert that the
//! well-formed remainder still converts.

use docloom::rtf;
use docloom::rtf::RtfError;

#[test]
fn test_input_not_opening_with_group_is_fatal() {
    for input in [b"hello world".as_slice(), b"\\rtf1 no braces".as_slice(), b"".as_slice()] {
        let err = rtf::parse(input).unwrap_err();
        assert!(matches!(err, RtfError::NotRtf(_)), "input: {:?}", input);
    }
}

#[test]
fn test_unknown_control_words_are_ignored() {
    let doc = rtf::parse(b"{\\rtf1\\nosuchword42 kept\\alsofake text\\par}").unwrap();
    assert_eq!(doc.body_text(), "kept text");
}

#[test]
fn test_unknown_ignorable_destination_is_contained() {
    let doc = rtf::parse(b"{\\rtf1 a{\\*\\futurefeature{\\deep junk}}b\\par}").unwrap();
    assert_eq!(doc.body_text(), "ab");
}

#[test]
fn test_unknown_plain_destination_keeps_its_text() {
    // Without the \* marker an unknown leading word is just an unknown word;
    // the group's text is ordinary content
    let doc = rtf::parse(b"{\\rtf1 a{\\futurefeature b}c\\par}").unwrap();
    assert_eq!(doc.body_text(), "abc");
}

#[test]
fn test_unbalanced_open_braces_close_at_eof() {
    let doc = rtf::parse(b"{\\rtf1{\\b bold{\\i never closed").unwrap();
    assert_eq!(doc.body_text(), "boldnever closed");
}

#[test]
fn test_spurious_close_brace_is_ignored() {
    let doc = rtf::parse(b"{\\rtf1 a}}}b\\par}").unwrap();
    assert_eq!(doc.body_text(), "ab");
}

#[test]
fn test_malformed_parameter_is_treated_as_no_value() {
    // A parameter longer than the format allows is dropped; for a boolean
    // word no value means "on"
    let doc = rtf::parse(b"{\\rtf1\\b123456789012345 x\\par}").unwrap();
    let json = serde_json::to_string(&doc).unwrap();
    assert!(json.contains("\"bold\":true"));
    assert_eq!(doc.body_text(), "x");
}

#[test]
fn test_stray_hex_escape_with_truncated_digits() {
    // \'q is not valid hex; nothing decodable, nothing emitted, no panic
    let doc = rtf::parse(b"{\\rtf1 a\\'q b\\par}").unwrap();
    assert!(doc.body_text().starts_with('a'));
}

#[test]
fn test_binary_run_truncated_at_eof() {
    // \bin claims more bytes than remain; the reader hands back what exists
    let doc = rtf::parse(b"{\\rtf1 x{\\pict\\bin100 abc").unwrap();
    assert_eq!(doc.body_text(), "x");
}

#[test]
fn test_control_word_at_eof() {
    let doc = rtf::parse(b"{\\rtf1 text\\b").unwrap();
    assert_eq!(doc.body_text(), "text");
}

#[test]
fn test_lone_backslash_at_eof() {
    let doc = rtf::parse(b"{\\rtf1 text\\").unwrap();
    assert_eq!(doc.body_text(), "text");
}
