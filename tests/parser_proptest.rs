//! Property-based tests for the RTF pipeline
//!
//! These tests ensure that the pipeline never panics, regardless of input:
//! arbitrary bytes, arbitrary brace nesting, and generated documents built
//! from valid fragments must all either convert or fail with the one
//! recoverable error.

use proptest::prelude::*;

use docloom::rtf;
use docloom::rtf::group::build_tree;
use docloom::rtf::tokenizer::Tokenizer;

proptest! {
    /// Arbitrary bytes: tokenization must always terminate without panicking.
    #[test]
    fn tokenizer_never_panics(input in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _tokens: Vec<_> = Tokenizer::new(&input).collect();
    }

    /// Arbitrary bytes: the full pipeline must either produce a document or
    /// report that the input is not a document.
    #[test]
    fn parse_never_panics(input in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = rtf::parse(&input);
    }

    /// Anything prefixed with a group open always builds a tree: every other
    /// structural defect is repaired.
    #[test]
    fn group_open_prefix_always_yields_tree(tail in proptest::collection::vec(any::<u8>(), 0..256)) {
        let mut input = vec![b'{'];
        input.extend(tail);
        prop_assert!(build_tree(Tokenizer::new(&input)).is_ok());
    }

    /// Documents assembled from valid fragments convert, and their plain
    /// visible text survives into the output in order.
    #[test]
    fn generated_documents_convert(words in proptest::collection::vec(
        prop_oneof![
            Just("\\b ".to_string()),
            Just("\\b0 ".to_string()),
            Just("\\i ".to_string()),
            Just("{".to_string()),
            Just("}".to_string()),
            Just("\\par ".to_string()),
            Just("\\pard ".to_string()),
            Just("\\plain ".to_string()),
            Just("\\u8364?".to_string()),
            "[a-z]{1,8}",
        ],
        0..64,
    )) {
        let mut input = String::from("{\\rtf1 ");
        for word in &words {
            input.push_str(word);
        }
        let doc = rtf::parse(input.as_bytes()).expect("fragment documents parse");

        // Visible text fragments must appear in order in the body
        let body = doc.body_text();
        let mut cursor = 0;
        for word in &words {
            if word.chars().all(|c| c.is_ascii_lowercase()) {
                if let Some(at) = body[cursor..].find(word.as_str()) {
                    cursor += at + word.len();
                } else {
                    prop_assert!(false, "fragment {:?} lost from body {:?}", word, body);
                }
            }
        }
    }
}
