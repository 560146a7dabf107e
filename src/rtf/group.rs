//! Group tree assembly from the flat token stream.
//!
//! The group builder is the one stage that materializes the lazy token
//! sequence: it consumes the tokenizer exactly once and produces a strict
//! tree of brace-delimited scopes. Each group is tagged with a destination
//! from its first word-class token, and a `\*` marker immediately after the
//! opening brace flags the group as an ignorable extension without itself
//! becoming the destination.
//!
//! Structural anomalies are repaired in place: a spurious closing brace at
//! the document root is a no-op, and any groups still open at end of input
//! are closed implicitly. The only fatal condition is a stream that does not
//! begin with a group start, because then there is no document at all.

use serde::Serialize;

use crate::rtf::destination::Destination;
use crate::rtf::error::{ParseResult, RtfError};
use crate::rtf::token::Token;

/// One item inside a group: an atomic token or a nested scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GroupContent {
    Token(Token),
    Group(Group),
}

/// A brace-delimited scope. Owned exclusively by its parent; the tree has no
/// back-references and no cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Group {
    /// Destination identity from the first word-class token, if any.
    pub destination: Option<Destination>,
    /// Set by a `\*` extension marker right after the opening brace.
    pub ignorable: bool,
    pub children: Vec<GroupContent>,
}

impl Group {
    /// The first control word in this group, if any.
    pub fn first_word(&self) -> Option<(&str, Option<i32>)> {
        self.children.iter().find_map(|child| match child {
            GroupContent::Token(Token::ControlWord { name, value, .. }) if name != "*" => {
                Some((name.as_str(), *value))
            }
            _ => None,
        })
    }

    /// Iterate over directly nested groups.
    pub fn subgroups(&self) -> impl Iterator<Item = &Group> {
        self.children.iter().filter_map(|child| match child {
            GroupContent::Group(g) => Some(g),
            _ => None,
        })
    }

    /// Concatenate the text tokens directly inside this group.
    pub fn direct_text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let GroupContent::Token(Token::Text(t)) = child {
                out.push_str(t);
            }
        }
        out
    }

    fn add_token(&mut self, token: Token) {
        if self.children.is_empty() {
            if let Token::ControlWord { name, .. } = &token {
                if !token.is_word_class() {
                    // The marker flags the group; the next word names it
                    self.ignorable = true;
                    return;
                }
                if self.destination.is_none() {
                    self.destination = Some(Destination::from_name(name));
                }
            }
        }
        self.children.push(GroupContent::Token(token));
    }
}

/// Assemble the token sequence into a group tree.
///
/// Fails only when the first structural token is not a group start.
pub fn build_tree<I>(tokens: I) -> ParseResult<Group>
where
    I: IntoIterator<Item = Token>,
{
    let mut iter = tokens.into_iter();
    match iter.next() {
        Some(Token::GroupStart) => {}
        Some(other) => {
            return Err(RtfError::NotRtf(format!(
                "expected an opening group, found {:?}",
                other
            )))
        }
        None => return Err(RtfError::NotRtf("empty input".to_string())),
    }

    // stack[0] is the root group; it only closes at end of input
    let mut stack: Vec<Group> = vec![Group::default()];

    for token in iter {
        match token {
            Token::GroupStart => stack.push(Group::default()),
            Token::GroupEnd => {
                if stack.len() > 1 {
                    let closed = stack.pop().expect("stack holds at least the root");
                    let parent = stack.last_mut().expect("root is never popped");
                    parent.children.push(GroupContent::Group(closed));
                }
                // A close at the root is spurious; ignore it
            }
            other => {
                let top = stack.last_mut().expect("stack holds at least the root");
                top.add_token(other);
            }
        }
    }

    // Implicitly close whatever end-of-input left open
    while stack.len() > 1 {
        let closed = stack.pop().expect("stack holds at least the root");
        let parent = stack.last_mut().expect("root is never popped");
        parent.children.push(GroupContent::Group(closed));
    }

    Ok(stack.pop().expect("root group"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::destination::HeaderFooterKind;
    use crate::rtf::tokenizer::Tokenizer;

    fn tree(input: &[u8]) -> Group {
        build_tree(Tokenizer::new(input)).expect("valid tree")
    }

    #[test]
    fn test_rejects_non_group_start() {
        let err = build_tree(Tokenizer::new(b"hello")).unwrap_err();
        assert!(matches!(err, RtfError::NotRtf(_)));
        assert!(build_tree(Tokenizer::new(b"")).is_err());
    }

    #[test]
    fn test_nested_groups() {
        let root = tree(b"{\\rtf1{\\b nested}tail}");
        assert_eq!(root.destination, Some(Destination::Unknown("rtf".into())));
        let nested: Vec<&Group> = root.subgroups().collect();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].first_word(), Some(("b", None)));
        assert_eq!(root.direct_text(), "tail");
    }

    #[test]
    fn test_destination_from_first_word() {
        let root = tree(b"{\\rtf1{\\fonttbl{\\f0 Arial;}}}");
        let fonttbl = root.subgroups().next().unwrap();
        assert_eq!(fonttbl.destination, Some(Destination::FontTable));
    }

    #[test]
    fn test_extension_marker_sets_ignorable_not_destination() {
        let root = tree(b"{\\rtf1{\\*\\bkmkstart mark}}");
        let bookmark = root.subgroups().next().unwrap();
        assert!(bookmark.ignorable);
        assert_eq!(bookmark.destination, Some(Destination::BookmarkStart));
    }

    #[test]
    fn test_text_first_group_has_no_destination() {
        let root = tree(b"{\\rtf1{plain \\b text}}");
        let inner = root.subgroups().next().unwrap();
        assert_eq!(inner.destination, None);
    }

    #[test]
    fn test_spurious_close_is_ignored() {
        let root = tree(b"{\\rtf1 a}}b");
        // Trailing content after the spurious closes still lands in the root
        assert_eq!(root.direct_text(), "ab");
    }

    #[test]
    fn test_missing_closes_repaired_at_eof() {
        let root = tree(b"{\\rtf1{\\b deep{\\i deeper");
        let b = root.subgroups().next().unwrap();
        let i = b.subgroups().next().unwrap();
        assert_eq!(i.first_word(), Some(("i", None)));
    }

    #[test]
    fn test_header_variants() {
        let root = tree(b"{\\rtf1{\\headerl x}{\\footerf y}}");
        let kinds: Vec<_> = root.subgroups().map(|g| g.destination.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                Some(Destination::Header(HeaderFooterKind::Left)),
                Some(Destination::Footer(HeaderFooterKind::First)),
            ]
        );
    }
}
