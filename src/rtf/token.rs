//! Atomic token types produced by the tokenizer.
//!
//! Tokens are immutable once produced. A control word keeps its raw name and
//! optional signed parameter even when nothing downstream recognizes it:
//! unknown words are preserved for the next stage to ignore or use, never
//! rejected.

use serde::Serialize;

/// One atomic token from the RTF character stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Token {
    /// A control word: backslash, lowercase ASCII name, optional signed
    /// integer parameter, optionally terminated by a single space delimiter.
    ControlWord {
        name: String,
        value: Option<i32>,
        delimited_by_space: bool,
    },
    /// A literal text run, already decoded through the active encoding.
    Text(String),
    /// A declared-length binary region (`\binN`), captured verbatim.
    Binary(Vec<u8>),
    /// `{`
    GroupStart,
    /// `}`
    GroupEnd,
}

impl Token {
    /// Shorthand for a control word without a parameter.
    pub fn word(name: &str) -> Token {
        Token::ControlWord {
            name: name.to_string(),
            value: None,
            delimited_by_space: false,
        }
    }

    /// Shorthand for a control word with a parameter.
    pub fn word_with(name: &str, value: i32) -> Token {
        Token::ControlWord {
            name: name.to_string(),
            value: Some(value),
            delimited_by_space: false,
        }
    }

    /// Shorthand for a text token.
    pub fn text(content: &str) -> Token {
        Token::Text(content.to_string())
    }

    /// Whether this token can name a group's destination.
    ///
    /// Only control words qualify, and the `\*` extension marker is excluded:
    /// it flags the group as ignorable but the word after it is the one that
    /// names the destination.
    pub fn is_word_class(&self) -> bool {
        matches!(self, Token::ControlWord { name, .. } if name != "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_class() {
        assert!(Token::word("fonttbl").is_word_class());
        assert!(!Token::word("*").is_word_class());
        assert!(!Token::text("hello").is_word_class());
        assert!(!Token::GroupStart.is_word_class());
    }
}
