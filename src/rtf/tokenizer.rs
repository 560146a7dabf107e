//! Single-pass tokenizer for the RTF character stream.
//!
//! The tokenizer consumes characters from a [`Reader`] and yields a lazy,
//! forward-only sequence of [`Token`]s. It is consumed exactly once; the
//! group builder materializes the sequence for everything downstream.
//!
//! Two pieces of state make this more than a plain scanner:
//!
//! - An encoding-context stack. The active codepage can change mid-stream
//!   (`\ansicpgN`, charset family words, per-font `\fcharsetN` declarations
//!   picked up while the font table streams by) and every change is scoped to
//!   the enclosing brace group, so `{` pushes a clone and `}` restores the
//!   parent's encoding.
//!
//! - A binary pass-through mode. Once `\binN` declares a byte count, the next
//!   N bytes are captured verbatim as one `Binary` token; braces and
//!   backslashes inside are not interpreted.
//!
//! Lexical anomalies are recovered locally: a malformed numeric parameter
//! becomes "no value", a truncated hex escape emits nothing, and a backslash
//! at end of stream is dropped silently.

use std::collections::HashMap;

use crate::rtf::encoding::{charset_to_encoding, codepage_to_encoding, family_to_encoding};
use crate::rtf::reader::Reader;
use crate::rtf::state::EncodingContext;
use crate::rtf::token::Token;

/// Longest run of digits accepted for a control-word parameter. Anything
/// longer is malformed and treated as "no value supplied".
const MAX_PARAM_DIGITS: usize = 10;

/// Streaming tokenizer over an RTF byte buffer.
pub struct Tokenizer<'a> {
    reader: Reader<'a>,
    /// Scope stack for the active encoding; top mirrors the reader.
    encodings: Vec<EncodingContext>,
    /// Font index -> encoding, learned from `\fcharsetN` in the font table.
    font_encodings: HashMap<i32, &'static encoding_rs::Encoding>,
    /// The `\fN` index most recently seen, for attributing `\fcharsetN`.
    last_font: Option<i32>,
    /// The document default font (`\deffN`), restored by `\plain`.
    default_font: Option<i32>,
    /// A token produced while finishing a hex run, emitted on the next pull.
    pending: Option<Token>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(bytes),
            encodings: vec![EncodingContext::default()],
            font_encodings: HashMap::new(),
            last_font: None,
            default_font: None,
            pending: None,
        }
    }

    /// Produce the next token, or `None` at end of stream.
    fn next_token(&mut self) -> Option<Token> {
        loop {
            let c = self.reader.read()?;
            match c {
                '{' => {
                    let top = self.current_context();
                    self.encodings.push(top);
                    return Some(Token::GroupStart);
                }
                '}' => {
                    if self.encodings.len() > 1 {
                        self.encodings.pop();
                    }
                    let restored = self.current_context();
                    self.reader.set_encoding(restored.encoding);
                    return Some(Token::GroupEnd);
                }
                '\\' => {
                    if let Some(token) = self.read_escape() {
                        return Some(token);
                    }
                    // Ignorable escape (or backslash at end of stream)
                }
                '\r' | '\n' => {}
                '\t' => return Some(Token::word("tab")),
                _ => return Some(self.read_text(c)),
            }
        }
    }

    fn current_context(&self) -> EncodingContext {
        *self.encodings.last().expect("encoding stack never empties")
    }

    fn set_current_encoding(&mut self, encoding: &'static encoding_rs::Encoding) {
        if let Some(top) = self.encodings.last_mut() {
            top.encoding = encoding;
        }
        self.reader.set_encoding(encoding);
    }

    /// Handle the character(s) after a backslash.
    fn read_escape(&mut self) -> Option<Token> {
        let c = self.reader.peek()?;
        match c {
            '\'' => {
                self.reader.read();
                self.read_hex_run()
            }
            'a'..='z' | 'A'..='Z' => Some(self.read_control_word()),
            '{' | '}' | '\\' => {
                self.reader.read();
                Some(Token::Text(c.to_string()))
            }
            '~' => {
                self.reader.read();
                Some(Token::text("\u{00A0}"))
            }
            '-' => {
                self.reader.read();
                Some(Token::text("\u{00AD}"))
            }
            '_' => {
                self.reader.read();
                Some(Token::text("\u{2011}"))
            }
            '*' => {
                self.reader.read();
                Some(Token::word("*"))
            }
            '\r' | '\n' => {
                // \<CR> is a paragraph end by format convention
                self.reader.read();
                Some(Token::word("par"))
            }
            _ => {
                // \| \: and friends carry no content we preserve
                self.reader.read();
                None
            }
        }
    }

    /// Read a run of `\'xx` hex escapes and decode the collected bytes with
    /// the active encoding. Consecutive escapes are decoded together so that
    /// double-byte codepages see complete sequences.
    fn read_hex_run(&mut self) -> Option<Token> {
        let mut bytes = Vec::new();
        loop {
            match self.read_hex_byte() {
                Some(b) => bytes.push(b),
                None => break,
            }
            // Only continue through an immediately following \'xx escape
            if self.reader.peek() != Some('\\') {
                break;
            }
            self.reader.read();
            if self.reader.peek() != Some('\'') {
                // Some other escape; hand it back to the main loop by
                // re-running the escape reader on the next iteration.
                return match self.read_escape() {
                    Some(next) => {
                        let decoded = self.decode_bytes(&bytes);
                        if decoded.is_empty() {
                            Some(next)
                        } else if let Token::Text(tail) = next {
                            Some(Token::Text(decoded + &tail))
                        } else {
                            // A control word follows; the decoded text token
                            // is emitted first and the word re-read later is
                            // not possible, so fold it into the pending queue.
                            self.pending = Some(next);
                            Some(Token::Text(decoded))
                        }
                    }
                    None => {
                        let decoded = self.decode_bytes(&bytes);
                        if decoded.is_empty() {
                            None
                        } else {
                            Some(Token::Text(decoded))
                        }
                    }
                };
            }
            self.reader.read();
        }
        let decoded = self.decode_bytes(&bytes);
        if decoded.is_empty() {
            None
        } else {
            Some(Token::Text(decoded))
        }
    }

    /// Read the two hex digits of a `\'xx` escape. Truncated or malformed
    /// escapes yield nothing.
    fn read_hex_byte(&mut self) -> Option<u8> {
        let hi = self.reader.read()?.to_digit(16)?;
        let lo = self.reader.read()?.to_digit(16)?;
        Some((hi * 16 + lo) as u8)
    }

    fn decode_bytes(&self, bytes: &[u8]) -> String {
        if bytes.is_empty() {
            return String::new();
        }
        let (decoded, _) = self
            .current_context()
            .encoding
            .decode_without_bom_handling(bytes);
        decoded.into_owned()
    }

    /// Read a control word: letters, optional signed integer, optional single
    /// space delimiter.
    fn read_control_word(&mut self) -> Token {
        let mut name = String::new();
        while let Some(c) = self.reader.peek() {
            if c.is_ascii_alphabetic() {
                name.push(c);
                self.reader.read();
            } else {
                break;
            }
        }

        let mut value = None;
        let negative = self.reader.peek() == Some('-');
        if negative {
            self.reader.read();
        }
        let mut digits = String::new();
        while let Some(c) = self.reader.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            if digits.len() < MAX_PARAM_DIGITS {
                digits.push(c);
            }
            self.reader.read();
        }
        if !digits.is_empty() {
            // Out-of-range parameters are malformed: no value supplied
            value = digits
                .parse::<i64>()
                .ok()
                .map(|v| if negative { -v } else { v })
                .and_then(|v| i32::try_from(v).ok());
        }

        let delimited_by_space = self.reader.peek() == Some(' ');
        if delimited_by_space {
            self.reader.read();
        }

        self.apply_encoding_word(&name, value);

        if name == "bin" {
            let n = value.unwrap_or(0).max(0) as usize;
            return Token::Binary(self.reader.read_bytes(n));
        }

        Token::ControlWord {
            name,
            value,
            delimited_by_space,
        }
    }

    /// React to the control words that steer the active encoding. The token
    /// itself is still emitted; downstream stages may care about it too.
    fn apply_encoding_word(&mut self, name: &str, value: Option<i32>) {
        match name {
            "ansicpg" => {
                if let Some(enc) = value.and_then(codepage_to_encoding) {
                    self.set_current_encoding(enc);
                }
            }
            "ansi" | "mac" | "pc" | "pca" => {
                if let Some(enc) = family_to_encoding(name) {
                    self.set_current_encoding(enc);
                }
            }
            "deff" => self.default_font = value,
            "f" => {
                self.last_font = value;
                if let Some(enc) = value.and_then(|f| self.font_encodings.get(&f).copied()) {
                    self.set_current_encoding(enc);
                }
            }
            "fcharset" => {
                if let (Some(font), Some(enc)) =
                    (self.last_font, value.and_then(charset_to_encoding))
                {
                    self.font_encodings.insert(font, enc);
                }
            }
            "plain" => {
                if let Some(enc) = self
                    .default_font
                    .and_then(|f| self.font_encodings.get(&f).copied())
                {
                    self.set_current_encoding(enc);
                }
            }
            _ => {}
        }
    }

    /// Accumulate plain characters into a text run, stopping before the next
    /// structural character.
    fn read_text(&mut self, first: char) -> Token {
        let mut content = String::new();
        content.push(first);
        while let Some(c) = self.reader.peek() {
            match c {
                '\\' | '{' | '}' | '\r' | '\n' | '\t' => break,
                _ => {
                    content.push(c);
                    self.reader.read();
                }
            }
        }
        Token::Text(content)
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }
        self.next_token()
    }
}
