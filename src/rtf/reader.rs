//! Forward-only character reader with a mutable active encoding.
//!
//! The reader is the bottom of the ingestion pipeline: it hands single
//! characters to the tokenizer with one character of lookahead, and exposes
//! raw byte access for the two places where RTF suspends text decoding
//! entirely (`\'xx` hex escapes and `\binN` regions).
//!
//! The active encoding can be swapped at any point (`\ansicpgN` arrives well
//! after the first reads) and applies to every subsequent decoded read. End
//! of stream is not an error; `read`/`peek` simply return `None`.

use encoding_rs::Encoding;

use crate::rtf::encoding::default_encoding;

/// Character source over a byte buffer.
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// Pending peeked character and the number of bytes it consumed.
    peeked: Option<(char, usize)>,
    encoding: &'static Encoding,
}

impl<'a> Reader<'a> {
    /// Create a reader over the given bytes, starting in Windows-1252.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            peeked: None,
            encoding: default_encoding(),
        }
    }

    /// The active encoding.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Swap the active encoding. Takes effect for all subsequent reads;
    /// a pending peeked character keeps the encoding it was decoded with.
    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = encoding;
    }

    /// Look at the next character without consuming it.
    pub fn peek(&mut self) -> Option<char> {
        if self.peeked.is_none() {
            self.peeked = self.decode_next();
        }
        self.peeked.map(|(c, _)| c)
    }

    /// Consume and return the next character.
    pub fn read(&mut self) -> Option<char> {
        if let Some((c, width)) = self.peeked.take() {
            self.pos += width;
            return Some(c);
        }
        let (c, width) = self.decode_next()?;
        self.pos += width;
        Some(c)
    }

    /// Consume and return the next raw byte, bypassing decoding.
    ///
    /// Any pending peeked character is discarded first so the stream position
    /// is exactly where the last consumed item ended.
    pub fn read_byte(&mut self) -> Option<u8> {
        self.peeked = None;
        let b = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    /// Consume up to `n` raw bytes, bypassing decoding.
    pub fn read_bytes(&mut self, n: usize) -> Vec<u8> {
        self.peeked = None;
        let end = (self.pos + n).min(self.bytes.len());
        let out = self.bytes[self.pos..end].to_vec();
        self.pos = end;
        out
    }

    /// Decode one character at the current position without advancing.
    ///
    /// ASCII is taken directly. Other bytes are fed one at a time into an
    /// `encoding_rs` decoder until it produces a scalar, so multibyte
    /// codepages (Shift-JIS, GBK, ...) decode correctly. A truncated trailing
    /// sequence yields U+FFFD.
    fn decode_next(&self) -> Option<(char, usize)> {
        let first = *self.bytes.get(self.pos)?;
        if first < 0x80 {
            return Some((first as char, 1));
        }

        let mut decoder = self.encoding.new_decoder_without_bom_handling();
        let mut out = String::with_capacity(4);
        let mut taken = 0usize;
        while taken < 4 {
            let avail = &self.bytes[self.pos + taken..];
            let Some(&b) = avail.first() else { break };
            let (_, _read, _) =
                decoder.decode_to_string(std::slice::from_ref(&b), &mut out, false);
            taken += 1;
            if let Some(c) = out.chars().next() {
                return Some((c, taken));
            }
        }
        // The decoder is still waiting for continuation bytes that do not
        // exist; flush it to force a replacement character.
        decoder.decode_to_string(&[], &mut out, true);
        let c = out.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
        Some((c, taken.max(1)))
    }
}
