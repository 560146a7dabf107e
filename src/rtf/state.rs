//! Scope-local state: formatting snapshots and encoding contexts.
//!
//! Both state types are plain value types cloned on group entry and popped on
//! group exit, which makes brace scoping mechanical: a property set inside
//! `{...}` can never leak past the closing brace. Formatting additionally has
//! an in-line reset (`\plain`) independent of braces, which is why it lives
//! on its own stack instead of piggybacking on the encoding stack.

use encoding_rs::Encoding;
use serde::Serialize;

use crate::rtf::encoding::default_encoding;

/// Per-scope encoding state carried by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingContext {
    /// Active codepage for decoding legacy bytes.
    pub encoding: &'static Encoding,
}

impl Default for EncodingContext {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
        }
    }
}

/// Underline variants (`\ul`, `\uldb`, `\uldash`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
    Dotted,
    Dashed,
    DashDot,
    DashDotDot,
    Words,
    Thick,
    Wave,
}

/// Snapshot of active run-level properties.
///
/// Cloned on group entry, discarded on group exit, and reset to defaults by
/// `\plain` regardless of brace depth. The Unicode fields travel here because
/// `\ucN` scopes exactly like run formatting and the pending-skip countdown
/// must survive across token boundaries within one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattingState {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub double_strike: bool,
    pub subscript: bool,
    pub superscript: bool,
    pub small_caps: bool,
    pub all_caps: bool,
    pub hidden: bool,
    pub emboss: bool,
    pub imprint: bool,
    pub outline: bool,
    pub shadow: bool,
    pub underline: Underline,
    /// Color table index for the underline stroke.
    pub underline_color: Option<u32>,
    /// Color table index for highlighting, if any.
    pub highlight: Option<u32>,
    /// Font table index.
    pub font: Option<u32>,
    /// Font size in half-points (`\fsN`).
    pub font_size: Option<u32>,
    /// Color table index for the text foreground.
    pub color: Option<u32>,
    /// Expansion/compression in quarter-points (`\expndN`).
    pub char_spacing: i32,
    /// Horizontal scaling percentage (`\charscalexN`), 100 = normal.
    pub char_scale: u32,
    /// Kerning threshold in half-points (`\kerningN`).
    pub kerning: u32,
    /// Vertical offset in half-points; positive is up (`\upN` / `\dnN`).
    pub vertical_offset: i32,
    /// Language id (`\langN`).
    pub language: Option<u32>,
    /// Current `\ucN` value: legacy chars to skip after each `\uN`.
    #[serde(skip)]
    pub unicode_skip: u32,
    /// Countdown of legacy chars still to discard after a `\uN`.
    #[serde(skip)]
    pub pending_skip: u32,
}

impl Default for FormattingState {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            strike: false,
            double_strike: false,
            subscript: false,
            superscript: false,
            small_caps: false,
            all_caps: false,
            hidden: false,
            emboss: false,
            imprint: false,
            outline: false,
            shadow: false,
            underline: Underline::None,
            underline_color: None,
            highlight: None,
            font: None,
            font_size: None,
            color: None,
            char_spacing: 0,
            char_scale: 100,
            kerning: 0,
            vertical_offset: 0,
            language: None,
            unicode_skip: 1,
            pending_skip: 0,
        }
    }
}

impl FormattingState {
    /// Reset everything `\plain` resets. The Unicode skip configuration is
    /// stream bookkeeping, not formatting, so it survives.
    pub fn reset_plain(&mut self) {
        let unicode_skip = self.unicode_skip;
        let pending_skip = self.pending_skip;
        *self = FormattingState::default();
        self.unicode_skip = unicode_skip;
        self.pending_skip = pending_skip;
    }
}

/// The boolean control-word convention: an absent parameter enables, an
/// explicit `0` disables, and any other explicit value enables.
pub fn flag(value: Option<i32>) -> bool {
    value != Some(0)
}
