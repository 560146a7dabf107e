//! Destination identities for brace groups.
//!
//! A destination redirects a group's content away from the main document
//! body: lookup tables, headers and footers, note bodies, field parts, raw
//! picture bytes. Anything else is either plain body content or an unknown
//! extension, and unknown extensions marked ignorable are retained
//! structurally but contribute nothing.

use serde::Serialize;

/// Which header/footer slot a destination names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum HeaderFooterKind {
    /// Applies to every page the more specific kinds don't cover.
    Default,
    /// Even pages.
    Left,
    /// Odd pages.
    Right,
    /// First page of the section.
    First,
}

/// Destination tag inferred from a group's first word-class token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Destination {
    FontTable,
    ColorTable,
    StyleSheet,
    Info,
    ListTable,
    ListOverrideTable,
    Header(HeaderFooterKind),
    Footer(HeaderFooterKind),
    Footnote,
    Field,
    FieldInstruction,
    FieldResult,
    Picture,
    BookmarkStart,
    BookmarkEnd,
    /// Preserved so ignorable unknown destinations still parse structurally.
    Unknown(String),
}

impl Destination {
    /// Classify a control-word name. Every name maps somewhere; unrecognized
    /// ones become `Unknown` and are only discarded when the group carries
    /// the `\*` extension marker.
    pub fn from_name(name: &str) -> Destination {
        match name {
            "fonttbl" => Destination::FontTable,
            "colortbl" => Destination::ColorTable,
            "stylesheet" => Destination::StyleSheet,
            "info" => Destination::Info,
            "listtable" => Destination::ListTable,
            "listoverridetable" => Destination::ListOverrideTable,
            "header" => Destination::Header(HeaderFooterKind::Default),
            "headerl" => Destination::Header(HeaderFooterKind::Left),
            "headerr" => Destination::Header(HeaderFooterKind::Right),
            "headerf" => Destination::Header(HeaderFooterKind::First),
            "footer" => Destination::Footer(HeaderFooterKind::Default),
            "footerl" => Destination::Footer(HeaderFooterKind::Left),
            "footerr" => Destination::Footer(HeaderFooterKind::Right),
            "footerf" => Destination::Footer(HeaderFooterKind::First),
            "footnote" => Destination::Footnote,
            "field" => Destination::Field,
            "fldinst" => Destination::FieldInstruction,
            "fldrslt" => Destination::FieldResult,
            "pict" => Destination::Picture,
            "bkmkstart" => Destination::BookmarkStart,
            "bkmkend" => Destination::BookmarkEnd,
            other => Destination::Unknown(other.to_string()),
        }
    }

    /// Whether the document builder has a handler for this destination.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Destination::Unknown(_))
    }
}
