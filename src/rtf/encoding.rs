//! Codepage handling for legacy RTF text.
//!
//! RTF declares its text encoding in three places: the charset family words
//! (`\ansi`, `\mac`, `\pc`, `\pca`), the document codepage (`\ansicpgN`), and
//! per-font charsets in the font table (`\fcharsetN`). All of them resolve to
//! an `encoding_rs` encoding; Windows-1252 is the fallback the format assumes
//! when nothing is declared.

use encoding_rs::Encoding;

/// The encoding assumed when a document declares nothing.
pub fn default_encoding() -> &'static Encoding {
    encoding_rs::WINDOWS_1252
}

/// Map a Windows codepage number (`\ansicpgN`) to an encoding.
///
/// Unknown codepages return `None` and leave the active encoding untouched,
/// matching the ignore-unknown rule used everywhere else in the pipeline.
pub fn codepage_to_encoding(codepage: i32) -> Option<&'static Encoding> {
    match codepage {
        866 => Some(encoding_rs::IBM866),
        874 => Some(encoding_rs::WINDOWS_874),
        932 => Some(encoding_rs::SHIFT_JIS),
        936 => Some(encoding_rs::GBK),
        949 => Some(encoding_rs::EUC_KR),
        950 => Some(encoding_rs::BIG5),
        1250 => Some(encoding_rs::WINDOWS_1250),
        1251 => Some(encoding_rs::WINDOWS_1251),
        1252 => Some(encoding_rs::WINDOWS_1252),
        1253 => Some(encoding_rs::WINDOWS_1253),
        1254 => Some(encoding_rs::WINDOWS_1254),
        1255 => Some(encoding_rs::WINDOWS_1255),
        1256 => Some(encoding_rs::WINDOWS_1256),
        1257 => Some(encoding_rs::WINDOWS_1257),
        1258 => Some(encoding_rs::WINDOWS_1258),
        10000 => Some(encoding_rs::MACINTOSH),
        65001 => Some(encoding_rs::UTF_8),
        _ => None,
    }
}

/// Map a font charset byte (`\fcharsetN`) to an encoding.
///
/// Charset 1 ("default") and unknown values return `None`.
pub fn charset_to_encoding(charset: i32) -> Option<&'static Encoding> {
    match charset {
        0 => Some(encoding_rs::WINDOWS_1252),
        77 => Some(encoding_rs::MACINTOSH),
        128 => Some(encoding_rs::SHIFT_JIS),
        129 => Some(encoding_rs::EUC_KR),
        134 => Some(encoding_rs::GBK),
        136 => Some(encoding_rs::BIG5),
        161 => Some(encoding_rs::WINDOWS_1253),
        162 => Some(encoding_rs::WINDOWS_1254),
        163 => Some(encoding_rs::WINDOWS_1258),
        177 => Some(encoding_rs::WINDOWS_1255),
        178 => Some(encoding_rs::WINDOWS_1256),
        186 => Some(encoding_rs::WINDOWS_1257),
        204 => Some(encoding_rs::WINDOWS_1251),
        222 => Some(encoding_rs::WINDOWS_874),
        238 => Some(encoding_rs::WINDOWS_1250),
        _ => None,
    }
}

/// Map a charset family word to an encoding.
pub fn family_to_encoding(name: &str) -> Option<&'static Encoding> {
    match name {
        "ansi" => Some(encoding_rs::WINDOWS_1252),
        "mac" => Some(encoding_rs::MACINTOSH),
        // encoding_rs carries no CP437/CP850; IBM866 is the only OEM table it has
        "pc" | "pca" => Some(encoding_rs::IBM866),
        _ => None,
    }
}
