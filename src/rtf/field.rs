//! Field instruction classification.
//!
//! A field group carries two sibling destinations: the instruction text
//! (`\fldinst`) and the cached result (`\fldrslt`). The instruction is a
//! small command language of its own; only the handful of commands the
//! converter acts on are classified, everything else stays `Other` with the
//! raw text preserved.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::rtf::document::FieldKind;

static HYPERLINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^HYPERLINK\s+(?:\\l\s+)?"?([^"]+)"?"#).unwrap());

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:REF|PAGEREF)\s+(\S+)").unwrap());

/// Classify a raw field instruction.
pub fn classify_instruction(instruction: &str) -> FieldKind {
    let trimmed = instruction.trim();

    if let Some(captures) = HYPERLINK.captures(trimmed) {
        return FieldKind::Hyperlink {
            target: captures[1].trim().to_string(),
        };
    }
    if let Some(captures) = REFERENCE.captures(trimmed) {
        return FieldKind::Reference {
            bookmark: captures[1].to_string(),
        };
    }

    let command = trimmed
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_uppercase();
    match command.as_str() {
        "PAGE" => FieldKind::PageNumber,
        "NUMPAGES" => FieldKind::NumPages,
        "DATE" | "CREATEDATE" | "SAVEDATE" => FieldKind::Date,
        "TIME" => FieldKind::Time,
        _ => FieldKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_hyperlink_with_quotes() {
        assert_eq!(
            classify_instruction(r#"HYPERLINK "https://example.com/a b""#),
            FieldKind::Hyperlink {
                target: "https://example.com/a b".to_string()
            }
        );
    }

    #[test]
    fn test_hyperlink_unquoted() {
        assert_eq!(
            classify_instruction("HYPERLINK https://example.com"),
            FieldKind::Hyperlink {
                target: "https://example.com".to_string()
            }
        );
    }

    #[test]
    fn test_reference() {
        assert_eq!(
            classify_instruction("REF intro \\h"),
            FieldKind::Reference {
                bookmark: "intro".to_string()
            }
        );
    }

    #[rstest]
    #[case("PAGE", FieldKind::PageNumber)]
    #[case("PAGE \\* MERGEFORMAT", FieldKind::PageNumber)]
    #[case("NUMPAGES", FieldKind::NumPages)]
    #[case("DATE \\@ \"d.M.yyyy\"", FieldKind::Date)]
    #[case("TIME", FieldKind::Time)]
    #[case("XE \"index entry\"", FieldKind::Other)]
    fn test_simple_commands(#[case] instruction: &str, #[case] expected: FieldKind) {
        assert_eq!(classify_instruction(instruction), expected);
    }
}
