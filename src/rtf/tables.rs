//! Lookup-table resolvers: fonts, colors, and list definitions.
//!
//! These run as a post-pass over specific destination subtrees of the group
//! tree, before the document builder walks it. The resulting maps are
//! read-only for the rest of the conversion and are consulted by numeric
//! index (`\fN`, `\cfN`, `\lsN`).

use std::collections::HashMap;

use serde::Serialize;

use crate::rtf::destination::Destination;
use crate::rtf::group::{Group, GroupContent};
use crate::rtf::token::Token;

/// Font family hint from the font table (`\froman`, `\fswiss`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum FontFamily {
    #[default]
    Nil,
    Roman,
    Swiss,
    Modern,
    Script,
    Decor,
    Tech,
    Bidi,
}

impl FontFamily {
    fn from_word(name: &str) -> Option<FontFamily> {
        match name {
            "fnil" => Some(FontFamily::Nil),
            "froman" => Some(FontFamily::Roman),
            "fswiss" => Some(FontFamily::Swiss),
            "fmodern" => Some(FontFamily::Modern),
            "fscript" => Some(FontFamily::Script),
            "fdecor" => Some(FontFamily::Decor),
            "ftech" => Some(FontFamily::Tech),
            "fbidi" => Some(FontFamily::Bidi),
            _ => None,
        }
    }
}

/// One font table entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Font {
    pub name: String,
    pub family: FontFamily,
    pub charset: Option<i32>,
}

/// Font index -> descriptor.
pub type FontTable = HashMap<i32, Font>;

/// One RGB color table entry. The reserved "automatic" entry (declared with
/// no components at all) is stored as black so that every later numeric
/// reference stays aligned with its declared index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

/// Positional color table; `\cfN` indexes into it directly.
pub type ColorTable = Vec<Color>;

/// Numbering style of one list level (`\levelnfcN`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum NumberFormat {
    #[default]
    Decimal,
    UpperRoman,
    LowerRoman,
    UpperLetter,
    LowerLetter,
    Bullet,
    None,
}

impl NumberFormat {
    fn from_code(code: i32) -> NumberFormat {
        match code {
            0 => NumberFormat::Decimal,
            1 => NumberFormat::UpperRoman,
            2 => NumberFormat::LowerRoman,
            3 => NumberFormat::UpperLetter,
            4 => NumberFormat::LowerLetter,
            23 => NumberFormat::Bullet,
            255 => NumberFormat::None,
            _ => NumberFormat::Decimal,
        }
    }
}

/// One level of an abstract list definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListLevel {
    pub format: NumberFormat,
    pub start_at: i32,
    /// Literal level text (bullet glyph or number template).
    pub text: String,
}

/// Abstract list definition keyed by `\listidN`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListDefinition {
    pub id: i32,
    pub levels: Vec<ListLevel>,
}

/// The two-level list resolution: abstract definitions by id, plus override
/// entries binding a numbering instance (`\lsN`) to a definition id. Only the
/// override id is referenced from paragraph content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListTables {
    pub definitions: HashMap<i32, ListDefinition>,
    pub overrides: HashMap<i32, i32>,
}

impl ListTables {
    /// Resolve a paragraph's `\lsN` reference to its abstract definition.
    pub fn definition_for(&self, ls: i32) -> Option<&ListDefinition> {
        self.overrides
            .get(&ls)
            .and_then(|id| self.definitions.get(id))
    }
}

/// All resolved lookup tables, shared by reference across the builder pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Tables {
    pub fonts: FontTable,
    pub colors: ColorTable,
    pub lists: ListTables,
}

impl Tables {
    /// Walk the tree and resolve every table destination found in it.
    pub fn resolve(root: &Group) -> Tables {
        let mut tables = Tables::default();
        tables.scan(root);
        tables
    }

    fn scan(&mut self, group: &Group) {
        for sub in group.subgroups() {
            match sub.destination {
                Some(Destination::FontTable) => resolve_font_table(sub, &mut self.fonts),
                Some(Destination::ColorTable) => resolve_color_table(sub, &mut self.colors),
                Some(Destination::ListTable) => resolve_list_table(sub, &mut self.lists),
                Some(Destination::ListOverrideTable) => {
                    resolve_list_overrides(sub, &mut self.lists)
                }
                _ => self.scan(sub),
            }
        }
    }
}

/// Fill the font table from its destination group.
///
/// Entries usually sit in sub-groups (`{\f0\froman\fcharset0 Times;}`) but
/// the flat form (`\fonttbl\f0 Helvetica;\f1 ...`) also occurs; both walks
/// close an entry on the `;` terminator and strip it from the name.
fn resolve_font_table(group: &Group, fonts: &mut FontTable) {
    if group.subgroups().next().is_some() {
        for sub in group.subgroups() {
            resolve_font_run(&sub.children, fonts);
        }
    } else {
        resolve_font_run(&group.children, fonts);
    }
}

fn resolve_font_run(children: &[GroupContent], fonts: &mut FontTable) {
    let mut current: Option<i32> = None;
    let mut font = Font::default();

    let finish = |index: &mut Option<i32>, font: &mut Font, fonts: &mut FontTable| {
        if let Some(i) = index.take() {
            font.name = font.name.trim().trim_end_matches(';').trim().to_string();
            fonts.insert(i, std::mem::take(font));
        } else {
            *font = Font::default();
        }
    };

    for child in children {
        match child {
            GroupContent::Token(Token::ControlWord { name, value, .. }) => match name.as_str() {
                "f" => {
                    if current.is_some() {
                        finish(&mut current, &mut font, fonts);
                    }
                    current = *value;
                }
                "fcharset" => font.charset = *value,
                other => {
                    if let Some(family) = FontFamily::from_word(other) {
                        font.family = family;
                    }
                }
            },
            GroupContent::Token(Token::Text(text)) => {
                font.name.push_str(text);
                if text.contains(';') {
                    finish(&mut current, &mut font, fonts);
                }
            }
            // Nested extension groups (\*\panose ...) carry no name text
            _ => {}
        }
    }
    finish(&mut current, &mut font, fonts);
}

/// Fill the color table from its destination group.
///
/// A flat scan of `\red`/`\green`/`\blue` words separated by `;` text; each
/// semicolon closes one entry. An entry closed with no components at all is
/// the reserved automatic color and still occupies its index.
fn resolve_color_table(group: &Group, colors: &mut ColorTable) {
    let mut current = Color::default();

    for child in &group.children {
        match child {
            GroupContent::Token(Token::ControlWord { name, value, .. }) => {
                let component = value.unwrap_or(0).clamp(0, 255) as u8;
                match name.as_str() {
                    "red" => current.red = component,
                    "green" => current.green = component,
                    "blue" => current.blue = component,
                    _ => {}
                }
            }
            GroupContent::Token(Token::Text(text)) => {
                for c in text.chars() {
                    if c == ';' {
                        colors.push(current);
                        current = Color::default();
                    }
                }
            }
            _ => {}
        }
    }
}

/// Fill abstract list definitions from the `\listtable` destination.
fn resolve_list_table(group: &Group, lists: &mut ListTables) {
    for sub in group.subgroups() {
        if sub.first_word().map(|(name, _)| name) != Some("list") {
            continue;
        }
        let mut def = ListDefinition::default();
        let mut has_id = false;
        for child in &sub.children {
            match child {
                GroupContent::Token(Token::ControlWord { name, value, .. }) => {
                    if name == "listid" {
                        if let Some(id) = value {
                            def.id = *id;
                            has_id = true;
                        }
                    }
                }
                GroupContent::Group(level_group) => {
                    if level_group.first_word().map(|(name, _)| name) == Some("listlevel") {
                        def.levels.push(resolve_list_level(level_group));
                    }
                }
                _ => {}
            }
        }
        if has_id {
            lists.definitions.insert(def.id, def);
        }
    }
}

fn resolve_list_level(group: &Group) -> ListLevel {
    let mut level = ListLevel {
        start_at: 1,
        ..ListLevel::default()
    };
    for child in &group.children {
        match child {
            GroupContent::Token(Token::ControlWord { name, value, .. }) => match name.as_str() {
                "levelnfc" => level.format = NumberFormat::from_code(value.unwrap_or(0)),
                "levelstartat" => level.start_at = value.unwrap_or(1),
                _ => {}
            },
            GroupContent::Group(sub) => {
                if sub.first_word().map(|(name, _)| name) == Some("leveltext") {
                    level.text = sub.direct_text().trim_end_matches(';').to_string();
                }
            }
            _ => {}
        }
    }
    level
}

/// Fill the override entries binding `\lsN` instances to definitions.
fn resolve_list_overrides(group: &Group, lists: &mut ListTables) {
    for sub in group.subgroups() {
        if sub.first_word().map(|(name, _)| name) != Some("listoverride") {
            continue;
        }
        let mut list_id = None;
        let mut ls = None;
        for child in &sub.children {
            if let GroupContent::Token(Token::ControlWord { name, value, .. }) = child {
                match name.as_str() {
                    "listid" => list_id = *value,
                    "ls" => ls = *value,
                    _ => {}
                }
            }
        }
        if let (Some(ls), Some(list_id)) = (ls, list_id) {
            lists.overrides.insert(ls, list_id);
        }
    }
}
