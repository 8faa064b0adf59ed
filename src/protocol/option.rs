//! `option name <n> type <t> [default <d> [min <m> max <M>]]` lines.
//!
//! Engines differ in how many trailing fields they print, so parsing tries
//! the most specific shape first and falls back to simpler ones. Values are
//! kept as the raw text the engine printed.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::id::EngineId;

const OPTION: &str = "option";

const FULL: &[&str] = &["name", "type", "default", "min", "max"];
const WITH_DEFAULT: &[&str] = &["name", "type", "default"];
const BASIC: &[&str] = &["name", "type"];

/// Option table keyed by [`option_key`], plus the `id` record.
pub type OptionTable = BTreeMap<String, OptionDescriptor>;

/// The five option types defined by UCI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    Check,
    Spin,
    Combo,
    Button,
    String,
}

impl OptionType {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "check" => Some(OptionType::Check),
            "spin" => Some(OptionType::Spin),
            "combo" => Some(OptionType::Combo),
            "button" => Some(OptionType::Button),
            "string" => Some(OptionType::String),
            _ => None,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OptionType::Check => "check",
            OptionType::Spin => "spin",
            OptionType::Combo => "combo",
            OptionType::Button => "button",
            OptionType::String => "string",
        };
        write!(f, "{s}")
    }
}

/// An option advertised by the engine during the handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptionDescriptor {
    pub name: String,
    /// Declared type, as printed by the engine
    pub option_type: String,
    pub default: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    /// `var` entries of a combo option
    pub vars: Vec<String>,
    /// Only set on the `id` record
    pub id: Option<EngineId>,
}

impl OptionDescriptor {
    /// The declared type, if it is one UCI defines.
    #[must_use]
    pub fn kind(&self) -> Option<OptionType> {
        OptionType::parse(&self.option_type)
    }
}

/// Table key for an option: `option` followed by the name with all
/// whitespace removed, e.g. `Skill Level` becomes `optionSkillLevel`.
#[must_use]
pub fn option_key(name: &str) -> String {
    let mut key = String::with_capacity(OPTION.len() + name.len());
    key.push_str(OPTION);
    key.extend(name.chars().filter(|c| !c.is_whitespace()));
    key
}

/// Parse an `option` line. Returns `None` if the line is not an option line
/// or lacks a name or type.
#[must_use]
pub fn parse_option_line(line: &str) -> Option<OptionDescriptor> {
    if !line.starts_with(OPTION) {
        return None;
    }
    let mut fields = split_fields(line, FULL)
        .or_else(|| split_fields(line, WITH_DEFAULT))
        .or_else(|| split_fields(line, BASIC))?;

    // Combo `var` entries trail whichever field came last
    let last = fields.len() - 1;
    let (head, vars) = split_vars(fields[last]);
    fields[last] = head;

    let name = fields[0];
    if name.is_empty() {
        return None;
    }
    let field = |i: usize| fields.get(i).map(|s| (*s).to_string());
    Some(OptionDescriptor {
        name: name.to_string(),
        option_type: fields[1].to_string(),
        default: field(2),
        min: field(3),
        max: field(4),
        vars,
        id: None,
    })
}

/// Split `line` into the values following each keyword, in order.
///
/// The first keyword only marks where the first value starts. Each value
/// runs up to the next keyword; the last one runs to the end of the line.
fn split_fields<'a>(line: &'a str, keywords: &[&str]) -> Option<Vec<&'a str>> {
    let (_, mut cursor) = find_keyword(line, 0, keywords[0])?;
    let mut fields = Vec::with_capacity(keywords.len());
    for keyword in &keywords[1..] {
        let (end, next) = find_keyword(line, cursor, keyword)?;
        fields.push(line[cursor..end.max(cursor)].trim());
        cursor = next;
    }
    fields.push(line[cursor..].trim());
    Some(fields)
}

/// Find `keyword` as a whole space-separated word at or after `from`.
///
/// Returns the index where the preceding value ends and the index where the
/// keyword's own value starts.
fn find_keyword(line: &str, from: usize, keyword: &str) -> Option<(usize, usize)> {
    let bytes = line.as_bytes();
    for (i, _) in line[from..].match_indices(keyword) {
        let start = from + i;
        let end = start + keyword.len();
        if start == 0 || bytes[start - 1] != b' ' {
            continue;
        }
        match bytes.get(end) {
            None => return Some((start - 1, end)),
            Some(b' ') => return Some((start - 1, end + 1)),
            Some(_) => {}
        }
    }
    None
}

fn split_vars(field: &str) -> (&str, Vec<String>) {
    let mut parts = field.split(" var ");
    let head = parts.next().unwrap_or_default();
    let (head, first_var) = match head.strip_prefix("var ") {
        Some(var) => ("", Some(var)),
        None => (head, None),
    };
    let vars = first_var
        .into_iter()
        .chain(parts)
        .map(|v| v.trim().to_string())
        .collect();
    (head.trim(), vars)
}
