//! `id name <text>` / `id author <text>` lines.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::option::{OptionDescriptor, OptionTable};

/// Key under which the engine identity is stored in the option table.
pub const ID_KEY: &str = "id";

const ID_NAME: &str = "id name ";
const ID_AUTHOR: &str = "id author ";

/// Engine identity, merged from separate `id name` and `id author` lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineId {
    pub name: Option<String>,
    pub author: Option<String>,
}

/// One parsed `id` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdField<'a> {
    Name(&'a str),
    Author(&'a str),
}

impl<'a> IdField<'a> {
    /// Split on the literal `id name ` / `id author ` marker.
    #[must_use]
    pub fn parse(line: &'a str) -> Option<Self> {
        if let Some((_, name)) = line.split_once(ID_NAME) {
            return Some(IdField::Name(name.trim()));
        }
        if let Some((_, author)) = line.split_once(ID_AUTHOR) {
            return Some(IdField::Author(author.trim()));
        }
        None
    }
}

/// Merge an `id` line into the `id` record of `table`, creating it on first
/// sight. Returns `false` if the line is not an `id name`/`id author` line.
pub fn merge_id_line(table: &mut OptionTable, line: &str) -> bool {
    let Some(field) = IdField::parse(line) else {
        return false;
    };
    let entry = table.entry(ID_KEY.to_string()).or_insert_with(|| OptionDescriptor {
        name: ID_KEY.to_string(),
        id: Some(EngineId::default()),
        ..OptionDescriptor::default()
    });
    let id = entry.id.get_or_insert_with(EngineId::default);
    match field {
        IdField::Name(name) => id.name = Some(name.to_string()),
        IdField::Author(author) => id.author = Some(author.to_string()),
    }
    true
}
