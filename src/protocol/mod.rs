//! Parsing of the text the engine sends back.
//!
//! Everything here is pure: a line in, a typed value out. The command
//! matchers in [`crate::command`] decide what to do with the results.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod id;
pub mod option;
pub mod search;

pub use id::{merge_id_line, EngineId, IdField};
pub use option::{option_key, parse_option_line, OptionDescriptor, OptionTable, OptionType};
pub use search::{parse_info_line, BestMove, Score, ScoreBound, SearchInfo};

pub const UCIOK: &str = "uciok";
pub const READYOK: &str = "readyok";
pub const BESTMOVE: &str = "bestmove";
pub const REGISTRATION: &str = "registration";
pub const COPYPROTECTION: &str = "copyprotection";
pub const UNKNOWN_COMMAND: &str = "Unknown command";

/// Which of the engine's output streams a line is delivered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Regular protocol output (stdout)
    Data,
    /// stderr, plus stdout lines reporting an unknown command
    Error,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Data => write!(f, "data"),
            Stream::Error => write!(f, "error"),
        }
    }
}

/// Decide which stream a raw line belongs to.
///
/// Returns `None` for blank lines, which are never delivered. Lines are
/// trimmed. A stdout line starting with `Unknown command` is moved to the
/// error stream: that is how engines report protocol violations.
#[must_use]
pub fn classify_line(origin: Stream, raw: &str) -> Option<(Stream, &str)> {
    let line = raw.trim();
    if line.is_empty() {
        return None;
    }
    if origin == Stream::Data && line.starts_with(UNKNOWN_COMMAND) {
        return Some((Stream::Error, line));
    }
    Some((origin, line))
}

/// Registration (or copy protection) status reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RegistrationState {
    #[default]
    NotInitiated,
    Checking,
    Ok,
    Error,
}

/// Copy protection reports the same four states.
pub type ProtectionState = RegistrationState;

impl RegistrationState {
    /// Parse `<keyword> checking|ok|error`. Anything else is `None`.
    #[must_use]
    pub fn parse(line: &str, keyword: &str) -> Option<Self> {
        let status = line.strip_prefix(keyword)?.strip_prefix(' ')?;
        match status {
            "checking" => Some(RegistrationState::Checking),
            "ok" => Some(RegistrationState::Ok),
            "error" => Some(RegistrationState::Error),
            _ => None,
        }
    }

    /// `Ok` and `Error` end a registration exchange.
    #[must_use]
    pub fn is_final(self) -> bool {
        matches!(self, RegistrationState::Ok | RegistrationState::Error)
    }
}
