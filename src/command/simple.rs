//! Commands with fixed text.

use super::{CommandKind, MatchOutcome};
use crate::protocol::READYOK;

/// `isready`, answered by `readyok`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsReady;

impl CommandKind for IsReady {
    const NAME: &'static str = "isready";

    fn request_lines(&self) -> Vec<String> {
        vec!["isready".to_string()]
    }

    fn expects_reply(&self) -> bool {
        true
    }

    fn on_line(&mut self, line: &str) -> MatchOutcome {
        if line.starts_with(READYOK) {
            MatchOutcome::Resolved
        } else {
            MatchOutcome::Continue
        }
    }
}

/// `debug on` / `debug off`. The engine does not reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugMode {
    pub on: bool,
}

impl CommandKind for DebugMode {
    const NAME: &'static str = "debug";

    fn request_lines(&self) -> Vec<String> {
        let text = if self.on { "debug on" } else { "debug off" };
        vec![text.to_string()]
    }
}

macro_rules! fixed_command {
    ($(#[$doc:meta])* $name:ident, $text:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl CommandKind for $name {
            const NAME: &'static str = $text;

            fn request_lines(&self) -> Vec<String> {
                vec![$text.to_string()]
            }
        }
    };
}

fixed_command!(
    /// `ponderhit`: the opponent played the move being pondered.
    PonderHit,
    "ponderhit"
);
fixed_command!(
    /// `stop`: end the current search. The `bestmove` that follows
    /// resolves the in-flight `go`, not this command.
    Stop,
    "stop"
);
fixed_command!(
    /// `quit`: the engine exits. Nothing comes back; do not wait on it.
    Quit,
    "quit"
);
fixed_command!(
    /// `ucinewgame`: the next position belongs to a new game.
    UciNewGame,
    "ucinewgame"
);
