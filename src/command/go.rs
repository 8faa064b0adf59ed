use std::fmt::Write;

use super::{CommandKind, MatchOutcome};
use crate::protocol::{parse_info_line, BestMove, SearchInfo, BESTMOVE};

/// `go`: start searching the current position.
///
/// Search parameters are appended only when set, in the order UCI lists
/// them. Resolves on the `bestmove` line; every other line seen meanwhile
/// is kept in [`info_log`](Self::info_log).
#[derive(Debug, Clone, Default)]
pub struct Go {
    pub infinite: bool,
    /// Restrict the search to these moves
    pub search_moves: Vec<String>,
    pub ponder: bool,
    /// White's remaining time in milliseconds
    pub wtime: Option<u64>,
    /// Black's remaining time in milliseconds
    pub btime: Option<u64>,
    pub winc: u64,
    pub binc: u64,
    pub movestogo: u32,
    pub depth: u32,
    pub nodes: u64,
    pub mate: u32,
    pub movetime: u64,

    info_log: String,
    infos: Vec<SearchInfo>,
    best_move_line: Option<String>,
    best_move: Option<BestMove>,
}

impl Go {
    /// `go infinite`
    #[must_use]
    pub fn infinite() -> Self {
        Go {
            infinite: true,
            ..Go::default()
        }
    }

    /// `go depth <depth>`
    #[must_use]
    pub fn depth(depth: u32) -> Self {
        Go {
            depth,
            ..Go::default()
        }
    }

    /// `go movetime <ms>`
    #[must_use]
    pub fn movetime(ms: u64) -> Self {
        Go {
            movetime: ms,
            ..Go::default()
        }
    }

    #[must_use]
    pub fn with_clock(mut self, wtime: u64, btime: u64, winc: u64, binc: u64) -> Self {
        self.wtime = Some(wtime);
        self.btime = Some(btime);
        self.winc = winc;
        self.binc = binc;
        self
    }

    #[must_use]
    pub fn with_nodes(mut self, nodes: u64) -> Self {
        self.nodes = nodes;
        self
    }

    /// Every non-`bestmove` line received during the search, newline-joined.
    #[must_use]
    pub fn info_log(&self) -> &str {
        &self.info_log
    }

    /// The `info` lines of [`info_log`](Self::info_log), parsed.
    #[must_use]
    pub fn infos(&self) -> &[SearchInfo] {
        &self.infos
    }

    /// The `bestmove` line exactly as received.
    #[must_use]
    pub fn best_move_line(&self) -> Option<&str> {
        self.best_move_line.as_deref()
    }

    #[must_use]
    pub fn best_move(&self) -> Option<&BestMove> {
        self.best_move.as_ref()
    }

    fn text(&self) -> String {
        let mut s = String::from("go");
        if self.infinite {
            s.push_str(" infinite");
        }
        if !self.search_moves.is_empty() {
            let _ = write!(s, " searchmoves {}", self.search_moves.join(" "));
        }
        if self.ponder {
            s.push_str(" ponder");
        }
        if let Some(wtime) = self.wtime {
            let _ = write!(s, " wtime {wtime}");
        }
        if let Some(btime) = self.btime {
            let _ = write!(s, " btime {btime}");
        }
        push_positive(&mut s, "winc", self.winc);
        push_positive(&mut s, "binc", self.binc);
        push_positive(&mut s, "movestogo", u64::from(self.movestogo));
        push_positive(&mut s, "depth", u64::from(self.depth));
        push_positive(&mut s, "nodes", self.nodes);
        push_positive(&mut s, "mate", u64::from(self.mate));
        push_positive(&mut s, "movetime", self.movetime);
        s
    }
}

fn push_positive(s: &mut String, token: &str, value: u64) {
    if value > 0 {
        let _ = write!(s, " {token} {value}");
    }
}

impl CommandKind for Go {
    const NAME: &'static str = "go";

    fn request_lines(&self) -> Vec<String> {
        vec![self.text()]
    }

    fn expects_reply(&self) -> bool {
        true
    }

    fn on_send(&mut self) {
        self.info_log.clear();
        self.infos.clear();
        self.best_move_line = None;
        self.best_move = None;
    }

    fn on_line(&mut self, line: &str) -> MatchOutcome {
        if line.starts_with(BESTMOVE) {
            self.best_move = BestMove::parse(line);
            self.best_move_line = Some(line.to_string());
            return MatchOutcome::Resolved;
        }
        if !self.info_log.is_empty() {
            self.info_log.push('\n');
        }
        self.info_log.push_str(line);
        if let Some(info) = parse_info_line(line) {
            self.infos.push(info);
        }
        MatchOutcome::Continue
    }
}
