//! `bestmove` and `info` lines produced while the engine searches.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::BESTMOVE;

const INFO: &str = "info";

/// Words that start a new attribute inside an `info` line.
const INFO_KEYWORDS: &[&str] = &[
    "depth",
    "seldepth",
    "time",
    "nodes",
    "pv",
    "multipv",
    "score",
    "currmove",
    "currmovenumber",
    "hashfull",
    "nps",
    "tbhits",
    "sbhits",
    "cpuload",
    "string",
    "refutation",
    "currline",
];

/// `bestmove <move> [ponder <move>]`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BestMove {
    pub best: String,
    pub ponder: Option<String>,
}

impl BestMove {
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        if tokens.next()? != BESTMOVE {
            return None;
        }
        let best = tokens.next()?.to_string();
        let ponder = match tokens.next() {
            Some("ponder") => tokens.next().map(str::to_string),
            _ => None,
        };
        Some(BestMove { best, ponder })
    }
}

/// Score reported in an `info` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Score {
    Centipawns(i32),
    /// Moves (not plies) to mate; negative when the engine is being mated
    Mate(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScoreBound {
    Lower,
    Upper,
}

/// One parsed `info` line. Absent attributes stay `None`/empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchInfo {
    pub depth: Option<u32>,
    pub seldepth: Option<u32>,
    pub time_ms: Option<u64>,
    pub nodes: Option<u64>,
    pub pv: Vec<String>,
    pub multipv: Option<u32>,
    pub score: Option<Score>,
    pub score_bound: Option<ScoreBound>,
    pub currmove: Option<String>,
    pub currmovenumber: Option<u32>,
    pub hashfull: Option<u32>,
    pub nps: Option<u64>,
    pub tbhits: Option<u64>,
    pub sbhits: Option<u64>,
    pub cpuload: Option<u32>,
    pub string: Option<String>,
    pub refutation: Vec<String>,
    pub currline: Vec<String>,
}

fn is_keyword(token: &str) -> bool {
    INFO_KEYWORDS.contains(&token)
}

/// Parse an `info` line. Unknown attributes and malformed numbers are
/// skipped rather than failing the whole line.
#[must_use]
pub fn parse_info_line(line: &str) -> Option<SearchInfo> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.first() != Some(&INFO) {
        return None;
    }

    let mut info = SearchInfo::default();
    let mut i = 1;
    while i < tokens.len() {
        let value = tokens.get(i + 1).copied();
        match tokens[i] {
            "depth" => {
                info.depth = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "seldepth" => {
                info.seldepth = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "time" => {
                info.time_ms = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "nodes" => {
                info.nodes = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "multipv" => {
                info.multipv = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "currmove" => {
                info.currmove = value.map(str::to_string);
                i += 2;
            }
            "currmovenumber" => {
                info.currmovenumber = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "hashfull" => {
                info.hashfull = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "nps" => {
                info.nps = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "tbhits" => {
                info.tbhits = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "sbhits" => {
                info.sbhits = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "cpuload" => {
                info.cpuload = value.and_then(|v| v.parse().ok());
                i += 2;
            }
            "score" => {
                i += 1;
                while i < tokens.len() {
                    match tokens[i] {
                        "cp" => {
                            info.score = tokens
                                .get(i + 1)
                                .and_then(|v| v.parse().ok())
                                .map(Score::Centipawns);
                            i += 2;
                        }
                        "mate" => {
                            info.score = tokens
                                .get(i + 1)
                                .and_then(|v| v.parse().ok())
                                .map(Score::Mate);
                            i += 2;
                        }
                        "lowerbound" => {
                            info.score_bound = Some(ScoreBound::Lower);
                            i += 1;
                        }
                        "upperbound" => {
                            info.score_bound = Some(ScoreBound::Upper);
                            i += 1;
                        }
                        _ => break,
                    }
                }
            }
            "string" => {
                // Everything after `string` is free text
                info.string = Some(tokens[i + 1..].join(" "));
                i = tokens.len();
            }
            "pv" => {
                i = collect_moves(&tokens, i + 1, &mut info.pv);
            }
            "refutation" => {
                i = collect_moves(&tokens, i + 1, &mut info.refutation);
            }
            "currline" => {
                i = collect_moves(&tokens, i + 1, &mut info.currline);
            }
            _ => i += 1,
        }
    }
    Some(info)
}

/// Push tokens into `out` until the next keyword; returns its index.
fn collect_moves(tokens: &[&str], mut i: usize, out: &mut Vec<String>) -> usize {
    while i < tokens.len() && !is_keyword(tokens[i]) {
        out.push(tokens[i].to_string());
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bestmove_with_ponder() {
        let best = BestMove::parse("bestmove e2e4 ponder e7e5").expect("bestmove");
        assert_eq!(best.best, "e2e4");
        assert_eq!(best.ponder.as_deref(), Some("e7e5"));
    }

    #[test]
    fn test_bestmove_without_ponder() {
        let best = BestMove::parse("bestmove (none)").expect("bestmove");
        assert_eq!(best.best, "(none)");
        assert_eq!(best.ponder, None);
        assert_eq!(BestMove::parse("bestmove"), None);
        assert_eq!(BestMove::parse("info depth 1"), None);
    }

    #[test]
    fn test_typical_info_line() {
        let info = parse_info_line(
            "info depth 12 seldepth 17 multipv 1 score cp 35 nodes 123456 nps 987654 \
             hashfull 12 tbhits 0 time 125 pv e2e4 e7e5 g1f3",
        )
        .expect("info line");
        assert_eq!(info.depth, Some(12));
        assert_eq!(info.seldepth, Some(17));
        assert_eq!(info.multipv, Some(1));
        assert_eq!(info.score, Some(Score::Centipawns(35)));
        assert_eq!(info.nodes, Some(123_456));
        assert_eq!(info.nps, Some(987_654));
        assert_eq!(info.hashfull, Some(12));
        assert_eq!(info.tbhits, Some(0));
        assert_eq!(info.time_ms, Some(125));
        assert_eq!(info.pv, vec!["e2e4", "e7e5", "g1f3"]);
    }

    #[test]
    fn test_mate_score_with_bound() {
        let info = parse_info_line("info depth 5 score mate -3 upperbound nodes 10").expect("info");
        assert_eq!(info.score, Some(Score::Mate(-3)));
        assert_eq!(info.score_bound, Some(ScoreBound::Upper));
        assert_eq!(info.nodes, Some(10));
    }

    #[test]
    fn test_info_string_takes_rest_of_line() {
        let info = parse_info_line("info string NNUE evaluation using nn.nnue enabled")
            .expect("info");
        assert_eq!(
            info.string.as_deref(),
            Some("NNUE evaluation using nn.nnue enabled")
        );
    }

    #[test]
    fn test_currmove_and_refutation() {
        let info = parse_info_line("info currmove e2e4 currmovenumber 1 refutation d1h5 g6h5")
            .expect("info");
        assert_eq!(info.currmove.as_deref(), Some("e2e4"));
        assert_eq!(info.currmovenumber, Some(1));
        assert_eq!(info.refutation, vec!["d1h5", "g6h5"]);
    }

    #[test]
    fn test_malformed_values_are_skipped() {
        let info = parse_info_line("info depth x nodes 42 foo bar").expect("info");
        assert_eq!(info.depth, None);
        assert_eq!(info.nodes, Some(42));
        assert_eq!(parse_info_line("bestmove e2e4"), None);
    }
}
