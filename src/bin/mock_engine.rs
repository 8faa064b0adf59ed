//! Scripted UCI engine used by the integration tests.
//!
//! Answers the handshake with a fixed identity and option set, plays
//! `e2e4` from any position and reports anything it does not understand
//! with `Unknown command: <line>`.
//!
//! Flags:
//! - `--silent` never writes anything
//! - `--no-readyok` ignores `isready`
//! - `--exit-after-handshake` exits right after `uciok`
//! - `--uci-delay-ms N` waits before answering `uci`
//! - `--stderr-on-uci` writes a warning to stderr, then answers `uci` after
//!   a pause long enough for the warning to be read first
//! - `--copyprotection` reports `copyprotection checking` / `ok` after `uci`

use std::env;
use std::io::{self, BufRead};
use std::process::ExitCode;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use uci_driver::sync::StopFlag;

#[derive(Default)]
struct Flags {
    silent: bool,
    no_readyok: bool,
    exit_after_handshake: bool,
    uci_delay: Duration,
    stderr_on_uci: bool,
    copyprotection: bool,
}

impl Flags {
    fn parse() -> Result<Self, String> {
        let mut flags = Flags::default();
        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--silent" => flags.silent = true,
                "--no-readyok" => flags.no_readyok = true,
                "--exit-after-handshake" => flags.exit_after_handshake = true,
                "--stderr-on-uci" => flags.stderr_on_uci = true,
                "--copyprotection" => flags.copyprotection = true,
                "--uci-delay-ms" => {
                    let ms: u64 = args
                        .next()
                        .and_then(|v| v.parse().ok())
                        .ok_or("--uci-delay-ms needs a number")?;
                    flags.uci_delay = Duration::from_millis(ms);
                }
                other => return Err(format!("unknown flag {other}")),
            }
        }
        Ok(flags)
    }
}

enum Input {
    Uci,
    IsReady,
    UciNewGame,
    Position,
    Go { infinite: bool, depth: u32 },
    SetOption,
    Register { later: bool },
    Debug,
    Stop,
    PonderHit,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Option<Input> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let first = *parts.first()?;
    let input = match first {
        "uci" => Input::Uci,
        "isready" => Input::IsReady,
        "ucinewgame" => Input::UciNewGame,
        "position" => Input::Position,
        "go" => {
            let depth = parts
                .iter()
                .position(|p| *p == "depth")
                .and_then(|i| parts.get(i + 1))
                .and_then(|v| v.parse().ok())
                .unwrap_or(3);
            Input::Go {
                infinite: parts.contains(&"infinite"),
                depth,
            }
        }
        "setoption" => Input::SetOption,
        "register" => Input::Register {
            later: parts.get(1) == Some(&"later"),
        },
        "debug" => Input::Debug,
        "stop" => Input::Stop,
        "ponderhit" => Input::PonderHit,
        "quit" => Input::Quit,
        _ => Input::Unknown(line.trim().to_string()),
    };
    Some(input)
}

/// A search running on its own thread until stopped.
struct Search {
    stop: StopFlag,
    handle: JoinHandle<()>,
}

impl Search {
    fn infinite() -> Self {
        let stop = StopFlag::new();
        let flag = stop.clone();
        let handle = thread::spawn(move || {
            let mut depth = 1;
            while !flag.is_stopped() {
                print_info(depth);
                depth += 1;
                thread::sleep(Duration::from_millis(10));
            }
            println!("bestmove e2e4 ponder e7e5");
        });
        Search { stop, handle }
    }

    fn finish(self) {
        self.stop.stop();
        let _ = self.handle.join();
    }
}

fn print_info(depth: u32) {
    println!(
        "info depth {depth} seldepth {} score cp {} nodes {} nps 100000 time {} pv e2e4 e7e5",
        depth + 2,
        20 + depth,
        depth * 1000,
        depth * 10
    );
}

fn handshake(flags: &Flags) {
    if !flags.uci_delay.is_zero() {
        thread::sleep(flags.uci_delay);
    }
    if flags.stderr_on_uci {
        eprintln!("warning: running without an opening book");
        thread::sleep(Duration::from_millis(200));
    }
    println!("id name Mock Engine 1.0");
    println!("id author The Testers");
    println!("option name Hash type spin default 16 min 1 max 1024");
    println!("option name Skill Level type spin default 20 min 0 max 20");
    println!("option name Ponder type check default false");
    println!("option name Style type combo default Normal var Solid var Normal var Risky");
    println!("option name Clear Hash type button");
    println!("option name NalimovPath type string default <empty>");
    if flags.copyprotection {
        println!("copyprotection checking");
        println!("copyprotection ok");
    }
    println!("uciok");
}

fn main() -> ExitCode {
    let flags = match Flags::parse() {
        Ok(flags) => flags,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut search: Option<Search> = None;
    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        let Some(input) = parse_input(&line) else {
            continue;
        };
        if flags.silent {
            if matches!(input, Input::Quit) {
                break;
            }
            continue;
        }

        match input {
            Input::Uci => {
                handshake(&flags);
                if flags.exit_after_handshake {
                    break;
                }
            }
            Input::IsReady => {
                if !flags.no_readyok {
                    println!("readyok");
                }
            }
            Input::Go { infinite: true, .. } => {
                if let Some(previous) = search.take() {
                    previous.finish();
                }
                search = Some(Search::infinite());
            }
            Input::Go { depth, .. } => {
                for d in 1..=depth {
                    print_info(d);
                }
                println!("bestmove e2e4 ponder e7e5");
            }
            Input::Register { later: true } => {}
            Input::Register { later: false } => {
                println!("registration checking");
                println!("registration ok");
            }
            Input::Stop => {
                if let Some(running) = search.take() {
                    running.finish();
                }
            }
            Input::UciNewGame
            | Input::Position
            | Input::SetOption
            | Input::Debug
            | Input::PonderHit => {}
            Input::Quit => break,
            Input::Unknown(text) => println!("Unknown command: {text}"),
        }
    }

    if let Some(running) = search.take() {
        running.finish();
    }
    ExitCode::SUCCESS
}
