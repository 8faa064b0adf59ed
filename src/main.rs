//! Inspect a UCI engine: run the handshake, print what it advertises and
//! optionally search the start position.
//!
//! ```text
//! uci_driver [ENGINE_PATH] [--depth N] [--log LEVEL]
//! ```
//!
//! The engine path falls back to the `UCI_ENGINE_PATH` environment variable.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use log::LevelFilter;
use uci_driver::config::ENGINE_PATH_ENV;
use uci_driver::logging::StderrLog;
use uci_driver::{
    Go, InterfaceConfig, IsReady, Logger, Position, Resolution, UniversalChessInterface,
};

struct Args {
    engine_path: Option<String>,
    depth: Option<u32>,
    level: LevelFilter,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        engine_path: None,
        depth: None,
        level: LevelFilter::Warn,
    };
    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--depth" => {
                let value = iter.next().ok_or("--depth needs a value")?;
                let depth = value
                    .parse()
                    .map_err(|_| format!("invalid depth '{value}'"))?;
                args.depth = Some(depth);
            }
            "--log" => {
                let value = iter.next().ok_or("--log needs a value")?;
                args.level = value
                    .parse()
                    .map_err(|_| format!("invalid log level '{value}'"))?;
            }
            _ if args.engine_path.is_none() => args.engine_path = Some(arg),
            _ => return Err(format!("unexpected argument '{arg}'")),
        }
    }
    Ok(args)
}

fn run(args: Args) -> Result<(), String> {
    let path = args
        .engine_path
        .or_else(|| env::var(ENGINE_PATH_ENV).ok())
        .ok_or_else(|| format!("no engine path given and {ENGINE_PATH_ENV} is not set"))?;

    let logger = Logger::new(Arc::new(StderrLog::new(args.level)));
    let uci = UniversalChessInterface::start(InterfaceConfig::new(path).with_logger(logger))
        .map_err(|e| e.to_string())?;

    if let Some(id) = uci.engine_id() {
        println!("name:   {}", id.name.as_deref().unwrap_or("-"));
        println!("author: {}", id.author.as_deref().unwrap_or("-"));
    }
    for option in uci.chess_engine_options().values().filter(|o| o.id.is_none()) {
        print!("option: {} ({})", option.name, option.option_type);
        if let Some(default) = &option.default {
            print!(" default {default}");
        }
        if let (Some(min), Some(max)) = (&option.min, &option.max) {
            print!(" range {min}..{max}");
        }
        if !option.vars.is_empty() {
            print!(" vars {}", option.vars.join("|"));
        }
        println!();
    }

    let Some(depth) = args.depth else {
        return Ok(());
    };

    let ready = uci.create_command::<IsReady>();
    if ready.send_and_wait().map_err(|e| e.to_string())? != Resolution::Response {
        return Err("the engine did not answer isready".to_string());
    }
    let position = uci.create_command_with(Position::startpos(""));
    uci.send_command(&position).map_err(|e| e.to_string())?;

    let go = uci.create_command_with(Go::depth(depth));
    match go.send_and_wait().map_err(|e| e.to_string())? {
        Resolution::Response => {}
        Resolution::Error(text) => return Err(format!("search failed: {text}")),
        other => return Err(format!("search did not finish: {other:?}")),
    }
    let state = go.state();
    if let Some(info) = state.infos().iter().rev().find(|i| i.score.is_some()) {
        println!("score:  {:?} at depth {}", info.score, info.depth.unwrap_or(0));
    }
    println!("{}", state.best_move_line().unwrap_or("no bestmove"));
    Ok(())
}

fn main() -> ExitCode {
    let result = parse_args().and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
