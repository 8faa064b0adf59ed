//! Drive a UCI chess engine running as a child process.
//!
//! [`UniversalChessInterface`] starts the engine, performs the `uci`
//! handshake and binds [`Command`]s to it. Each command writes its request
//! and watches the engine's output until its response is complete, an
//! error line arrives, or its timeout elapses.

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod interface;
pub mod logging;
pub mod protocol;
pub mod sync;

pub use command::{
    Command, CommandKind, DebugMode, Go, IsReady, MatchOutcome, OptionSetting, PonderHit,
    Position, Quit, Register, Resolution, SetOption, Stop, Uci, UciNewGame,
    DEFAULT_RESPONSE_TIMEOUT,
};
pub use config::{EnginePaths, InterfaceConfig};
pub use engine::{EngineChannel, EngineProcess};
pub use error::{ConfigError, Result, UciError};
pub use interface::UniversalChessInterface;
pub use logging::Logger;
pub use protocol::{
    BestMove, EngineId, OptionDescriptor, OptionTable, ProtectionState, RegistrationState,
    SearchInfo, Stream,
};
