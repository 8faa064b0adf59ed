//! Error types for the UCI client.

use std::fmt;
use std::io;
use std::time::Duration;

/// Invalid configuration detected before anything is sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The engine path is empty or the OS refused to spawn it
    InvalidEnginePath { path: String, reason: String },
    /// A response timeout of zero was requested
    NonPositiveTimeout,
    /// `register name <n> code <c>` needs both a name and a code
    RegistrationArgumentsMissing,
    /// A register command was sent before `set_registration` was called
    RegistrationNotConfigured,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidEnginePath { path, reason } => {
                write!(f, "Invalid chess engine path '{path}': {reason}")
            }
            ConfigError::NonPositiveTimeout => {
                write!(f, "The response timeout must be greater than zero")
            }
            ConfigError::RegistrationArgumentsMissing => {
                write!(f, "A name and a code are required to register the engine")
            }
            ConfigError::RegistrationNotConfigured => {
                write!(f, "The register command has no registration set")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error type for everything the client can fail at.
///
/// Protocol-level failures reported by the engine (`Unknown command`, stderr
/// output) are not represented here: they are captured on the command that
/// was in flight, see [`Command::error_text`](crate::Command::error_text).
#[derive(Debug)]
pub enum UciError {
    /// Configuration was rejected
    Configuration(ConfigError),
    /// The engine process has exited
    EngineNotRunning,
    /// The `uci` handshake did not complete in time; the engine was killed
    EngineFailedToInitialize { timeout: Duration },
    /// The command is not bound to this interface's engine
    CommandNotBound,
    /// The command has already been sent once
    AlreadySent,
    /// Writing to the engine failed
    Io(io::Error),
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciError::Configuration(e) => write!(f, "Configuration error: {e}"),
            UciError::EngineNotRunning => write!(f, "The chess engine is not running"),
            UciError::EngineFailedToInitialize { timeout } => write!(
                f,
                "The chess engine did not complete UCI initialization within {}ms",
                timeout.as_millis()
            ),
            UciError::CommandNotBound => {
                write!(f, "The command was not created by this chess interface")
            }
            UciError::AlreadySent => write!(f, "The command has already been sent"),
            UciError::Io(e) => write!(f, "Engine I/O error: {e}"),
        }
    }
}

impl std::error::Error for UciError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UciError::Configuration(e) => Some(e),
            UciError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for UciError {
    fn from(e: ConfigError) -> Self {
        UciError::Configuration(e)
    }
}

impl From<io::Error> for UciError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::BrokenPipe {
            UciError::EngineNotRunning
        } else {
            UciError::Io(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, UciError>;
