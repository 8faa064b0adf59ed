//! Settings for starting an engine and talking to it.

use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::command::DEFAULT_RESPONSE_TIMEOUT;
use crate::error::ConfigError;
use crate::logging::Logger;

/// Default time the `uci` handshake may take.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable the `uci_driver` binary reads the engine path from.
pub const ENGINE_PATH_ENV: &str = "UCI_ENGINE_PATH";

/// How to start the engine and how long to wait on it.
#[derive(Debug, Clone)]
pub struct InterfaceConfig {
    pub engine_path: PathBuf,
    /// Extra arguments passed to the engine executable
    pub args: Vec<String>,
    pub handshake_timeout: Duration,
    /// Response timeout given to every command the interface creates
    pub command_timeout: Duration,
    pub logger: Logger,
}

impl InterfaceConfig {
    pub fn new(engine_path: impl Into<PathBuf>) -> Self {
        InterfaceConfig {
            engine_path: engine_path.into(),
            args: Vec::new(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            command_timeout: DEFAULT_RESPONSE_TIMEOUT,
            logger: Logger::default(),
        }
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Timeouts must be positive. The path is only checked for emptiness
    /// here; whether it can be started is found out when spawning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_timeouts()?;
        if self.engine_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidEnginePath {
                path: String::new(),
                reason: "no path given".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn validate_timeouts(&self) -> Result<(), ConfigError> {
        if self.handshake_timeout.is_zero() || self.command_timeout.is_zero() {
            return Err(ConfigError::NonPositiveTimeout);
        }
        Ok(())
    }
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self::new(PathBuf::new())
    }
}

/// Engine executables for each supported OS, so one configuration file
/// can serve several machines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnginePaths {
    pub windows: Option<PathBuf>,
    pub linux: Option<PathBuf>,
    pub macos: Option<PathBuf>,
}

impl EnginePaths {
    /// The entry for the OS this binary was built for.
    pub fn resolve(&self) -> Result<PathBuf, ConfigError> {
        let (os, path) = if cfg!(target_os = "windows") {
            ("windows", &self.windows)
        } else if cfg!(target_os = "macos") {
            ("macos", &self.macos)
        } else {
            ("linux", &self.linux)
        };
        match path {
            Some(path) if !path.as_os_str().is_empty() => Ok(path.clone()),
            _ => Err(ConfigError::InvalidEnginePath {
                path: String::new(),
                reason: format!("no engine configured for {os}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InterfaceConfig::new("/usr/bin/stockfish");
        assert_eq!(config.handshake_timeout, Duration::from_secs(10));
        assert_eq!(config.command_timeout, Duration::from_secs(10));
        assert!(config.args.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = InterfaceConfig::new("engine")
            .with_args(["--threads", "2"])
            .with_handshake_timeout(Duration::from_millis(500))
            .with_command_timeout(Duration::from_secs(3))
            .with_logger(Logger::nop());
        assert_eq!(config.args, vec!["--threads", "2"]);
        assert_eq!(config.handshake_timeout, Duration::from_millis(500));
        assert_eq!(config.command_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_validate_rejects_empty_path_and_zero_timeouts() {
        assert!(matches!(
            InterfaceConfig::default().validate(),
            Err(ConfigError::InvalidEnginePath { .. })
        ));
        assert_eq!(
            InterfaceConfig::new("engine")
                .with_handshake_timeout(Duration::ZERO)
                .validate(),
            Err(ConfigError::NonPositiveTimeout)
        );
        assert_eq!(
            InterfaceConfig::new("engine")
                .with_command_timeout(Duration::ZERO)
                .validate(),
            Err(ConfigError::NonPositiveTimeout)
        );
    }

    #[test]
    fn test_engine_paths_resolve_current_os() {
        let paths = EnginePaths {
            windows: Some(PathBuf::from("C:\\engines\\stockfish.exe")),
            linux: Some(PathBuf::from("/usr/games/stockfish")),
            macos: Some(PathBuf::from("/opt/homebrew/bin/stockfish")),
        };
        let resolved = paths.resolve().expect("path for this OS");
        if cfg!(target_os = "windows") {
            assert_eq!(resolved, PathBuf::from("C:\\engines\\stockfish.exe"));
        } else if cfg!(target_os = "macos") {
            assert_eq!(resolved, PathBuf::from("/opt/homebrew/bin/stockfish"));
        } else {
            assert_eq!(resolved, PathBuf::from("/usr/games/stockfish"));
        }
    }

    #[test]
    fn test_engine_paths_missing_entry() {
        assert!(matches!(
            EnginePaths::default().resolve(),
            Err(ConfigError::InvalidEnginePath { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_engine_paths_from_json() {
        let paths: EnginePaths =
            serde_json::from_str(r#"{"linux": "/usr/games/stockfish"}"#).expect("valid json");
        assert_eq!(paths.linux, Some(PathBuf::from("/usr/games/stockfish")));
        assert_eq!(paths.windows, None);
    }
}
