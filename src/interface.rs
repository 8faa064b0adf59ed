//! The front door: start an engine, run the handshake, hand out commands.

use std::sync::Arc;
use std::time::Duration;

use crate::command::{Command, CommandKind, Resolution, Uci};
use crate::config::InterfaceConfig;
use crate::engine::{EngineChannel, EngineProcess};
use crate::error::{Result, UciError};
use crate::logging::Logger;
use crate::protocol::{EngineId, OptionTable, ProtectionState, RegistrationState};

/// A UCI engine that has completed the `uci` handshake.
///
/// Owns the engine: dropping the interface disposes of it. Commands are
/// created through [`create_command`](Self::create_command) so they are
/// bound to this engine.
///
/// ```no_run
/// use uci_driver::{Go, InterfaceConfig, IsReady, UniversalChessInterface};
///
/// let uci = UniversalChessInterface::start(InterfaceConfig::new("/usr/games/stockfish"))?;
/// let ready = uci.create_command::<IsReady>();
/// uci.send_command(&ready)?;
/// uci.wait_for_response(&ready)?;
///
/// let go = uci.create_command_with(Go::depth(12));
/// go.send_and_wait()?;
/// println!("{:?}", go.state().best_move());
/// # Ok::<(), uci_driver::UciError>(())
/// ```
pub struct UniversalChessInterface {
    engine: Arc<dyn EngineChannel>,
    options: OptionTable,
    registration: RegistrationState,
    copy_protection: ProtectionState,
    uci_mode_complete: bool,
    handshake_error: Option<String>,
    command_timeout: Duration,
    log: Logger,
}

impl UniversalChessInterface {
    /// Start the engine named by `config` and run the handshake.
    pub fn start(config: InterfaceConfig) -> Result<Self> {
        config.validate()?;
        let process = EngineProcess::start_with_args(
            &config.engine_path,
            &config.args,
            config.logger.clone(),
        )?;
        Self::with_engine(Arc::new(process), &config)
    }

    /// Run the handshake over an already started engine. `engine_path` and
    /// `args` of `config` are not used.
    ///
    /// If the engine does not send `uciok` within the handshake timeout it
    /// is killed and [`UciError::EngineFailedToInitialize`] is returned.
    pub fn with_engine(engine: Arc<dyn EngineChannel>, config: &InterfaceConfig) -> Result<Self> {
        let log = config.logger.with_target("uci_driver::interface");
        if let Err(e) = config.validate_timeouts() {
            engine.dispose();
            return Err(e.into());
        }

        let handshake = Command::bound(
            Uci::default(),
            &engine,
            config.handshake_timeout,
            log.clone(),
        );
        let resolution = match handshake.send_and_wait() {
            Ok(resolution) => resolution,
            Err(e) => {
                log.error(format_args!("Unable to send the uci command: {e}"));
                drop(handshake);
                engine.dispose();
                return Err(e);
            }
        };

        let handshake_error = match resolution {
            Resolution::Response => None,
            Resolution::Error(text) => {
                log.warn(format_args!(
                    "The chess engine reported an error during initialization: {text}"
                ));
                Some(text)
            }
            Resolution::TimedOut | Resolution::Unacknowledged => {
                log.critical(format_args!(
                    "The chess engine did not respond to uci within {}ms, killing it",
                    config.handshake_timeout.as_millis()
                ));
                drop(handshake);
                engine.kill();
                engine.dispose();
                return Err(UciError::EngineFailedToInitialize {
                    timeout: config.handshake_timeout,
                });
            }
        };

        let uci = std::mem::take(&mut *handshake.state());
        drop(handshake);
        log.info(format_args!(
            "UCI mode complete, {} options received",
            uci.options().len()
        ));

        Ok(UniversalChessInterface {
            engine,
            registration: uci.registration(),
            copy_protection: uci.copy_protection(),
            options: uci.into_options(),
            uci_mode_complete: true,
            handshake_error,
            command_timeout: config.command_timeout,
            log,
        })
    }

    /// A new command of kind `K` bound to this engine, with the configured
    /// response timeout.
    #[must_use]
    pub fn create_command<K: CommandKind + Default>(&self) -> Command<K> {
        self.create_command_with(K::default())
    }

    /// Bind an already configured command kind to this engine.
    #[must_use]
    pub fn create_command_with<K: CommandKind>(&self, kind: K) -> Command<K> {
        Command::bound(kind, &self.engine, self.command_timeout, self.log.clone())
    }

    /// Send `command`, which must come from this interface.
    pub fn send_command<K: CommandKind>(&self, command: &Command<K>) -> Result<()> {
        self.check_bound(command)?;
        command.send()
    }

    /// Block until `command` is resolved or times out.
    pub fn wait_for_response<K: CommandKind>(&self, command: &Command<K>) -> Result<Resolution> {
        self.check_bound(command)?;
        Ok(command.wait())
    }

    fn check_bound<K: CommandKind>(&self, command: &Command<K>) -> Result<()> {
        if command.is_bound_to(&self.engine) {
            Ok(())
        } else {
            Err(UciError::CommandNotBound)
        }
    }

    #[must_use]
    pub fn is_engine_running(&self) -> bool {
        self.engine.is_running()
    }

    #[must_use]
    pub fn uci_mode_complete(&self) -> bool {
        self.uci_mode_complete
    }

    /// The error line that ended the handshake before `uciok`, if any.
    ///
    /// When set, [`chess_engine_options`](Self::chess_engine_options) only
    /// holds what arrived before the error and may be empty.
    #[must_use]
    pub fn handshake_error(&self) -> Option<&str> {
        self.handshake_error.as_deref()
    }

    /// Options advertised during the handshake, keyed by
    /// [`option_key`](crate::protocol::option_key), plus the `id` record.
    #[must_use]
    pub fn chess_engine_options(&self) -> &OptionTable {
        &self.options
    }

    #[must_use]
    pub fn engine_id(&self) -> Option<&EngineId> {
        self.options
            .get(crate::protocol::id::ID_KEY)
            .and_then(|record| record.id.as_ref())
    }

    /// Registration status seen during the handshake.
    #[must_use]
    pub fn registration(&self) -> RegistrationState {
        self.registration
    }

    /// Copy protection status seen during the handshake.
    #[must_use]
    pub fn copy_protection(&self) -> ProtectionState {
        self.copy_protection
    }

    /// Terminate the engine now. Commands still waiting time out.
    pub fn kill_engine(&self) {
        self.log.info(format_args!("Killing the chess engine on request"));
        self.engine.kill();
    }
}

impl Drop for UniversalChessInterface {
    fn drop(&mut self) {
        self.engine.dispose();
    }
}
