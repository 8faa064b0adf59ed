//! One UCI exchange: a request written to the engine and the decision of
//! when its response is complete.
//!
//! [`Command`] holds the shared machinery: subscription to the engine's
//! output, the sticky resolution, the timeout and the blocking wait. What
//! to send and which lines end the exchange is supplied by a
//! [`CommandKind`].
//!
//! A command is resolved exactly once, either by its matcher, by a line on
//! the error stream, or by its timeout elapsing. Lines arriving after that
//! are ignored.

mod go;
mod position;
mod register;
mod set_option;
mod simple;
mod uci;

pub use go::Go;
pub use position::Position;
pub use register::Register;
pub use set_option::{OptionSetting, SetOption};
pub use simple::{DebugMode, IsReady, PonderHit, Quit, Stop, UciNewGame};
pub use uci::Uci;

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;
use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::engine::{EngineChannel, LineListener, SubscriptionId};
use crate::error::{ConfigError, Result, UciError};
use crate::logging::Logger;
use crate::protocol::Stream;

/// Default time a command waits for the engine.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// What a matcher decided about one incoming line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Not the end of the response
    Continue,
    /// The response is complete
    Resolved,
    /// The exchange failed with this text
    Error(String),
}

/// How a command ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The matcher saw the terminating line
    Response,
    /// An error line ended the exchange
    Error(String),
    /// The timeout elapsed first
    TimedOut,
    /// Nothing to wait for: the command expects no reply, or was never sent
    Unacknowledged,
}

/// Protocol semantics of one command type.
pub trait CommandKind: Send + 'static {
    /// Short name used in logs
    const NAME: &'static str;

    /// Text to write, one entry per line. Rebuilt on every send from the
    /// current field values.
    fn request_lines(&self) -> Vec<String>;

    /// Reject a send before anything is written.
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        Ok(())
    }

    /// Whether the engine answers this command at all.
    fn expects_reply(&self) -> bool {
        false
    }

    /// Reset per-exchange results right before sending.
    fn on_send(&mut self) {}

    /// Classify one data-stream line. Error-stream lines never reach here:
    /// they always end the exchange.
    fn on_line(&mut self, _line: &str) -> MatchOutcome {
        MatchOutcome::Continue
    }
}

struct Shared<K> {
    kind: Mutex<K>,
    timeout: Mutex<Duration>,
    sent_at: OnceCell<Instant>,
    resolution: OnceCell<Resolution>,
    error_text: OnceCell<String>,
    signal: Mutex<()>,
    resolved: Condvar,
    engine: Weak<dyn EngineChannel>,
    subscriptions: Mutex<Vec<SubscriptionId>>,
    log: Logger,
}

impl<K: CommandKind> Shared<K> {
    fn timeout(&self) -> Duration {
        *self.timeout.lock()
    }

    fn timeout_elapsed(&self) -> bool {
        self.sent_at
            .get()
            .is_some_and(|sent| sent.elapsed() >= self.timeout())
    }

    /// Run one delivered line through the matcher.
    fn offer(&self, stream: Stream, line: &str) {
        // The kind lock serializes the stdout and stderr pumps, so the
        // resolved check and the matcher run as one step.
        let mut kind = self.kind.lock();
        if self.resolution.get().is_some() {
            return;
        }
        if self.timeout_elapsed() {
            self.resolve(Resolution::TimedOut);
            return;
        }
        self.log
            .trace(format_args!("{} received on {stream}: {line}", K::NAME));

        let outcome = match stream {
            Stream::Data => kind.on_line(line),
            Stream::Error => {
                self.log
                    .error(format_args!("{} error received: {line}", K::NAME));
                MatchOutcome::Error(line.to_string())
            }
        };
        match outcome {
            MatchOutcome::Continue => {}
            MatchOutcome::Resolved => self.resolve(Resolution::Response),
            MatchOutcome::Error(text) => {
                let _ = self.error_text.set(text.clone());
                self.resolve(Resolution::Error(text));
            }
        }
    }

    /// First caller wins; everyone waiting is woken.
    fn resolve(&self, resolution: Resolution) {
        let label = format!("{resolution:?}");
        if self.resolution.set(resolution).is_err() {
            return;
        }
        self.log
            .debug(format_args!("{} resolved: {label}", K::NAME));
        self.detach();
        let _guard = self.signal.lock();
        self.resolved.notify_all();
    }

    fn subscribe(self: &Arc<Self>, engine: &Arc<dyn EngineChannel>) {
        let weak = Arc::downgrade(self);
        let listener: LineListener = Arc::new(move |stream: Stream, line: &str| {
            if let Some(shared) = weak.upgrade() {
                shared.offer(stream, line);
            }
        });
        let router = engine.lines();
        let mut subscriptions = self.subscriptions.lock();
        subscriptions.push(router.subscribe(Stream::Data, Arc::clone(&listener)));
        subscriptions.push(router.subscribe(Stream::Error, listener));
    }

    fn detach(&self) {
        let ids: Vec<SubscriptionId> = self.subscriptions.lock().drain(..).collect();
        if ids.is_empty() {
            return;
        }
        if let Some(engine) = self.engine.upgrade() {
            for id in ids {
                engine.lines().unsubscribe(id);
            }
        }
    }
}

/// A single exchange with the engine.
///
/// Created by [`create_command`](crate::UniversalChessInterface::create_command),
/// which binds it to the interface's engine. Dropping the command
/// unsubscribes it; a command must be dropped before its interface.
pub struct Command<K: CommandKind> {
    shared: Arc<Shared<K>>,
}

impl<K: CommandKind> Command<K> {
    pub(crate) fn bound(
        kind: K,
        engine: &Arc<dyn EngineChannel>,
        timeout: Duration,
        log: Logger,
    ) -> Self {
        Command {
            shared: Arc::new(Shared {
                kind: Mutex::new(kind),
                timeout: Mutex::new(timeout),
                sent_at: OnceCell::new(),
                resolution: OnceCell::new(),
                error_text: OnceCell::new(),
                signal: Mutex::new(()),
                resolved: Condvar::new(),
                engine: Arc::downgrade(engine),
                subscriptions: Mutex::new(Vec::new()),
                log,
            }),
        }
    }

    pub(crate) fn is_bound_to(&self, engine: &Arc<dyn EngineChannel>) -> bool {
        std::ptr::eq(
            self.shared.engine.as_ptr().cast::<()>(),
            Arc::as_ptr(engine).cast::<()>(),
        )
    }

    /// Command fields and parsed results.
    ///
    /// Do not hold the guard across [`send`](Self::send) or
    /// [`wait`](Self::wait).
    pub fn state(&self) -> MutexGuard<'_, K> {
        self.shared.kind.lock()
    }

    /// The request text as it would be sent now, lines joined by `\n`.
    #[must_use]
    pub fn command_text(&self) -> String {
        self.shared.kind.lock().request_lines().join("\n")
    }

    #[must_use]
    pub fn response_timeout(&self) -> Duration {
        self.shared.timeout()
    }

    /// Change how long [`wait`](Self::wait) blocks. Zero is rejected.
    pub fn set_response_timeout(&self, timeout: Duration) -> Result<()> {
        if timeout.is_zero() {
            return Err(ConfigError::NonPositiveTimeout.into());
        }
        *self.shared.timeout.lock() = timeout;
        Ok(())
    }

    /// Write the request and start watching for the response. Returns as
    /// soon as the text is written.
    pub fn send(&self) -> Result<()> {
        let engine = self
            .shared
            .engine
            .upgrade()
            .ok_or(UciError::EngineNotRunning)?;
        if !engine.is_running() {
            return Err(UciError::EngineNotRunning);
        }

        let lines = {
            let mut kind = self.shared.kind.lock();
            kind.validate()?;
            if self.shared.sent_at.get().is_some() {
                return Err(UciError::AlreadySent);
            }
            kind.on_send();
            let lines = kind.request_lines();
            let _ = self.shared.sent_at.set(Instant::now());
            lines
        };

        // Subscribe before writing so a fast reply cannot be missed
        self.shared.subscribe(&engine);
        if lines.is_empty() {
            self.shared
                .log
                .warn(format_args!("{} has nothing to send", K::NAME));
        }
        for line in &lines {
            self.shared.log.trace(format_args!(
                "Sending the {line} command to the chess engine"
            ));
            if let Err(e) = engine.send_line(line) {
                // The exchange is over: nothing more will be written or matched
                let text = e.to_string();
                self.shared
                    .log
                    .error(format_args!("{} could not be sent: {text}", K::NAME));
                let _ = self.shared.error_text.set(text.clone());
                self.shared.resolve(Resolution::Error(text));
                return Err(e);
            }
        }
        Ok(())
    }

    /// Block until the command is resolved or its timeout elapses.
    ///
    /// Returns at once for commands that expect no reply (unless an error
    /// line already resolved them) and for commands never sent.
    pub fn wait(&self) -> Resolution {
        let shared = &self.shared;
        if let Some(resolution) = shared.resolution.get() {
            return resolution.clone();
        }
        let Some(sent_at) = shared.sent_at.get().copied() else {
            return Resolution::Unacknowledged;
        };
        if !shared.kind.lock().expects_reply() {
            return Resolution::Unacknowledged;
        }

        let deadline = sent_at.checked_add(shared.timeout());
        let mut guard = shared.signal.lock();
        loop {
            if let Some(resolution) = shared.resolution.get() {
                return resolution.clone();
            }
            match deadline {
                Some(deadline) => {
                    if shared.resolved.wait_until(&mut guard, deadline).timed_out() {
                        break;
                    }
                }
                None => shared.resolved.wait(&mut guard),
            }
        }
        drop(guard);

        shared.resolve(Resolution::TimedOut);
        shared
            .resolution
            .get()
            .cloned()
            .unwrap_or(Resolution::TimedOut)
    }

    /// [`send`](Self::send) followed by [`wait`](Self::wait).
    pub fn send_and_wait(&self) -> Result<Resolution> {
        self.send()?;
        Ok(self.wait())
    }

    /// `true` once the engine answered, with a terminating line or an error.
    #[must_use]
    pub fn response_received(&self) -> bool {
        matches!(
            self.shared.resolution.get(),
            Some(Resolution::Response | Resolution::Error(_))
        )
    }

    /// `true` once the timeout has passed since the command was sent.
    #[must_use]
    pub fn response_timeout_elapsed(&self) -> bool {
        self.shared.timeout_elapsed()
    }

    #[must_use]
    pub fn resolution(&self) -> Option<Resolution> {
        self.shared.resolution.get().cloned()
    }

    /// The error line that ended this exchange, if any.
    #[must_use]
    pub fn error_text(&self) -> Option<&str> {
        self.shared.error_text.get().map(String::as_str)
    }

    #[must_use]
    pub fn sent_at(&self) -> Option<Instant> {
        self.shared.sent_at.get().copied()
    }

    /// Unsubscribe from the engine. Same as dropping the command.
    pub fn dispose(self) {}
}

impl<K: CommandKind> Drop for Command<K> {
    fn drop(&mut self) {
        self.shared.detach();
    }
}

impl<K: CommandKind> fmt::Debug for Command<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("kind", &K::NAME)
            .field("sent_at", &self.sent_at())
            .field("resolution", &self.resolution())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use proptest::prelude::*;

    use super::*;
    use crate::engine::scripted::ScriptedEngine;

    fn bind<K: CommandKind>(
        engine: &Arc<ScriptedEngine>,
        kind: K,
        timeout: Duration,
    ) -> Command<K> {
        let channel: Arc<dyn EngineChannel> = engine.clone();
        Command::bound(kind, &channel, timeout, Logger::nop())
    }

    fn ready_engine() -> Arc<ScriptedEngine> {
        Arc::new(ScriptedEngine::new(|line| match line {
            "isready" => vec![(Stream::Data, "readyok".to_string())],
            _ => Vec::new(),
        }))
    }

    #[test]
    fn test_isready_resolves_on_readyok() {
        let engine = ready_engine();
        let cmd = bind(&engine, IsReady, DEFAULT_RESPONSE_TIMEOUT);

        assert_eq!(cmd.send_and_wait().expect("send"), Resolution::Response);
        assert!(cmd.response_received());
        assert!(!cmd.response_timeout_elapsed());
        assert_eq!(cmd.error_text(), None);
        assert_eq!(engine.sent(), vec!["isready"]);
    }

    #[test]
    fn test_resolution_unsubscribes() {
        let engine = ready_engine();
        let cmd = bind(&engine, IsReady, DEFAULT_RESPONSE_TIMEOUT);
        cmd.send().expect("send");
        assert_eq!(engine.lines().subscriber_count(Stream::Data), 0);
        assert_eq!(engine.lines().subscriber_count(Stream::Error), 0);
    }

    #[test]
    fn test_timeout_without_reply() {
        let engine = Arc::new(ScriptedEngine::silent());
        let cmd = bind(&engine, IsReady, Duration::from_millis(10));
        cmd.send().expect("send");

        thread::sleep(Duration::from_millis(20));
        assert!(!cmd.response_received());
        assert!(cmd.response_timeout_elapsed());

        assert_eq!(cmd.wait(), Resolution::TimedOut);
        assert!(!cmd.response_received());
    }

    #[test]
    fn test_wait_blocks_until_timeout() {
        let engine = Arc::new(ScriptedEngine::silent());
        let cmd = bind(&engine, IsReady, Duration::from_millis(30));
        cmd.send().expect("send");

        let start = Instant::now();
        assert_eq!(cmd.wait(), Resolution::TimedOut);
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(engine.lines().subscriber_count(Stream::Data), 0);
    }

    #[test]
    fn test_lines_after_timeout_are_ignored() {
        let engine = Arc::new(ScriptedEngine::silent());
        let cmd = bind(&engine, IsReady, Duration::from_millis(5));
        cmd.send().expect("send");
        thread::sleep(Duration::from_millis(15));

        engine.emit(Stream::Data, "readyok");
        assert_eq!(cmd.resolution(), Some(Resolution::TimedOut));
        assert!(!cmd.response_received());
    }

    #[test]
    fn test_wait_wakes_on_reply_from_another_thread() {
        let engine = Arc::new(ScriptedEngine::silent());
        let cmd = bind(&engine, IsReady, Duration::from_secs(5));
        cmd.send().expect("send");

        let emitter = {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                engine.emit(Stream::Data, "readyok");
            })
        };
        let start = Instant::now();
        assert_eq!(cmd.wait(), Resolution::Response);
        assert!(start.elapsed() < Duration::from_secs(5));
        emitter.join().expect("emitter thread");
    }

    #[test]
    fn test_unknown_command_sets_error_text() {
        let engine = Arc::new(ScriptedEngine::silent());
        let cmd = bind(&engine, IsReady, DEFAULT_RESPONSE_TIMEOUT);
        cmd.send().expect("send");

        engine.emit(Stream::Data, "Unknown command: foo");

        assert_eq!(cmd.error_text(), Some("Unknown command: foo"));
        assert!(cmd.response_received());
        assert_eq!(
            cmd.wait(),
            Resolution::Error("Unknown command: foo".to_string())
        );
    }

    #[test]
    fn test_error_text_is_sticky() {
        let engine = Arc::new(ScriptedEngine::silent());
        let cmd = bind(&engine, IsReady, DEFAULT_RESPONSE_TIMEOUT);
        cmd.send().expect("send");

        engine.emit(Stream::Error, "first failure");
        engine.emit(Stream::Error, "second failure");
        engine.emit(Stream::Data, "readyok");

        assert_eq!(cmd.error_text(), Some("first failure"));
        assert_eq!(
            cmd.resolution(),
            Some(Resolution::Error("first failure".to_string()))
        );
    }

    #[test]
    fn test_error_reaches_every_subscribed_command() {
        let engine = Arc::new(ScriptedEngine::silent());
        let ready = bind(&engine, IsReady, DEFAULT_RESPONSE_TIMEOUT);
        let new_game = bind(&engine, UciNewGame, DEFAULT_RESPONSE_TIMEOUT);
        ready.send().expect("send");
        new_game.send().expect("send");

        engine.emit(Stream::Data, "Unknown command: ucinewgame");

        assert_eq!(ready.error_text(), Some("Unknown command: ucinewgame"));
        assert_eq!(new_game.error_text(), Some("Unknown command: ucinewgame"));
    }

    #[test]
    fn test_one_data_line_resolves_every_matching_command() {
        let engine = Arc::new(ScriptedEngine::silent());
        let first = bind(&engine, IsReady, DEFAULT_RESPONSE_TIMEOUT);
        let second = bind(&engine, IsReady, DEFAULT_RESPONSE_TIMEOUT);
        let go = bind(&engine, Go::infinite(), DEFAULT_RESPONSE_TIMEOUT);
        first.send().expect("send");
        second.send().expect("send");
        go.send().expect("send");

        engine.emit(Stream::Data, "readyok");

        assert_eq!(first.resolution(), Some(Resolution::Response));
        assert_eq!(second.resolution(), Some(Resolution::Response));
        assert_eq!(go.resolution(), None);
        assert!(go.state().info_log().contains("readyok"));
        assert_eq!(engine.lines().subscriber_count(Stream::Data), 1);
    }

    #[test]
    fn test_write_failure_resolves_with_error() {
        let engine = Arc::new(ScriptedEngine::silent());
        engine.fail_writes();
        let timeout = Duration::from_secs(5);
        let cmd = bind(&engine, IsReady, timeout);

        assert!(matches!(cmd.send(), Err(UciError::Io(_))));
        let start = Instant::now();
        assert!(matches!(cmd.wait(), Resolution::Error(_)));
        assert!(start.elapsed() < timeout);
        assert!(cmd.error_text().is_some_and(|t| t.contains("pipe closed")));
        assert!(cmd.response_received());
        assert_eq!(engine.lines().subscriber_count(Stream::Data), 0);
        assert_eq!(engine.lines().subscriber_count(Stream::Error), 0);
    }

    #[test]
    fn test_no_reply_commands_do_not_block() {
        let engine = Arc::new(ScriptedEngine::silent());
        let stop = bind(&engine, Stop, DEFAULT_RESPONSE_TIMEOUT);

        let start = Instant::now();
        assert_eq!(stop.send_and_wait().expect("send"), Resolution::Unacknowledged);
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(!stop.response_received());
        assert_eq!(engine.sent(), vec!["stop"]);
    }

    #[test]
    fn test_unsent_command_wait_returns_at_once() {
        let engine = Arc::new(ScriptedEngine::silent());
        let cmd = bind(&engine, IsReady, DEFAULT_RESPONSE_TIMEOUT);
        assert_eq!(cmd.wait(), Resolution::Unacknowledged);
        assert!(!cmd.response_timeout_elapsed());
        assert_eq!(cmd.sent_at(), None);
    }

    #[test]
    fn test_second_send_is_rejected() {
        let engine = ready_engine();
        let cmd = bind(&engine, IsReady, DEFAULT_RESPONSE_TIMEOUT);
        cmd.send().expect("first send");
        assert!(matches!(cmd.send(), Err(UciError::AlreadySent)));
        assert!(cmd.response_received());
        assert_eq!(engine.sent().len(), 1);
    }

    #[test]
    fn test_send_to_stopped_engine_fails() {
        let engine = ready_engine();
        engine.stop_running();
        let cmd = bind(&engine, IsReady, DEFAULT_RESPONSE_TIMEOUT);
        assert!(matches!(cmd.send(), Err(UciError::EngineNotRunning)));
        assert_eq!(cmd.sent_at(), None);
    }

    #[test]
    fn test_send_after_engine_dropped_fails() {
        let engine = ready_engine();
        let cmd = bind(&engine, IsReady, DEFAULT_RESPONSE_TIMEOUT);
        drop(engine);
        assert!(matches!(cmd.send(), Err(UciError::EngineNotRunning)));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let engine = ready_engine();
        let cmd = bind(&engine, IsReady, DEFAULT_RESPONSE_TIMEOUT);
        assert!(matches!(
            cmd.set_response_timeout(Duration::ZERO),
            Err(UciError::Configuration(ConfigError::NonPositiveTimeout))
        ));
        assert_eq!(cmd.response_timeout(), DEFAULT_RESPONSE_TIMEOUT);
        cmd.set_response_timeout(Duration::from_millis(250))
            .expect("positive timeout");
        assert_eq!(cmd.response_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_drop_unsubscribes_even_unresolved() {
        let engine = Arc::new(ScriptedEngine::silent());
        let cmd = bind(&engine, IsReady, DEFAULT_RESPONSE_TIMEOUT);
        cmd.send().expect("send");
        assert_eq!(engine.lines().subscriber_count(Stream::Data), 1);
        cmd.dispose();
        assert_eq!(engine.lines().subscriber_count(Stream::Data), 0);
        assert_eq!(engine.lines().subscriber_count(Stream::Error), 0);
    }

    #[test]
    fn test_dispose_unsent_command() {
        let engine = Arc::new(ScriptedEngine::silent());
        let cmd = bind(&engine, Quit, DEFAULT_RESPONSE_TIMEOUT);
        drop(cmd);
        assert!(engine.sent().is_empty());
    }

    #[test]
    fn test_bound_engine_identity() {
        let engine = ready_engine();
        let other: Arc<dyn EngineChannel> = ready_engine();
        let channel: Arc<dyn EngineChannel> = engine.clone();
        let cmd = bind(&engine, IsReady, DEFAULT_RESPONSE_TIMEOUT);
        assert!(cmd.is_bound_to(&channel));
        assert!(!cmd.is_bound_to(&other));
    }

    proptest! {
        /// Property: once resolved, no later line changes the resolution
        #[test]
        fn prop_resolution_is_sticky(
            lines in proptest::collection::vec(
                prop_oneof![
                    Just((Stream::Data, "readyok")),
                    Just((Stream::Data, "info string hello")),
                    Just((Stream::Error, "engine crashed")),
                    Just((Stream::Data, "Unknown command: x")),
                ],
                1..12,
            )
        ) {
            let engine = Arc::new(ScriptedEngine::silent());
            let cmd = bind(&engine, IsReady, DEFAULT_RESPONSE_TIMEOUT);
            cmd.send().expect("send");

            let mut first: Option<Resolution> = None;
            for (stream, line) in lines {
                engine.emit(stream, line);
                let current = cmd.resolution();
                if let Some(expected) = &first {
                    prop_assert_eq!(current.as_ref(), Some(expected));
                } else {
                    first = current;
                }
                if first.is_some() {
                    prop_assert!(cmd.response_received());
                }
            }
        }
    }
}
