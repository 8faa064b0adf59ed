//! The chess engine child process and its stream pumps.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use super::{EngineChannel, LineRouter};
use crate::error::{ConfigError, Result, UciError};
use crate::logging::Logger;
use crate::protocol::{classify_line, Stream};
use crate::sync::StopFlag;

/// A running UCI engine.
///
/// Two background threads read the engine's stdout and stderr line by line
/// and hand every non-blank line to the [`LineRouter`]. Input is written
/// synchronously by [`send_line`](EngineChannel::send_line); concurrent
/// senders must serialize themselves.
pub struct EngineProcess {
    path: PathBuf,
    pid: u32,
    child: Mutex<Child>,
    /// `None` once disposed
    stdin: Mutex<Option<ChildStdin>>,
    router: Arc<LineRouter>,
    shutdown: StopFlag,
    log: Logger,
}

impl EngineProcess {
    /// Launch the engine at `path` with no arguments.
    pub fn start(path: impl AsRef<Path>, log: Logger) -> Result<Self> {
        Self::start_with_args(path, &[], log)
    }

    /// Launch the engine at `path` with its standard streams redirected.
    ///
    /// The working directory is the directory containing the executable, if
    /// the path names one.
    pub fn start_with_args(path: impl AsRef<Path>, args: &[String], log: Logger) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidEnginePath {
                path: String::new(),
                reason: "no chess engine path was supplied".to_string(),
            }
            .into());
        }
        let log = log.with_target("uci_driver::engine");
        log.info(format_args!(
            "Starting the chess engine process, path is {}",
            path.display()
        ));

        let invalid = |reason: String| ConfigError::InvalidEnginePath {
            path: path.display().to_string(),
            reason,
        };

        // A relative program path combined with `current_dir` resolves
        // differently per platform, so pin it down first.
        let program = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let mut command = Command::new(&program);
        command
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = program.parent().filter(|d| !d.as_os_str().is_empty()) {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| invalid(e.to_string()))?;
        let pid = child.id();

        let (Some(stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(invalid("standard streams could not be redirected".to_string()).into());
        };

        let router = Arc::new(LineRouter::new());
        let shutdown = StopFlag::new();
        let pumps = spawn_pump(stdout, Stream::Data, &router, &shutdown, &log)
            .and_then(|()| spawn_pump(stderr, Stream::Error, &router, &shutdown, &log));
        if let Err(e) = pumps {
            shutdown.stop();
            let _ = child.kill();
            let _ = child.wait();
            return Err(UciError::Io(e));
        }

        log.info(format_args!(
            "The chess engine process is started, process id {pid}"
        ));

        Ok(EngineProcess {
            path: path.to_path_buf(),
            pid,
            child: Mutex::new(child),
            stdin: Mutex::new(Some(stdin)),
            router,
            shutdown,
            log,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Stop delivering lines, drop every listener, close the engine's input
    /// and make sure the process is gone. Safe to call more than once.
    pub fn dispose(&self) {
        if !self.shutdown.stop() {
            return;
        }
        self.log.debug(format_args!(
            "Disposing of the chess engine process {}",
            self.path().display()
        ));
        self.router.clear();
        self.stdin.lock().take();
        if self.is_running() {
            self.kill();
        }
    }
}

impl EngineChannel for EngineProcess {
    fn send_line(&self, line: &str) -> Result<()> {
        if !self.is_running() {
            return Err(UciError::EngineNotRunning);
        }
        let mut guard = self.stdin.lock();
        let stdin = guard.as_mut().ok_or(UciError::EngineNotRunning)?;
        self.log.info(format_args!("Sending the {line} command"));
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        stdin.write_all(buf.as_bytes())?;
        stdin.flush()?;
        Ok(())
    }

    fn is_running(&self) -> bool {
        matches!(self.child.lock().try_wait(), Ok(None))
    }

    fn kill(&self) {
        let mut child = self.child.lock();
        if !matches!(child.try_wait(), Ok(None)) {
            return;
        }
        self.log.info(format_args!(
            "Killing the chess engine process {} ({})",
            self.pid,
            self.path().display()
        ));
        match child.kill() {
            // Reap it so no zombie is left behind
            Ok(()) => {
                let _ = child.wait();
            }
            Err(e) => self
                .log
                .warn(format_args!("Unable to kill the chess engine process: {e}")),
        }
    }

    fn dispose(&self) {
        EngineProcess::dispose(self);
    }

    fn lines(&self) -> &LineRouter {
        &self.router
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Read `source` line by line on a named background thread.
///
/// The thread is detached: it ends by itself once the pipe closes.
fn spawn_pump<R: Read + Send + 'static>(
    source: R,
    origin: Stream,
    router: &Arc<LineRouter>,
    shutdown: &StopFlag,
    log: &Logger,
) -> io::Result<()> {
    let name = match origin {
        Stream::Data => "uci-stdout",
        Stream::Error => "uci-stderr",
    };
    let router = Arc::clone(router);
    let shutdown = shutdown.clone();
    let log = log.clone();

    thread::Builder::new().name(name.to_string()).spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log.warn(format_args!("{name} read failed: {e}"));
                    break;
                }
            }
            if shutdown.is_stopped() {
                break;
            }
            let raw = String::from_utf8_lossy(&buf);
            if let Some((stream, line)) = classify_line(origin, &raw) {
                log.trace(format_args!("{stream} line received: {line}"));
                router.dispatch(stream, line);
            }
        }
        log.debug(format_args!("{name} closed"));
    })?;
    Ok(())
}
