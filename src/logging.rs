//! Injected logging capability.
//!
//! Components never reach for a global logger directly. Each one is handed a
//! [`Logger`] when it is built; the default forwards to the `log` facade, which
//! stays silent until the hosting application installs a backend.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Forwards to whatever logger is installed in the `log` facade.
struct Facade;

impl Log for Facade {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        log::logger().log(record);
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

struct Nop;

impl Log for Nop {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        false
    }

    fn log(&self, _: &Record<'_>) {}

    fn flush(&self) {}
}

/// Leveled logging handle passed to every component.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn Log>,
    target: &'static str,
}

impl Logger {
    /// Log into a custom sink.
    #[must_use]
    pub fn new(sink: Arc<dyn Log>) -> Self {
        Logger {
            sink,
            target: "uci_driver",
        }
    }

    /// Discard everything.
    #[must_use]
    pub fn nop() -> Self {
        Self::new(Arc::new(Nop))
    }

    /// Same sink, different record target.
    #[must_use]
    pub fn with_target(&self, target: &'static str) -> Self {
        Logger {
            sink: Arc::clone(&self.sink),
            target,
        }
    }

    #[must_use]
    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Trace, self.target, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, self.target, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, self.target, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, self.target, args);
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, self.target, args);
    }

    /// `log` has no level above `Error`; critical records are errors whose
    /// target carries a `::critical` suffix.
    pub fn critical(&self, args: fmt::Arguments<'_>) {
        let target = format!("{}::critical", self.target);
        self.emit(Level::Error, &target, args);
    }

    fn emit(&self, level: Level, target: &str, args: fmt::Arguments<'_>) {
        let metadata = Metadata::builder().level(level).target(target).build();
        if !self.sink.enabled(&metadata) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .module_path_static(Some(module_path!()))
                .build(),
        );
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(Arc::new(Facade))
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("target", &self.target).finish()
    }
}

/// Plain stderr backend used by the `uci_driver` binary.
pub struct StderrLog {
    level: LevelFilter,
}

impl StderrLog {
    #[must_use]
    pub fn new(level: LevelFilter) -> Self {
        StderrLog { level }
    }
}

impl Log for StderrLog {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let stderr = std::io::stderr();
        let mut out = stderr.lock();
        let _ = writeln!(
            out,
            "[{:<5} {}] {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Test sink that keeps every record.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct CaptureLog {
    records: parking_lot::Mutex<Vec<(Level, String, String)>>,
}

#[cfg(test)]
impl CaptureLog {
    pub(crate) fn records(&self) -> Vec<(Level, String, String)> {
        self.records.lock().clone()
    }

    pub(crate) fn contains(&self, level: Level, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|(l, _, msg)| *l == level && msg.contains(needle))
    }
}

#[cfg(test)]
impl Log for CaptureLog {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.records.lock().push((
            record.level(),
            record.target().to_string(),
            record.args().to_string(),
        ));
    }

    fn flush(&self) {}
}
