//! Transport to the chess engine.
//!
//! [`EngineChannel`] is the seam between the command machinery and whatever
//! carries the text: normally an [`EngineProcess`], in unit tests a scripted
//! in-memory engine.

mod process;
mod router;

pub use process::EngineProcess;
pub use router::{LineListener, LineRouter, SubscriptionId};

use crate::error::Result;

/// Line-oriented, bidirectional link to a UCI engine.
pub trait EngineChannel: Send + Sync {
    /// Write one line (a terminator is appended) and flush it.
    fn send_line(&self, line: &str) -> Result<()>;

    /// `true` until the engine has exited.
    fn is_running(&self) -> bool;

    /// Forcibly terminate the engine. Idempotent.
    fn kill(&self);

    /// Drop all listeners and release the engine. Idempotent.
    fn dispose(&self);

    /// Where output lines are published.
    fn lines(&self) -> &LineRouter;
}
