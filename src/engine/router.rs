//! Fan-out of engine output lines to the commands waiting on them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::protocol::Stream;

/// Callback receiving every line delivered on the stream it subscribed to.
pub type LineListener = Arc<dyn Fn(Stream, &str) + Send + Sync>;

/// Handle returned by [`LineRouter::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registry of line listeners, one list per stream.
///
/// Delivery snapshots the listener list and calls it without holding the
/// lock, so a listener may subscribe or unsubscribe (itself included) while
/// a line is being delivered.
#[derive(Default)]
pub struct LineRouter {
    next_id: AtomicU64,
    data: Mutex<Vec<(SubscriptionId, LineListener)>>,
    error: Mutex<Vec<(SubscriptionId, LineListener)>>,
}

impl LineRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, stream: Stream) -> &Mutex<Vec<(SubscriptionId, LineListener)>> {
        match stream {
            Stream::Data => &self.data,
            Stream::Error => &self.error,
        }
    }

    pub fn subscribe(&self, stream: Stream, listener: LineListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.list(stream).lock().push((id, listener));
        id
    }

    /// Remove a listener from whichever stream holds it. Unknown ids are
    /// ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.data.lock().retain(|(sid, _)| *sid != id);
        self.error.lock().retain(|(sid, _)| *sid != id);
    }

    /// Offer `line` to every listener currently subscribed to `stream`, in
    /// subscription order.
    pub fn dispatch(&self, stream: Stream, line: &str) {
        let snapshot: Vec<LineListener> = self
            .list(stream)
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in snapshot {
            listener(stream, line);
        }
    }

    pub fn clear(&self) {
        self.data.lock().clear();
        self.error.lock().clear();
    }

    #[must_use]
    pub fn subscriber_count(&self, stream: Stream) -> usize {
        self.list(stream).lock().len()
    }
}
