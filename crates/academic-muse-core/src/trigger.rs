//! Armed triggers: owned, cancellable deferred callbacks.
//!
//! A trigger sleeps on the tokio runtime and then posts a message back to its
//! owner over an mpsc channel, so all state changes stay on the owner's task.
//! Dropping an `ArmedTrigger` aborts it; a fired-then-dropped trigger is a no-op.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug)]
pub struct ArmedTrigger {
    handle: JoinHandle<()>,
}

impl ArmedTrigger {
    /// Post `msg` on `tx` after `delay`. Must be called inside a tokio runtime.
    pub fn arm<T>(delay: Duration, tx: UnboundedSender<T>, msg: T) -> Self
    where
        T: Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the owner shut down.
            let _ = tx.send(msg);
        });
        Self { handle }
    }

    /// Cancel explicitly. Equivalent to dropping.
    pub fn cancel(self) {}
}

impl Drop for ArmedTrigger {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Triggers keyed by owner-defined ids. Re-arming a key cancels the previous
/// trigger for that key.
#[derive(Debug)]
pub struct TriggerSet<K> {
    triggers: HashMap<K, ArmedTrigger>,
}

impl<K: Eq + Hash + std::fmt::Debug> TriggerSet<K> {
    pub fn new() -> Self {
        Self {
            triggers: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: K, trigger: ArmedTrigger) {
        debug!(?key, "trigger armed");
        self.triggers.insert(key, trigger);
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        self.triggers.remove(key).is_some()
    }

    /// Cancel every pending trigger.
    pub fn cancel_all(&mut self) {
        if !self.triggers.is_empty() {
            debug!(count = self.triggers.len(), "cancelling all triggers");
        }
        self.triggers.clear();
    }

    pub fn contains(&self, key: &K) -> bool {
        self.triggers.contains_key(key)
    }
}

impl<K: Eq + Hash + std::fmt::Debug> Default for TriggerSet<K> {
    fn default() -> Self {
        Self::new()
    }
}
