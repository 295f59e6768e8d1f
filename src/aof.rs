//! Hooks for a persistence collaborator.
//!
//! The server never writes anything to disk itself. A [`CommandLog`] handed to the
//! [`Dispatcher`](crate::dispatch::Dispatcher) receives every write command that succeeded, in
//! the order they were applied, and the same commands can later be fed back through
//! [`Dispatcher::replay`](crate::dispatch::Dispatcher::replay) to rebuild a store.

use bytes::Bytes;
use parking_lot::Mutex;

/// Receives write commands after they were applied to the store.
pub trait CommandLog: Send + Sync {
    /// `command` holds the command name followed by its arguments, exactly as received.
    fn append(&self, command: &[Bytes]);
}

/// A [`CommandLog`] that keeps every command in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<Vec<Bytes>>>,
}

impl MemoryLog {
    pub fn new() -> MemoryLog {
        MemoryLog::default()
    }

    /// A copy of the recorded commands, oldest first.
    pub fn entries(&self) -> Vec<Vec<Bytes>> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl CommandLog for MemoryLog {
    fn append(&self, command: &[Bytes]) {
        self.entries.lock().push(command.to_vec());
    }
}
