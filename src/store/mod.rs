mod hash;
mod list;
mod set;
mod sorted_set;
mod value;

pub use hash::Hash;
pub use list::List;
pub use set::Set;
pub use sorted_set::SortedSet;
pub use value::Value;

use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::debug;

/// The Store is responsible for managing key-value pairs, with optional time-to-live settings for
/// each key. Expired keys are invisible to every read as soon as their deadline passes; they are
/// physically removed by the first access that notices them or by a background task, whichever
/// comes first. The store is designed to be thread-safe, allowing it to be shared and cloned
/// cheaply using reference counting.
///
/// Locking happens in two tiers: the key -> entry map is behind a single reader-writer lock, and
/// every collection value carries its own lock, so commands on different keys never contend on
/// anything but the short map lookup.
#[derive(Clone)]
pub struct Store {
    inner: Arc<InnerStore>,
}

impl Store {
    /// Creates an empty store and spawns its expiration task, so it must be called from within a
    /// Tokio runtime.
    pub fn new() -> Store {
        let state = State {
            keys: HashMap::new(),
            ttls: BTreeSet::new(),
        };

        let inner = Arc::new(InnerStore {
            state: RwLock::new(state),
            waker: Notify::new(),
        });

        tokio::spawn({
            let inner = inner.clone();
            async move { remove_expired_keys(inner).await }
        });

        Self { inner }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Store {
    type Target = InnerStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct InnerStore {
    state: RwLock<State>,
    waker: Notify,
}

impl InnerStore {
    /// Returns the value stored at `key`, or `None` if the key is absent or expired.
    pub fn get(&self, key: &[u8]) -> Option<Value> {
        self.lookup(key, |entry| entry.value.clone())
    }

    pub fn exists(&self, key: &[u8]) -> bool {
        self.lookup(key, |_| ()).is_some()
    }

    /// Returns the type name of the value at `key`, `none` when there is no live key.
    pub fn type_of(&self, key: &[u8]) -> &'static str {
        self.lookup(key, |entry| entry.value.type_name())
            .unwrap_or("none")
    }

    /// Installs `value` at `key`, replacing whatever was there. Without a `ttl` any previous
    /// expiration is cleared.
    pub fn set(&self, key: Bytes, value: Value, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        let mut state = self.state.write();

        state.remove(&key);
        state.keys.insert(key.clone(), Entry { value, expires_at });

        if let Some(when) = expires_at {
            state.ttls.insert((when, key));

            // Only wake the expiration task when it would otherwise sleep past this deadline.
            if state.next_expiration() == Some(when) {
                self.waker.notify_one();
            }
        }
    }

    /// Removes `key` and its expiration. Returns whether a live key was removed.
    pub fn delete(&self, key: &[u8]) -> bool {
        let now = Instant::now();
        self.state
            .write()
            .remove(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Returns the live value at `key`, or atomically installs the one built by `default` when
    /// there is none. New entries never expire.
    pub fn get_or_insert_with(&self, key: &Bytes, default: impl FnOnce() -> Value) -> Value {
        let now = Instant::now();
        let mut state = self.state.write();

        if let Some(entry) = state.keys.get(key) {
            if !entry.is_expired(now) {
                return entry.value.clone();
            }
        }

        state.remove(key);

        let value = default();
        state.keys.insert(
            key.clone(),
            Entry {
                value: value.clone(),
                expires_at: None,
            },
        );

        value
    }

    /// Runs `f` on the live entry at `key` under the read lock.
    ///
    /// An expired entry is reported as absent. It is then removed under the write lock after
    /// re-checking its deadline, which tolerates another task having replaced or removed it in
    /// between.
    fn lookup<T>(&self, key: &[u8], f: impl FnOnce(&Entry) -> T) -> Option<T> {
        let now = Instant::now();

        {
            let state = self.state.read();
            match state.keys.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(f(entry)),
                Some(_) => {}
            }
        }

        let mut state = self.state.write();
        let expired = state
            .keys
            .get(key)
            .is_some_and(|entry| entry.is_expired(Instant::now()));
        if expired {
            state.remove(key);
            debug!(key = %String::from_utf8_lossy(key), "removed expired key");
        }

        None
    }

    #[cfg(test)]
    fn slots(&self) -> usize {
        self.state.read().keys.len()
    }
}

#[derive(Debug)]
pub struct Entry {
    pub value: Value,
    pub expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

struct State {
    keys: HashMap<Bytes, Entry>,
    ttls: BTreeSet<(Instant, Bytes)>,
}

impl State {
    /// Removes the entry and its expiration index record.
    fn remove(&mut self, key: &[u8]) -> Option<Entry> {
        let (key, entry) = self.keys.remove_entry(key)?;
        if let Some(when) = entry.expires_at {
            self.ttls.remove(&(when, key));
        }
        Some(entry)
    }

    fn next_expiration(&self) -> Option<Instant> {
        self.ttls.iter().next().map(|&(expires_at, _)| expires_at)
    }

    fn remove_expired_keys(&mut self, now: Instant) -> Option<Instant> {
        let expired_keys: Vec<(Instant, Bytes)> = self
            .ttls
            .iter()
            .take_while(|(expires_at, _)| expires_at <= &now)
            .cloned()
            .collect();

        if !expired_keys.is_empty() {
            debug!(count = expired_keys.len(), "removing expired keys");
        }

        for (when, key) in expired_keys {
            self.keys.remove(&key);
            self.ttls.remove(&(when, key));
        }

        self.next_expiration()
    }
}

async fn remove_expired_keys(store: Arc<InnerStore>) {
    loop {
        let next_expiration = {
            let mut state = store.state.write();
            state.remove_expired_keys(Instant::now())
        };

        if let Some(next_expiration) = next_expiration {
            tokio::select! {
                _ = sleep_until(next_expiration) => {}
                _ = store.waker.notified() => {}
            }
        } else {
            store.waker.notified().await;
        }
    }
}
