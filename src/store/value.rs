use bytes::Bytes;
use std::sync::Arc;
use strum::IntoStaticStr;

use super::hash::Hash;
use super::list::List;
use super::set::Set;
use super::sorted_set::SortedSet;

/// A value stored under a key.
///
/// The collection variants are reference counted handles so a command can release the keyspace
/// lock before working on the collection, which is guarded by its own lock. The handle never
/// leaves the store's lookup path other than for the duration of a single command.
#[derive(Clone, Debug, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Value {
    String(Bytes),
    List(Arc<List>),
    Hash(Arc<Hash>),
    Set(Arc<Set>),
    #[strum(serialize = "zset")]
    SortedSet(Arc<SortedSet>),
}

impl Value {
    pub fn empty_list() -> Value {
        Value::List(Arc::default())
    }

    pub fn empty_hash() -> Value {
        Value::Hash(Arc::default())
    }

    pub fn empty_set() -> Value {
        Value::Set(Arc::default())
    }

    pub fn empty_sorted_set() -> Value {
        Value::SortedSet(Arc::default())
    }

    /// The name reported by `TYPE`.
    pub fn type_name(&self) -> &'static str {
        self.into()
    }
}

impl From<Bytes> for Value {
    fn from(data: Bytes) -> Self {
        Value::String(data)
    }
}
