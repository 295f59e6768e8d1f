use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;

/// A field -> value map.
#[derive(Debug, Default)]
pub struct Hash {
    fields: RwLock<HashMap<Bytes, Bytes>>,
}

impl Hash {
    /// Sets `field` to `value`. Returns `true` when the field did not exist before.
    pub fn set(&self, field: Bytes, value: Bytes) -> bool {
        self.fields.write().insert(field, value).is_none()
    }

    pub fn get(&self, field: &[u8]) -> Option<Bytes> {
        self.fields.read().get(field).cloned()
    }

    /// Removes the given fields and returns how many of them existed.
    pub fn delete(&self, fields: &[Bytes]) -> usize {
        let mut map = self.fields.write();
        fields
            .iter()
            .filter(|field| map.remove(*field).is_some())
            .count()
    }

    pub fn len(&self) -> usize {
        self.fields.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.read().is_empty()
    }
}
