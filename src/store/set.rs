use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashSet;

/// An unordered collection of unique binary strings.
#[derive(Debug, Default)]
pub struct Set {
    members: RwLock<HashSet<Bytes>>,
}

impl Set {
    /// Adds the members and returns how many were not present before.
    pub fn add(&self, members: Vec<Bytes>) -> usize {
        let mut set = self.members.write();
        members
            .into_iter()
            .filter(|member| set.insert(member.clone()))
            .count()
    }

    /// Removes the members and returns how many were present.
    pub fn remove(&self, members: &[Bytes]) -> usize {
        let mut set = self.members.write();
        members.iter().filter(|member| set.remove(*member)).count()
    }

    pub fn contains(&self, member: &[u8]) -> bool {
        self.members.read().contains(member)
    }

    pub fn cardinality(&self) -> usize {
        self.members.read().len()
    }
}
