use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::VecDeque;

/// An ordered sequence of binary strings, addressable from both ends.
#[derive(Debug, Default)]
pub struct List {
    items: RwLock<VecDeque<Bytes>>,
}

impl List {
    /// Inserts `items` at the head as one contiguous block, keeping their order, and returns the
    /// new length.
    pub fn push_front(&self, items: Vec<Bytes>) -> usize {
        let mut list = self.items.write();
        for item in items.into_iter().rev() {
            list.push_front(item);
        }
        list.len()
    }

    /// Appends `items` at the tail, keeping their order, and returns the new length.
    pub fn push_back(&self, items: Vec<Bytes>) -> usize {
        let mut list = self.items.write();
        list.extend(items);
        list.len()
    }

    pub fn pop_front(&self) -> Option<Bytes> {
        self.items.write().pop_front()
    }

    pub fn pop_back(&self) -> Option<Bytes> {
        self.items.write().pop_back()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Copies the current elements, head first.
    pub fn to_vec(&self) -> Vec<Bytes> {
        self.items.read().iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(values: &[&'static str]) -> Vec<Bytes> {
        values.iter().map(|v| Bytes::from_static(v.as_bytes())).collect()
    }

    #[test]
    fn push_front_keeps_argument_order() {
        let list = List::default();

        assert_eq!(list.push_back(items(&["x"])), 1);
        assert_eq!(list.push_front(items(&["a", "b", "c"])), 4);

        assert_eq!(list.to_vec(), items(&["a", "b", "c", "x"]));
    }

    #[test]
    fn push_back_keeps_argument_order() {
        let list = List::default();

        list.push_back(items(&["a"]));
        assert_eq!(list.push_back(items(&["b", "c"])), 3);

        assert_eq!(list.to_vec(), items(&["a", "b", "c"]));
    }

    #[test]
    fn pop_from_both_ends() {
        let list = List::default();
        list.push_back(items(&["a", "b", "c"]));

        assert_eq!(list.pop_front(), Some(Bytes::from("a")));
        assert_eq!(list.pop_back(), Some(Bytes::from("c")));
        assert_eq!(list.len(), 1);
        assert_eq!(list.pop_back(), Some(Bytes::from("b")));
        assert_eq!(list.pop_front(), None);
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        let list = List::default();

        assert_eq!(list.push_back(items(&["a", "a", "a"])), 3);
    }
}
