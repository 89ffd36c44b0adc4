//! Most-recently-used application ordering.
//!
//! [`MruList`] lives for the whole process and is never persisted.  It is
//! fed by the frontmost-application notifications of the window manager
//! (via [`push`](MruList::push)) and seeded once from a z-order snapshot
//! so that the very first session already starts from the application the
//! user touched last.

use crate::command::AppId;
use std::collections::HashSet;

/// Ordered application ids, most recent first, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MruList {
    ids: Vec<AppId>,
}

impl MruList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `id` to the front, inserting it if absent.
    pub fn push(&mut self, id: AppId) {
        self.ids.retain(|existing| *existing != id);
        self.ids.insert(0, id);
    }

    /// Replace the whole list with `ordered`, keeping the first occurrence
    /// of each id, then move `frontmost` to the front if it is present.
    ///
    /// An empty input yields an empty list.
    pub fn seed<I>(&mut self, ordered: I, frontmost: Option<&AppId>)
    where
        I: IntoIterator<Item = AppId>,
    {
        let mut seen = HashSet::new();
        self.ids.clear();
        for id in ordered {
            if seen.insert(id.clone()) {
                self.ids.push(id);
            }
        }
        if let Some(front) = frontmost {
            if let Some(idx) = self.ids.iter().position(|id| id == front) {
                let id = self.ids.remove(idx);
                self.ids.insert(0, id);
            }
        }
    }

    /// Snapshot of the ids, most recent first.
    pub fn ids(&self) -> &[AppId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<AppId> {
        names.iter().map(|n| AppId::new(*n)).collect()
    }

    #[test]
    fn new_list_is_empty() {
        let mru = MruList::new();
        assert!(mru.is_empty());
        assert_eq!(mru.len(), 0);
    }

    #[test]
    fn push_moves_to_front() {
        let mut mru = MruList::new();
        mru.push("a".into());
        mru.push("b".into());
        mru.push("c".into());
        assert_eq!(mru.ids(), ids(&["c", "b", "a"]).as_slice());
        mru.push("a".into());
        assert_eq!(mru.ids(), ids(&["a", "c", "b"]).as_slice());
    }

    #[test]
    fn repeated_push_is_idempotent() {
        let mut mru = MruList::new();
        mru.push("a".into());
        mru.push("b".into());
        let once = mru.clone();
        mru.push("b".into());
        mru.push("b".into());
        assert_eq!(mru, once);
    }

    #[test]
    fn push_sequences_never_duplicate() {
        let seq = ["a", "b", "a", "c", "c", "b", "d", "a", "d", "e", "b"];
        let mut mru = MruList::new();
        for (i, name) in seq.iter().enumerate() {
            mru.push(AppId::new(*name));
            let unique: HashSet<&AppId> = mru.ids().iter().collect();
            assert_eq!(unique.len(), mru.len(), "duplicate after step {}", i);
            assert_eq!(mru.ids()[0], AppId::new(*name));
        }
        assert_eq!(mru.ids(), ids(&["b", "e", "d", "a", "c"]).as_slice());
    }

    #[test]
    fn seed_dedups_preserving_order() {
        let mut mru = MruList::new();
        mru.seed(ids(&["x", "y", "x", "z", "y"]), None);
        assert_eq!(mru.ids(), ids(&["x", "y", "z"]).as_slice());
    }

    #[test]
    fn seed_pins_frontmost() {
        let mut mru = MruList::new();
        mru.seed(ids(&["x", "y", "z"]), Some(&AppId::new("z")));
        assert_eq!(mru.ids(), ids(&["z", "x", "y"]).as_slice());
    }

    #[test]
    fn seed_ignores_absent_frontmost() {
        let mut mru = MruList::new();
        mru.seed(ids(&["x", "y"]), Some(&AppId::new("q")));
        assert_eq!(mru.ids(), ids(&["x", "y"]).as_slice());
    }

    #[test]
    fn seed_replaces_previous_contents() {
        let mut mru = MruList::new();
        mru.push("old".into());
        mru.seed(ids(&["new"]), None);
        assert_eq!(mru.ids(), ids(&["new"]).as_slice());
    }

    #[test]
    fn seed_empty_yields_empty() {
        let mut mru = MruList::new();
        mru.push("a".into());
        mru.seed(Vec::new(), Some(&AppId::new("a")));
        assert!(mru.is_empty());
    }

    #[test]
    fn seed_is_idempotent() {
        let input = ids(&["b", "a", "b", "c"]);
        let front = AppId::new("c");
        let mut once = MruList::new();
        once.seed(input.clone(), Some(&front));
        let mut twice = MruList::new();
        twice.seed(input.clone(), Some(&front));
        twice.seed(input, Some(&front));
        assert_eq!(once, twice);
    }
}
