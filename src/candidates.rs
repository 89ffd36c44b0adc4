//! Candidate ordering for a switch session.
//!
//! A session shows every switchable application exactly once: first the
//! ones the [`MruList`](crate::mru::MruList) knows about, in recency order,
//! then the rest in the order the window manager discovered them.  The
//! merge only walks the two input slices, so equal inputs always produce
//! equal output.

use crate::command::{AppHandle, AppId};
use std::collections::HashSet;

/// Merge `mru` recency with the live `running` set.
///
/// Ids in `mru` that are not running are skipped.  Running applications
/// missing from `mru` keep their relative order in `running`.
pub fn order(mru: &[AppId], running: &[AppHandle]) -> Vec<AppHandle> {
    let mut seen: HashSet<&AppId> = HashSet::new();
    let mut result = Vec::with_capacity(running.len());

    for id in mru {
        if seen.contains(id) {
            continue;
        }
        if let Some(app) = running.iter().find(|app| app.id == *id) {
            seen.insert(&app.id);
            result.push(app.clone());
        }
    }
    for app in running {
        if seen.insert(&app.id) {
            result.push(app.clone());
        }
    }
    result
}

/// Ids to seed an empty MRU with.
///
/// `z_ordered` lists the owners of on-screen windows, front to back; the
/// same merge as [`order`] is applied so that applications without a
/// visible window still get a slot.  When no z-order is available the
/// running list is used with `frontmost` moved to the front.
pub fn seed_ids(
    z_ordered: &[AppId],
    running: &[AppHandle],
    frontmost: Option<&AppId>,
) -> Vec<AppId> {
    if z_ordered.is_empty() {
        let mut ids: Vec<AppId> = running.iter().map(|app| app.id.clone()).collect();
        if let Some(front) = frontmost {
            if let Some(idx) = ids.iter().position(|id| id == front) {
                let id = ids.remove(idx);
                ids.insert(0, id);
            }
        }
        return ids;
    }
    order(z_ordered, running)
        .into_iter()
        .map(|app| app.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apps(names: &[&str]) -> Vec<AppHandle> {
        names.iter().map(|n| AppHandle::new(*n)).collect()
    }

    fn ids(names: &[&str]) -> Vec<AppId> {
        names.iter().map(|n| AppId::new(*n)).collect()
    }

    fn names(list: &[AppHandle]) -> Vec<&str> {
        list.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn mru_first_then_discovery_order() {
        let out = order(&ids(&["B", "C"]), &apps(&["A", "B", "C"]));
        assert_eq!(names(&out), vec!["B", "C", "A"]);
    }

    #[test]
    fn empty_mru_keeps_discovery_order() {
        let out = order(&[], &apps(&["A", "B", "C"]));
        assert_eq!(names(&out), vec!["A", "B", "C"]);
    }

    #[test]
    fn stale_mru_ids_are_skipped() {
        let out = order(&ids(&["gone", "C", "also-gone"]), &apps(&["A", "B", "C"]));
        assert_eq!(names(&out), vec!["C", "A", "B"]);
    }

    #[test]
    fn every_running_app_exactly_once() {
        let running = apps(&["A", "B", "C", "D"]);
        let mrus = [
            ids(&[]),
            ids(&["D"]),
            ids(&["D", "D", "A"]),
            ids(&["x", "y"]),
            ids(&["C", "B", "A", "D", "E"]),
        ];
        for mru in &mrus {
            let out = order(mru, &running);
            assert_eq!(out.len(), running.len(), "mru {:?}", mru);
            for app in &running {
                assert_eq!(out.iter().filter(|a| a.id == app.id).count(), 1);
            }
        }
    }

    #[test]
    fn duplicate_running_entries_collapse() {
        let out = order(&ids(&["B"]), &apps(&["A", "B", "A"]));
        assert_eq!(names(&out), vec!["B", "A"]);
    }

    #[test]
    fn order_is_deterministic() {
        let mru = ids(&["C", "A"]);
        let running = apps(&["A", "B", "C", "D"]);
        assert_eq!(order(&mru, &running), order(&mru, &running));
    }

    #[test]
    fn seed_uses_z_order_merge() {
        let seeded = seed_ids(&ids(&["C", "A", "C"]), &apps(&["A", "B", "C"]), None);
        assert_eq!(seeded, ids(&["C", "A", "B"]));
    }

    #[test]
    fn seed_without_z_order_pins_frontmost() {
        let front = AppId::new("B");
        let seeded = seed_ids(&[], &apps(&["A", "B", "C"]), Some(&front));
        assert_eq!(seeded, ids(&["B", "A", "C"]));
    }
}
