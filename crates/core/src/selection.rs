//! Ordered, deduplicated set of selected targets.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::target::{TargetId, TargetKind, TargetRef};

/// Targets chosen in one picker session. Insertion-ordered, unique by `(kind, id)`.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    order: Vec<TargetRef>,
    keys: FxHashSet<(TargetKind, TargetId)>,
}

impl SelectionSet {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.order.len() }
    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    /// Insert if absent. Returns whether the set changed.
    pub fn add(&mut self, target: TargetRef) -> bool {
        if !self.keys.insert(target.key()) {
            return false;
        }
        self.order.push(target);
        true
    }

    /// Remove if present. Returns whether the set changed.
    pub fn remove(&mut self, target: &TargetRef) -> bool {
        if !self.keys.remove(&target.key()) {
            return false;
        }
        self.order.retain(|t| t != target);
        true
    }

    /// Add each target in input order; already-present targets keep their position.
    pub fn merge<I>(&mut self, targets: I)
    where
        I: IntoIterator<Item = TargetRef>,
    {
        for t in targets {
            self.add(t);
        }
    }

    pub fn contains(&self, target: &TargetRef) -> bool { self.keys.contains(&target.key()) }

    /// Remove the target when selected, add it otherwise. Returns `true` when it ends up selected.
    pub fn toggle(&mut self, target: TargetRef) -> bool {
        if self.remove(&target) {
            false
        } else {
            self.add(target)
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.keys.clear();
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&TargetRef) -> bool,
    {
        let keys = &mut self.keys;
        self.order.retain(|t| {
            let k = keep(t);
            if !k {
                keys.remove(&t.key());
            }
            k
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetRef> { self.order.iter() }

    pub fn of_kind(&self, kind: TargetKind) -> impl Iterator<Item = &TargetRef> {
        self.order.iter().filter(move |t| t.kind == kind)
    }

    /// Snapshot in insertion order.
    pub fn to_vec(&self) -> Vec<TargetRef> { self.order.clone() }

    /// Split by kind into id lists for the search request.
    pub fn to_selected_ids(&self) -> SelectedTargetIds { self.order.iter().collect() }
}

impl FromIterator<TargetRef> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = TargetRef>>(iter: I) -> Self {
        let mut s = SelectionSet::new();
        s.merge(iter);
        s
    }
}

/// Selected target ids grouped by kind, the shape the search endpoint accepts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectedTargetIds {
    pub hosts: SmallVec<[TargetId; 8]>,
    pub labels: SmallVec<[TargetId; 8]>,
    pub teams: SmallVec<[TargetId; 8]>,
}

impl SelectedTargetIds {
    pub fn is_empty(&self) -> bool { self.hosts.is_empty() && self.labels.is_empty() && self.teams.is_empty() }
}

impl<'a> FromIterator<&'a TargetRef> for SelectedTargetIds {
    fn from_iter<I: IntoIterator<Item = &'a TargetRef>>(iter: I) -> Self {
        let mut out = SelectedTargetIds::default();
        for t in iter {
            match t.kind {
                TargetKind::Host => out.hosts.push(t.id),
                TargetKind::Label => out.labels.push(t.id),
                TargetKind::Team => out.teams.push(t.id),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let mut once = SelectionSet::new();
        once.add(TargetRef::host(1, "a"));
        let mut twice = SelectionSet::new();
        assert!(twice.add(TargetRef::host(1, "a")));
        assert!(!twice.add(TargetRef::host(1, "a")));
        assert_eq!(once.to_vec(), twice.to_vec());
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut s: SelectionSet = vec![TargetRef::label(2, "macOS")].into_iter().collect();
        assert!(!s.remove(&TargetRef::host(2, "macOS")));
        assert_eq!(s.len(), 1);
        assert!(s.remove(&TargetRef::label(2, "ignored name")));
        assert!(s.is_empty());
    }

    #[test]
    fn merge_keeps_existing_order_and_appends_new() {
        let mut s: SelectionSet = vec![TargetRef::host(1, "a"), TargetRef::team(3, "t")].into_iter().collect();
        s.merge(vec![TargetRef::label(5, "l"), TargetRef::host(1, "a-renamed"), TargetRef::host(9, "z")]);
        let keys: Vec<_> = s.iter().map(|t| t.key()).collect();
        assert_eq!(
            keys,
            vec![
                (TargetKind::Host, 1),
                (TargetKind::Team, 3),
                (TargetKind::Label, 5),
                (TargetKind::Host, 9),
            ]
        );
        // existing entry is not overwritten
        assert_eq!(s.iter().next().map(|t| t.display_name.as_str()), Some("a"));
    }

    #[test]
    fn same_id_different_kind_are_distinct() {
        let s: SelectionSet = vec![TargetRef::host(4, "h"), TargetRef::label(4, "l"), TargetRef::team(4, "t")]
            .into_iter()
            .collect();
        assert_eq!(s.len(), 3);
        assert!(s.contains(&TargetRef::team(4, "")));
    }

    #[test]
    fn toggle_and_retain() {
        let mut s = SelectionSet::new();
        assert!(s.toggle(TargetRef::label(1, "a")));
        assert!(!s.toggle(TargetRef::label(1, "a")));
        assert!(s.is_empty());
        s.merge(vec![TargetRef::host(1, "h"), TargetRef::label(2, "l"), TargetRef::host(3, "h3")]);
        s.retain(|t| t.kind != TargetKind::Host);
        assert_eq!(s.len(), 1);
        assert!(!s.contains(&TargetRef::host(1, "")));
        // key index stays consistent after retain
        assert!(s.add(TargetRef::host(1, "h")));
    }

    #[test]
    fn selected_ids_split_by_kind_in_order() {
        let s: SelectionSet = vec![
            TargetRef::host(200, "h"),
            TargetRef::label(10, "l10"),
            TargetRef::team(1, "t"),
            TargetRef::label(6, "l6"),
        ]
        .into_iter()
        .collect();
        let ids = s.to_selected_ids();
        assert_eq!(ids.hosts.as_slice(), &[200]);
        assert_eq!(ids.labels.as_slice(), &[10, 6]);
        assert_eq!(ids.teams.as_slice(), &[1]);
        assert!(SelectionSet::new().to_selected_ids().is_empty());
    }
}
