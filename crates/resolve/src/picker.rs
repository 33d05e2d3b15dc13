//! Per-session target picker state.
//!
//! Owns the selection, the classified groups and the latest counts for one
//! picker screen. Dropping the picker discards all of it.

use muster_api::TargetError;
use muster_core::{HostRef, SelectionSet, TargetCounts, TargetGroups, TargetKind, TargetRef};
use tracing::debug;

use crate::resolver::ResolveOutcome;

/// What accepting a response does to the selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResolveIntent {
    /// Refresh candidates, groups and counts only.
    #[default]
    Browse,
    /// Restore a saved target list. The listed targets are sent as selected,
    /// and on accept they are merged into the selection with display names
    /// taken from the response where it returned them.
    Adopt(Vec<TargetRef>),
}

/// A sequenced resolve request with a snapshot of the selection it was issued for.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub seq: u64,
    pub filter: String,
    pub selection: SelectionSet,
    pub include_labels: bool,
    pub intent: ResolveIntent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    Accepted,
    /// A newer request was issued; the response was dropped unmerged.
    Stale,
}

#[derive(Debug, Default)]
pub struct TargetPicker {
    selection: SelectionSet,
    groups: TargetGroups,
    related_hosts: Vec<HostRef>,
    counts: TargetCounts,
    filter: String,
    latest_seq: u64,
    in_flight: bool,
    last_error: Option<TargetError>,
}

impl TargetPicker {
    pub fn new() -> Self { Self::default() }

    /// Start from a saved selection.
    pub fn with_selection(selection: SelectionSet) -> Self { Self { selection, ..Self::default() } }

    pub fn selection(&self) -> &SelectionSet { &self.selection }
    pub fn groups(&self) -> &TargetGroups { &self.groups }
    pub fn related_hosts(&self) -> &[HostRef] { &self.related_hosts }
    pub fn counts(&self) -> TargetCounts { self.counts }
    pub fn online_percent(&self) -> u8 { self.counts.online_percent() }
    pub fn filter(&self) -> &str { &self.filter }
    pub fn latest_seq(&self) -> u64 { self.latest_seq }
    pub fn is_loading(&self) -> bool { self.in_flight }
    pub fn last_error(&self) -> Option<&TargetError> { self.last_error.as_ref() }

    pub fn set_filter(&mut self, filter: impl Into<String>) { self.filter = filter.into(); }

    /// Issue a request for the current filter. Supersedes every earlier request.
    pub fn request(&mut self, include_labels: bool, intent: ResolveIntent) -> ResolveRequest {
        self.latest_seq += 1;
        self.in_flight = true;
        let mut selection = self.selection.clone();
        if let ResolveIntent::Adopt(saved) = &intent {
            merge_exclusive(&mut selection, saved.iter().cloned());
        }
        ResolveRequest {
            seq: self.latest_seq,
            filter: self.filter.clone(),
            selection,
            include_labels,
            intent,
        }
    }

    /// Merge a response if it answers the latest request; otherwise drop it.
    pub fn accept(&mut self, outcome: ResolveOutcome) -> AcceptOutcome {
        if outcome.seq != self.latest_seq {
            metrics::counter!("resolve_stale_dropped_total", 1u64);
            debug!(seq = outcome.seq, latest = self.latest_seq, "picker: stale response dropped");
            return AcceptOutcome::Stale;
        }
        let result = outcome.result;
        if let ResolveIntent::Adopt(saved) = outcome.intent {
            let returned = result.target_refs();
            let hydrated = saved
                .into_iter()
                .map(|t| returned.iter().find(|r| **r == t).cloned().unwrap_or(t));
            merge_exclusive(&mut self.selection, hydrated);
        }
        if outcome.include_labels {
            self.groups = result.groups;
        }
        self.related_hosts = result.hosts;
        self.counts = result.counts;
        self.in_flight = false;
        self.last_error = None;
        AcceptOutcome::Accepted
    }

    /// Record a failed request. Selection and groups stay as they were.
    pub fn reject(&mut self, seq: u64, error: TargetError) -> AcceptOutcome {
        if seq != self.latest_seq {
            debug!(seq, latest = self.latest_seq, "picker: stale failure dropped");
            return AcceptOutcome::Stale;
        }
        self.in_flight = false;
        self.last_error = Some(error);
        AcceptOutcome::Accepted
    }

    /// Convenience for `accept`/`reject` on a resolver result.
    pub fn settle(&mut self, seq: u64, outcome: Result<ResolveOutcome, TargetError>) -> AcceptOutcome {
        match outcome {
            Ok(o) => self.accept(o),
            Err(e) => self.reject(seq, e),
        }
    }

    /// Pill click on a label or team. "All Hosts" is exclusive: selecting it
    /// clears everything else, selecting anything else drops it.
    /// Returns whether `target` ends up selected.
    pub fn toggle(&mut self, target: TargetRef) -> bool {
        if target.is_all_hosts() {
            let was_selected = self.selection.contains(&target);
            self.selection.clear();
            if was_selected {
                return false;
            }
            return self.selection.add(target);
        }
        self.selection.retain(|t| !t.is_all_hosts());
        self.selection.toggle(target)
    }

    /// Row click in the host search results.
    pub fn pick_host(&mut self, host: &HostRef) {
        self.selection.retain(|t| !t.is_all_hosts());
        self.selection.add(host.to_target());
        self.filter.clear();
    }

    pub fn unpick_host(&mut self, host: &HostRef) { self.selection.remove(&host.to_target()); }

    pub fn is_selected(&self, target: &TargetRef) -> bool { self.selection.contains(target) }

    pub fn selected_of_kind(&self, kind: TargetKind) -> Vec<TargetRef> { self.selection.of_kind(kind).cloned().collect() }
}

/// Merge `additions` keeping "All Hosts" exclusive: if it is among them it
/// replaces the whole selection, otherwise a selected "All Hosts" is dropped.
fn merge_exclusive<I>(selection: &mut SelectionSet, additions: I)
where
    I: IntoIterator<Item = TargetRef>,
{
    let additions: Vec<TargetRef> = additions.into_iter().collect();
    if additions.is_empty() {
        return;
    }
    if let Some(all) = additions.iter().find(|t| t.is_all_hosts()) {
        let all = all.clone();
        selection.clear();
        selection.add(all);
        return;
    }
    selection.retain(|t| !t.is_all_hosts());
    selection.merge(additions);
}
