//! Label classification into selector groups.
//!
//! Classification is by canonical display name, case-sensitive. A custom label
//! that happens to be named like a builtin lands in the builtin group.

use serde::{Deserialize, Serialize};

use crate::target::{fresh_ui_key, LabelRef, LabelType, TeamRef};

pub const ALL_HOSTS_LABEL: &str = "All Hosts";

/// Closed set of platform label names. Extending it is a data change.
pub const PLATFORM_LABELS: &[&str] = &["macOS", "MS Windows", "All Linux"];

/// Classifier output. Every input label sits in exactly one of the three label groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetGroups {
    pub all_hosts: Vec<LabelRef>,
    pub platform: Vec<LabelRef>,
    pub other: Vec<LabelRef>,
    pub teams: Vec<TeamRef>,
}

impl TargetGroups {
    pub fn with_teams(mut self, teams: Vec<TeamRef>) -> Self {
        self.teams = teams;
        self
    }

    pub fn label_count(&self) -> usize { self.all_hosts.len() + self.platform.len() + self.other.len() }

    pub fn is_empty(&self) -> bool { self.label_count() == 0 && self.teams.is_empty() }

    /// All labels in group order: all-hosts, platform, other.
    pub fn labels(&self) -> impl Iterator<Item = &LabelRef> {
        self.all_hosts.iter().chain(self.platform.iter()).chain(self.other.iter())
    }

    /// Number of selectable pills, used as the tab index of the host search input.
    pub fn selector_count(&self) -> usize { self.label_count() + self.teams.len() }
}

/// Group of a single label name.
pub fn label_type_for(name: &str) -> LabelType {
    if name == ALL_HOSTS_LABEL {
        LabelType::BuiltinAll
    } else if PLATFORM_LABELS.contains(&name) {
        LabelType::BuiltinPlatform
    } else {
        LabelType::Regular
    }
}

/// Partition labels into all-hosts / platform / other, preserving input order
/// within each group. Each label gets a fresh `ui_key` and a `label_type`
/// matching its group. Total over any input.
pub fn classify<I>(labels: I) -> TargetGroups
where
    I: IntoIterator<Item = LabelRef>,
{
    let mut groups = TargetGroups::default();
    for mut label in labels {
        label.ui_key = fresh_ui_key();
        label.label_type = label_type_for(&label.name);
        match label.label_type {
            LabelType::BuiltinAll => groups.all_hosts.push(label),
            LabelType::BuiltinPlatform => groups.platform.push(label),
            LabelType::Regular => groups.other.push(label),
        }
    }
    groups
}
