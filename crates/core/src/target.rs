//! Typed target references.
//!
//! A target is anything a query, pack or enroll secret can apply to. Identity is
//! always `(kind, id)`; display names are carried for rendering only.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Collaborator-assigned id. Positive, never reused within a session.
pub type TargetId = u32;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    #[serde(alias = "hosts")]
    Host,
    #[serde(alias = "labels")]
    Label,
    #[serde(alias = "teams")]
    Team,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Host => "host",
            TargetKind::Label => "label",
            TargetKind::Team => "team",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// One selectable entity. Equality and hashing only look at `(kind, id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRef {
    pub kind: TargetKind,
    pub id: TargetId,
    pub display_name: String,
}

impl TargetRef {
    pub fn new(kind: TargetKind, id: TargetId, display_name: impl Into<String>) -> Self {
        Self { kind, id, display_name: display_name.into() }
    }

    pub fn host(id: TargetId, display_name: impl Into<String>) -> Self { Self::new(TargetKind::Host, id, display_name) }
    pub fn label(id: TargetId, display_name: impl Into<String>) -> Self { Self::new(TargetKind::Label, id, display_name) }
    pub fn team(id: TargetId, display_name: impl Into<String>) -> Self { Self::new(TargetKind::Team, id, display_name) }

    pub fn key(&self) -> (TargetKind, TargetId) { (self.kind, self.id) }

    /// The "All Hosts" builtin label, matched by name like the classifier does.
    pub fn is_all_hosts(&self) -> bool {
        self.kind == TargetKind::Label && self.display_name == crate::classify::ALL_HOSTS_LABEL
    }

    /// Short text shown on selector pills.
    pub fn pill_text(&self) -> &str { pill_text(&self.display_name) }
}

impl PartialEq for TargetRef {
    fn eq(&self, other: &Self) -> bool { self.key() == other.key() }
}

impl Eq for TargetRef {}

impl Hash for TargetRef {
    fn hash<H: Hasher>(&self, state: &mut H) { self.key().hash(state) }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.kind, self.id, self.display_name)
    }
}

pub(crate) fn pill_text(name: &str) -> &str {
    match name {
        "All Hosts" => "All hosts",
        "All Linux" => "Linux",
        "" => "Missing display name",
        other => other,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Online,
    #[default]
    Offline,
    /// Missing in action; counted as offline.
    Mia,
}

/// Host as returned by the target search collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostRef {
    pub id: TargetId,
    #[serde(alias = "hostname")]
    pub display_name: String,
    #[serde(default)]
    pub status: HostStatus,
    #[serde(default)]
    pub team_id: Option<TargetId>,
}

impl HostRef {
    pub fn is_online(&self) -> bool { self.status == HostStatus::Online }
    pub fn to_target(&self) -> TargetRef { TargetRef::host(self.id, self.display_name.clone()) }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LabelType {
    BuiltinAll,
    /// The collaborator only distinguishes `builtin` from `regular`; `classify`
    /// re-stamps the precise type from the label name.
    #[serde(alias = "builtin")]
    BuiltinPlatform,
    #[default]
    Regular,
}

/// Label target. `ui_key` is a list-rendering key regenerated on every
/// materialization; it never takes part in identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRef {
    pub id: TargetId,
    #[serde(alias = "display_text")]
    pub name: String,
    #[serde(default)]
    pub label_type: LabelType,
    #[serde(skip, default = "fresh_ui_key")]
    pub ui_key: String,
}

impl LabelRef {
    pub fn new(id: TargetId, name: impl Into<String>, label_type: LabelType) -> Self {
        Self { id, name: name.into(), label_type, ui_key: fresh_ui_key() }
    }

    pub fn to_target(&self) -> TargetRef { TargetRef::label(self.id, self.name.clone()) }
    pub fn pill_text(&self) -> &str { pill_text(&self.name) }
}

impl PartialEq for LabelRef {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for LabelRef {}

pub(crate) fn fresh_ui_key() -> String { uuid::Uuid::new_v4().to_string() }

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamRef {
    pub id: TargetId,
    pub name: String,
}

impl TeamRef {
    pub fn to_target(&self) -> TargetRef { TargetRef::team(self.id, self.name.clone()) }
}

impl From<&HostRef> for TargetRef {
    fn from(h: &HostRef) -> Self { h.to_target() }
}

impl From<&LabelRef> for TargetRef {
    fn from(l: &LabelRef) -> Self { l.to_target() }
}

impl From<&TeamRef> for TargetRef {
    fn from(t: &TeamRef) -> Self { t.to_target() }
}
