//! Muster core: target references and the pure selection model.
//!
//! Everything here is synchronous and total. The only fallible step of target
//! resolution (the collaborator call) lives in `muster_api` / `muster-resolve`.

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod classify;
pub mod secrets;
pub mod selection;
pub mod target;

pub use aggregate::{online_percent, OnlineShare, TargetCounts};
pub use classify::{classify, TargetGroups, ALL_HOSTS_LABEL, PLATFORM_LABELS};
pub use secrets::{resolve_secrets, EnrollSecret, SecretScope, Team, TeamChoice};
pub use selection::{SelectedTargetIds, SelectionSet};
pub use target::{HostRef, HostStatus, LabelRef, LabelType, TargetId, TargetKind, TargetRef, TeamRef};

pub mod prelude {
    pub use super::{
        classify, online_percent, resolve_secrets, HostRef, LabelRef, SecretScope, SelectionSet,
        TargetCounts, TargetGroups, TargetKind, TargetRef, TeamChoice, TeamRef,
    };
}
