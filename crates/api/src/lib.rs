//! Muster target-search API surface.
//!
//! This crate defines the one capability the target resolver consumes from the
//! backend (free-text + selection in, hosts/labels/teams + counts out), the
//! error taxonomy for it, and two implementations: a scripted `MockApi` for
//! tests and an `InMemFleet` that answers from a loaded fleet fixture.

#![forbid(unsafe_code)]

use std::sync::Mutex;

use muster_core::{HostRef, LabelRef, SelectedTargetIds, TargetCounts, TargetId, TeamRef};
use serde::{Deserialize, Serialize};

pub mod fleet;

pub use fleet::{FleetFixture, FleetHost, InMemFleet};

/// Request sent to the target-search collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SearchRequest {
    /// Free-text host filter. Empty means no host search.
    pub query: String,
    /// Current selection split by kind.
    pub selected: SelectedTargetIds,
    /// Hosts already picked; never offered again as matches.
    pub excluded_host_ids: Vec<TargetId>,
    pub include_labels: bool,
    /// Max host matches to return.
    pub limit: usize,
}

impl SearchRequest {
    pub fn wants_hosts(&self) -> bool { !self.query.trim().is_empty() }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchTargets {
    #[serde(default)]
    pub hosts: Vec<HostRef>,
    #[serde(default)]
    pub labels: Vec<LabelRef>,
    #[serde(default)]
    pub teams: Vec<TeamRef>,
}

/// Collaborator response. `targets` is required on the wire; counts are
/// optional so a missing field can be reported as malformed instead of
/// silently defaulting to zero.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchResponse {
    pub targets: SearchTargets,
    #[serde(default)]
    pub targets_count: Option<u64>,
    #[serde(default)]
    pub targets_online: Option<u64>,
}

impl SearchResponse {
    pub fn new(targets: SearchTargets, counts: TargetCounts) -> Self {
        Self { targets, targets_count: Some(counts.total), targets_online: Some(counts.online) }
    }

    /// Decode a raw JSON body.
    pub fn from_json_slice(body: &[u8]) -> TargetResult<Self> {
        serde_json::from_slice(body).map_err(|e| TargetError::Malformed(e.to_string()))
    }

    /// Validated counts: both present and `online <= total`.
    pub fn counts(&self) -> TargetResult<TargetCounts> {
        let total = self.targets_count.ok_or_else(|| TargetError::Malformed("missing targets_count".into()))?;
        let online = self.targets_online.ok_or_else(|| TargetError::Malformed("missing targets_online".into()))?;
        if online > total {
            return Err(TargetError::Malformed(format!("targets_online {} exceeds targets_count {}", online, total)));
        }
        Ok(TargetCounts::new(total, online))
    }
}

/// Collaborator failures. Everything else in target resolution is total.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum TargetError {
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("malformed: {0}")]
    Malformed(String),
}

impl TargetError {
    /// Resolution never retries; callers decide whether to ask again.
    pub fn is_retryable(&self) -> bool { false }
}

pub type TargetResult<T> = Result<T, TargetError>;

/// The backend target-search endpoint.
#[async_trait::async_trait]
pub trait TargetSearch: Send + Sync {
    async fn search(&self, request: SearchRequest) -> TargetResult<SearchResponse>;
}

// ----------------- Mock implementation -----------------

/// Scripted collaborator for tests: returns `response` (or `error`) and
/// records every request it sees.
#[derive(Default)]
pub struct MockApi {
    pub response: SearchResponse,
    pub error: Option<TargetError>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockApi {
    pub fn new() -> Self { Self::default() }

    pub fn with_response(response: SearchResponse) -> Self { Self { response, ..Self::default() } }

    pub fn failing(error: TargetError) -> Self { Self { error: Some(error), ..Self::default() } }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl TargetSearch for MockApi {
    async fn search(&self, request: SearchRequest) -> TargetResult<SearchResponse> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request);
        }
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(self.response.clone()),
        }
    }
}
