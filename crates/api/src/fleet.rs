//! In-memory fleet answering target searches.
//!
//! Backs the CLI and integration tests. Host matching is fuzzy on hostname;
//! counts cover the deduplicated union of every host a selection reaches.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use muster_core::{EnrollSecret, HostRef, HostStatus, LabelRef, SelectedTargetIds, TargetCounts, TargetId, Team, TeamRef};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{SearchRequest, SearchResponse, SearchTargets, TargetResult, TargetSearch};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FleetHost {
    pub id: TargetId,
    pub hostname: String,
    #[serde(default)]
    pub status: HostStatus,
    #[serde(default)]
    pub team_id: Option<TargetId>,
    /// Labels this host is a member of.
    #[serde(default)]
    pub label_ids: Vec<TargetId>,
}

impl FleetHost {
    fn to_ref(&self) -> HostRef {
        HostRef { id: self.id, display_name: self.hostname.clone(), status: self.status, team_id: self.team_id }
    }
}

/// Fleet contents as stored in a fixture file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FleetFixture {
    #[serde(default)]
    pub hosts: Vec<FleetHost>,
    #[serde(default)]
    pub labels: Vec<LabelRef>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub global_secrets: Vec<EnrollSecret>,
}

pub struct InMemFleet {
    fixture: FleetFixture,
}

impl InMemFleet {
    pub fn new(fixture: FleetFixture) -> Self { Self { fixture } }

    pub fn from_json_slice(body: &[u8]) -> Result<Self> {
        let fixture: FleetFixture = serde_json::from_slice(body).context("decoding fleet fixture")?;
        Ok(Self::new(fixture))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let body = std::fs::read(path).with_context(|| format!("reading fleet fixture {}", path.display()))?;
        Self::from_json_slice(&body).with_context(|| format!("loading fleet fixture {}", path.display()))
    }

    pub fn fixture(&self) -> &FleetFixture { &self.fixture }

    /// Count the hosts reached by a selection, each host once.
    pub fn count(&self, selected: &SelectedTargetIds) -> TargetCounts {
        let mut reached: FxHashSet<TargetId> = FxHashSet::default();
        let mut online = 0u64;
        for h in &self.fixture.hosts {
            let hit = selected.hosts.contains(&h.id)
                || h.label_ids.iter().any(|l| selected.labels.contains(l))
                || h.team_id.map(|t| selected.teams.contains(&t)).unwrap_or(false);
            if hit && reached.insert(h.id) && h.status == HostStatus::Online {
                online += 1;
            }
        }
        TargetCounts::new(reached.len() as u64, online)
    }

    /// Fuzzy hostname matches, best first, ties by hostname then id.
    pub fn match_hosts(&self, query: &str, excluded: &[TargetId], limit: usize) -> Vec<HostRef> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return Vec::new();
        }
        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &FleetHost)> = self
            .fixture
            .hosts
            .iter()
            .filter(|h| !excluded.contains(&h.id))
            .filter_map(|h| matcher.fuzzy_match(&h.hostname.to_lowercase(), &q).map(|s| (s, h)))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.hostname.cmp(&b.1.hostname)).then(a.1.id.cmp(&b.1.id)));
        scored.into_iter().take(limit).map(|(_, h)| h.to_ref()).collect()
    }
}

#[async_trait::async_trait]
impl TargetSearch for InMemFleet {
    async fn search(&self, request: SearchRequest) -> TargetResult<SearchResponse> {
        let t0 = Instant::now();
        let hosts = if request.wants_hosts() {
            self.match_hosts(&request.query, &request.excluded_host_ids, request.limit)
        } else {
            Vec::new()
        };
        let (labels, teams) = if request.include_labels {
            let teams = self.fixture.teams.iter().map(|t| TeamRef { id: t.id, name: t.name.clone() }).collect();
            (self.fixture.labels.clone(), teams)
        } else {
            (Vec::new(), Vec::new())
        };
        let counts = self.count(&request.selected);
        debug!(hosts = hosts.len(), labels = labels.len(), teams = teams.len(), "fleet: search matched");
        info!(query = %request.query, total = counts.total, online = counts.online, took_ms = %t0.elapsed().as_millis(), "fleet: search ok");
        Ok(SearchResponse::new(SearchTargets { hosts, labels, teams }, counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muster_core::{LabelType, TargetRef, SelectionSet};

    fn host(id: TargetId, name: &str, online: bool, team: Option<TargetId>, labels: &[TargetId]) -> FleetHost {
        FleetHost {
            id,
            hostname: name.to_string(),
            status: if online { HostStatus::Online } else { HostStatus::Offline },
            team_id: team,
            label_ids: labels.to_vec(),
        }
    }

    fn fleet() -> InMemFleet {
        InMemFleet::new(FleetFixture {
            hosts: vec![
                host(1, "web-1.local", true, Some(10), &[100, 101]),
                host(2, "web-2.local", false, Some(10), &[100]),
                host(3, "db-1.local", true, None, &[100, 102]),
                host(4, "laptop-ana", false, Some(11), &[100, 101]),
            ],
            labels: vec![
                LabelRef::new(100, "All Hosts", LabelType::BuiltinAll),
                LabelRef::new(101, "macOS", LabelType::BuiltinPlatform),
                LabelRef::new(102, "Databases", LabelType::Regular),
            ],
            teams: vec![Team { id: 10, name: "Servers".into(), secrets: vec![] }],
            global_secrets: vec![],
        })
    }

    fn ids(targets: Vec<TargetRef>) -> SelectedTargetIds { targets.into_iter().collect::<SelectionSet>().to_selected_ids() }

    #[test]
    fn counts_deduplicate_overlapping_targets() {
        let f = fleet();
        // host 1 is reached by itself, by team 10 and by label 101
        let sel = ids(vec![TargetRef::host(1, "web-1.local"), TargetRef::team(10, "Servers"), TargetRef::label(101, "macOS")]);
        assert_eq!(f.count(&sel), TargetCounts::new(3, 1));
        assert_eq!(f.count(&ids(vec![TargetRef::label(100, "All Hosts")])), TargetCounts::new(4, 2));
        assert_eq!(f.count(&SelectedTargetIds::default()), TargetCounts::default());
    }

    #[test]
    fn host_matches_skip_excluded_and_respect_limit() {
        let f = fleet();
        let all = f.match_hosts("web", &[], 10);
        assert_eq!(all.len(), 2);
        let excl = f.match_hosts("web", &[1], 10);
        assert_eq!(excl.iter().map(|h| h.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(f.match_hosts("web", &[], 1).len(), 1);
        assert!(f.match_hosts("   ", &[], 10).is_empty());
    }

    #[tokio::test]
    async fn search_without_labels_or_query() {
        let f = fleet();
        let resp = f.search(SearchRequest { limit: 10, ..Default::default() }).await.unwrap();
        assert!(resp.targets.hosts.is_empty());
        assert!(resp.targets.labels.is_empty());
        assert!(resp.targets.teams.is_empty());
        assert_eq!(resp.counts().unwrap(), TargetCounts::default());

        let resp = f.search(SearchRequest { include_labels: true, limit: 10, ..Default::default() }).await.unwrap();
        assert_eq!(resp.targets.labels.len(), 3);
        assert_eq!(resp.targets.teams.len(), 1);
    }

    #[test]
    fn fixture_decodes_from_json() {
        let body = serde_json::json!({
            "hosts": [{ "id": 1, "hostname": "a", "status": "mia", "label_ids": [5] }],
            "labels": [{ "id": 5, "name": "All Hosts", "label_type": "builtin" }],
            "teams": [{ "id": 2, "name": "T", "secrets": [{ "secret": "abc" }] }],
            "global_secrets": [{ "secret": "g" }]
        });
        let f = InMemFleet::from_json_slice(body.to_string().as_bytes()).unwrap();
        assert_eq!(f.fixture().hosts[0].status, HostStatus::Mia);
        assert_eq!(f.fixture().teams[0].secrets[0].secret, "abc");
        assert!(InMemFleet::from_json_slice(b"{").is_err());
    }
}
