//! Collaborator call and response shaping.

use std::sync::Arc;
use std::time::Instant;

use muster_api::{SearchRequest, TargetResult, TargetSearch};
use muster_core::{classify, HostRef, SelectionSet, TargetCounts, TargetGroups, TargetRef};
use tracing::{info, warn};

use crate::config::ResolverConfig;
use crate::picker::{ResolveIntent, ResolveRequest};

/// Shaped collaborator response. Labels are only reachable through `groups`,
/// so callers never see an unclassified label.
#[derive(Debug, Clone, Default)]
pub struct ResolutionResult {
    /// Host matches for the filter; empty when the filter is empty.
    pub hosts: Vec<HostRef>,
    /// Classified labels plus teams; empty when labels were not requested.
    pub groups: TargetGroups,
    pub counts: TargetCounts,
}

impl ResolutionResult {
    pub fn online_percent(&self) -> u8 { self.counts.online_percent() }

    /// Every returned target as a reference: hosts, then labels in group order, then teams.
    pub fn target_refs(&self) -> Vec<TargetRef> {
        let hosts = self.hosts.iter().map(TargetRef::from);
        let labels = self.groups.labels().map(TargetRef::from);
        let teams = self.groups.teams.iter().map(TargetRef::from);
        hosts.chain(labels).chain(teams).collect()
    }
}

/// Outcome of one sequenced request, handed back to the picker that issued it.
#[derive(Debug, Clone)]
pub struct ResolveOutcome {
    pub seq: u64,
    pub include_labels: bool,
    pub intent: ResolveIntent,
    pub result: ResolutionResult,
}

pub struct TargetResolver {
    api: Arc<dyn TargetSearch>,
    config: ResolverConfig,
}

impl TargetResolver {
    pub fn new(api: Arc<dyn TargetSearch>) -> Self { Self::with_config(api, ResolverConfig::default()) }

    pub fn with_config(api: Arc<dyn TargetSearch>, config: ResolverConfig) -> Self { Self { api, config } }

    pub fn config(&self) -> &ResolverConfig { &self.config }

    /// Query the collaborator with `filter` and the current selection. Fails only
    /// when the collaborator does; no retry, nothing cached.
    pub async fn resolve(
        &self,
        filter: &str,
        selection: &SelectionSet,
        include_labels: bool,
    ) -> TargetResult<ResolutionResult> {
        let t0 = Instant::now();
        metrics::counter!("resolve_requests_total", 1u64);
        let selected = selection.to_selected_ids();
        let request = SearchRequest {
            query: filter.to_string(),
            excluded_host_ids: selected.hosts.to_vec(),
            selected,
            include_labels,
            limit: self.config.search_limit,
        };
        let wants_hosts = request.wants_hosts();
        info!(filter = %filter, selected = selection.len(), include_labels, "resolve: start");
        let response = match self.api.search(request).await {
            Ok(r) => r,
            Err(e) => {
                metrics::counter!("resolve_failures_total", 1u64, "kind" => "unavailable");
                warn!(error = %e, took_ms = %t0.elapsed().as_millis(), "resolve: collaborator failed");
                return Err(e);
            }
        };
        let counts = match response.counts() {
            Ok(c) => c,
            Err(e) => {
                metrics::counter!("resolve_failures_total", 1u64, "kind" => "malformed");
                warn!(error = %e, "resolve: malformed response");
                return Err(e);
            }
        };
        let targets = response.targets;
        let hosts = if wants_hosts { targets.hosts } else { Vec::new() };
        let groups = if include_labels {
            classify(targets.labels).with_teams(targets.teams)
        } else {
            TargetGroups::default()
        };
        metrics::histogram!("resolve_ms", t0.elapsed().as_secs_f64() * 1000.0);
        info!(
            hosts = hosts.len(),
            labels = groups.label_count(),
            teams = groups.teams.len(),
            total = counts.total,
            online = counts.online,
            took_ms = %t0.elapsed().as_millis(),
            "resolve: ok"
        );
        Ok(ResolutionResult { hosts, groups, counts })
    }

    /// Run a request issued by a picker. Borrows nothing from the picker, so
    /// several requests may be in flight; the picker drops superseded ones.
    pub async fn run(&self, request: ResolveRequest) -> TargetResult<ResolveOutcome> {
        let result = self.resolve(&request.filter, &request.selection, request.include_labels).await?;
        Ok(ResolveOutcome { seq: request.seq, include_labels: request.include_labels, intent: request.intent, result })
    }
}
