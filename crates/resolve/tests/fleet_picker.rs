#![forbid(unsafe_code)]

use std::sync::Arc;

use muster_api::{FleetFixture, FleetHost, InMemFleet};
use muster_core::{HostStatus, LabelRef, LabelType, Team, TargetRef};
use muster_resolve::{ResolveIntent, ResolverConfig, TargetPicker, TargetResolver};

fn host(id: u32, name: &str, online: bool, team: Option<u32>, labels: &[u32]) -> FleetHost {
    FleetHost {
        id,
        hostname: name.to_string(),
        status: if online { HostStatus::Online } else { HostStatus::Offline },
        team_id: team,
        label_ids: labels.to_vec(),
    }
}

fn fleet() -> Arc<InMemFleet> {
    Arc::new(InMemFleet::new(FleetFixture {
        hosts: vec![
            host(1, "web-1.local", true, Some(10), &[1, 2]),
            host(2, "web-2.local", true, Some(10), &[1, 3]),
            host(3, "db-1.local", false, None, &[1, 3]),
            host(4, "mac-ana", true, Some(11), &[1, 4, 5]),
        ],
        labels: vec![
            LabelRef::new(1, "All Hosts", LabelType::BuiltinAll),
            LabelRef::new(2, "macOS", LabelType::BuiltinPlatform),
            LabelRef::new(3, "All Linux", LabelType::BuiltinPlatform),
            LabelRef::new(4, "MS Windows", LabelType::BuiltinPlatform),
            LabelRef::new(5, "Finance laptops", LabelType::Regular),
        ],
        teams: vec![
            Team { id: 10, name: "Servers".into(), secrets: vec![] },
            Team { id: 11, name: "Workstations".into(), secrets: vec![] },
        ],
        global_secrets: vec![],
    }))
}

#[tokio::test]
async fn picker_session_against_in_memory_fleet() {
    let resolver = TargetResolver::with_config(fleet(), ResolverConfig { search_limit: 5, ..Default::default() });
    let mut picker = TargetPicker::new();

    // initial load: label/team pickers only, no host search
    let req = picker.request(true, ResolveIntent::Browse);
    let seq = req.seq;
    picker.settle(seq, resolver.run(req).await);
    assert!(picker.related_hosts().is_empty());
    assert_eq!(picker.groups().all_hosts.len(), 1);
    assert_eq!(picker.groups().platform.len(), 3);
    assert_eq!(picker.groups().other.len(), 1);
    assert_eq!(picker.groups().teams.len(), 2);
    assert_eq!(picker.counts().total, 0);
    assert_eq!(picker.online_percent(), 0);

    // select a team and a platform label overlapping on host 2
    picker.toggle(TargetRef::team(10, "Servers"));
    picker.toggle(TargetRef::label(3, "All Linux"));
    picker.set_filter("web");
    let req = picker.request(false, ResolveIntent::Browse);
    let seq = req.seq;
    picker.settle(seq, resolver.run(req).await);
    // hosts 1, 2 (team) and 2, 3 (label): three distinct hosts, two online
    assert_eq!(picker.counts().total, 3);
    assert_eq!(picker.counts().online, 2);
    assert_eq!(picker.online_percent(), 67);
    assert_eq!(picker.related_hosts().len(), 2);
    assert_eq!(picker.groups().teams.len(), 2, "host-only refresh keeps groups");

    // pick a host from the results; it is excluded from the next search
    let picked = picker.related_hosts()[0].clone();
    picker.pick_host(&picked);
    assert_eq!(picker.filter(), "");
    picker.set_filter("web");
    let req = picker.request(false, ResolveIntent::Browse);
    let seq = req.seq;
    picker.settle(seq, resolver.run(req).await);
    assert_eq!(picker.related_hosts().len(), 1);
    assert_ne!(picker.related_hosts()[0].id, picked.id);

    // "All Hosts" takes over the whole selection
    picker.toggle(TargetRef::label(1, "All Hosts"));
    picker.set_filter("");
    let req = picker.request(false, ResolveIntent::Browse);
    let seq = req.seq;
    picker.settle(seq, resolver.run(req).await);
    assert_eq!(picker.selection().len(), 1);
    assert_eq!(picker.counts().total, 4);
    assert_eq!(picker.online_percent(), 75);
}

#[tokio::test]
async fn restoring_saved_targets_merges_only_those_targets() {
    let resolver = TargetResolver::new(fleet());
    let mut picker = TargetPicker::with_selection(vec![TargetRef::team(10, "Servers")].into_iter().collect());

    let req = picker.request(true, ResolveIntent::Adopt(vec![TargetRef::label(2, "")]));
    let seq = req.seq;
    picker.settle(seq, resolver.run(req).await);
    let keys: Vec<String> = picker.selection().iter().map(|t| t.to_string()).collect();
    assert_eq!(keys.len(), 2, "{:?}", keys);
    assert!(picker.is_selected(&TargetRef::team(10, "Servers")));
    assert_eq!(picker.selected_of_kind(muster_core::TargetKind::Label), vec![TargetRef::label(2, "macOS")]);
    assert_eq!(picker.selected_of_kind(muster_core::TargetKind::Label)[0].display_name, "macOS");
    assert!(!picker.is_selected(&TargetRef::label(1, "All Hosts")));
    // team 10 is hosts 1 and 2, macOS adds nothing new
    assert_eq!(picker.counts().total, 2);
    assert_eq!(picker.counts().online, 2);

    let req = picker.request(true, ResolveIntent::Adopt(vec![TargetRef::label(1, "All Hosts")]));
    let seq = req.seq;
    picker.settle(seq, resolver.run(req).await);
    assert_eq!(picker.selection().to_vec(), vec![TargetRef::label(1, "All Hosts")]);
    assert_eq!(picker.counts().total, 4);
}
