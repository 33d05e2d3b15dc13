use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use muster_api::InMemFleet;
use muster_core::{classify, resolve_secrets, HostRef, SelectionSet, TargetGroups, TargetKind, TargetRef, TeamChoice};
use muster_resolve::{ResolverConfig, TargetResolver};
use serde::Serialize;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "musterctl", version, about = "Muster CLI: target resolution against a fleet fixture")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Fleet fixture (JSON with hosts, labels, teams, global_secrets)
    #[arg(long = "fleet", global = true, env = "MUSTER_FLEET", default_value = "demos/fleet.json")]
    fleet: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a selection: host matches, label/team groups and counts
    Targets {
        /// Free-text host filter
        #[arg(long = "query", default_value = "")]
        query: String,
        /// Selected target as kind:id, e.g. "label:6" or "team:2" (repeatable)
        #[arg(long = "select", value_parser = parse_target)]
        select: Vec<(TargetKind, u32)>,
        /// Only refresh host matches and counts
        #[arg(long = "no-labels", action = ArgAction::SetTrue)]
        no_labels: bool,
    },
    /// Show fleet labels grouped as the target picker shows them
    Labels,
    /// Show the enroll secrets in scope for a team ("0" or omitted: no team)
    Secrets {
        #[arg(long = "team")]
        team: Option<String>,
    },
}

fn parse_target(raw: &str) -> Result<(TargetKind, u32), String> {
    let (kind, id) = raw.split_once(':').ok_or_else(|| format!("expected kind:id, got {:?}", raw))?;
    let kind = match kind {
        "host" | "hosts" => TargetKind::Host,
        "label" | "labels" => TargetKind::Label,
        "team" | "teams" => TargetKind::Team,
        other => return Err(format!("unknown target kind {:?}", other)),
    };
    let id = id.parse::<u32>().map_err(|e| format!("invalid id {:?}: {}", id, e))?;
    if id == 0 {
        return Err("target ids are positive".into());
    }
    Ok((kind, id))
}

fn init_tracing() {
    let env = std::env::var("MUSTER_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("MUSTER_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid MUSTER_METRICS_ADDR; expected host:port");
        }
    }
}

/// Look up display names for `kind:id` selections; unknown ids are an error.
fn selection_from_fixture(fleet: &InMemFleet, picks: &[(TargetKind, u32)]) -> Result<SelectionSet> {
    let fx = fleet.fixture();
    let mut sel = SelectionSet::new();
    for (kind, id) in picks {
        let name = match kind {
            TargetKind::Host => fx.hosts.iter().find(|h| h.id == *id).map(|h| h.hostname.clone()),
            TargetKind::Label => fx.labels.iter().find(|l| l.id == *id).map(|l| l.name.clone()),
            TargetKind::Team => fx.teams.iter().find(|t| t.id == *id).map(|t| t.name.clone()),
        };
        let Some(name) = name else { bail!("no {} with id {} in fleet", kind, id) };
        sel.add(TargetRef::new(*kind, *id, name));
    }
    Ok(sel)
}

#[derive(Serialize)]
struct GroupsOut<'a> {
    all_hosts: Vec<&'a str>,
    platform: Vec<&'a str>,
    other: Vec<&'a str>,
    teams: Vec<&'a str>,
}

impl<'a> From<&'a TargetGroups> for GroupsOut<'a> {
    fn from(g: &'a TargetGroups) -> Self {
        Self {
            all_hosts: g.all_hosts.iter().map(|l| l.pill_text()).collect(),
            platform: g.platform.iter().map(|l| l.pill_text()).collect(),
            other: g.other.iter().map(|l| l.pill_text()).collect(),
            teams: g.teams.iter().map(|t| t.name.as_str()).collect(),
        }
    }
}

#[derive(Serialize)]
struct TargetsOut<'a> {
    selected: Vec<TargetRef>,
    hosts: &'a [HostRef],
    groups: GroupsOut<'a>,
    targets_count: u64,
    targets_online: u64,
    targets_offline: u64,
    online_percent: u8,
}

fn print_groups(g: &TargetGroups) {
    let line = |title: &str, names: Vec<&str>| {
        if !names.is_empty() {
            println!("{:<10} {}", title, names.join(", "));
        }
    };
    line("", g.all_hosts.iter().map(|l| l.pill_text()).collect());
    line("Platforms", g.platform.iter().map(|l| l.pill_text()).collect());
    line("Teams", g.teams.iter().map(|t| t.name.as_str()).collect());
    line("Labels", g.other.iter().map(|l| l.pill_text()).collect());
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();
    let fleet = Arc::new(InMemFleet::from_path(&cli.fleet)?);

    match cli.command {
        Commands::Targets { query, select, no_labels } => {
            let selection = selection_from_fixture(&fleet, &select)?;
            info!(query = %query, selected = selection.len(), "targets invoked");
            let resolver = TargetResolver::with_config(fleet.clone(), ResolverConfig::from_env());
            let res = match resolver.resolve(&query, &selection, !no_labels).await {
                Ok(r) => r,
                Err(e) => {
                    error!(error = %e, "resolve failed");
                    return Err(e).context("couldn't load targets");
                }
            };
            match cli.output {
                Output::Human => {
                    print_groups(&res.groups);
                    if !res.hosts.is_empty() {
                        println!("ID     HOSTNAME                 STATUS");
                        for h in &res.hosts {
                            println!("{:<6} {:<24} {:?}", h.id, h.display_name, h.status);
                        }
                    }
                    let total = res.counts.total;
                    println!(
                        "{} host{} targeted ({}% online)",
                        total,
                        if total == 1 { "" } else { "s" },
                        res.counts.online_share()
                    );
                }
                Output::Json => {
                    let out = TargetsOut {
                        selected: selection.to_vec(),
                        hosts: &res.hosts,
                        groups: GroupsOut::from(&res.groups),
                        targets_count: res.counts.total,
                        targets_online: res.counts.online,
                        targets_offline: res.counts.offline(),
                        online_percent: res.counts.online_percent(),
                    };
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
            }
        }
        Commands::Labels => {
            let groups = classify(fleet.fixture().labels.clone());
            match cli.output {
                Output::Human => print_groups(&groups),
                Output::Json => println!("{}", serde_json::to_string_pretty(&GroupsOut::from(&groups))?),
            }
        }
        Commands::Secrets { team } => {
            let choice = TeamChoice::from(team.as_deref());
            let fx = fleet.fixture();
            let scope = resolve_secrets(choice, &fx.teams, &fx.global_secrets);
            info!(team = ?scope.team_id, secrets = scope.secrets.len(), "secrets resolved");
            match cli.output {
                Output::Human => {
                    let owner = match scope.team_id {
                        None => "global".to_string(),
                        Some(id) => fx
                            .teams
                            .iter()
                            .find(|t| t.id == id)
                            .map(|t| t.name.clone())
                            .unwrap_or_else(|| format!("team {} (not loaded)", id)),
                    };
                    println!("scope: {}", owner);
                    if scope.secrets.is_empty() {
                        println!("(no enroll secrets)");
                    }
                    for s in &scope.secrets {
                        println!("{}", s.secret);
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&scope)?),
            }
        }
    }
    Ok(())
}
