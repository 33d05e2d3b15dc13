//! Enrollment-secret scope for a team selection.
//!
//! "No team" (null, 0, "0") maps to the global secret set. A team id that is not
//! (yet) loaded yields an empty list instead of an error.

use serde::{Deserialize, Deserializer, Serialize};

use crate::target::TargetId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnrollSecret {
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl EnrollSecret {
    pub fn new(secret: impl Into<String>) -> Self { Self { secret: secret.into(), created_at: None } }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Team {
    pub id: TargetId,
    pub name: String,
    #[serde(default)]
    pub secrets: Vec<EnrollSecret>,
}

/// Team picked in a team dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TeamChoice {
    #[default]
    NoTeam,
    Team(TargetId),
}

impl TeamChoice {
    /// Numeric input; zero, negative and out-of-range ids select "No team".
    pub fn from_id(id: i64) -> Self {
        match TargetId::try_from(id) {
            Ok(0) | Err(_) => TeamChoice::NoTeam,
            Ok(id) => TeamChoice::Team(id),
        }
    }

    /// Stringified input from form widgets; anything that is not a positive id selects "No team".
    pub fn parse(raw: &str) -> Self {
        raw.trim().parse::<i64>().map(Self::from_id).unwrap_or(TeamChoice::NoTeam)
    }

    pub fn team_id(&self) -> Option<TargetId> {
        match self {
            TeamChoice::NoTeam => None,
            TeamChoice::Team(id) => Some(*id),
        }
    }
}

impl From<Option<i64>> for TeamChoice {
    fn from(v: Option<i64>) -> Self { v.map(Self::from_id).unwrap_or_default() }
}

impl From<Option<&str>> for TeamChoice {
    fn from(v: Option<&str>) -> Self { v.map(Self::parse).unwrap_or_default() }
}

impl<'de> Deserialize<'de> for TeamChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Str(String),
        }
        Ok(match Option::<Raw>::deserialize(deserializer)? {
            None => TeamChoice::NoTeam,
            Some(Raw::Num(n)) => TeamChoice::from_id(n),
            Some(Raw::Str(s)) => TeamChoice::parse(&s),
        })
    }
}

/// Secrets in scope for a team choice. Replaced wholesale on every team switch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SecretScope {
    pub team_id: Option<TargetId>,
    pub secrets: Vec<EnrollSecret>,
}

impl SecretScope {
    pub fn is_global(&self) -> bool { self.team_id.is_none() }

    /// Secret used in generated enrollment commands.
    pub fn primary(&self) -> Option<&EnrollSecret> { self.secrets.first() }

    /// New secret list after adding `new`, replacing `previous` when editing.
    pub fn with_saved(&self, previous: Option<&str>, new: &str) -> Vec<EnrollSecret> {
        let mut out: Vec<EnrollSecret> = self
            .secrets
            .iter()
            .filter(|s| Some(s.secret.as_str()) != previous && s.secret != new)
            .cloned()
            .collect();
        if !new.is_empty() {
            out.push(EnrollSecret::new(new));
        }
        out
    }

    /// New secret list without `secret`.
    pub fn without(&self, secret: &str) -> Vec<EnrollSecret> {
        self.secrets.iter().filter(|s| s.secret != secret).cloned().collect()
    }
}

/// Resolve which secret set applies to `choice`. Never fails.
pub fn resolve_secrets(choice: TeamChoice, teams: &[Team], global_secrets: &[EnrollSecret]) -> SecretScope {
    match choice {
        TeamChoice::NoTeam => SecretScope { team_id: None, secrets: global_secrets.to_vec() },
        TeamChoice::Team(id) => match teams.iter().find(|t| t.id == id) {
            Some(team) => SecretScope { team_id: Some(team.id), secrets: team.secrets.clone() },
            None => SecretScope { team_id: Some(id), secrets: Vec::new() },
        },
    }
}
