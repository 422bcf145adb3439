//! Team name reconciliation against football-data's canonical names.
//!
//! Rosters are cached per competition. An entry lives until `ttl` elapses
//! (forever when `ttl` is `None`) or until it is invalidated explicitly.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::{ServiceError, ServiceResult};
use crate::models::Team;
use crate::services::FootballApi;

/// One cached roster, kept in upstream order so the fallback match is stable.
#[derive(Debug, Clone)]
struct Roster {
    /// (lowercased name, team)
    entries: Vec<(String, Team)>,
    fetched_at: Instant,
}

impl Roster {
    fn from_teams(teams: Vec<Team>) -> Self {
        Self {
            entries: teams
                .into_iter()
                .map(|team| (team.name.to_lowercase(), team))
                .collect(),
            fetched_at: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Option<Duration>) -> bool {
        ttl.map_or(true, |ttl| self.fetched_at.elapsed() < ttl)
    }

    fn resolve(&self, input: &str) -> Option<&Team> {
        let wanted = input.to_lowercase();
        if let Some((_, team)) = self.entries.iter().find(|(name, _)| *name == wanted) {
            return Some(team);
        }

        let wanted = strip_fc(&wanted);
        self.entries
            .iter()
            .find(|(name, _)| strip_fc(name) == wanted)
            .map(|(_, team)| team)
    }
}

/// Remove the first "fc" (any case) anywhere in the name, then trim.
pub fn strip_fc(name: &str) -> String {
    let lower = name.to_lowercase();
    match lower.find("fc") {
        Some(at) => format!("{}{}", &lower[..at], &lower[at + 2..]).trim().to_string(),
        None => lower.trim().to_string(),
    }
}

pub struct TeamNameCache {
    rosters: RwLock<HashMap<String, Roster>>,
    ttl: Option<Duration>,
}

impl TeamNameCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            rosters: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Resolve a loosely typed team name to the competition's canonical team.
    pub async fn resolve(&self, api: &dyn FootballApi, competition: &str, input: &str) -> ServiceResult<Team> {
        let roster = self.roster(api, competition).await?;

        match roster.resolve(input) {
            Some(team) => {
                tracing::debug!("Resolved '{}' to '{}' ({})", input, team.name, team.id);
                Ok(team.clone())
            }
            None => {
                tracing::warn!("No match found for team '{}' in competition {}", input, competition);
                Err(ServiceError::NotFound(format!(
                    "Team '{}' not found in competition {}",
                    input, competition
                )))
            }
        }
    }

    /// Drop the cached roster for one competition. Returns true if one was cached.
    pub async fn invalidate(&self, competition: &str) -> bool {
        self.rosters.write().await.remove(competition).is_some()
    }

    /// Number of competitions with a cached roster.
    pub(crate) async fn len(&self) -> usize {
        self.rosters.read().await.len()
    }

    async fn roster(&self, api: &dyn FootballApi, competition: &str) -> ServiceResult<Roster> {
        if let Some(roster) = self.rosters.read().await.get(competition) {
            if roster.is_fresh(self.ttl) {
                return Ok(roster.clone());
            }
            tracing::info!("Team roster for competition {} expired, refetching", competition);
        }

        // Lock is not held across the fetch; concurrent misses may both fetch.
        let teams = api.competition_teams(competition).await?;
        tracing::debug!(
            "Available teams for competition {}: {:?}",
            competition,
            teams.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()
        );

        let roster = Roster::from_teams(teams);
        self.rosters
            .write()
            .await
            .insert(competition.to_string(), roster.clone());
        Ok(roster)
    }
}
