use anyhow::Result;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::error::ServiceResult;
use crate::models::{FootballMatch, PredictionReport, Team, TeamData};
use crate::services::{
    betting_odds, lookups, DataFetcher, FootballApi, OddsApi, OddsFetcher, PredictionEngine,
    PredictionInputs, TeamNameCache,
};

/// Owns the upstream clients and the team name cache. Shared by all handlers.
pub struct PredictionService {
    football: Arc<dyn FootballApi>,
    odds: Arc<dyn OddsApi>,
    team_names: TeamNameCache,
    engine: PredictionEngine,
}

impl PredictionService {
    pub fn new(football: Arc<dyn FootballApi>, odds: Arc<dyn OddsApi>, team_names: TeamNameCache) -> Self {
        Self {
            football,
            odds,
            team_names,
            engine: PredictionEngine::new(),
        }
    }

    /// Build the live service: reqwest clients for both providers.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.upstream_timeout).build()?;

        Ok(Self::new(
            Arc::new(DataFetcher::new(&config.football, client.clone())),
            Arc::new(OddsFetcher::new(&config.odds, client)),
            TeamNameCache::new(config.team_cache_ttl),
        ))
    }

    pub fn team_names(&self) -> &TeamNameCache {
        &self.team_names
    }

    pub async fn top_competitions(&self) -> ServiceResult<Value> {
        lookups::top_competitions(self.football.as_ref()).await
    }

    pub async fn upcoming_matches(&self, competition: &str) -> ServiceResult<Vec<Value>> {
        lookups::upcoming_matches(self.football.as_ref(), competition).await
    }

    /// Full prediction for `team_a` vs `team_b`. Stops at the first failing step.
    pub async fn predict(&self, competition: &str, team_a: &str, team_b: &str) -> ServiceResult<PredictionReport> {
        let football = self.football.as_ref();

        let a = self.team_names.resolve(football, competition, team_a).await?;
        let b = self.team_names.resolve(football, competition, team_b).await?;
        tracing::info!("Normalized teams: {} vs {}", a.name, b.name);

        let team_a = self.team_data(a).await?;
        let team_b = self.team_data(b).await?;

        let standings = football.competition_standings(competition).await?;
        let head_to_head = self.head_to_head(&team_a, &team_b).await?;

        let prediction = self.engine.predict(&PredictionInputs {
            team_a: &team_a,
            team_b: &team_b,
            standings: &standings,
            head_to_head: &head_to_head,
        });
        tracing::info!(
            "Prediction for {} vs {}: favourite {:?} by {:?} (confidence {})",
            team_a.name,
            team_b.name,
            prediction.favourite,
            prediction.basis,
            prediction.confidence_score
        );

        let odds = betting_odds(self.odds.as_ref(), &team_a.name, &team_b.name).await?;

        Ok(PredictionReport {
            prediction: prediction.text,
            confidence_score: prediction.confidence_score,
            team_a: team_a.name,
            team_b: team_b.name,
            standings,
            head_to_head,
            betting_odds: odds,
        })
    }

    async fn team_data(&self, team: Team) -> ServiceResult<TeamData> {
        let matches = self.football.team_matches(team.id, None).await?;
        Ok(TeamData {
            id: team.id,
            name: team.name,
            matches,
        })
    }

    /// Head-to-head history anchored on the most recent meeting, if any.
    async fn head_to_head(&self, team_a: &TeamData, team_b: &TeamData) -> ServiceResult<Vec<FootballMatch>> {
        let meetings = self.football.team_matches(team_a.id, Some(team_b.id)).await?;
        match meetings.first() {
            Some(last) => self.football.head_to_head(last.id).await,
            None => {
                tracing::info!("No meetings between {} and {}", team_a.name, team_b.name);
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use crate::error::ServiceError;
    use crate::models::{Area, OddsEvent};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory football-data double. Records every call it receives.
    #[derive(Default)]
    pub struct FakeFootball {
        pub areas: Vec<Area>,
        pub teams: Vec<Team>,
        pub team_matches: HashMap<u32, Vec<FootballMatch>>,
        pub meetings: Vec<FootballMatch>,
        pub head_to_head: Vec<FootballMatch>,
        pub competition_matches: Vec<Value>,
        /// When set, `areas` fails with this upstream status and body.
        pub areas_error: Option<(Option<StatusCode>, Option<Value>)>,
        pub fail_standings: bool,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeFootball {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FootballApi for FakeFootball {
        async fn areas(&self) -> ServiceResult<Vec<Area>> {
            self.record("areas".into());
            if let Some((status, details)) = &self.areas_error {
                return Err(ServiceError::upstream("Fetching areas", *status, details.clone()));
            }
            Ok(self.areas.clone())
        }

        async fn competitions(&self, area_ids: &[u32]) -> ServiceResult<Value> {
            self.record(format!("competitions {:?}", area_ids));
            Ok(json!({ "competitions": [{ "code": "PL", "areaIds": area_ids }] }))
        }

        async fn competition_teams(&self, competition: &str) -> ServiceResult<Vec<Team>> {
            self.record(format!("teams {}", competition));
            Ok(self.teams.clone())
        }

        async fn competition_standings(&self, competition: &str) -> ServiceResult<Value> {
            self.record(format!("standings {}", competition));
            if self.fail_standings {
                return Err(ServiceError::upstream("Fetching competition standings", None, None));
            }
            Ok(json!([{ "type": "TOTAL", "table": [] }]))
        }

        async fn competition_matches(&self, competition: &str) -> ServiceResult<Vec<Value>> {
            self.record(format!("matches {}", competition));
            Ok(self.competition_matches.clone())
        }

        async fn team_matches(&self, team_id: u32, opponent: Option<u32>) -> ServiceResult<Vec<FootballMatch>> {
            self.record(format!("team_matches {} {:?}", team_id, opponent));
            Ok(match opponent {
                Some(_) => self.meetings.clone(),
                None => self.team_matches.get(&team_id).cloned().unwrap_or_default(),
            })
        }

        async fn head_to_head(&self, match_id: u64) -> ServiceResult<Vec<FootballMatch>> {
            self.record(format!("head2head {}", match_id));
            Ok(self.head_to_head.clone())
        }
    }

    pub struct FakeOdds(pub Vec<OddsEvent>);

    #[async_trait]
    impl OddsApi for FakeOdds {
        async fn events(&self) -> ServiceResult<Vec<OddsEvent>> {
            Ok(self.0.clone())
        }
    }

    pub fn game(id: u64, home: &Team, away: &Team, score: (u32, u32)) -> FootballMatch {
        serde_json::from_value(json!({
            "id": id,
            "status": "FINISHED",
            "homeTeam": { "id": home.id, "name": home.name },
            "awayTeam": { "id": away.id, "name": away.name },
            "score": { "fullTime": { "home": score.0, "away": score.1 } }
        }))
        .unwrap()
    }

    pub fn odds_event(home: &str, away: &str) -> OddsEvent {
        serde_json::from_value(json!({
            "id": "evt-1",
            "home_team": home,
            "away_team": away,
            "bookmakers": []
        }))
        .unwrap()
    }

    pub fn arsenal() -> Team {
        Team { id: 57, name: "Arsenal FC".into() }
    }

    pub fn chelsea() -> Team {
        Team { id: 61, name: "Chelsea FC".into() }
    }

    pub fn everton() -> Team {
        Team { id: 62, name: "Everton FC".into() }
    }

    /// Arsenal won both recent games, Chelsea drew both. No meetings on record.
    pub fn premier_league() -> FakeFootball {
        let (ars, che, eve) = (arsenal(), chelsea(), everton());
        let mut team_matches = HashMap::new();
        team_matches.insert(ars.id, vec![game(1, &ars, &eve, (2, 0)), game(2, &eve, &ars, (0, 1))]);
        team_matches.insert(che.id, vec![game(3, &che, &eve, (1, 1)), game(4, &eve, &che, (2, 2))]);

        FakeFootball {
            areas: vec![
                Area { id: 2072, name: "England".into() },
                Area { id: 2081, name: "France".into() },
                Area { id: 2088, name: "Germany".into() },
            ],
            teams: vec![ars, che, eve],
            team_matches,
            ..Default::default()
        }
    }

    pub fn service(football: Arc<FakeFootball>, odds: Vec<OddsEvent>) -> PredictionService {
        PredictionService::new(football, Arc::new(FakeOdds(odds)), TeamNameCache::new(None))
    }
}
