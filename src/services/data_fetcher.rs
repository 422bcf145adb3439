use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::FootballDataConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Area, AreasResponse, FootballMatch, MatchesResponse, Team, TeamsResponse};

/// The football-data endpoints the service reads.
#[async_trait]
pub trait FootballApi: Send + Sync {
    async fn areas(&self) -> ServiceResult<Vec<Area>>;

    /// Raw `/competitions` payload for the given area ids.
    async fn competitions(&self, area_ids: &[u32]) -> ServiceResult<Value>;

    async fn competition_teams(&self, competition: &str) -> ServiceResult<Vec<Team>>;

    /// The `standings` array of `/competitions/{id}/standings`.
    async fn competition_standings(&self, competition: &str) -> ServiceResult<Value>;

    /// The `matches` array of `/competitions/{id}/matches`, untouched.
    async fn competition_matches(&self, competition: &str) -> ServiceResult<Vec<Value>>;

    async fn team_matches(&self, team_id: u32, opponent: Option<u32>) -> ServiceResult<Vec<FootballMatch>>;

    async fn head_to_head(&self, match_id: u64) -> ServiceResult<Vec<FootballMatch>>;
}

// ── DataFetcher ──────────────────────────────────────────────────────────────

/// football-data.org v4 client, authenticated with the `X-Auth-Token` header.
pub struct DataFetcher {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl DataFetcher {
    pub fn new(config: &FootballDataConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn get(&self, path: &str) -> ServiceResult<RequestBuilder> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(ServiceError::MissingCredentials("FOOTBALL_DATA_API_KEY"))?;

        Ok(self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("X-Auth-Token", api_key))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, context: &str) -> ServiceResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::transport(context, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("{} failed with {}: {}", context, status, body);
            let details = serde_json::from_str::<Value>(&body)
                .unwrap_or_else(|_| Value::String(body));
            return Err(ServiceError::upstream(context, Some(status), Some(details)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::transport(context, e))
    }
}

#[async_trait]
impl FootballApi for DataFetcher {
    async fn areas(&self) -> ServiceResult<Vec<Area>> {
        tracing::info!("Fetching areas from football-data.org…");
        let data: AreasResponse = self.fetch(self.get("/areas")?, "Fetching areas").await?;
        Ok(data.areas)
    }

    async fn competitions(&self, area_ids: &[u32]) -> ServiceResult<Value> {
        let areas = area_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        tracing::info!("Fetching competitions for areas {}…", areas);

        let request = self.get("/competitions")?.query(&[("areas", areas.as_str())]);
        self.fetch(request, "Fetching competitions").await
    }

    async fn competition_teams(&self, competition: &str) -> ServiceResult<Vec<Team>> {
        tracing::info!("Fetching teams for competition {}…", competition);
        let path = format!("/competitions/{}/teams", competition);
        let data: TeamsResponse = self.fetch(self.get(&path)?, "Fetching competition teams").await?;
        Ok(data.teams)
    }

    async fn competition_standings(&self, competition: &str) -> ServiceResult<Value> {
        tracing::info!("Fetching standings for competition {}…", competition);
        let path = format!("/competitions/{}/standings", competition);
        let data: Value = self.fetch(self.get(&path)?, "Fetching competition standings").await?;
        Ok(match data.get("standings") {
            Some(standings) if !standings.is_null() => standings.clone(),
            _ => Value::Array(Vec::new()),
        })
    }

    async fn competition_matches(&self, competition: &str) -> ServiceResult<Vec<Value>> {
        tracing::info!("Fetching matches for competition {}…", competition);
        let path = format!("/competitions/{}/matches", competition);
        let data: Value = self.fetch(self.get(&path)?, "Fetching competition matches").await?;
        match data.get("matches") {
            Some(Value::Array(matches)) => Ok(matches.clone()),
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(other) => Err(ServiceError::upstream(
                "Fetching competition matches: unexpected payload",
                None,
                Some(other.clone()),
            )),
        }
    }

    async fn team_matches(&self, team_id: u32, opponent: Option<u32>) -> ServiceResult<Vec<FootballMatch>> {
        let path = format!("/teams/{}/matches", team_id);
        let mut request = self.get(&path)?;
        if let Some(opponent) = opponent {
            tracing::info!("Fetching matches for team {} against {}…", team_id, opponent);
            request = request.query(&[("opponents", opponent)]);
        } else {
            tracing::info!("Fetching matches for team {}…", team_id);
        }

        let data: MatchesResponse = self.fetch(request, "Fetching team matches").await?;
        Ok(data.matches)
    }

    async fn head_to_head(&self, match_id: u64) -> ServiceResult<Vec<FootballMatch>> {
        tracing::info!("Fetching head-to-head for match {}…", match_id);
        let path = format!("/matches/{}/head2head", match_id);
        let data: MatchesResponse = self.fetch(self.get(&path)?, "Fetching head-to-head data").await?;
        Ok(data.matches)
    }
}
