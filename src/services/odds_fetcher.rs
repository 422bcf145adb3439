//! Fetches odds from The Odds API and picks the event for a team pair.
//!
//! One call per prediction: the whole sport/region board is pulled and
//! searched locally, since the API has no team filter.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::OddsConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::models::OddsEvent;

/// Trailing suffixes dropped before comparing names. At most one is removed.
const TEAM_SUFFIXES: [&str; 4] = [" FC", " SC", " AFC", "United"];

#[async_trait]
pub trait OddsApi: Send + Sync {
    /// Every event currently listed for the configured sport and region.
    async fn events(&self) -> ServiceResult<Vec<OddsEvent>>;
}

pub struct OddsFetcher {
    client: Client,
    config: OddsConfig,
}

impl OddsFetcher {
    pub fn new(config: &OddsConfig, client: Client) -> Self {
        let mut config = config.clone();
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self { client, config }
    }
}

#[async_trait]
impl OddsApi for OddsFetcher {
    async fn events(&self) -> ServiceResult<Vec<OddsEvent>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ServiceError::MissingCredentials("ODDS_API_KEY"))?;

        let url = format!("{}/sports/{}/odds", self.config.base_url, self.config.sport);
        tracing::info!("Fetching {} odds ({})…", self.config.sport, self.config.region);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("regions", self.config.region.as_str()),
                ("oddsFormat", self.config.odds_format.as_str()),
                ("apiKey", api_key),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::transport("Fetching betting odds", e))?;

        let status = resp.status();
        if status == 401 {
            return Err(ServiceError::upstream("Odds API: invalid API key", Some(status), None));
        }
        if status == 422 {
            return Err(ServiceError::upstream(
                format!("Odds API: sport {} not in subscription", self.config.sport),
                Some(status),
                None,
            ));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!("Odds API HTTP {}: {}", status, body);
            return Err(ServiceError::upstream(
                "Fetching betting odds",
                Some(status),
                Some(serde_json::Value::String(body)),
            ));
        }

        resp.json::<Vec<OddsEvent>>()
            .await
            .map_err(|e| ServiceError::transport("Decoding betting odds", e))
    }
}

/// Fetch the board and return the event played between `team_a` and `team_b`,
/// in either home/away order.
pub async fn betting_odds(odds: &dyn OddsApi, team_a: &str, team_b: &str) -> ServiceResult<OddsEvent> {
    let events = odds.events().await?;
    let a = normalize_team_name(team_a);
    let b = normalize_team_name(team_b);
    tracing::info!("Searching odds for {} vs {} among {} events", a, b, events.len());

    find_event(events, team_a, team_b).ok_or_else(|| {
        tracing::warn!("No odds found for {} vs {}", a, b);
        ServiceError::NotFound(format!("No betting odds found for {} vs {}", team_a, team_b))
    })
}

pub fn find_event(events: Vec<OddsEvent>, team_a: &str, team_b: &str) -> Option<OddsEvent> {
    let a = normalize_team_name(team_a);
    let b = normalize_team_name(team_b);

    events.into_iter().find(|event| {
        let home = normalize_team_name(&event.home_team);
        let away = normalize_team_name(&event.away_team);
        (home == a && away == b) || (home == b && away == a)
    })
}

/// Drop one trailing " FC", " SC", " AFC" or "United" (any case), then trim.
pub fn normalize_team_name(name: &str) -> &str {
    let stripped = TEAM_SUFFIXES
        .iter()
        .find_map(|suffix| strip_suffix_ignore_case(name, suffix))
        .unwrap_or(name);
    stripped.trim()
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(cut) {
        return None;
    }
    let (head, tail) = s.split_at(cut);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, Query},
        http::StatusCode,
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;

    fn event(home: &str, away: &str) -> OddsEvent {
        serde_json::from_value(json!({
            "id": format!("{}-{}", home, away),
            "sport_key": "soccer_epl",
            "home_team": home,
            "away_team": away,
            "bookmakers": [{ "key": "bet365", "markets": [] }]
        }))
        .unwrap()
    }

    struct FakeOdds(Vec<OddsEvent>);

    #[async_trait]
    impl OddsApi for FakeOdds {
        async fn events(&self) -> ServiceResult<Vec<OddsEvent>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_normalize_team_name() {
        assert_eq!(normalize_team_name("Arsenal FC"), "Arsenal");
        assert_eq!(normalize_team_name("Sporting SC"), "Sporting");
        assert_eq!(normalize_team_name("Bournemouth AFC"), "Bournemouth");
        assert_eq!(normalize_team_name("Manchester United"), "Manchester");
        assert_eq!(normalize_team_name("Newcastle united"), "Newcastle");
        assert_eq!(normalize_team_name("Chelsea"), "Chelsea");
    }

    #[test]
    fn test_normalize_only_strips_trailing_suffix() {
        assert_eq!(normalize_team_name("FC Barcelona"), "FC Barcelona");
        assert_eq!(normalize_team_name("AFC Wimbledon"), "AFC Wimbledon");
        // one suffix per name
        assert_eq!(normalize_team_name("Leeds United FC"), "Leeds United");
    }

    #[test]
    fn test_normalize_handles_multibyte_names() {
        assert_eq!(normalize_team_name("Atlético"), "Atlético");
        assert_eq!(normalize_team_name("É"), "É");
    }

    #[test]
    fn test_find_event_either_order() {
        let events = vec![event("Liverpool", "Everton"), event("Arsenal", "Chelsea")];

        let found = find_event(events.clone(), "Chelsea FC", "Arsenal FC").unwrap();
        assert_eq!(found.home_team, "Arsenal");

        let found = find_event(events, "Liverpool FC", "Everton FC").unwrap();
        assert_eq!(found.away_team, "Everton");
    }

    #[tokio::test]
    async fn test_betting_odds_returns_full_payload() {
        let odds = FakeOdds(vec![event("Manchester United", "Tottenham Hotspur")]);
        let found = betting_odds(&odds, "Manchester United", "Tottenham Hotspur FC")
            .await
            .unwrap();
        let payload = serde_json::to_value(&found).unwrap();
        assert_eq!(payload["sport_key"], "soccer_epl");
        assert_eq!(payload["bookmakers"][0]["key"], "bet365");
    }

    #[tokio::test]
    async fn test_betting_odds_not_found() {
        let odds = FakeOdds(vec![event("Liverpool", "Everton")]);
        let err = betting_odds(&odds, "Arsenal FC", "Chelsea FC").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    // ── OddsFetcher against a local server ──────────────────────────────────

    /// Serves `/sports/{sport}/odds`. The `apiKey` picks the response:
    /// `good` echoes the query back inside one event, `expired` is a 401,
    /// anything else a 500. Sport `soccer_mls` is outside the subscription.
    async fn stub_server() -> String {
        let app = Router::new().route(
            "/sports/{sport}/odds",
            get(|Path(sport): Path<String>, Query(q): Query<HashMap<String, String>>| async move {
                if sport == "soccer_mls" {
                    return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "message": "unknown sport" })));
                }
                match q.get("apiKey").map(String::as_str) {
                    Some("good") => (
                        StatusCode::OK,
                        Json(json!([{
                            "id": "e1",
                            "sport_key": sport,
                            "home_team": "Arsenal",
                            "away_team": "Chelsea",
                            "query": q
                        }])),
                    ),
                    Some("expired") => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "bad key" }))),
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "boom" }))),
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn fetcher(base_url: String, api_key: Option<&str>, sport: &str) -> OddsFetcher {
        OddsFetcher::new(
            &OddsConfig {
                base_url: format!("{}/", base_url),
                api_key: api_key.map(str::to_string),
                sport: sport.to_string(),
                region: "uk".to_string(),
                odds_format: "american".to_string(),
            },
            Client::new(),
        )
    }

    #[tokio::test]
    async fn test_events_sends_key_and_market_params() {
        let base = stub_server().await;
        let events = fetcher(base, Some("good"), "soccer_epl").events().await.unwrap();
        assert_eq!(events.len(), 1);

        let query = &events[0].extra["query"];
        assert_eq!(query["apiKey"], "good");
        assert_eq!(query["regions"], "uk");
        assert_eq!(query["oddsFormat"], "american");
        assert_eq!(events[0].extra["sport_key"], "soccer_epl");
    }

    #[tokio::test]
    async fn test_betting_odds_over_http() {
        let base = stub_server().await;
        let odds = fetcher(base, Some("good"), "soccer_epl");
        let found = betting_odds(&odds, "Chelsea FC", "Arsenal FC").await.unwrap();
        assert_eq!(found.home_team, "Arsenal");
    }

    #[tokio::test]
    async fn test_events_rejected_key() {
        let base = stub_server().await;
        let err = fetcher(base, Some("expired"), "soccer_epl").events().await.unwrap_err();
        match err {
            ServiceError::Upstream { status, .. } => assert_eq!(status, Some(StatusCode::UNAUTHORIZED)),
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_events_sport_outside_subscription() {
        let base = stub_server().await;
        let err = fetcher(base, Some("good"), "soccer_mls").events().await.unwrap_err();
        match err {
            ServiceError::Upstream { context, status, .. } => {
                assert_eq!(status, Some(StatusCode::UNPROCESSABLE_ENTITY));
                assert!(context.contains("soccer_mls"), "context: {}", context);
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_events_server_error_keeps_body() {
        let base = stub_server().await;
        let err = fetcher(base, Some("other"), "soccer_epl").events().await.unwrap_err();
        match err {
            ServiceError::Upstream { status, details, .. } => {
                assert_eq!(status, Some(StatusCode::INTERNAL_SERVER_ERROR));
                let body = details.unwrap();
                assert!(body.as_str().unwrap().contains("boom"));
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_events_missing_key_fails_before_request() {
        let err = fetcher("http://127.0.0.1:9".to_string(), None, "soccer_epl")
            .events()
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::MissingCredentials("ODDS_API_KEY")));
    }
}
