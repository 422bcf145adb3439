use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ── football-data.org structures ────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct AreasResponse {
    #[serde(default)]
    pub areas: Vec<Area>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Area {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamsResponse {
    #[serde(default)]
    pub teams: Vec<Team>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchesResponse {
    #[serde(default)]
    pub matches: Vec<FootballMatch>,
}

/// A match as returned by football-data. Only the fields the prediction
/// reads are typed; the rest is kept so the match serializes back intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FootballMatch {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub home_team: MatchTeam,
    pub away_team: MatchTeam,
    #[serde(default)]
    pub score: MatchScore,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchTeam {
    /// Null for undecided knockout fixtures.
    pub id: Option<u32>,
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    #[serde(default)]
    pub full_time: Option<Score>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// v4 uses `home`/`away`; v2 payloads used `homeTeam`/`awayTeam`.
/// Legacy keys are read but always written back as `home`/`away`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    #[serde(default, alias = "homeTeam")]
    pub home: Option<u32>,
    #[serde(default, alias = "awayTeam")]
    pub away: Option<u32>,
}

impl FootballMatch {
    /// Full-time `(home, away)` goals, if the match has a complete result.
    pub fn full_time(&self) -> Option<(u32, u32)> {
        let ft = self.score.full_time.as_ref()?;
        Some((ft.home?, ft.away?))
    }
}

// ── The Odds API structures ─────────────────────────────────────────────────

/// One odds event. Bookmaker markets are passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsEvent {
    pub home_team: String,
    pub away_team: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Prediction ──────────────────────────────────────────────────────────────

/// A reconciled team with its recent match history.
#[derive(Debug, Clone)]
pub struct TeamData {
    pub id: u32,
    pub name: String,
    pub matches: Vec<FootballMatch>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReport {
    pub prediction: String,
    pub confidence_score: i32,
    pub team_a: String,
    pub team_b: String,
    pub standings: Value,
    pub head_to_head: Vec<FootballMatch>,
    pub betting_odds: OddsEvent,
}

// ── Request bodies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpcomingMatchesRequest {
    #[serde(default, deserialize_with = "loose_string")]
    pub competition: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    #[serde(default, deserialize_with = "loose_string")]
    pub competition: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub team_a: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub team_b: Option<String>,
}

/// Accepts a string or a number; null, blank strings and other shapes read as absent.
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ── API response bodies ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}
