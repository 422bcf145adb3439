//! Process configuration read from the environment (and `.env` via dotenv).

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_FOOTBALL_DATA_BASE_URL: &str = "https://api.football-data.org/v4";
pub const DEFAULT_ODDS_API_BASE_URL: &str = "https://api.the-odds-api.com/v4";

/// Odds are only pulled for one league; the football-data side covers any competition.
pub const DEFAULT_ODDS_SPORT: &str = "soccer_epl";
pub const DEFAULT_ODDS_REGION: &str = "uk";
pub const DEFAULT_ODDS_FORMAT: &str = "american";

pub const DEFAULT_TEAM_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone)]
pub struct FootballDataConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OddsConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub sport: String,
    pub region: String,
    pub odds_format: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub football: FootballDataConfig,
    pub odds: OddsConfig,
    /// `None` keeps roster entries for the whole process lifetime.
    pub team_cache_ttl: Option<Duration>,
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let team_cache_ttl_secs = parse_secs("TEAM_CACHE_TTL_SECS", DEFAULT_TEAM_CACHE_TTL_SECS)?;
        let upstream_timeout_secs = parse_secs("UPSTREAM_TIMEOUT_SECS", DEFAULT_UPSTREAM_TIMEOUT_SECS)?;

        Ok(Self {
            football: FootballDataConfig {
                base_url: var_or("FOOTBALL_DATA_BASE_URL", DEFAULT_FOOTBALL_DATA_BASE_URL),
                api_key: non_empty_var("FOOTBALL_DATA_API_KEY"),
            },
            odds: OddsConfig {
                base_url: var_or("ODDS_API_BASE_URL", DEFAULT_ODDS_API_BASE_URL),
                api_key: non_empty_var("ODDS_API_KEY"),
                sport: var_or("ODDS_SPORT", DEFAULT_ODDS_SPORT),
                region: var_or("ODDS_REGION", DEFAULT_ODDS_REGION),
                odds_format: var_or("ODDS_FORMAT", DEFAULT_ODDS_FORMAT),
            },
            team_cache_ttl: (team_cache_ttl_secs > 0).then(|| Duration::from_secs(team_cache_ttl_secs)),
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
        })
    }

    /// Log which upstreams are usable without printing the keys.
    pub fn log_summary(&self) {
        tracing::info!(
            "football-data: {} (key {})",
            self.football.base_url,
            if self.football.api_key.is_some() { "set" } else { "missing" }
        );
        tracing::info!(
            "odds: {} sport={} region={} (key {})",
            self.odds.base_url,
            self.odds.sport,
            self.odds.region,
            if self.odds.api_key.is_some() { "set" } else { "missing" }
        );
        if self.football.api_key.is_none() {
            tracing::warn!("FOOTBALL_DATA_API_KEY not set: every lookup will fail");
        }
        if self.odds.api_key.is_none() {
            tracing::warn!("ODDS_API_KEY not set: predictions will fail at the odds step");
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    non_empty_var(name)
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_else(|| default.to_string())
}

fn parse_secs(name: &str, default: u64) -> Result<u64> {
    match non_empty_var(name) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{} must be a whole number of seconds, got '{}'", name, raw)),
        None => Ok(default),
    }
}
