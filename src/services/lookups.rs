use serde_json::Value;

use crate::error::{ServiceError, ServiceResult};
use crate::services::FootballApi;

/// Areas whose competitions are exposed by `/api/competitions`.
pub const TOP_LEAGUE_AREAS: [&str; 5] = ["England", "Germany", "Spain", "Italy", "Portugal"];

/// Competitions of the top-league areas, as returned by football-data.
pub async fn top_competitions(api: &dyn FootballApi) -> ServiceResult<Value> {
    let area_ids: Vec<u32> = api
        .areas()
        .await?
        .into_iter()
        .filter(|area| TOP_LEAGUE_AREAS.contains(&area.name.as_str()))
        .map(|area| area.id)
        .collect();

    if area_ids.is_empty() {
        tracing::warn!("None of {:?} present in upstream areas", TOP_LEAGUE_AREAS);
        return Err(ServiceError::NotFound(
            "No areas found for the specified leagues.".to_string(),
        ));
    }

    api.competitions(&area_ids).await
}

/// Every match listed for a competition. An empty list is NotFound.
pub async fn upcoming_matches(api: &dyn FootballApi, competition: &str) -> ServiceResult<Vec<Value>> {
    let matches = api.competition_matches(competition).await?;
    if matches.is_empty() {
        return Err(ServiceError::NotFound("No upcoming matches found.".to_string()));
    }
    tracing::info!("{} matches for competition {}", matches.len(), competition);
    Ok(matches)
}
