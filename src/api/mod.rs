use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ServiceError;
use crate::models::{ErrorBody, HealthResponse, PredictRequest, PredictionReport, UpcomingMatchesRequest};
use crate::services::PredictionService;

pub type AppState = Arc<PredictionService>;

pub async fn serve(port: u16, service: PredictionService) -> anyhow::Result<()> {
    let app = create_router(Arc::new(service));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Prediction API server listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/competitions", get(competitions_handler))
        .route("/api/upcoming-matches", get(upcoming_matches_handler))
        .route("/api/predict", post(predict_handler))
        .route("/api/team-cache/{competition}", delete(invalidate_team_cache_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

// ── Errors ───────────────────────────────────────────────────────────────────

/// Handler error: status plus the JSON body sent to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: Some(message.into()),
                message: None,
                kind: None,
                details: None,
            },
        }
    }

    fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: None,
                message: Some(message.into()),
                kind: None,
                details: None,
            },
        }
    }

    fn with_kind(mut self, err: &ServiceError) -> Self {
        self.body.kind = Some(err.kind());
        self
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::error(StatusCode::BAD_REQUEST, message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Upstream { .. } | ServiceError::MissingCredentials(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::error(status, err.to_string()).with_kind(&err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Missing or empty body reads as all fields absent; malformed JSON is a 400.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ServiceError::Validation(format!("Invalid JSON body: {}", e)).into())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CacheInvalidation {
    competition: String,
    invalidated: bool,
    cached_competitions: usize,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now(),
    })
}

// GET /api/competitions - Competitions of the top European leagues
async fn competitions_handler(State(service): State<AppState>) -> Result<Json<Value>, ApiError> {
    match service.top_competitions().await {
        Ok(competitions) => Ok(Json(competitions)),
        Err(ServiceError::NotFound(message)) => Err(ApiError::error(StatusCode::NOT_FOUND, message)),
        Err(e) => {
            tracing::error!("Error fetching top leagues competitions: {}", e);
            let (status, details) = match e {
                ServiceError::Upstream { status, details, .. } => (
                    status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                    details.unwrap_or_else(|| Value::String("Server error".to_string())),
                ),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, Value::String("Server error".to_string())),
            };
            let mut err = ApiError::error(status, "Could not fetch competitions.");
            err.body.details = Some(details);
            Err(err)
        }
    }
}

// GET /api/upcoming-matches - Matches of one competition
async fn upcoming_matches_handler(
    State(service): State<AppState>,
    Query(query): Query<UpcomingMatchesRequest>,
    body: Bytes,
) -> Result<Json<Vec<Value>>, ApiError> {
    let request: UpcomingMatchesRequest = parse_body(&body)?;
    let Some(competition) = request.competition.or(query.competition) else {
        return Err(ApiError::bad_request("Please provide a competition."));
    };

    match service.upcoming_matches(&competition).await {
        Ok(matches) => Ok(Json(matches)),
        Err(ServiceError::NotFound(_)) => {
            Err(ApiError::message(StatusCode::NOT_FOUND, "No upcoming matches found."))
        }
        Err(e) => {
            tracing::error!("Error fetching upcoming matches: {}", e);
            Err(ApiError::error(StatusCode::INTERNAL_SERVER_ERROR, "Could not fetch upcoming matches."))
        }
    }
}

// POST /api/predict - Rule-based prediction for two teams
async fn predict_handler(
    State(service): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictionReport>, ApiError> {
    let request: PredictRequest = parse_body(&body)?;
    let (Some(competition), Some(team_a), Some(team_b)) = (request.competition, request.team_a, request.team_b)
    else {
        return Err(ApiError::bad_request("Please provide competition and teams."));
    };

    match service.predict(&competition, &team_a, &team_b).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            tracing::error!("Error in prediction for {} vs {} ({}): {}", team_a, team_b, competition, e);
            Err(ApiError::error(StatusCode::INTERNAL_SERVER_ERROR, "Could not generate prediction.").with_kind(&e))
        }
    }
}

// DELETE /api/team-cache/{competition} - Forget a cached roster
async fn invalidate_team_cache_handler(
    State(service): State<AppState>,
    Path(competition): Path<String>,
) -> Json<CacheInvalidation> {
    let team_names = service.team_names();
    let invalidated = team_names.invalidate(&competition).await;
    tracing::info!("Team roster cache for {} invalidated: {}", competition, invalidated);

    Json(CacheInvalidation {
        competition,
        invalidated,
        cached_competitions: team_names.len().await,
    })
}
