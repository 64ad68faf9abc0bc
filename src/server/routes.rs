//! HTTP routes.
//!
//! - `POST /api/v1/synthesize`: analyse a text
//! - `GET /api/v1/schema`: JSON Schema of the analysis result
//! - `GET /api/health`: liveness check, never gated
//!
//! When an access token is configured, every `/api/v1` route requires
//! `Authorization: Bearer <token>`.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::types::{AppState, ErrorDetail, HealthResponse, SynthesisRequest};
use crate::config::SecretString;
use crate::error::AnalysisError;
use crate::schema::AnalysisResult;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/synthesize", post(synthesize))
        .route("/schema", get(schema))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .nest("/api/v1", api)
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// An error response with a `detail` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    /// The 401 returned when the bearer token is missing or wrong.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            detail: "Not authenticated".to_string(),
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        let status = match err {
            AnalysisError::EmptyInput | AnalysisError::InputTooLarge { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorDetail {
            detail: self.detail,
        });
        if self.status == StatusCode::UNAUTHORIZED {
            (self.status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (self.status, body).into_response()
        }
    }
}

async fn synthesize(
    State(state): State<AppState>,
    Json(request): Json<SynthesisRequest>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("synthesize", %request_id, mode = state.service.mode());

    async move {
        info!(chars = request.text.chars().count(), "Synthesis requested");
        let result = state.service.synthesize(&request.text).await?;
        Ok::<_, ApiError>(Json(result))
    }
    .instrument(span)
    .await
}

async fn schema() -> Json<Value> {
    Json(AnalysisResult::json_schema())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = &state.access_token {
        if !is_authorized(request.headers(), token) {
            warn!(path = %request.uri().path(), "Rejected unauthenticated request");
            return Err(ApiError::unauthorized());
        }
    }
    Ok(next.run(request).await)
}

fn is_authorized(headers: &HeaderMap, token: &SecretString) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| token.matches_bearer(value))
}
