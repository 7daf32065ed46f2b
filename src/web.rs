use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::location_resolver::GeoResolver;
use crate::pipeline::AirQualityPipeline;
use crate::pollution::PollutionFetcher;
use crate::{AirQualityError, VERSION};

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    #[serde(default)]
    pub city: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    version: &'static str,
}

impl IntoResponse for AirQualityError {
    fn into_response(self) -> Response {
        let status = match &self {
            AirQualityError::NotFound { .. } => StatusCode::NOT_FOUND,
            AirQualityError::Transport { .. } => StatusCode::BAD_GATEWAY,
            AirQualityError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router<G, P>(pipeline: Arc<AirQualityPipeline<G, P>>) -> Router
where
    G: GeoResolver + 'static,
    P: PollutionFetcher + 'static,
{
    Router::new()
        .route("/air-quality", get(get_air_quality::<G, P>))
        .route("/health", get(get_health))
        .with_state(pipeline)
}

async fn get_air_quality<G, P>(
    State(pipeline): State<Arc<AirQualityPipeline<G, P>>>,
    Query(query): Query<CityQuery>,
) -> Response
where
    G: GeoResolver + 'static,
    P: PollutionFetcher + 'static,
{
    match pipeline.lookup(&query.city).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get_health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        version: VERSION,
    })
}

pub async fn run<G, P>(pipeline: AirQualityPipeline<G, P>, port: u16) -> Result<()>
where
    G: GeoResolver + 'static,
    P: PollutionFetcher + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", router(Arc::new(pipeline)))
        .layer(TimeoutLayer::new(Duration::from_secs(60)))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", port);
    axum::serve(listener, app)
        .await
        .context("Web server terminated")?;
    Ok(())
}
