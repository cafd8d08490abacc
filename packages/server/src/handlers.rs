//! HTTP handler functions for the arrest map API.

use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, web};
use arrest_map_aggregate::AggregateOptions;
use arrest_map_server_models::{
    AggregateQueryParams, ApiDatasetStats, ApiError, ApiHealth, ApiLegend, ApiMapResponse,
    ApiMarker, ApiSummaryResponse, ApiTopLocation, DEFAULT_CENTER, SummaryQueryParams,
};

use crate::AppState;
use crate::pipeline::{self, Analysis, PipelineError};

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/map`
///
/// Returns one styled circle marker per active bucket.
pub async fn map(
    state: web::Data<AppState>,
    params: web::Query<AggregateQueryParams>,
) -> HttpResponse {
    let options = state
        .config
        .aggregate_options(params.precision, params.threshold);

    match load(&state, options).await {
        Ok(analysis) => HttpResponse::Ok().json(ApiMapResponse {
            center: DEFAULT_CENTER,
            legend: ApiLegend::default(),
            markers: analysis.markers().into_iter().map(ApiMarker::from).collect(),
        }),
        Err(e) => error_response("Failed to build map", &e),
    }
}

/// `GET /api/data`
///
/// Returns headline statistics for the dataset.
pub async fn data(
    state: web::Data<AppState>,
    params: web::Query<AggregateQueryParams>,
) -> HttpResponse {
    let options = state
        .config
        .aggregate_options(params.precision, params.threshold);

    match load(&state, options).await {
        Ok(analysis) => HttpResponse::Ok().json(ApiDatasetStats::from(analysis.stats)),
        Err(e) => error_response("Failed to compute dataset statistics", &e),
    }
}

/// `GET /api/summary`
///
/// Returns dataset statistics and the busiest locations with place names.
/// Names come from the geocode cache; misses are looked up one at a time.
pub async fn summary(
    state: web::Data<AppState>,
    params: web::Query<SummaryQueryParams>,
) -> HttpResponse {
    let options = state
        .config
        .aggregate_options(params.precision, params.threshold);
    let limit = params.limit.unwrap_or(state.config.top_locations);

    let analysis = match load(&state, options).await {
        Ok(analysis) => analysis,
        Err(e) => return error_response("Failed to build summary", &e),
    };

    let mut cache = state.cache.lock().await;
    let resolved = pipeline::summarize(
        &analysis,
        limit,
        &mut cache,
        state.geocoder.as_ref(),
        state.limiter.as_ref(),
    )
    .await;
    drop(cache);

    match resolved {
        Ok(locations) => HttpResponse::Ok().json(ApiSummaryResponse {
            stats: ApiDatasetStats::from(analysis.stats),
            locations: locations
                .into_iter()
                .enumerate()
                .map(|(i, loc)| ApiTopLocation::from_resolved(i, loc))
                .collect(),
        }),
        Err(e) => error_response("Failed to save geocode cache", &e),
    }
}

/// Reads and aggregates the dataset on the blocking thread pool.
async fn load(state: &AppState, options: AggregateOptions) -> Result<Analysis, PipelineError> {
    let path = state.config.data_path.clone();
    web::block(move || pipeline::analyze(&path, options)).await?
}

fn error_response(context: &str, error: &PipelineError) -> HttpResponse {
    if error.is_client_error() {
        log::warn!("{context}: {error}");
        HttpResponse::BadRequest().json(ApiError {
            error: error.to_string(),
        })
    } else {
        log::error!("{context}: {error}");
        HttpResponse::InternalServerError().json(ApiError {
            error: format!("{context}: {error}"),
        })
    }
}

/// Rejects unparseable query strings with an [`ApiError`] body.
pub fn query_error(error: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid query string: {error}");
    log::warn!("{} {}: {message}", req.method(), req.path());
    let response = HttpResponse::BadRequest().json(ApiError {
        error: message,
    });
    InternalError::from_response(error, response).into()
}
