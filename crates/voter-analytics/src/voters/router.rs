use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::info;

use super::domain::VoterId;
use super::filter::FilterCriteria;
use super::ingest::IngestError;
use super::report::{parse_page, PageError, VoterPage};
use super::service::{VoterAnalyticsService, VoterServiceError};
use super::store::VoterStore;

/// Settings the HTTP layer needs beyond the service itself.
#[derive(Debug, Clone)]
pub struct VoterRouterSettings {
    pub page_size: usize,
    pub default_csv: PathBuf,
}

pub(crate) struct VoterApiState<S> {
    service: Arc<VoterAnalyticsService<S>>,
    settings: VoterRouterSettings,
    // Loads replace the whole table, so only one may run at a time.
    ingest_gate: Mutex<()>,
}

/// Router builder exposing the voter listing, detail, chart, and load endpoints.
pub fn voter_router<S>(
    service: Arc<VoterAnalyticsService<S>>,
    settings: VoterRouterSettings,
) -> Router
where
    S: VoterStore + 'static,
{
    let state = Arc::new(VoterApiState {
        service,
        settings,
        ingest_gate: Mutex::new(()),
    });

    Router::new()
        .route("/api/v1/voters", get(list_handler::<S>))
        .route("/api/v1/voters/options", get(options_handler::<S>))
        .route("/api/v1/voters/graphs", get(graphs_handler::<S>))
        .route("/api/v1/voters/load", post(load_handler::<S>))
        .route("/api/v1/voters/:voter_id", get(detail_handler::<S>))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub(crate) struct VoterListResponse {
    #[serde(flatten)]
    pub(crate) page: VoterPage,
    pub(crate) criteria: FilterCriteria,
    pub(crate) querystring: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LoadRequest {
    #[serde(default)]
    pub(crate) path: Option<PathBuf>,
    #[serde(default)]
    pub(crate) csv: Option<String>,
}

fn error_response(status: StatusCode, message: impl ToString) -> Response {
    let payload = json!({ "error": message.to_string() });
    (status, Json(payload)).into_response()
}

fn service_error_response(error: VoterServiceError) -> Response {
    let status = match &error {
        VoterServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        VoterServiceError::Page(PageError::OutOfRange { .. }) => StatusCode::NOT_FOUND,
        VoterServiceError::Page(PageError::InvalidPage(_)) => StatusCode::BAD_REQUEST,
        VoterServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, error)
}

pub(crate) async fn list_handler<S>(
    State(state): State<Arc<VoterApiState<S>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response
where
    S: VoterStore + 'static,
{
    let criteria = match FilterCriteria::from_params(&params) {
        Ok(criteria) => criteria,
        Err(error) => return error_response(StatusCode::BAD_REQUEST, error),
    };
    let page = match parse_page(params.get("page").map(String::as_str)) {
        Ok(page) => page,
        Err(error) => return error_response(StatusCode::BAD_REQUEST, error),
    };

    match state
        .service
        .list(&criteria, page, state.settings.page_size)
    {
        Ok(page) => {
            let querystring = criteria.query_string();
            let body = VoterListResponse {
                page,
                criteria,
                querystring,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn options_handler<S>(State(state): State<Arc<VoterApiState<S>>>) -> Response
where
    S: VoterStore + 'static,
{
    match state.service.filter_options() {
        Ok(options) => (StatusCode::OK, Json(options)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn graphs_handler<S>(
    State(state): State<Arc<VoterApiState<S>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response
where
    S: VoterStore + 'static,
{
    let criteria = match FilterCriteria::from_params(&params) {
        Ok(criteria) => criteria,
        Err(error) => return error_response(StatusCode::BAD_REQUEST, error),
    };

    match state.service.graphs(&criteria) {
        Ok(graphs) => {
            let body = json!({ "criteria": criteria, "graphs": graphs });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn detail_handler<S>(
    State(state): State<Arc<VoterApiState<S>>>,
    Path(voter_id): Path<u64>,
) -> Response
where
    S: VoterStore + 'static,
{
    match state.service.detail(VoterId(voter_id)) {
        Ok(voter) => (StatusCode::OK, Json(voter)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn load_handler<S>(
    State(state): State<Arc<VoterApiState<S>>>,
    body: Bytes,
) -> Response
where
    S: VoterStore + 'static,
{
    let request = match parse_load_request(&body) {
        Ok(request) => request,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };
    let _gate = state.ingest_gate.lock().await;

    let service = state.service.clone();
    let default_csv = state.settings.default_csv.clone();
    let result = tokio::task::spawn_blocking(move || match request {
        LoadRequest { csv: Some(csv), .. } => service.load_reader(Cursor::new(csv.into_bytes())),
        LoadRequest { path, .. } => {
            let path = path.unwrap_or(default_csv);
            info!(path = %path.display(), "loading voters from file");
            service.load_path(path)
        }
    })
    .await;

    match result {
        Ok(Ok(summary)) => (StatusCode::OK, Json(summary.to_view())).into_response(),
        Ok(Err(error @ IngestError::SourceNotFound { .. })) => {
            error_response(StatusCode::NOT_FOUND, error)
        }
        Ok(Err(error @ IngestError::Csv(_))) => error_response(StatusCode::BAD_REQUEST, error),
        Ok(Err(error)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, error),
        Err(error) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("voter load task failed: {error}"),
        ),
    }
}

/// An empty body loads the default export; anything else must be a valid request.
fn parse_load_request(body: &[u8]) -> Result<LoadRequest, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(LoadRequest::default());
    }

    let request: LoadRequest = serde_json::from_slice(body)
        .map_err(|error| format!("invalid load request: {error}"))?;
    if request.path.is_some() && request.csv.is_some() {
        return Err("invalid load request: set either path or csv, not both".to_string());
    }
    Ok(request)
}
