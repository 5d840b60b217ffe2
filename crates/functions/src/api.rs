use crate::issue;
use crate::metrics;
use crate::state::AppState;
use crate::store::CertificateStore;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Json;
use certify_common::models::{IssueCertificate, IssueResponse, VerifyResponse};
use certify_common::CertifyError;
use chrono::Local;
use tower_http::trace::TraceLayer;
use tracing::info;

type ApiResult<T> = std::result::Result<T, CertifyError>;

pub const ISSUED_MESSAGE: &str = "certificate created";
pub const VALID_MESSAGE: &str = "valid";
pub const INVALID_MESSAGE: &str = "invalid";

pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/generateCertificate", post(generate_certificate))
        .route("/verifyCertificate", get(missing_certificate_id))
        .route("/verifyCertificate/{id}", get(verify_certificate))
        .route("/metrics", get(render_metrics))
        .layer(middleware::from_fn(metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn generate_certificate(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<IssueResponse>)> {
    // Clients post JSON under any content type, so the header is not checked.
    let request: IssueCertificate = serde_json::from_slice(&body)
        .map_err(|err| CertifyError::bad_request(format!("invalid request body: {}", err)))?;
    request.validate()?;

    let issued = issue::issue_certificate(&state, &request, Local::now())
        .await
        .inspect_err(|err| metrics::inc_issue_failure(err.stage()))?;

    Ok((
        StatusCode::CREATED,
        Json(IssueResponse {
            message: ISSUED_MESSAGE.to_string(),
            url: issued.url,
        }),
    ))
}

// Success is 201, not 200: existing clients check for it.
async fn verify_certificate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<VerifyResponse>)> {
    match state.records.find(&id).await? {
        Some(record) => Ok((
            StatusCode::CREATED,
            Json(VerifyResponse {
                message: VALID_MESSAGE.to_string(),
                name: Some(record.name),
                url: Some(state.locator.url(&record.id)),
            }),
        )),
        None => {
            info!(id = %id, "certificate not found");
            Ok((
                StatusCode::BAD_REQUEST,
                Json(VerifyResponse {
                    message: INVALID_MESSAGE.to_string(),
                    name: None,
                    url: None,
                }),
            ))
        }
    }
}

async fn missing_certificate_id() -> ApiResult<()> {
    Err(CertifyError::bad_request("certificate id is required"))
}

async fn render_metrics() -> Response {
    metrics::render_metrics()
}
