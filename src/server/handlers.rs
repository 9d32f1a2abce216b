//! HTTP route handlers

use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;
use tracing::{debug, error, warn};

use crate::core::messaging::PubSubPushDecoder;
use crate::server::state::AppState;
use crate::utils::error::{DisperserError, ErrorResponse, Result};

/// Header carrying the ingest key for direct submissions
pub const API_KEY_HEADER: &str = "x-api-key";

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/pubsub/push", web::post().to(pubsub_push))
        .route("/v1/batches", web::post().to(submit_batch));
}

/// Health check endpoint handler
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Pub/Sub push delivery
///
/// The status code is the ack: any 2xx acknowledges, anything else makes Pub/Sub redeliver
/// the whole message. Only a failed batch is worth redelivering.
pub async fn pubsub_push(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let outcome = match state.disperser.handle(&PubSubPushDecoder, &body).await {
        Ok(report) => report.into_result(),
        Err(err) => Err(err),
    };

    match outcome {
        Ok(summary) => {
            debug!(correlation_id = %summary.correlation_id, "Acknowledging message");
            HttpResponse::NoContent().finish()
        }
        Err(err) if err.is_redeliverable() => {
            error!(error = %err, "Requesting redelivery");
            HttpResponse::InternalServerError().json(ErrorResponse::from(&err))
        }
        Err(err) => {
            warn!(error = %err, "Dropping undeliverable message");
            HttpResponse::NoContent().finish()
        }
    }
}

/// Direct batch submission
pub async fn submit_batch(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    authorize(&state, &req)?;

    let batch = state.disperser.prepare(&body)?;
    let report = state.disperser.dispatch(batch).await;
    let outcome = report.outcome();

    if report.is_success() {
        Ok(HttpResponse::Ok().json(outcome))
    } else {
        Ok(HttpResponse::BadGateway().json(outcome))
    }
}

fn authorize(state: &AppState, req: &HttpRequest) -> Result<()> {
    let Some(expected) = state.config.server().ingest_api_key.as_deref() else {
        return Ok(());
    };

    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if constant_time_eq(key.as_bytes(), expected.as_bytes()) => Ok(()),
        Some(_) => Err(DisperserError::unauthorized("invalid API key")),
        None => Err(DisperserError::unauthorized(format!(
            "missing {} header",
            API_KEY_HEADER
        ))),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
