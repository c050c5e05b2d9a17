use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};
use tracing::debug;

use crate::infra::app_state::AppState;

pub async fn ping_handler() -> Json<Value> {
    debug!("Ping endpoint called");
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<Value>) {
    let storage = &state.config().storage;
    let upload_dir_ok = tokio::fs::metadata(&storage.upload_dir)
        .await
        .is_ok_and(|meta| meta.is_dir());
    let data_file_ok = tokio::fs::metadata(&storage.data_file)
        .await
        .is_ok_and(|meta| meta.is_file());
    let healthy = upload_dir_ok && data_file_ok;

    let body = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "photos": state.photos().metadata().len().await,
        "checks": {
            "upload_dir": upload_dir_ok,
            "data_file": data_file_ok,
        }
    });

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}
