use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{health, photos},
    infra::app_state::AppState,
};

/// Page and form routes. Unrouted paths fall through to the public dir.
pub fn create_router(state: AppState) -> Router {
    let config = state.config_handle();

    Router::new()
        .route("/", get(photos::list_photos))
        .route(
            "/upload",
            get(photos::upload_form).post(photos::upload_photo),
        )
        .route("/delete/{filename}", post(photos::delete_photo))
        .route("/ping", get(health::ping_handler))
        .route("/health", get(health::health_handler))
        .nest_service("/uploads", ServeDir::new(&config.storage.upload_dir))
        .fallback_service(ServeDir::new(&config.storage.public_dir))
        .layer(DefaultBodyLimit::max(config.upload.max_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
