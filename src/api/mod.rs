use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request},
    handler::HandlerWithoutStateExt,
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};

use crate::errors::AppError;
use crate::AppState;

pub mod handlers;

/// Build the public router: token routes, a health probe, and static
/// file hosting of the storage root for everything else.
pub fn router(state: Arc<AppState>) -> Router {
    let static_files =
        ServeDir::new(state.images.root()).not_found_service(fallback_404.into_service());

    // Uploads are unbounded unless a cap is configured.
    let body_limit = match state.config.max_upload_bytes {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };

    let app = Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/", post(handlers::register_token))
        .route("/:id", get(handlers::get_token))
        .fallback_service(static_files)
        .with_state(state)
        .layer(body_limit);

    with_middleware(app)
}

/// Request logging, panic recovery and request ids, outermost last.
pub fn with_middleware(app: Router) -> Router {
    app.layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

async fn fallback_404() -> AppError {
    AppError::NotFound("not found".into())
}

/// Turn a handler panic into a generic 500 so the server keeps running.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let panic_message = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic_message = %panic_message, "handler panicked");

    let body = Json(json!({
        "error": {
            "message": "internal server error",
            "type": "internal_error",
            "code": "internal_server_error",
        }
    }));
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}

/// Middleware: injects a unique X-Request-Id into every response.
async fn request_id_middleware(req: Request, next: Next) -> Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    tracing::debug!(
        request_id = %req_id,
        method = %req.method(),
        uri = %req.uri(),
        "incoming request"
    );

    let mut resp = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}
