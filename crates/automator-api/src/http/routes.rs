//! Router construction.

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use uuid::Uuid;

use super::handlers;
use crate::error::ApiError;
use crate::state::ApiState;

/// Build the control API router.
///
/// Requests without an `Origin` header (CLI, scripts) are served. Browser
/// requests are served only from the state's allowed origins, which also
/// receive CORS headers.
pub fn create_router(state: ApiState) -> Router {
    let job_routes = Router::new()
        .route("/{kind}", get(handlers::get_state))
        .route("/{kind}/start", post(handlers::start_job))
        .route("/{kind}/pause", post(handlers::pause_job))
        .route("/{kind}/resume", post(handlers::resume_job))
        .route("/{kind}/stop", post(handlers::stop_job))
        .route(
            "/{kind}/artifacts",
            get(handlers::list_artifacts).delete(handlers::clear_artifacts),
        )
        .route("/{kind}/export", post(handlers::export_artifacts))
        .route("/{kind}/settings", put(handlers::update_settings));

    let tab_routes = Router::new().route("/{tab}/inspect", get(handlers::inspect_tab));

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .nest("/jobs", job_routes)
        .nest("/tabs", tab_routes);

    if let Some(cors) = cors_layer(state.allowed_origins()) {
        router = router.layer(cors);
    }

    router
        .layer(middleware::from_fn_with_state(state.clone(), guard_origin))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}

/// Refuse browser requests from origins outside the allow-list.
async fn guard_origin(State(state): State<ApiState>, request: Request, next: Next) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        let origin = origin.to_str().unwrap_or_default().to_string();
        if !state.allows_origin(&origin) {
            warn!("Refused request from origin {:?}", origin);
            return ApiError::ForbiddenOrigin(origin).into_response();
        }
    }
    next.run(request).await
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o.trim_end_matches('/')).ok())
        .collect();
    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
