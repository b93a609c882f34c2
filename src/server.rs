use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderName, HeaderValue, Method, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::bookmarks;
use crate::config::Cors;
use crate::error::{ApiError, ErrorReport};
use crate::handler::{AppState, healthcheck};

const INTERNAL_SERVER_ERROR_MESSAGE: &str = "internal server error";

/// Hardening headers sent on every response, rejections included.
fn security_headers() -> [(HeaderName, &'static str); 6] {
    [
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
        (header::REFERRER_POLICY, "no-referrer"),
        (header::X_DNS_PREFETCH_CONTROL, "off"),
        (header::STRICT_TRANSPORT_SECURITY, "max-age=15552000; includeSubDomains"),
        (header::CONTENT_SECURITY_POLICY, "default-src 'none'; frame-ancestors 'none'"),
    ]
}

/// Layer order, outermost first: CORS, security headers, tracing, error
/// normalization, auth. Preflight requests are answered by the CORS layer and
/// never reach auth.
pub fn build_router(state: AppState, cors: &Cors) -> Router {
    let router: Router<AppState> = Router::new()
        .route("/", get(healthcheck))
        .nest("/bookmarks", bookmarks::routes())
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(middleware::from_fn_with_state(state.clone(), normalize_errors))
        .layer(TraceLayer::new_for_http());

    security_headers()
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value)))
        })
        .layer(cors_layer(cors))
        .with_state(state)
}

/// Browsers only get CORS headers for whitelisted origins. Requests without
/// an `Origin` header are unaffected.
pub fn cors_layer(cors: &Cors) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "ignoring invalid cors origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::LOCATION])
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

pub async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let authorized = bearer_token(&req).is_some_and(|key| key == state.settings.api_key);

    if !authorized {
        tracing::warn!(method = %req.method(), path = %req.uri().path(), "unauthorized request");
        return ApiError::Unauthorized.into_response();
    }

    next.run(req).await
}

/// Single exit point for failed requests: logs outside production and never
/// lets a 5xx message reach a production client.
pub async fn normalize_errors(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let response = next.run(req).await;

    let Some(report) = response.extensions().get::<ErrorReport>().cloned() else {
        return response;
    };
    let status = response.status();

    if !state.settings.environment.is_production() {
        tracing::error!(%method, %path, status = status.as_u16(), message = %report.message, "request failed");
        return response;
    }

    if status.is_server_error() {
        tracing::error!(%method, %path, status = status.as_u16(), message = %report.message, "request failed");
        return (status, Json(json!({ "message": INTERNAL_SERVER_ERROR_MESSAGE }))).into_response();
    }

    response
}
