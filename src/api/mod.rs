use crate::auth::AuthState;
use anyhow::{Context, Result, anyhow};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Method, Request, header::CONTENT_TYPE},
    routing::{get, options, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use url::Url;
use utoipa_axum::router::OpenApiRouter;

pub(crate) mod handlers;
mod openapi;

pub use handlers::types;
pub use openapi::openapi;

/// Prefix the site's page scripts already post to.
pub const LEGACY_PREFIX: &str = "/.netlify/functions";

#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// Build the full application: documented routes, legacy aliases, CORS, request
/// ids and tracing.
///
/// # Errors
/// Returns an error if `allowed_origin` is neither `*` nor a valid URL origin.
pub fn app(auth_state: Arc<AuthState>, allowed_origin: &str) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(allow_origin(allowed_origin)?);

    let (router, _openapi) = router().split_for_parts();
    let app = router
        .route("/", get(handlers::root))
        .route("/health", options(handlers::health))
        .route("/login", options(handlers::preflight))
        .route("/verify-token", options(handlers::preflight))
        .route(
            &format!("{LEGACY_PREFIX}/login"),
            post(handlers::login).options(handlers::preflight),
        )
        .route(
            &format!("{LEGACY_PREFIX}/verify-token"),
            post(handlers::verify_token).options(handlers::preflight),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(auth_state)),
        );

    Ok(app)
}

/// Start the server on `port` and run until Ctrl-C.
/// # Errors
/// Return error if failed to bind or serve
pub async fn new(port: u16, auth_state: Arc<AuthState>, allowed_origin: &str) -> Result<()> {
    let app = app(auth_state, allowed_origin)?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    serve(listener, app).await
}

/// Serve `app` on an already bound listener until Ctrl-C.
/// # Errors
/// Return error if the server fails
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn allow_origin(allowed_origin: &str) -> Result<AllowOrigin> {
    let allowed_origin = allowed_origin.trim();
    if allowed_origin == "*" {
        return Ok(AllowOrigin::any());
    }

    let parsed = Url::parse(allowed_origin)
        .with_context(|| format!("Invalid allowed origin: {allowed_origin}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("Allowed origin must include a valid host: {allowed_origin}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    let origin = HeaderValue::from_str(&origin).context("Failed to build origin header")?;

    Ok(AllowOrigin::exact(origin))
}

#[cfg(test)]
mod tests;
