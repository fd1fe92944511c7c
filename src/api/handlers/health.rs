use crate::GIT_COMMIT_HASH;
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

const X_APP: HeaderName = HeaderName::from_static("x-app");

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
}

impl Health {
    fn current() -> Self {
        Self {
            commit: GIT_COMMIT_HASH.to_string(),
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// `name:version:short-commit`, the commit left empty outside a git checkout.
    fn x_app(&self) -> Option<HeaderValue> {
        let short_hash = self.commit.get(..7).filter(|_| self.commit != "unknown").unwrap_or("");
        HeaderValue::from_str(&format!("{}:{}:{short_hash}", self.name, self.version))
            .map_err(|err| warn!("Failed to build X-App header: {err}"))
            .ok()
    }
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Service is up", body = Health),
    ),
    tag= "health"
)]
// No dependencies to probe: answering at all means healthy.
pub async fn health(method: Method) -> Response {
    let health = Health::current();
    let x_app = health.x_app();

    let mut response = if method == Method::GET {
        Json(&health).into_response()
    } else {
        (StatusCode::OK, Body::empty()).into_response()
    };

    if let Some(value) = x_app {
        response.headers_mut().insert(X_APP, value);
    }

    response
}
