use super::types::{
    INVALID_CREDENTIALS, LoginRequest, LoginResponse, MISSING_CREDENTIALS, SERVER_ERROR,
};
use crate::auth::{AuthError, AuthState};
use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Username or password missing", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = LoginResponse),
        (status = 500, description = "Server error", body = LoginResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state, payload))]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Unreadable login payload: {rejection}");
            return failure(StatusCode::BAD_REQUEST, MISSING_CREDENTIALS);
        }
    };

    let (Some(identity), Some(password)) = (request.identity, request.password) else {
        return failure(StatusCode::BAD_REQUEST, MISSING_CREDENTIALS);
    };

    match auth_state
        .issuer()
        .issue(&identity, &SecretString::from(password))
        .await
    {
        Ok(issued) => {
            info!("Login successful");

            (StatusCode::OK, Json(LoginResponse::success(issued.token)))
        }
        Err(AuthError::MissingField) => failure(StatusCode::BAD_REQUEST, MISSING_CREDENTIALS),
        Err(AuthError::InvalidCredentials) => {
            info!("Login rejected");

            failure(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS)
        }
        Err(AuthError::ServerError) => failure(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR),
    }
}

fn failure(status: StatusCode, error: &str) -> (StatusCode, Json<LoginResponse>) {
    (status, Json(LoginResponse::failure(error)))
}
