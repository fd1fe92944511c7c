use super::types::{MISSING_TOKEN, VerifyTokenRequest, VerifyTokenResponse};
use crate::auth::{AuthState, Verification};
use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Validation failures are reported in the body with `200`, not as HTTP errors.
#[utoipa::path(
    post,
    path = "/verify-token",
    request_body = VerifyTokenRequest,
    responses(
        (status = 200, description = "Verification result", body = VerifyTokenResponse),
        (status = 400, description = "Token missing", body = VerifyTokenResponse),
        (status = 500, description = "Server error", body = VerifyTokenResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state, payload))]
pub async fn verify_token(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<VerifyTokenRequest>, JsonRejection>,
) -> impl IntoResponse {
    let token = match payload {
        Ok(Json(VerifyTokenRequest { token: Some(token) })) if !token.is_empty() => token,
        Ok(_) => return missing_token(),
        Err(rejection) => {
            debug!("Unreadable verify-token payload: {rejection}");
            return missing_token();
        }
    };

    let response = match auth_state.verifier().verify(&token) {
        Verification::Valid(claim) => VerifyTokenResponse::valid(claim),
        Verification::Invalid(reason) => VerifyTokenResponse::rejected(reason),
    };

    (StatusCode::OK, Json(response))
}

fn missing_token() -> (StatusCode, Json<VerifyTokenResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(VerifyTokenResponse::failure(MISSING_TOKEN)),
    )
}
