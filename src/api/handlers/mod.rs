pub mod health;
pub use self::health::health;

pub mod login;
pub use self::login::login;

pub mod root;
pub use self::root::root;

pub mod types;

pub mod verify_token;
pub use self::verify_token::verify_token;

use axum::{http::StatusCode, response::IntoResponse};

// Answers bare OPTIONS requests that carry no CORS preflight headers.
pub async fn preflight() -> impl IntoResponse {
    StatusCode::OK
}
