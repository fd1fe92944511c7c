use super::handlers::{health, login, verify_token};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Router for the documented endpoints.
///
/// Aliases under `/.netlify/functions/` and bare `OPTIONS` answers are added in
/// `api::app` and stay out of the document.
pub(crate) fn api_router() -> OpenApiRouter {
    let mut router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(login::login))
        .routes(routes!(verify_token::verify_token));

    let mut health_tag = Tag::new("health");
    health_tag.description = Some("Service liveness".to_string());

    let mut auth_tag = Tag::new("auth");
    auth_tag.description = Some("Login and token verification".to_string());

    router.get_openapi_mut().tags = Some(vec![health_tag, auth_tag]);

    router
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact(env!("CARGO_PKG_AUTHORS"));
    info.license = Some(License::new(env!("CARGO_PKG_LICENSE")));

    OpenApiBuilder::new().info(info).build()
}

// Cargo authors are `:` separated and may include "Name <email>".
fn cargo_contact(authors: &str) -> Option<Contact> {
    let primary = authors.split(':').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let mut contact = Contact::new();
    if let Some((name, email)) = primary.split_once('<') {
        contact.name = Some(name.trim().to_string()).filter(|s| !s.is_empty());
        contact.email = Some(email.trim_end_matches('>').trim().to_string());
    } else {
        contact.name = Some(primary.to_string());
    }
    Some(contact)
}
