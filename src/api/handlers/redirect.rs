//! Handler for tracked email click redirects.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use tracing::warn;

use crate::api::middleware::message_context::MessageContext;
use crate::application::services::ClickRequest;
use crate::domain::entities::{ContactIdentifier, QueryParams};
use crate::state::AppState;
use crate::utils::request_context::request_context;

/// Query parameter carrying the contact identifier.
pub const CONTACT_ID_PARAM: &str = "ec_contact_id";
/// Query parameter carrying the contact identifier source.
pub const CONTACT_SOURCE_PARAM: &str = "ec_contact_source";

/// Redirects a tracked email click to its destination.
///
/// # Endpoint
///
/// `GET /redirect?ec_url=...&ec_message_id=...`
///
/// # Request Flow
///
/// 1. Build the request context (client IP, User-Agent, headers)
/// 2. Take the [`MessageContext`] attached by the message-context middleware
/// 3. Parse the contact identity from the query string
/// 4. Resolve the analytics tracker for the request
/// 5. Hand everything to [`crate::application::services::RedirectService`]
/// 6. Return 301 Moved Permanently
///
/// # Responses
///
/// Always `301` with a `Location` header while the endpoint is enabled: the
/// resolved URL, the original `ec_url`, or the configured not-found URL.
/// Returns `404 Not Found` with an empty body when the endpoint is disabled.
pub async fn redirect_handler(State(state): State<AppState>, request: Request) -> Response {
    if !state.settings.enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    let (parts, _body) = request.into_parts();

    let query = QueryParams::parse(parts.uri.query());
    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let context = request_context(&parts.headers, peer, state.settings.behind_proxy);
    let message = parts
        .extensions
        .get::<MessageContext>()
        .map(|c| c.message.clone());
    let contact = ContactIdentifier::from_link(
        query.get(CONTACT_ID_PARAM),
        query.get(CONTACT_SOURCE_PARAM),
    );
    let tracker = state.tracker_provider.current(&context);

    let decision = state
        .redirect_service
        .handle(ClickRequest {
            query: &query,
            message: message.as_ref(),
            contact: contact.as_ref(),
            request: &context,
            tracker: tracker.as_deref(),
            site_name: &state.settings.site_name,
        })
        .await;

    moved_permanently(
        &decision.location,
        state.redirect_service.item_not_found_url(),
    )
}

/// Builds a `301 Moved Permanently` response.
///
/// Falls back to `fallback` when `location` contains bytes not allowed in a
/// header value.
pub fn moved_permanently(location: &str, fallback: &str) -> Response {
    let value = HeaderValue::from_bytes(location.as_bytes())
        .or_else(|_| {
            warn!("Redirect target is not a valid header value, using not-found URL");
            HeaderValue::from_bytes(fallback.as_bytes())
        })
        .unwrap_or_else(|_| HeaderValue::from_static("/"));

    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, value)]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moved_permanently_sets_location() {
        let response = moved_permanently("https://example.com/page", "/not-found");

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_moved_permanently_keeps_non_ascii() {
        let response = moved_permanently("https://example.com/æble", "/not-found");

        assert_eq!(
            response.headers().get(header::LOCATION).unwrap().as_bytes(),
            "https://example.com/æble".as_bytes()
        );
    }

    #[test]
    fn test_moved_permanently_rejects_control_characters() {
        let response = moved_permanently("https://example.com/\r\nSet-Cookie: x=1", "/not-found");

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/not-found"
        );
    }
}
