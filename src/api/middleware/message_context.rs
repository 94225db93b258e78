//! Resolves the tracked message a click belongs to.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};
use uuid::Uuid;

use crate::domain::entities::{QueryParams, TrackedMessage};
use crate::state::AppState;

/// Query parameter carrying the message identifier.
pub const MESSAGE_ID_PARAM: &str = "ec_message_id";
/// Query parameter carrying the A/B test variant index.
pub const TEST_VALUE_PARAM: &str = "ec_test";
/// Query parameter carrying the contact-history-entry identifier.
pub const HISTORY_ENTRY_PARAM: &str = "ec_eah";

/// Message attached to the request by [`layer`].
#[derive(Debug, Clone)]
pub struct MessageContext {
    pub message: TrackedMessage,
}

/// Looks up the message named in the query string and attaches a
/// [`MessageContext`] to the request extensions.
///
/// Never rejects a request: a missing or malformed id, an unknown message or
/// a repository error leave the context absent, and the handler turns that
/// into a failure redirect.
///
/// # Example
///
/// ```rust,ignore
/// let tracking = Router::new()
///     .route("/redirect", get(redirect_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), message_context::layer));
/// ```
pub async fn layer(State(st): State<AppState>, mut req: Request, next: Next) -> Response {
    let query = QueryParams::parse(req.uri().query());

    if let Some(context) = resolve(&st, &query).await {
        req.extensions_mut().insert(context);
    }

    next.run(req).await
}

async fn resolve(st: &AppState, query: &QueryParams) -> Option<MessageContext> {
    let raw_id = query.get_non_empty(MESSAGE_ID_PARAM)?;

    let Ok(message_id) = Uuid::parse_str(raw_id) else {
        debug!("Malformed {} '{}'", MESSAGE_ID_PARAM, raw_id);
        return None;
    };

    let item = match st.message_repository.find_by_id(message_id).await {
        Ok(Some(item)) => item,
        Ok(None) => {
            debug!("Message {} not found", message_id);
            return None;
        }
        Err(e) => {
            error!("Failed to load message {}: {}", message_id, e);
            return None;
        }
    };

    let test_value_index = query
        .get_non_empty(TEST_VALUE_PARAM)
        .and_then(|v| v.parse::<i32>().ok());

    let history_entry_id = query
        .get_non_empty(HISTORY_ENTRY_PARAM)
        .and_then(|v| Uuid::parse_str(v).ok());

    Some(MessageContext {
        message: TrackedMessage::from_item(&item, test_value_index, history_entry_id),
    })
}
