//! HTTP polling endpoint.
//!
//! `GET /feed?identifier=<id>` drains the pending payload for `<id>` and
//! returns it as the body. Every outcome is `200 OK`: a missing parameter,
//! an unknown identifier, and an identifier with nothing pending all yield
//! an empty body. The call never waits for a payload to arrive.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};

use crate::mode::{TenancyMode, FIXED_IDENTIFIER};
use crate::server::AppState;
use crate::store::RelayStore;

/// Query parameter naming the mailbox to drain.
pub const IDENTIFIER_PARAM: &str = "identifier";

/// Legacy spelling of [`IDENTIFIER_PARAM`] still sent by older dashboards.
pub const LEGACY_IDENTIFIER_PARAM: &str = "oasis_id";

/// Handler for `GET /feed`.
///
/// Query decoding failures are treated like an absent identifier so the
/// status stays `200 OK`.
pub async fn feed(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> String {
    let pairs = query.map(|Query(pairs)| pairs).unwrap_or_default();
    let identifier = match state.config.mode {
        TenancyMode::Single => Some(FIXED_IDENTIFIER),
        TenancyMode::Multi => extract_identifier(&pairs),
    };
    take_feed(&state.store, identifier).unwrap_or_default()
}

/// Find the first non-empty identifier among decoded query pairs.
///
/// Both [`IDENTIFIER_PARAM`] and [`LEGACY_IDENTIFIER_PARAM`] are accepted;
/// whichever appears first wins.
#[must_use]
pub fn extract_identifier(pairs: &[(String, String)]) -> Option<&str> {
    pairs
        .iter()
        .find(|(key, _)| key == IDENTIFIER_PARAM || key == LEGACY_IDENTIFIER_PARAM)
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.is_empty())
}

/// Drain the payload for `identifier`, skipping the store entirely when no
/// identifier was supplied.
#[must_use]
pub fn take_feed(store: &RelayStore, identifier: Option<&str>) -> Option<String> {
    let identifier = identifier?;
    let payload = store.take_and_clear(identifier);
    if payload.is_some() {
        tracing::debug!(identifier, "feed: delivered pending payload");
    }
    payload
}
