//! WebSocket ingestion endpoint.
//!
//! Each upgraded connection gets its own task that reads frames in arrival
//! order, decodes them into [`Entry`] values, and installs them in the
//! [`RelayStore`]. Nothing is ever written back except a close frame when
//! a frame cannot be decoded.
//!
//! | Mode     | Text / binary frame                              |
//! |----------|--------------------------------------------------|
//! | `single` | raw payload for [`FIXED_IDENTIFIER`]             |
//! | `multi`  | JSON [`FeedFrame`] `{identifier, message}`       |
//!
//! Ping and pong frames are skipped. A close frame, a read error, or a
//! decode failure ends the connection; nothing is retried.

use axum::extract::ws::{close_code, CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::StreamExt;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::mode::{TenancyMode, FIXED_IDENTIFIER};
use crate::models::feed::{Entry, FeedFrame};
use crate::server::AppState;
use crate::store::RelayStore;
use crate::{AppError, Result};

/// Handler for `GET /oasis` — upgrades to a WebSocket and starts the read loop.
///
/// Requests without valid upgrade headers are rejected by the extractor
/// before this runs.
pub async fn ingest(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let mode = state.config.mode;
    ws.on_failed_upgrade(|err| debug!(%err, "ingest: websocket upgrade failed"))
        .on_upgrade(move |socket| handle_socket(socket, state.store, mode))
}

/// Decode one inbound frame for `mode`.
///
/// # Return value
///
/// - `Ok(Some(entry))` — a payload to store.
/// - `Ok(None)` — a control frame, or a multi-tenant record with an empty
///   identifier; nothing to store.
/// - `Err(AppError::Decode(...))` — the frame is unusable and the connection
///   must be closed.
///
/// Close frames are handled by the read loop and also yield `Ok(None)` here.
///
/// # Errors
///
/// - [`AppError::Decode`] when a binary frame is not UTF-8, or when a
///   multi-tenant frame is not a valid [`FeedFrame`].
pub fn decode_frame(mode: TenancyMode, frame: &Message) -> Result<Option<Entry>> {
    let text = match frame {
        Message::Text(text) => text.as_str().to_owned(),
        Message::Binary(bytes) => std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|err| AppError::Decode(format!("binary frame is not utf-8: {err}")))?,
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) => return Ok(None),
    };

    match mode {
        TenancyMode::Single => Ok(Some(Entry::new(FIXED_IDENTIFIER, text))),
        TenancyMode::Multi => {
            let frame = FeedFrame::from_json(&text)?;
            if frame.identifier.is_empty() {
                debug!("ingest: skipping frame with empty identifier");
                return Ok(None);
            }
            Ok(Some(frame.into()))
        }
    }
}

/// Read loop for one upgraded connection.
///
/// Owns `socket` for its whole lifetime; the connection is released when
/// this returns, whichever way the loop ended.
pub async fn handle_socket(mut socket: WebSocket, store: RelayStore, mode: TenancyMode) {
    let conn_id = Uuid::new_v4();
    let span = info_span!("ingest", %conn_id, ?mode);

    async move {
        debug!("ingest: connection open");
        let mut stored = 0_u64;

        while let Some(item) = socket.next().await {
            let frame = match item {
                Ok(Message::Close(_)) => {
                    debug!("ingest: peer closed connection");
                    break;
                }
                Ok(frame) => frame,
                Err(err) => {
                    debug!(%err, "ingest: read failed, dropping connection");
                    break;
                }
            };

            match decode_frame(mode, &frame) {
                Ok(Some(entry)) => {
                    debug!(identifier = %entry.identifier, "ingest: storing payload");
                    store.put(entry.identifier, entry.payload);
                    stored += 1;
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(%err, "ingest: undecodable frame, closing connection");
                    close_invalid(&mut socket).await;
                    break;
                }
            }
        }

        debug!(stored, "ingest: connection closed");
    }
    .instrument(span)
    .await;
}

/// Best-effort close with code 1007 (invalid frame payload data).
async fn close_invalid(socket: &mut WebSocket) {
    let frame = CloseFrame {
        code: close_code::INVALID,
        reason: Utf8Bytes::from_static("malformed feed frame"),
    };
    if let Err(err) = socket.send(Message::Close(Some(frame))).await {
        debug!(%err, "ingest: close frame not delivered");
    }
}
