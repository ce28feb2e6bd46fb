//! Live suggestions over a WebSocket.
//!
//! Every text frame from the client is one keystroke's worth of query text.
//! The server answers with the debounced suggestion state as JSON whenever
//! it changes.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use tracing::{debug, warn};

use super::AppState;
use crate::Result;
use crate::suggest::LocationSuggester;

pub(super) async fn suggestions_ws(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Result<Response> {
    let geocoder = state.geocoder()?;
    let suggester = LocationSuggester::new(geocoder, &state.config.suggestions);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, suggester)))
}

async fn handle_socket<G>(mut socket: WebSocket, suggester: LocationSuggester<G>)
where
    G: crate::provider::Geocoder + 'static,
{
    let mut updates = suggester.subscribe();
    debug!("Suggestion socket opened");

    loop {
        tokio::select! {
            message = socket.recv() => {
                match message {
                    Some(Ok(Message::Text(query))) => {
                        suggester.input(query.as_str());
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("Suggestion socket error: {}", e);
                        break;
                    }
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let payload = match serde_json::to_string(&*updates.borrow_and_update()) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!("Failed to encode suggestions: {}", e);
                        continue;
                    }
                };
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    // Dropping the suggester cancels any pending lookup timer
    drop(suggester);
    debug!("Suggestion socket closed");
}
