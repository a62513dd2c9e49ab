//! Server-sent transfer events

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::{Stream, StreamExt};
use transfer::TransferEvent;

use crate::dto::{state_failure, ApiFailure};
use crate::AppState;

/// Create event routes
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(stream_events))
}

/// GET /events - Submitted, confirmed, timed-out and state-change signals
/// for the open session.
///
/// A client that falls behind receives a `lagged` event carrying the number
/// of skipped events and should re-read `GET /transfers/{lane}`.
pub async fn stream_events(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiFailure> {
    let coordinator = state.coordinator().await.map_err(state_failure)?;

    let events = BroadcastStream::new(coordinator.subscribe())
        .filter_map(|item| match item {
            Ok(event) => encode(&event),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event subscriber lagged");
                Some(Event::default().event("lagged").data(skipped.to_string()))
            }
        })
        .map(Ok::<_, Infallible>);

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn encode(event: &TransferEvent) -> Option<Event> {
    match Event::default().event(event.kind()).json_data(event) {
        Ok(sse) => Some(sse),
        Err(e) => {
            tracing::warn!(error = %e, kind = event.kind(), "Failed to encode transfer event");
            None
        }
    }
}
