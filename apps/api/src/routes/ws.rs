use axum::{
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use plenum_broadcast::Hub;

use crate::state::AppState;

pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| async move {
        serve_notices(socket, hub, id).await;
    })
}

/// Streams every notice for one meeting until the client goes away. Inbound
/// frames are ignored except for close; the socket is write-only by contract.
async fn serve_notices(socket: WebSocket, hub: Arc<Hub>, meeting_id: Uuid) {
    let (mut sender, mut receiver) = socket.split();
    let mut notices = hub.subscribe(meeting_id);

    tracing::debug!(meeting_id = %meeting_id, "ws_subscriber_connected");

    loop {
        tokio::select! {
            notice = notices.recv() => match notice {
                Ok(notice) => {
                    let payload = match serde_json::to_string(&notice) {
                        Ok(p) => p,
                        Err(e) => {
                            tracing::warn!(error = %e, "notice_serialize_failed");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                // A slow reader dropped frames; the transcript endpoint is
                // still authoritative, so keep streaming.
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(meeting_id = %meeting_id, missed, "ws_subscriber_lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!(meeting_id = %meeting_id, "ws_subscriber_disconnected");
}
