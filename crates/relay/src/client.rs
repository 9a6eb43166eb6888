use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use url::Url;
use uuid::Uuid;

use crate::error::Error;
use crate::types::SegmentBody;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fire-and-forget forwarder to the downstream automation endpoint.
///
/// Best-effort by contract: callers log failures and move on, the transcript
/// record never depends on this side channel. A relay built with
/// [`Relay::disabled`] accepts every call and does nothing, which keeps the
/// call sites free of `if let Some(relay)` noise.
pub struct Relay {
    inner: Option<Inner>,
}

struct Inner {
    http: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl Relay {
    pub fn new(endpoint: Url, token: impl Into<String>) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            inner: Some(Inner {
                http,
                endpoint,
                token: token.into(),
            }),
        })
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub async fn forward_segment(&self, segment: &SegmentBody) -> Result<(), Error> {
        let body = json!({
            "parameters": {
                "start_time": segment.start_time.to_rfc3339(),
                "end_time": segment.end_time.to_rfc3339(),
                "transcription": segment.transcription_line(),
            }
        });
        self.post(body).await
    }

    pub async fn trigger_checkpoint(&self, meeting_id: Uuid, seq: i64) -> Result<(), Error> {
        let body = json!({
            "parameters": {
                "meeting_id": meeting_id.to_string(),
                "sequence": seq,
                "triggered_at": Utc::now().to_rfc3339(),
            }
        });
        self.post(body).await
    }

    async fn post(&self, body: serde_json::Value) -> Result<(), Error> {
        let Some(inner) = &self.inner else {
            return Ok(());
        };

        let response = inner
            .http
            .post(inner.endpoint.clone())
            .bearer_auth(&inner.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { status });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use chrono::TimeZone;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured {
        bodies: Arc<Mutex<Vec<serde_json::Value>>>,
        bearer: Arc<Mutex<Option<String>>>,
    }

    async fn spawn_downstream(status: axum::http::StatusCode) -> (SocketAddr, Captured) {
        let captured = Captured::default();
        let state = captured.clone();

        let app = axum::Router::new().route(
            "/automation",
            post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
                let state = state.clone();
                async move {
                    if let Some(auth) = headers.get("authorization") {
                        let auth = auth.to_str().unwrap_or_default().to_string();
                        *state.bearer.lock().unwrap() = Some(auth);
                    }
                    state.bodies.lock().unwrap().push(body);
                    status
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (addr, captured)
    }

    fn segment() -> SegmentBody {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        SegmentBody {
            speaker_name: "Alice".into(),
            text: "hello there".into(),
            start_time: start,
            end_time: start + chrono::Duration::seconds(2),
        }
    }

    fn relay_for(addr: SocketAddr) -> Relay {
        let endpoint = Url::parse(&format!("http://{addr}/automation")).unwrap();
        Relay::new(endpoint, "relay-token").unwrap()
    }

    #[tokio::test]
    async fn forwards_segments_in_the_automation_shape() {
        let (addr, captured) = spawn_downstream(axum::http::StatusCode::OK).await;
        let relay = relay_for(addr);

        relay.forward_segment(&segment()).await.unwrap();

        let bodies = captured.bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        let params = &bodies[0]["parameters"];
        assert_eq!(params["transcription"], "Alice: hello there");
        assert_eq!(params["start_time"], "2025-06-01T10:00:00+00:00");
        assert_eq!(
            captured.bearer.lock().unwrap().as_deref(),
            Some("Bearer relay-token")
        );
    }

    #[tokio::test]
    async fn checkpoint_posts_meeting_and_sequence() {
        let (addr, captured) = spawn_downstream(axum::http::StatusCode::OK).await;
        let relay = relay_for(addr);
        let meeting_id = Uuid::new_v4();

        relay.trigger_checkpoint(meeting_id, 15).await.unwrap();

        let bodies = captured.bodies.lock().unwrap();
        let params = &bodies[0]["parameters"];
        assert_eq!(params["meeting_id"], meeting_id.to_string());
        assert_eq!(params["sequence"], 15);
    }

    #[tokio::test]
    async fn non_success_status_surfaces_as_error() {
        let (addr, _captured) = spawn_downstream(axum::http::StatusCode::BAD_GATEWAY).await;
        let relay = relay_for(addr);

        let err = relay.forward_segment(&segment()).await.unwrap_err();

        match err {
            Error::Status { status } => assert_eq!(status, reqwest::StatusCode::BAD_GATEWAY),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn disabled_relay_accepts_everything() {
        let relay = Relay::disabled();

        assert!(!relay.is_enabled());
        relay.forward_segment(&segment()).await.unwrap();
        relay.trigger_checkpoint(Uuid::new_v4(), 1).await.unwrap();
    }
}
