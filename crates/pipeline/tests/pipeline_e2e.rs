use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use chrono::{DateTime, TimeZone, Utc};
use pipeline::{Pipeline, QueueConfig, RetryPolicy, TranscribeQueue};
use plenum_broadcast::Hub;
use plenum_db::{ChunkStatus, Database, NewChunk, NewMeeting, NewSpeakerEvent, SegmentRow};
use plenum_relay::Relay;
use plenum_transcribe_groq::GroqClient;
use url::Url;
use uuid::Uuid;

const FIVE_WORDS: &str = r#"{
    "text": "Hello world how are you",
    "language": "en",
    "duration": 3.0,
    "words": [
        {"word": "Hello", "start": 0.0, "end": 0.5},
        {"word": "world", "start": 0.6, "end": 1.2},
        {"word": "how", "start": 2.0, "end": 2.3},
        {"word": "are", "start": 2.4, "end": 2.6},
        {"word": "you", "start": 2.7, "end": 3.0}
    ]
}"#;

#[derive(Clone)]
struct Upstream {
    calls: Arc<AtomicUsize>,
    fail_first: usize,
    fail_status: StatusCode,
}

impl Upstream {
    fn reliable() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail_first: 0,
            fail_status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn failing(times: usize, status: StatusCode) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail_first: times,
            fail_status: status,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn spawn_stt_upstream(upstream: Upstream) -> SocketAddr {
    let app = axum::Router::new().route(
        "/audio/transcriptions",
        post(move |_body: axum::body::Bytes| {
            let upstream = upstream.clone();
            async move {
                let n = upstream.calls.fetch_add(1, Ordering::SeqCst);
                if n < upstream.fail_first {
                    (upstream.fail_status, "synthetic failure").into_response()
                } else {
                    (StatusCode::OK, FIVE_WORDS).into_response()
                }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn spawn_relay_downstream() -> (SocketAddr, Arc<std::sync::Mutex<Vec<serde_json::Value>>>) {
    let captured: Arc<std::sync::Mutex<Vec<serde_json::Value>>> = Arc::default();
    let state = captured.clone();

    let app = axum::Router::new().route(
        "/automation",
        post(move |Json(body): Json<serde_json::Value>| {
            let state = state.clone();
            async move {
                state.lock().unwrap().push(body);
                StatusCode::OK
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

fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
}

struct Harness {
    pipeline: Arc<Pipeline>,
    queue: TranscribeQueue,
    meeting_id: Uuid,
    chunk_id: Uuid,
}

async fn harness(stt_addr: SocketAddr, relay: Relay, checkpoint_frequency: Option<i64>) -> Harness {
    let db = Database::memory().await.unwrap();
    let meeting_id = Uuid::new_v4();
    db.upsert_meeting(NewMeeting {
        id: meeting_id,
        title: Some("weekly sync".into()),
        host_email: None,
        checkpoint_enabled: checkpoint_frequency.is_some(),
        checkpoint_frequency: checkpoint_frequency.unwrap_or(5),
    })
    .await
    .unwrap();

    let chunk = db
        .insert_chunk(NewChunk {
            meeting_id,
            seq: 1,
            audio: vec![0u8; 64],
            audio_started_at: Some(anchor()),
            audio_ended_at: Some(anchor() + chrono::Duration::seconds(30)),
        })
        .await
        .unwrap();

    for (member, name, offset_ms) in [("a", "Alice", 0), ("b", "Bob", 2_000)] {
        db.insert_speaker_event(NewSpeakerEvent {
            meeting_id,
            member_id: Some(member.into()),
            member_name: Some(name.into()),
            started_at: anchor() + chrono::Duration::milliseconds(offset_ms),
        })
        .await
        .unwrap();
    }

    let stt = GroqClient::builder()
        .api_base(format!("http://{stt_addr}"))
        .api_key("sk-test")
        .build()
        .unwrap();

    let pipeline = Arc::new(Pipeline::new(
        db,
        stt,
        Arc::new(Hub::new()),
        Arc::new(relay),
    ));
    let queue = TranscribeQueue::spawn(
        pipeline.clone(),
        QueueConfig {
            workers: 1,
            depth: 8,
            retry: RetryPolicy {
                attempts: 3,
                min_delay: Duration::from_millis(50),
                max_delay: Duration::from_millis(200),
            },
        },
    );

    Harness {
        pipeline,
        queue,
        meeting_id,
        chunk_id: chunk.id,
    }
}

async fn wait_for_segments(harness: &Harness, deadline: Duration) -> Vec<SegmentRow> {
    let start = Instant::now();
    loop {
        let segments = harness
            .pipeline
            .db()
            .list_segments(harness.meeting_id)
            .await
            .unwrap();
        if !segments.is_empty() {
            return segments;
        }
        assert!(
            start.elapsed() < deadline,
            "no segments after {deadline:?}"
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

async fn wait_for_status(harness: &Harness, status: ChunkStatus, deadline: Duration) {
    let start = Instant::now();
    loop {
        let chunk = harness
            .pipeline
            .db()
            .get_chunk(harness.chunk_id)
            .await
            .unwrap()
            .unwrap();
        if chunk.status == status {
            return;
        }
        assert!(
            start.elapsed() < deadline,
            "chunk never reached {status:?}"
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

#[tokio::test]
async fn chunk_flows_from_upload_to_attributed_segments() {
    let upstream = Upstream::reliable();
    let stt_addr = spawn_stt_upstream(upstream.clone()).await;
    let h = harness(stt_addr, Relay::disabled(), None).await;

    h.queue.enqueue(h.chunk_id).await.unwrap();

    let segments = wait_for_segments(&h, Duration::from_secs(5)).await;
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].speaker_name, "Alice");
    assert_eq!(segments[0].text, "Hello world");
    assert_eq!(segments[1].speaker_name, "Bob");
    assert_eq!(segments[1].text, "how are you");

    wait_for_status(&h, ChunkStatus::Completed, Duration::from_secs(5)).await;
    let chunk = h
        .pipeline
        .db()
        .get_chunk(h.chunk_id)
        .await
        .unwrap()
        .unwrap();
    let payload = chunk.transcript.unwrap();
    assert!(payload.contains("\"words\""));
    assert_eq!(upstream.call_count(), 1);
}

#[tokio::test]
async fn transient_upstream_failures_are_retried() {
    let upstream = Upstream::failing(2, StatusCode::INTERNAL_SERVER_ERROR);
    let stt_addr = spawn_stt_upstream(upstream.clone()).await;
    let h = harness(stt_addr, Relay::disabled(), None).await;

    h.queue.enqueue(h.chunk_id).await.unwrap();

    wait_for_segments(&h, Duration::from_secs(10)).await;
    assert_eq!(upstream.call_count(), 3);
}

#[tokio::test]
async fn rejected_requests_fail_the_chunk_without_retry() {
    let upstream = Upstream::failing(usize::MAX, StatusCode::BAD_REQUEST);
    let stt_addr = spawn_stt_upstream(upstream.clone()).await;
    let h = harness(stt_addr, Relay::disabled(), None).await;

    h.queue.enqueue(h.chunk_id).await.unwrap();

    wait_for_status(&h, ChunkStatus::Failed, Duration::from_secs(5)).await;
    assert!(
        h.pipeline
            .db()
            .list_segments(h.meeting_id)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(upstream.call_count(), 1);
}

#[tokio::test]
async fn segments_and_checkpoint_reach_the_relay() {
    let upstream = Upstream::reliable();
    let stt_addr = spawn_stt_upstream(upstream).await;
    let (relay_addr, captured) = spawn_relay_downstream().await;
    let relay = Relay::new(
        Url::parse(&format!("http://{relay_addr}/automation")).unwrap(),
        "relay-token",
    )
    .unwrap();
    // Frequency 1 fires a checkpoint on every chunk.
    let h = harness(stt_addr, relay, Some(1)).await;

    h.queue.enqueue(h.chunk_id).await.unwrap();
    wait_for_segments(&h, Duration::from_secs(5)).await;

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if captured.lock().unwrap().len() >= 3 {
            break;
        }
        assert!(Instant::now() < deadline, "relay posts never arrived");
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    let bodies = captured.lock().unwrap();
    let transcriptions: Vec<String> = bodies
        .iter()
        .filter_map(|b| b["parameters"]["transcription"].as_str())
        .map(str::to_string)
        .collect();
    assert_eq!(
        transcriptions,
        ["Alice: Hello world", "Bob: how are you"]
    );
    let checkpoint = bodies
        .iter()
        .find(|b| b["parameters"]["sequence"].is_i64())
        .expect("checkpoint post missing");
    assert_eq!(checkpoint["parameters"]["sequence"], 1);
    assert_eq!(
        checkpoint["parameters"]["meeting_id"],
        h.meeting_id.to_string()
    );
}
