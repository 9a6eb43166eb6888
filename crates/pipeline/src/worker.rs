//! Transcription worker queue.
//!
//! A bounded mpsc channel feeds a small pool of workers; each job takes one
//! chunk through transcribe → store → align. Jobs are independent — one
//! failing chunk is marked `failed` and the queue moves on. Provider calls
//! retry with exponential backoff, but only for errors the provider can
//! recover from (throttling, 5xx, transport); a rejected request fails fast.

use std::sync::Arc;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use bytes::Bytes;
use plenum_broadcast::{Notice, StatusNotice};
use plenum_db::{AudioChunk, ChunkStatus};
use plenum_stt_interface::Transcription;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

use crate::{Error, Pipeline};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub workers: usize,
    pub depth: usize,
    pub retry: RetryPolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            depth: 64,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Job {
    chunk_id: Uuid,
}

/// Handle for enqueueing chunks. Workers live as long as any handle does.
#[derive(Clone)]
pub struct TranscribeQueue {
    tx: mpsc::Sender<Job>,
}

impl TranscribeQueue {
    pub fn spawn(pipeline: Arc<Pipeline>, config: QueueConfig) -> Self {
        let (tx, rx) = mpsc::channel::<Job>(config.depth);
        let rx = Arc::new(Mutex::new(rx));

        for worker in 0..config.workers.max(1) {
            let pipeline = pipeline.clone();
            let rx = rx.clone();
            let retry = config.retry.clone();
            tokio::spawn(async move {
                loop {
                    let job = { rx.lock().await.recv().await };
                    let Some(job) = job else {
                        break;
                    };
                    if let Err(e) = pipeline.process_chunk(job.chunk_id, &retry).await {
                        tracing::error!(
                            error = %e,
                            chunk_id = %job.chunk_id,
                            worker,
                            "transcription_job_failed"
                        );
                    }
                }
            });
        }

        Self { tx }
    }

    pub async fn enqueue(&self, chunk_id: Uuid) -> Result<(), Error> {
        self.tx
            .send(Job { chunk_id })
            .await
            .map_err(|_| Error::QueueClosed)
    }
}

impl Pipeline {
    /// One job: mark processing, transcribe with retry, store the raw
    /// payload, then align. Provider failures are terminal for the chunk
    /// (status `failed`), not for the worker.
    pub async fn process_chunk(&self, chunk_id: Uuid, retry: &RetryPolicy) -> Result<(), Error> {
        let Some(chunk) = self.db.get_chunk(chunk_id).await? else {
            tracing::warn!(chunk_id = %chunk_id, "transcription_skipped_chunk_missing");
            return Ok(());
        };
        let audio = self.db.chunk_audio(chunk_id).await?.unwrap_or_default();
        if audio.is_empty() {
            tracing::warn!(chunk_id = %chunk_id, seq = chunk.seq, "transcription_skipped_no_audio");
            self.mark_status(&chunk, ChunkStatus::Failed).await?;
            return Ok(());
        }

        self.mark_status(&chunk, ChunkStatus::Processing).await?;

        let transcription = match self.transcribe_with_retry(&chunk, audio, retry).await {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    chunk_id = %chunk_id,
                    seq = chunk.seq,
                    "transcription_failed"
                );
                self.mark_status(&chunk, ChunkStatus::Failed).await?;
                return Ok(());
            }
        };

        tracing::info!(
            chunk_id = %chunk_id,
            seq = chunk.seq,
            duration = transcription.duration,
            has_words = transcription.has_word_timings(),
            "transcription_succeeded"
        );

        // store_transcript flips the status to completed in the same statement.
        let payload = serde_json::to_string(&transcription)?;
        self.db.store_transcript(chunk_id, &payload).await?;
        self.publish_status(&chunk, ChunkStatus::Completed);

        self.align_chunk(chunk_id).await?;
        Ok(())
    }

    async fn transcribe_with_retry(
        &self,
        chunk: &AudioChunk,
        audio: Vec<u8>,
        retry: &RetryPolicy,
    ) -> Result<Transcription, plenum_transcribe_groq::Error> {
        let audio = Bytes::from(audio);
        let file_name = format!("chunk-{}.webm", chunk.seq);
        // max_times counts retries, so attempts = 1 initial try + (attempts - 1).
        let backoff = ExponentialBuilder::default()
            .with_jitter()
            .with_min_delay(retry.min_delay)
            .with_max_delay(retry.max_delay)
            .with_max_times(retry.attempts.saturating_sub(1));

        (|| async { self.stt.transcribe(audio.clone(), &file_name).await })
            .retry(backoff)
            .notify(|err, dur| {
                tracing::warn!(
                    error = %err,
                    retry_delay_ms = dur.as_millis(),
                    "retrying_transcription"
                );
            })
            .when(|e| e.is_retryable())
            .await
    }

    /// Status writes double as live notices; chunk state is the one piece of
    /// progress a UI can show before segments exist.
    async fn mark_status(&self, chunk: &AudioChunk, status: ChunkStatus) -> Result<(), Error> {
        self.db.set_chunk_status(chunk.id, status).await?;
        self.publish_status(chunk, status);
        Ok(())
    }

    fn publish_status(&self, chunk: &AudioChunk, status: ChunkStatus) {
        self.hub.publish(
            chunk.meeting_id,
            Notice::Status(StatusNotice {
                meeting_id: chunk.meeting_id,
                seq: chunk.seq,
                status: status.as_str().to_string(),
            }),
        );
    }
}
