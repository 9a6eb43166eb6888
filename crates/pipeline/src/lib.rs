//! The side-effecting half of the transcription service.
//!
//! Everything stateful funnels through [`Pipeline`]: transcribing queued
//! chunks against the provider, running the pure alignment engine over the
//! results, persisting segments, and fanning out notices. The alignment
//! crates stay pure; this one owns the datastore handle, the HTTP clients
//! and the channels.

mod align;
mod error;
mod worker;

pub use align::{AlignOutcome, SkipReason};
pub use error::Error;
pub use worker::{QueueConfig, RetryPolicy, TranscribeQueue};

use std::sync::Arc;

use plenum_broadcast::Hub;
use plenum_db::Database;
use plenum_relay::Relay;
use plenum_transcribe_groq::GroqClient;

pub struct Pipeline {
    db: Database,
    stt: GroqClient,
    hub: Arc<Hub>,
    relay: Arc<Relay>,
}

impl Pipeline {
    pub fn new(db: Database, stt: GroqClient, hub: Arc<Hub>, relay: Arc<Relay>) -> Self {
        Self {
            db,
            stt,
            hub,
            relay,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }
}
