//! In-process fan-out of meeting notices to live subscribers.
//!
//! One lazily created `tokio::sync::broadcast` channel per meeting, shared
//! behind a plain mutex. Alignment completion publishes here; WebSocket
//! sessions subscribe. Publishing never blocks and never fails the caller:
//! with nobody listening the notice is dropped, and slow subscribers that
//! fall behind the channel capacity lose the oldest notices — losing
//! downstream messages must never stall transcript persistence.

mod notice;

pub use notice::{CheckpointNotice, Notice, SegmentNotice, StatusNotice};

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Default)]
pub struct Hub {
    channels: Mutex<HashMap<Uuid, broadcast::Sender<Notice>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, meeting_id: Uuid) -> broadcast::Receiver<Notice> {
        self.channels()
            .entry(meeting_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Deliver a notice to the meeting's subscribers; returns how many
    /// received it. A meeting whose last subscriber is gone gets its channel
    /// dropped on the next publish.
    pub fn publish(&self, meeting_id: Uuid, notice: Notice) -> usize {
        let mut channels = self.channels();
        let Some(sender) = channels.get(&meeting_id) else {
            return 0;
        };
        match sender.send(notice) {
            Ok(receivers) => receivers,
            Err(_) => {
                channels.remove(&meeting_id);
                0
            }
        }
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<Uuid, broadcast::Sender<Notice>>> {
        match self.channels.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[cfg(test)]
    fn channel_count(&self) -> usize {
        self.channels().len()
    }
}
