//! Point-in-time speaker lookup over the meeting's speaker-change history.
//!
//! Two rules, applied in order:
//!
//! 1. **At-or-before**: the active speaker at an instant is the *last* event
//!    whose `started_at` is `<=` the instant. An event stamped exactly at the
//!    instant counts — platform timestamps and audio anchors come from the
//!    same clock, and word boundaries routinely land exactly on speaker
//!    changes.
//! 2. **Bounded look-ahead**: when no event is at-or-before (words spoken
//!    before the first speaker event arrived), the *earliest* event within
//!    [`LOOKAHEAD_WINDOW_MS`] after the instant is used instead. Platform
//!    speaker events lag the audio by a moment; without this, the opening
//!    words of every meeting would go unattributed. Beyond the window the
//!    lookup reports nobody rather than guess.

use chrono::{DateTime, Duration, Utc};

use crate::types::SpeakerEvent;

/// How far past an instant the look-ahead rule may reach.
pub const LOOKAHEAD_WINDOW_MS: i64 = 5_000;

/// The full speaker-change history of one meeting, ordered by `started_at`.
#[derive(Debug, Clone, Default)]
pub struct SpeakerTimeline {
    events: Vec<SpeakerEvent>,
}

impl SpeakerTimeline {
    /// Events may arrive in any order; ties keep their insertion order.
    pub fn new(mut events: Vec<SpeakerEvent>) -> Self {
        events.sort_by_key(|e| e.started_at);
        Self { events }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Who was speaking at `instant`?
    pub fn active_at(&self, instant: DateTime<Utc>) -> Option<&SpeakerEvent> {
        let mut active = None;
        for event in &self.events {
            if event.started_at <= instant {
                active = Some(event);
            } else {
                break;
            }
        }
        if active.is_some() {
            return active;
        }

        let next = self.events.iter().find(|e| e.started_at > instant)?;
        let lead = next.started_at - instant;
        (lead <= Duration::milliseconds(LOOKAHEAD_WINDOW_MS)).then_some(next)
    }
}
