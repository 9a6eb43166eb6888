use crate::types::{Segment, WordAttribution};

/// Display name used when no speaker identity or name is available.
pub const UNKNOWN_SPEAKER_NAME: &str = "Unknown Speaker";

/// Fold word attributions into maximal same-speaker runs.
///
/// The grouping key is the speaker's `member_id` — `None` (no event, or an
/// event the platform could not identify) is a key like any other, so
/// consecutive unattributed words form their own segment instead of being
/// glued to a neighbor. Text is space-joined in word order; `end` follows the
/// last word appended; `confidence` stays whatever the run's opening
/// attribution carried.
pub fn group_attributions(attrs: Vec<WordAttribution<'_>>) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();

    for attr in attrs {
        let key = attr.speaker.and_then(|e| e.member_id.as_deref());
        match segments.last_mut() {
            Some(open) if open.speaker_id.as_deref() == key => {
                open.text.push(' ');
                open.text.push_str(&attr.text);
                open.end = attr.end;
                open.word_count += 1;
            }
            _ => segments.push(open_segment(&attr)),
        }
    }

    segments
}

fn open_segment(attr: &WordAttribution<'_>) -> Segment {
    let (speaker_id, speaker_name) = match attr.speaker {
        Some(event) => (
            event.member_id.clone(),
            event
                .member_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_SPEAKER_NAME.to_string()),
        ),
        None => (None, UNKNOWN_SPEAKER_NAME.to_string()),
    };

    Segment {
        speaker_id,
        speaker_name,
        text: attr.text.clone(),
        start: attr.start,
        end: attr.end,
        confidence: attr.confidence,
        word_count: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{SPEAKER_MATCH_CONFIDENCE, UNKNOWN_SPEAKER_CONFIDENCE};
    use crate::types::SpeakerEvent;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
    }

    fn event(member: Option<&str>, name: Option<&str>) -> SpeakerEvent {
        SpeakerEvent {
            member_id: member.map(str::to_string),
            member_name: name.map(str::to_string),
            started_at: anchor(),
        }
    }

    fn attr<'a>(
        text: &str,
        start_ms: i64,
        end_ms: i64,
        speaker: Option<&'a SpeakerEvent>,
    ) -> WordAttribution<'a> {
        let confidence = if speaker.is_some() {
            SPEAKER_MATCH_CONFIDENCE
        } else {
            UNKNOWN_SPEAKER_CONFIDENCE
        };
        WordAttribution {
            text: text.to_string(),
            start: anchor() + Duration::milliseconds(start_ms),
            end: anchor() + Duration::milliseconds(end_ms),
            speaker,
            confidence,
        }
    }

    #[test]
    fn consecutive_same_speaker_words_fold_into_one_segment() {
        let a = event(Some("a"), Some("Alice"));

        let segments = group_attributions(vec![
            attr("Hello", 0, 500, Some(&a)),
            attr("world", 600, 1_200, Some(&a)),
        ]);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Hello world");
        assert_eq!(segments[0].speaker_name, "Alice");
        assert_eq!(segments[0].start, anchor());
        assert_eq!(segments[0].end, anchor() + Duration::milliseconds(1_200));
        assert_eq!(segments[0].word_count, 2);
    }

    #[test]
    fn speaker_change_opens_a_new_segment() {
        let a = event(Some("a"), Some("Alice"));
        let b = event(Some("b"), Some("Bob"));

        let segments = group_attributions(vec![
            attr("Hello", 0, 500, Some(&a)),
            attr("there", 600, 900, Some(&b)),
            attr("Bob", 1_000, 1_300, Some(&b)),
        ]);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello");
        assert_eq!(segments[1].text, "there Bob");
        assert_eq!(segments[1].speaker_id.as_deref(), Some("b"));
    }

    #[test]
    fn unattributed_words_form_their_own_segment() {
        let a = event(Some("a"), Some("Alice"));

        let segments = group_attributions(vec![
            attr("Hello", 0, 500, Some(&a)),
            attr("mystery", 600, 900, None),
            attr("voice", 1_000, 1_300, None),
        ]);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].speaker_id, None);
        assert_eq!(segments[1].speaker_name, UNKNOWN_SPEAKER_NAME);
        assert_eq!(segments[1].text, "mystery voice");
        assert_eq!(segments[1].confidence, UNKNOWN_SPEAKER_CONFIDENCE);
    }

    #[test]
    fn anonymous_event_groups_with_no_event_under_the_null_key() {
        // An event with no member_id and "no speaker at all" share the None
        // key; the run keeps the name from whichever attribution opened it.
        let anon = event(None, Some("Guest"));

        let segments = group_attributions(vec![
            attr("one", 0, 200, Some(&anon)),
            attr("two", 300, 500, None),
        ]);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].speaker_id, None);
        assert_eq!(segments[0].speaker_name, "Guest");
        assert_eq!(segments[0].word_count, 2);
    }

    #[test]
    fn identified_event_without_name_falls_back_to_unknown() {
        let nameless = event(Some("a"), None);

        let segments = group_attributions(vec![attr("hi", 0, 200, Some(&nameless))]);

        assert_eq!(segments[0].speaker_id.as_deref(), Some("a"));
        assert_eq!(segments[0].speaker_name, UNKNOWN_SPEAKER_NAME);
    }

    #[test]
    fn confidence_comes_from_the_opening_attribution() {
        let a = event(Some("a"), Some("Alice"));
        let mut second = attr("world", 600, 900, Some(&a));
        second.confidence = 0.5;

        let segments = group_attributions(vec![attr("Hello", 0, 500, Some(&a)), second]);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].confidence, SPEAKER_MATCH_CONFIDENCE);
    }

    #[test]
    fn speaker_returning_later_gets_a_fresh_segment() {
        let a = event(Some("a"), Some("Alice"));
        let b = event(Some("b"), Some("Bob"));

        let segments = group_attributions(vec![
            attr("one", 0, 200, Some(&a)),
            attr("two", 300, 500, Some(&b)),
            attr("three", 600, 800, Some(&a)),
        ]);

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].speaker_id.as_deref(), Some("a"));
        assert_eq!(segments[2].speaker_id.as_deref(), Some("a"));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(group_attributions(vec![]).is_empty());
    }
}
