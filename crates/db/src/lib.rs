mod chunks;
mod error;
mod events;
mod meetings;
mod segments;
mod store;
mod types;

pub use error::Error;
pub use store::Database;
pub use types::{
    AudioChunk, ChunkSnapshot, ChunkStatus, Meeting, NewChunk, NewMeeting, NewSegment,
    NewSpeakerEvent, SegmentRow, SpeakerEventRow,
};
