pub mod batch;

pub use batch::{Transcription, WordTiming};
