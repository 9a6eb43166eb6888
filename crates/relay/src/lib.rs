mod client;
mod error;
mod types;

pub use client::Relay;
pub use error::Error;
pub use types::SegmentBody;
