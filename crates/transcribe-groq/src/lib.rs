mod client;
mod error;

pub use client::{GroqClient, GroqClientBuilder};
pub use error::Error;
