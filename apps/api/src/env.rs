use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer};

fn default_port() -> u16 {
    4000
}

fn default_database_path() -> String {
    "data/plenum.db".to_string()
}

fn default_queue_workers() -> usize {
    2
}

fn filter_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[derive(Deserialize)]
pub struct GroqEnv {
    #[serde(default, deserialize_with = "filter_empty")]
    pub groq_api_key: Option<String>,
    #[serde(default, deserialize_with = "filter_empty")]
    pub groq_api_base: Option<String>,
    #[serde(default, deserialize_with = "filter_empty")]
    pub groq_model: Option<String>,
}

#[derive(Deserialize)]
pub struct RelayEnv {
    #[serde(default, deserialize_with = "filter_empty")]
    pub relay_endpoint: Option<String>,
    #[serde(default, deserialize_with = "filter_empty")]
    pub relay_token: Option<String>,
}

#[derive(Deserialize)]
pub struct BotEnv {
    #[serde(default, deserialize_with = "filter_empty")]
    pub bot_command: Option<String>,
    /// Whitespace-separated argument list for the bot process.
    #[serde(default, deserialize_with = "filter_empty")]
    pub bot_args: Option<String>,
    #[serde(default, deserialize_with = "filter_empty")]
    pub bot_health_url: Option<String>,
}

#[derive(Deserialize)]
pub struct Env {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default, deserialize_with = "filter_empty")]
    pub service_token: Option<String>,
    #[serde(default = "default_queue_workers")]
    pub queue_workers: usize,

    #[serde(flatten)]
    pub groq: GroqEnv,
    #[serde(flatten)]
    pub relay: RelayEnv,
    #[serde(flatten)]
    pub bot: BotEnv,
}

static ENV: OnceLock<Env> = OnceLock::new();

pub fn env() -> &'static Env {
    ENV.get_or_init(|| {
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let _ = dotenvy::from_path(manifest_dir.join(".env"));
        envy::from_env().expect("Failed to load environment")
    })
}
