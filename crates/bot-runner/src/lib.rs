//! Lifecycle of the external meeting-bot process.
//!
//! The bot (a Node service that joins calls and relays audio) is owned by the
//! platform, not by us — this crate only makes sure one instance is up when a
//! meeting needs it and tears it down afterwards. Nothing in the alignment
//! path knows this exists.

use std::path::PathBuf;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub command: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// When set, `is_healthy` also probes this endpoint; a live process that
    /// fails the probe counts as unhealthy.
    pub health_url: Option<Url>,
    pub stop_grace: Duration,
}

impl BotConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            cwd: None,
            health_url: None,
            stop_grace: Duration::from_secs(5),
        }
    }
}

pub struct BotRunner {
    config: BotConfig,
    child: Mutex<Option<Child>>,
    http: reqwest::Client,
}

impl BotRunner {
    pub fn new(config: BotConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()?;
        Ok(Self {
            config,
            child: Mutex::new(None),
            http,
        })
    }

    /// Spawn the bot unless a previous spawn is still alive.
    /// Returns `true` when a new process was started.
    pub async fn ensure_running(&self) -> Result<bool, Error> {
        let mut guard = self.child.lock().await;

        if let Some(child) = guard.as_mut() {
            if child.try_wait()?.is_none() {
                return Ok(false);
            }
            tracing::warn!("bot_process_found_dead");
        }

        let mut command = Command::new(&self.config.command);
        command.args(&self.config.args).kill_on_drop(true);
        if let Some(cwd) = &self.config.cwd {
            command.current_dir(cwd);
        }

        let child = command.spawn()?;
        tracing::info!(pid = child.id(), "bot_process_started");
        *guard = Some(child);
        Ok(true)
    }

    /// Kill the bot and wait up to `stop_grace` for it to go away.
    /// Returns `true` when there was a live process to stop.
    pub async fn stop(&self) -> Result<bool, Error> {
        let mut guard = self.child.lock().await;
        let Some(mut child) = guard.take() else {
            return Ok(false);
        };

        if child.try_wait()?.is_some() {
            return Ok(false);
        }

        child.start_kill()?;
        // kill_on_drop covers the (unlikely) case of the wait timing out.
        let _ = tokio::time::timeout(self.config.stop_grace, child.wait()).await;
        tracing::info!("bot_process_stopped");
        Ok(true)
    }

    pub async fn is_running(&self) -> bool {
        let mut guard = self.child.lock().await;
        match guard.as_mut() {
            Some(child) => match child.try_wait() {
                Ok(None) => true,
                _ => {
                    *guard = None;
                    false
                }
            },
            None => false,
        }
    }

    /// Process liveness plus, when configured, the HTTP health probe.
    pub async fn is_healthy(&self) -> bool {
        if !self.is_running().await {
            return false;
        }
        let Some(url) = &self.config.health_url else {
            return true;
        };
        match self.http.get(url.clone()).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sleeper() -> BotRunner {
        let mut config = BotConfig::new("sleep");
        config.args = vec!["30".into()];
        BotRunner::new(config).unwrap()
    }

    #[tokio::test]
    async fn ensure_running_spawns_once() {
        let runner = sleeper();

        assert!(runner.ensure_running().await.unwrap());
        assert!(!runner.ensure_running().await.unwrap());
        assert!(runner.is_running().await);

        runner.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stop_kills_the_process() {
        let runner = sleeper();
        runner.ensure_running().await.unwrap();

        assert!(runner.stop().await.unwrap());
        assert!(!runner.is_running().await);
        assert!(!runner.stop().await.unwrap());
    }

    #[tokio::test]
    async fn dead_process_is_respawned() {
        let runner = BotRunner::new(BotConfig::new("true")).unwrap();

        assert!(runner.ensure_running().await.unwrap());
        // Give the one-shot command a moment to exit.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!runner.is_running().await);
        assert!(runner.ensure_running().await.unwrap());

        runner.stop().await.unwrap();
    }

    #[tokio::test]
    async fn health_probe_gates_on_the_endpoint() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().route("/health", axum::routing::get(|| async { "ok" }));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut config = BotConfig::new("sleep");
        config.args = vec!["30".into()];
        config.health_url = Some(Url::parse(&format!("http://{addr}/health")).unwrap());
        let runner = BotRunner::new(config).unwrap();

        runner.ensure_running().await.unwrap();
        assert!(runner.is_healthy().await);

        runner.stop().await.unwrap();
        assert!(!runner.is_healthy().await);
    }

    #[tokio::test]
    async fn never_started_is_not_running() {
        let runner = sleeper();

        assert!(!runner.is_running().await);
        assert!(!runner.is_healthy().await);
    }
}
