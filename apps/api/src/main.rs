mod env;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use url::Url;

use plenum_bot_runner::{BotConfig, BotRunner};
use plenum_broadcast::Hub;
use plenum_db::Database;
use plenum_pipeline::{Pipeline, QueueConfig, TranscribeQueue};
use plenum_relay::Relay;
use plenum_transcribe_groq::GroqClient;

use api::{AppState, AuthState, app};
use env::env;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve())
}

async fn serve() -> anyhow::Result<()> {
    let env = env();

    if let Some(parent) = Path::new(&env.database_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::open(&env.database_path).await?;

    let stt = {
        let mut builder = GroqClient::builder();
        if let Some(key) = &env.groq.groq_api_key {
            builder = builder.api_key(key);
        }
        if let Some(base) = &env.groq.groq_api_base {
            builder = builder.api_base(base);
        }
        if let Some(model) = &env.groq.groq_model {
            builder = builder.model(model);
        }
        builder.build()?
    };

    let relay = match (&env.relay.relay_endpoint, &env.relay.relay_token) {
        (Some(endpoint), Some(token)) => Relay::new(Url::parse(endpoint)?, token)?,
        _ => {
            tracing::info!("relay_disabled");
            Relay::disabled()
        }
    };

    let runner = match &env.bot.bot_command {
        Some(command) => {
            let mut config = BotConfig::new(command);
            if let Some(args) = &env.bot.bot_args {
                config.args = args.split_whitespace().map(str::to_string).collect();
            }
            if let Some(health) = &env.bot.bot_health_url {
                config.health_url = Some(Url::parse(health)?);
            }
            Some(Arc::new(BotRunner::new(config)?))
        }
        None => None,
    };

    let hub = Arc::new(Hub::new());
    let pipeline = Arc::new(Pipeline::new(
        db.clone(),
        stt,
        hub.clone(),
        Arc::new(relay),
    ));
    let queue = TranscribeQueue::spawn(
        pipeline,
        QueueConfig {
            workers: env.queue_workers,
            ..Default::default()
        },
    );

    let state = AppState {
        db,
        hub,
        queue,
        runner: runner.clone(),
    };
    let auth_state = AuthState::new(env.service_token.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], env.port));
    tracing::info!(addr = %addr, "server_listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state, auth_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(runner) = runner {
        runner.stop().await?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "ctrl_c_handler_failed");
        return;
    }
    tracing::info!("shutdown_signal_received");
}
