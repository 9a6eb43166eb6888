use std::sync::Arc;

use plenum_bot_runner::BotRunner;
use plenum_broadcast::Hub;
use plenum_db::Database;
use plenum_pipeline::TranscribeQueue;

/// Shared handles for every route. `runner` is `None` when no bot command is
/// configured; registration then skips the lazy spawn.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub hub: Arc<Hub>,
    pub queue: TranscribeQueue,
    pub runner: Option<Arc<BotRunner>>,
}
