use engine::{LoopConfig, SceneSet};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::GameConfig;
use super::gameplay::GameScene;
use super::menu_scenes::{PauseScene, StartScene};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scenes: SceneSet,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== RPG Startup ===");

    let game_config = GameConfig::from_env();
    info!(
        start_map = %game_config.start_map,
        start_spawn = %game_config.start_spawn,
        "game_config"
    );

    AppWiring {
        config: LoopConfig::default(),
        scenes: SceneSet {
            start: Box::new(StartScene),
            game: Box::new(GameScene::new(game_config)),
            pause: Box::new(PauseScene),
        },
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
