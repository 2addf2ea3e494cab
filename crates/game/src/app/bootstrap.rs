use shmup_engine::{LoopConfig, Scene};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay::{SceneOptions, ShooterScene};
use super::settings::{load_settings, settings_path_from_env, Settings, SettingsError};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, SettingsError> {
    init_tracing();
    info!("=== Fareast Startup ===");

    let settings = load_settings(settings_path_from_env().as_deref())?;
    Ok(wire(&settings, resolve_seed(settings.rng_seed)))
}

fn wire(settings: &Settings, rng_seed: u64) -> AppWiring {
    let config = LoopConfig {
        logical_width: settings.logical_width,
        logical_height: settings.logical_height,
        ..LoopConfig::default()
    };
    let scene = ShooterScene::new(SceneOptions {
        rng_seed,
        enable_music: settings.enable_music,
        volume: settings.volume,
    });

    AppWiring {
        config,
        scene: Box::new(scene),
    }
}

fn resolve_seed(configured: Option<u64>) -> u64 {
    let seed = configured.unwrap_or_else(rand::random);
    info!(seed, fixed = configured.is_some(), "rng_seeded");
    seed
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
