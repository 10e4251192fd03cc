use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use walker_engine::{
    load_catalog, resolve_app_paths, Catalog, ContentError, LoopConfig, Scene, StartupError,
};

use super::director::PortfolioDirector;
use super::settings::{load_settings, GameSettings, SettingsError};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) assets_dir: PathBuf,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to load world catalog: {0}")]
    Content(#[from] ContentError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Source Walker Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        assets = %paths.assets_dir.display(),
        "paths_resolved"
    );
    let settings = load_settings(&paths.assets_dir)?;
    let catalog = load_catalog(&paths.assets_dir)?;

    Ok(wire(catalog, settings, paths.assets_dir))
}

fn wire(catalog: Catalog, settings: GameSettings, assets_dir: PathBuf) -> AppWiring {
    let start_world = resolve_start_world(&catalog, settings.start_world.as_deref());
    info!(
        path_step_ms = settings.nav.movement.path_step_interval.as_millis() as u64,
        key_cooldown_ms = settings.nav.movement.key_cooldown.as_millis() as u64,
        open_panel_on_arrival = settings.nav.open_panel_on_arrival,
        start_world = ?start_world,
        "settings_resolved"
    );

    let config = LoopConfig {
        show_stats: settings.show_stats,
        max_render_fps: settings.max_render_fps,
        ..LoopConfig::default()
    };
    let scene = PortfolioDirector::new(catalog.worlds().to_vec(), settings.nav, start_world);

    AppWiring {
        config,
        scene: Box::new(scene),
        assets_dir,
    }
}

fn resolve_start_world(catalog: &Catalog, requested: Option<&str>) -> Option<usize> {
    let id = requested?;
    let index = catalog.position_of(id);
    if index.is_none() {
        warn!(world = id, "unknown start world; showing selection screen");
    }
    index
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
