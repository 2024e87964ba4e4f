use std::env;
use std::path::Path;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::config::{load_game_config, AppError, GameConfig};

pub(crate) const CONFIG_ENV_VAR: &str = "SPOREFRONT_CONFIG";
pub(crate) const RUN_SECONDS_ENV_VAR: &str = "SPOREFRONT_RUN_SECONDS";

pub(crate) struct AppWiring {
    pub(crate) config: GameConfig,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "=== Sporefront Startup ===");

    let mut config = resolve_game_config()?;
    if let Some(run_seconds) = resolve_run_seconds_override() {
        config.run_seconds = run_seconds;
    }
    info!(
        realtime = config.realtime,
        hex_radius = config.hex_radius,
        vertical_scale = config.vertical_scale,
        "startup"
    );

    Ok(AppWiring { config })
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

fn resolve_game_config() -> Result<GameConfig, AppError> {
    match env::var(CONFIG_ENV_VAR) {
        Ok(path) => {
            let config = load_game_config(Path::new(&path))?;
            info!(path = path.as_str(), "game_config_loaded");
            Ok(config)
        }
        Err(env::VarError::NotPresent) => Ok(GameConfig::default()),
        Err(err) => {
            warn!(
                env_var = CONFIG_ENV_VAR,
                error = %err,
                "unable to read config env var; using defaults"
            );
            Ok(GameConfig::default())
        }
    }
}

fn resolve_run_seconds_override() -> Option<f64> {
    let raw = env::var(RUN_SECONDS_ENV_VAR).ok()?;
    let parsed = parse_run_seconds(&raw);
    if parsed.is_none() {
        warn!(
            env_var = RUN_SECONDS_ENV_VAR,
            value = raw.as_str(),
            "invalid run-seconds env var value; keeping config"
        );
    }
    parsed
}

fn parse_run_seconds(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
}
