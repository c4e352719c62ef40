use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks. Falls back to defaults if `init_config`
/// was never called (library and test use).
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
        .load_full()
}

/// Initialize the global configuration from `config.toml`
pub fn init_config() {
    init_config_from(DEFAULT_CONFIG_PATH);
}

/// Initialize the global configuration from the given path
///
/// If the file doesn't exist, uses in-memory defaults plus `PC__*` overrides.
pub fn init_config_from(path: &str) {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load(path)));
}

/// Replace the global configuration
pub fn update_config(config: StaticConfig) {
    match CONFIG.get() {
        Some(current) => current.store(Arc::new(config)),
        None => {
            let _ = CONFIG.set(ArcSwap::from_pointee(config));
        }
    }
}
