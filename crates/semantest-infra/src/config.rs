//! Engine configuration loader for Semantest.
//!
//! Reads `config.toml` from the data directory (`~/.semantest/` in
//! production) and deserializes it into [`EngineConfig`]. Falls back to
//! sensible defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use semantest_types::config::EngineConfig;

/// Load engine configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`EngineConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and
///   returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_engine_config(data_dir: &Path) -> EngineConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No config.toml found at {}, using defaults",
                config_path.display()
            );
            return EngineConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return EngineConfig::default();
        }
    };

    match toml::from_str::<EngineConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            EngineConfig::default()
        }
    }
}

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `SEMANTEST_DATA_DIR` environment variable
/// 2. Platform home directory (`~/.semantest`)
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SEMANTEST_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".semantest");
    }

    // Last resort: current directory
    PathBuf::from(".semantest")
}
